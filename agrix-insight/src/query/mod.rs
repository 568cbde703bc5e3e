//! Client-side query engine
//!
//! Search, structured filters and pagination over the in-memory snapshot of
//! one record kind. The backend offers no query capability beyond bulk
//! listing, so every view is computed here.

pub mod engine;
pub mod filter;
pub mod options;
pub mod pagination;
pub mod state;

pub use engine::{QueryEngine, QueryView};
pub use options::FilterOptions;
pub use pagination::{calculate_pagination, Pagination};
pub use state::{FilterChange, Filters, QueryState};
