//! agrix-insight - production analytics and inventory queries
//!
//! Turns the bulk record listings of the agricultural record store into:
//! - per-category production summaries (extract → classify → aggregate)
//! - filtered, paginated inventory views over one record kind
//!
//! Data flow: [`orchestrator`] fetches and joins rows ([`derive`],
//! [`enrich`]), then feeds either the [`query`] engine or the
//! [`aggregate`] pipeline.

pub mod aggregate;
pub mod analytics;
pub mod cache;
pub mod category;
pub mod classify;
pub mod debounce;
pub mod derive;
pub mod enrich;
pub mod extract;
pub mod lenient;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod payload;
pub mod query;
pub mod session;
pub mod snapshot;
pub mod store;

pub use aggregate::{CategoryItem, CategorySummary, MonthlyTotals};
pub use analytics::AnalyticsDataset;
pub use category::Category;
pub use model::{Record, RecordKind};
pub use orchestrator::{FetchError, FetchOrchestrator, FetchOutcome, FetchRequest, FetchSettings};
pub use session::InventorySession;
pub use snapshot::Snapshot;
