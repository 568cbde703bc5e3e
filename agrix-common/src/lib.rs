//! # Agrix Common Library
//!
//! Shared code for the agrix production-analytics crates:
//! - Error type and result alias
//! - TOML / environment configuration loading
//! - Fetch lifecycle events (AgrixEvent) and the EventBus
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
