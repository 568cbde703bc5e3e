//! Test Helper Utilities
//!
//! Shared utilities for testing agrix-insight

#![allow(dead_code)]

pub mod memory_store;

pub use memory_store::{farmer, MemoryStore};
