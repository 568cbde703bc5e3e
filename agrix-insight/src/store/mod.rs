//! Record store collaborator
//!
//! The store only offers paged bulk listing per kind plus a farmer detail
//! lookup. [`RecordStore`] is that contract; [`HttpRecordStore`] speaks it
//! over HTTP and tests substitute in-memory implementations.

pub mod envelope;
pub mod http;

use crate::model::{Farmer, LivestockRecord, OperatorRecord, RecordId};
use async_trait::async_trait;
use thiserror::Error;

pub use envelope::Envelope;
pub use http::HttpRecordStore;

/// Record store errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Paging and server-side search of one list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// 1-indexed
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
}

impl ListParams {
    pub fn first(page_size: u32, search: Option<String>) -> Self {
        Self {
            page: 1,
            page_size,
            search,
        }
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            ..self.clone()
        }
    }
}

/// One page of a list call
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub rows: Vec<T>,
    /// Rows received before undecodable ones were dropped
    pub received: usize,
}

impl<T> ListPage<T> {
    pub fn new(rows: Vec<T>) -> Self {
        let received = rows.len();
        Self { rows, received }
    }

    /// Whether paging should continue after this page
    ///
    /// A short page ends the listing. So does an oversized one: the store
    /// ignored `limit` and returned everything at once.
    pub fn is_full(&self, page_size: u32) -> bool {
        self.received == page_size as usize
    }
}

/// Read side of the record store
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_farmers(&self, params: &ListParams) -> Result<ListPage<Farmer>, StoreError>;

    /// Farmer with nested crops and rice
    async fn get_farmer(&self, id: &RecordId) -> Result<Farmer, StoreError>;

    async fn list_livestock(
        &self,
        params: &ListParams,
    ) -> Result<ListPage<LivestockRecord>, StoreError>;

    async fn list_operators(
        &self,
        params: &ListParams,
    ) -> Result<ListPage<OperatorRecord>, StoreError>;
}
