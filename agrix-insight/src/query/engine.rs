//! Query engine: filtered, paginated views over one snapshot

use super::filter::apply_filters;
use super::options::FilterOptions;
use super::pagination::calculate_pagination;
use super::state::{FilterChange, Filters, QueryState};
use crate::model::{Record, RecordKind};
use crate::snapshot::Snapshot;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// One page of an inventory view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryView {
    pub kind: RecordKind,
    pub items: Vec<Record>,
    /// Rows passing the filters, independent of page size
    pub total_count: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub options: FilterOptions,
}

/// Holds the view's snapshot and query state
///
/// The filtered row set is memoized and only recomputed after a filter,
/// kind or snapshot change; page navigation reuses it.
#[derive(Debug)]
pub struct QueryEngine {
    state: QueryState,
    snapshot: Option<Arc<Snapshot>>,
    options: FilterOptions,
    filtered: Option<Vec<usize>>,
}

impl QueryEngine {
    pub fn new(kind: RecordKind, page_size: usize) -> Self {
        Self {
            state: QueryState::new(kind, page_size),
            snapshot: None,
            options: FilterOptions::default(),
            filtered: None,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn kind(&self) -> RecordKind {
        self.state.kind
    }

    pub fn filters(&self) -> &Filters {
        &self.state.filters
    }

    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        self.snapshot.as_ref()
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Switch record kind; drops the snapshot and resets filters and page
    ///
    /// The caller is responsible for fetching the new kind.
    pub fn set_record_kind(&mut self, kind: RecordKind) {
        self.state.set_kind(kind);
        self.snapshot = None;
        self.options = FilterOptions::default();
        self.filtered = None;
    }

    pub fn set_filter(&mut self, change: FilterChange) {
        self.state.apply(change);
        self.filtered = None;
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.set_page(page);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.page_size = page_size.max(1);
        self.state.current_page = 1;
    }

    /// Install a new snapshot wholesale
    ///
    /// `reset_page` is set when the kind changed; a background refresh of the
    /// same kind keeps the current page (clamped on the next view).
    pub fn replace_snapshot(&mut self, snapshot: Arc<Snapshot>, reset_page: bool) {
        if snapshot.kind != self.state.kind {
            self.state.set_kind(snapshot.kind);
        } else if reset_page {
            self.state.current_page = 1;
        }
        self.options = FilterOptions::from_records(&snapshot.records);
        self.snapshot = Some(snapshot);
        self.filtered = None;
    }

    /// Filter, then slice the current page
    ///
    /// An out-of-range page is clamped to the last page of the filtered set
    /// and stored back; the filters are not re-run for the clamp.
    pub fn compute_view(&mut self) -> QueryView {
        let records: &[Record] = self
            .snapshot
            .as_ref()
            .map(|s| s.records.as_slice())
            .unwrap_or(&[]);

        let filtered = match self.filtered.take() {
            Some(indices) => indices,
            None => {
                let indices = apply_filters(records, &self.state.filters);
                debug!(
                    kind = %self.state.kind,
                    snapshot = records.len(),
                    matched = indices.len(),
                    "Filters applied"
                );
                indices
            }
        };

        let total_count = filtered.len();
        let pagination =
            calculate_pagination(total_count, self.state.current_page, self.state.page_size);
        if pagination.page != self.state.current_page {
            debug!(
                requested = self.state.current_page,
                clamped = pagination.page,
                "Page out of range, clamped"
            );
            self.state.current_page = pagination.page;
        }

        let items = filtered[pagination.range(total_count)]
            .iter()
            .map(|&idx| records[idx].clone())
            .collect();

        let view = QueryView {
            kind: self.state.kind,
            items,
            total_count,
            current_page: pagination.page,
            page_size: pagination.page_size,
            total_pages: pagination.total_pages,
            options: self.options.clone(),
        };

        self.filtered = Some(filtered);
        view
    }
}
