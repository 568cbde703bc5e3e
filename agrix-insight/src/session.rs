//! Inventory session: one query engine bound to one orchestrator view

use crate::model::RecordKind;
use crate::orchestrator::{FetchError, FetchOrchestrator, FetchOutcome, FetchRequest};
use crate::query::{FilterChange, QueryEngine, QueryView};
use std::sync::Arc;

pub struct InventorySession {
    orchestrator: Arc<FetchOrchestrator>,
    view: String,
    engine: QueryEngine,
    last_error: Option<FetchError>,
}

impl InventorySession {
    pub fn new(
        orchestrator: Arc<FetchOrchestrator>,
        view: impl Into<String>,
        kind: RecordKind,
        page_size: usize,
    ) -> Self {
        Self {
            orchestrator,
            view: view.into(),
            engine: QueryEngine::new(kind, page_size),
            last_error: None,
        }
    }

    pub fn view_name(&self) -> &str {
        &self.view
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    /// Recoverable error of the last load, cleared by the next success
    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Switch kind: reset filters and page, then fetch
    pub async fn select_kind(&mut self, kind: RecordKind) -> FetchOutcome {
        self.engine.set_record_kind(kind);
        self.last_error = None;
        let outcome = self
            .orchestrator
            .load(&self.view, FetchRequest::new(kind))
            .await;
        self.apply(&outcome);
        outcome
    }

    /// Background refetch of the current kind; filters and page are kept
    pub async fn refresh(&mut self) -> FetchOutcome {
        let outcome = self
            .orchestrator
            .load(&self.view, FetchRequest::refresh(self.engine.kind()))
            .await;
        self.apply(&outcome);
        outcome
    }

    pub fn set_filter(&mut self, change: FilterChange) {
        self.engine.set_filter(change);
    }

    pub fn set_page(&mut self, page: usize) {
        self.engine.set_page(page);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.engine.set_page_size(page_size);
    }

    pub fn view(&mut self) -> QueryView {
        self.engine.compute_view()
    }

    fn apply(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Loaded {
                snapshot,
                kind_changed,
                ..
            } => {
                if snapshot.kind == self.engine.kind() {
                    let same = self
                        .engine
                        .snapshot()
                        .is_some_and(|current| Arc::ptr_eq(current, snapshot));
                    if !same {
                        self.engine.replace_snapshot(Arc::clone(snapshot), *kind_changed);
                    }
                    self.last_error = None;
                }
            }
            FetchOutcome::Cancelled => {}
            FetchOutcome::Failed { error, retained } => {
                if self.engine.snapshot().is_none() {
                    if let Some(snapshot) = retained.as_ref().filter(|s| s.kind == self.engine.kind()) {
                        self.engine.replace_snapshot(Arc::clone(snapshot), true);
                    }
                }
                self.last_error = Some(error.clone());
            }
        }
    }
}
