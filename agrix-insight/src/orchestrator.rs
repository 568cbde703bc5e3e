//! Fetch orchestrator
//!
//! Issues cancellable bulk fetches against the record store and owns the
//! snapshot of every view. Starting a load for a view cancels the load that
//! view already has in flight; a superseded load resolves to
//! [`FetchOutcome::Cancelled`] and never touches the view's snapshot.
//!
//! Within one cycle the farmer list is fetched first (or concurrently with
//! unrelated kinds) because every other kind is derived from or joined to it.

use crate::analytics::AnalyticsDataset;
use crate::cache::SnapshotCache;
use crate::derive;
use crate::enrich::{enrich, FarmerIndex};
use crate::model::{Farmer, Record, RecordKind};
use crate::snapshot::Snapshot;
use crate::store::{ListPage, ListParams, RecordStore, StoreError};
use agrix_common::config::TomlConfig;
use agrix_common::events::{AgrixEvent, EventBus};
use chrono::Utc;
use futures::StreamExt;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Fetch errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The fetch's token was cancelled before it resolved
    #[error("Fetch cancelled")]
    Cancelled,

    #[error("Failed to fetch {kind}: {source}")]
    Store {
        kind: RecordKind,
        #[source]
        source: StoreError,
    },
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// Tagged result of [`FetchOrchestrator::load`]
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The view's snapshot was replaced
    Loaded {
        snapshot: Arc<Snapshot>,
        /// The previous snapshot (if any) was of another kind
        kind_changed: bool,
        cached: bool,
    },
    /// Superseded or cancelled; nothing changed
    Cancelled,
    /// Store failure; the last good snapshot of the kind, if any, is kept
    Failed {
        error: FetchError,
        retained: Option<Arc<Snapshot>>,
    },
}

impl FetchOutcome {
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            FetchOutcome::Loaded { snapshot, .. } => Some(snapshot),
            FetchOutcome::Failed { retained, .. } => retained.as_ref(),
            FetchOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchOutcome::Cancelled)
    }
}

/// One load of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub kind: RecordKind,
    /// Bypass the snapshot cache
    pub refresh: bool,
}

impl FetchRequest {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            refresh: false,
        }
    }

    pub fn refresh(kind: RecordKind) -> Self {
        Self {
            kind,
            refresh: true,
        }
    }
}

/// Paging, hydration and caching settings
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub page_size: u32,
    pub max_pages: u32,
    pub hydrate_nested: bool,
    pub hydrate_concurrency: usize,
    pub cache_max_age: Duration,
}

impl FetchSettings {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            page_size: config.store.bulk_page_size.max(1),
            max_pages: config.store.max_pages.max(1),
            hydrate_nested: config.store.hydrate_nested,
            hydrate_concurrency: config.store.hydrate_concurrency.max(1),
            cache_max_age: Duration::from_secs(config.cache.max_age_secs),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from_config(&TomlConfig::default())
    }
}

/// Per-view fetch state
#[derive(Debug)]
struct ViewSlot {
    /// Incremented by every load; a load only commits if still current
    generation: u64,
    inflight: Option<CancellationToken>,
    snapshot: Option<Arc<Snapshot>>,
    cache: SnapshotCache,
}

impl ViewSlot {
    fn new(max_age: Duration) -> Self {
        Self {
            generation: 0,
            inflight: None,
            snapshot: None,
            cache: SnapshotCache::new(max_age),
        }
    }
}

/// Cancellable bulk fetches and per-view snapshots
pub struct FetchOrchestrator {
    store: Arc<dyn RecordStore>,
    settings: FetchSettings,
    event_bus: EventBus,
    /// Parent of every fetch token; cancelling it stops all fetches
    root: CancellationToken,
    views: Mutex<HashMap<String, ViewSlot>>,
}

impl FetchOrchestrator {
    pub fn new(store: Arc<dyn RecordStore>, settings: FetchSettings, event_bus: EventBus) -> Self {
        Self {
            store,
            settings,
            event_bus,
            root: CancellationToken::new(),
            views: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Token cancelled by [`Self::shutdown`]
    pub fn root_token(&self) -> &CancellationToken {
        &self.root
    }

    /// Cancel every in-flight fetch of every view
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    /// Current snapshot of `view`
    pub async fn snapshot(&self, view: &str) -> Option<Arc<Snapshot>> {
        let views = self.views.lock().await;
        views.get(view).and_then(|slot| slot.snapshot.clone())
    }

    /// Cancel the load `view` has in flight, if any
    pub async fn cancel_inflight(&self, view: &str) {
        let mut views = self.views.lock().await;
        if let Some(slot) = views.get_mut(view) {
            slot.generation += 1;
            if let Some(token) = slot.inflight.take() {
                debug!(view, "Cancelling in-flight fetch");
                token.cancel();
            }
        }
    }

    /// Drop the cached snapshots of `view`
    pub async fn invalidate_cache(&self, view: &str) {
        let mut views = self.views.lock().await;
        if let Some(slot) = views.get_mut(view) {
            slot.cache.invalidate();
        }
    }

    /// Load `request.kind` into `view`, cancelling that view's previous load
    pub async fn load(&self, view: &str, request: FetchRequest) -> FetchOutcome {
        let kind = request.kind;
        let fetch_id = Uuid::new_v4();

        let (generation, token) = {
            let mut views = self.views.lock().await;
            let slot = views
                .entry(view.to_string())
                .or_insert_with(|| ViewSlot::new(self.settings.cache_max_age));

            if let Some(previous) = slot.inflight.take() {
                debug!(view, kind = %kind, "Superseding in-flight fetch");
                previous.cancel();
            }
            slot.generation += 1;

            if slot.snapshot.as_ref().is_some_and(|s| s.kind != kind) {
                slot.snapshot = None;
            }
            slot.cache.select_kind(kind);

            if !request.refresh {
                if let Some(snapshot) = slot.cache.get(kind) {
                    let kind_changed = slot.snapshot.is_none();
                    slot.snapshot = Some(Arc::clone(&snapshot));
                    info!(view, kind = %kind, records = snapshot.len(), "Serving cached snapshot");
                    self.emit_loaded(view, &snapshot, kind_changed, true);
                    return FetchOutcome::Loaded {
                        snapshot,
                        kind_changed,
                        cached: true,
                    };
                }
            }

            let token = self.root.child_token();
            slot.inflight = Some(token.clone());
            (slot.generation, token)
        };

        self.event_bus.emit_lossy(AgrixEvent::FetchStarted {
            view: view.to_string(),
            kind: kind.wire_name().to_string(),
            fetch_id,
            timestamp: Utc::now(),
        });

        let result = self.fetch_kind(kind, &token).await;

        let mut views = self.views.lock().await;
        let Some(slot) = views.get_mut(view) else {
            return self.cancelled(view, kind, fetch_id);
        };

        if slot.generation != generation || token.is_cancelled() {
            return self.cancelled(view, kind, fetch_id);
        }
        slot.inflight = None;

        match result {
            Ok(records) => {
                let snapshot = Snapshot::new(kind, records, fetch_id).shared();
                let kind_changed = slot.snapshot.is_none();
                slot.snapshot = Some(Arc::clone(&snapshot));
                slot.cache.insert(Arc::clone(&snapshot));

                info!(view, kind = %kind, records = snapshot.len(), %fetch_id, "Snapshot replaced");
                self.emit_loaded(view, &snapshot, kind_changed, false);
                FetchOutcome::Loaded {
                    snapshot,
                    kind_changed,
                    cached: false,
                }
            }
            Err(FetchError::Cancelled) => self.cancelled(view, kind, fetch_id),
            Err(error) => {
                let retained = slot.snapshot.clone();
                warn!(
                    view,
                    kind = %kind,
                    error = %error,
                    snapshot_retained = retained.is_some(),
                    "Fetch failed"
                );
                self.event_bus.emit_lossy(AgrixEvent::FetchFailed {
                    view: view.to_string(),
                    kind: kind.wire_name().to_string(),
                    fetch_id,
                    error: error.to_string(),
                    snapshot_retained: retained.is_some(),
                    timestamp: Utc::now(),
                });
                FetchOutcome::Failed { error, retained }
            }
        }
    }

    fn cancelled(&self, view: &str, kind: RecordKind, fetch_id: Uuid) -> FetchOutcome {
        debug!(view, kind = %kind, %fetch_id, "Fetch cancelled, result discarded");
        self.event_bus.emit_lossy(AgrixEvent::FetchCancelled {
            view: view.to_string(),
            kind: kind.wire_name().to_string(),
            fetch_id,
            timestamp: Utc::now(),
        });
        FetchOutcome::Cancelled
    }

    fn emit_loaded(&self, view: &str, snapshot: &Snapshot, kind_changed: bool, cached: bool) {
        self.event_bus.emit_lossy(AgrixEvent::FetchCompleted {
            view: view.to_string(),
            kind: snapshot.kind.wire_name().to_string(),
            fetch_id: snapshot.fetch_id,
            records: snapshot.len(),
            cached,
            timestamp: Utc::now(),
        });
        self.event_bus.emit_lossy(AgrixEvent::SnapshotReplaced {
            view: view.to_string(),
            kind: snapshot.kind.wire_name().to_string(),
            fetch_id: snapshot.fetch_id,
            kind_changed,
            timestamp: Utc::now(),
        });
    }

    /// Fetch every record of `kind`, derived and enriched
    pub async fn fetch_kind(
        &self,
        kind: RecordKind,
        token: &CancellationToken,
    ) -> Result<Vec<Record>, FetchError> {
        let records = match kind {
            RecordKind::Farmer => derive::farmers(&self.fetch_farmers(token, false).await?),
            RecordKind::Crop | RecordKind::Rice | RecordKind::HighValueCrop => {
                let farmers = self.fetch_farmers(token, true).await?;
                let rows = match kind {
                    RecordKind::Crop => derive::crops(&farmers),
                    RecordKind::Rice => derive::rice(&farmers),
                    _ => derive::high_value_crops(&farmers),
                };
                enrich(rows, &FarmerIndex::build(&farmers))
            }
            RecordKind::Livestock => {
                let (farmers, rows) = tokio::try_join!(
                    self.fetch_farmers(token, false),
                    self.fetch_livestock(token),
                )?;
                enrich(rows, &FarmerIndex::build(&farmers))
            }
            RecordKind::Operator => {
                let (farmers, rows) = tokio::try_join!(
                    self.fetch_farmers(token, false),
                    self.fetch_operators(token),
                )?;
                enrich(rows, &FarmerIndex::build(&farmers))
            }
        };

        debug!(kind = %kind, records = records.len(), "Fetched kind");
        Ok(records)
    }

    /// Fetch every kind for the analytics summaries
    pub async fn fetch_analytics(
        &self,
        token: &CancellationToken,
    ) -> Result<AnalyticsDataset, FetchError> {
        let (farmers, livestock, operators) = tokio::try_join!(
            self.fetch_farmers(token, true),
            self.fetch_livestock(token),
            self.fetch_operators(token),
        )?;

        let index = FarmerIndex::build(&farmers);
        let dataset = AnalyticsDataset {
            crops: enrich(derive::crops(&farmers), &index),
            rice: enrich(derive::rice(&farmers), &index),
            high_value_crops: enrich(derive::high_value_crops(&farmers), &index),
            livestock: enrich(livestock, &index),
            operators: enrich(operators, &index),
            farmers: derive::farmers(&farmers),
        };

        info!(
            farmers = dataset.farmers.len(),
            crops = dataset.crops.len(),
            rice = dataset.rice.len(),
            livestock = dataset.livestock.len(),
            operators = dataset.operators.len(),
            high_value_crops = dataset.high_value_crops.len(),
            "Analytics dataset fetched"
        );
        Ok(dataset)
    }

    async fn fetch_farmers(
        &self,
        token: &CancellationToken,
        with_nested: bool,
    ) -> Result<Vec<Farmer>, FetchError> {
        let store = Arc::clone(&self.store);
        let farmers = self
            .fetch_all(RecordKind::Farmer, token, |params| {
                let store = Arc::clone(&store);
                async move { store.list_farmers(&params).await }
            })
            .await?;

        if with_nested {
            self.hydrate(farmers, token).await
        } else {
            Ok(farmers)
        }
    }

    async fn fetch_livestock(&self, token: &CancellationToken) -> Result<Vec<Record>, FetchError> {
        let store = Arc::clone(&self.store);
        let rows = self
            .fetch_all(RecordKind::Livestock, token, |params| {
                let store = Arc::clone(&store);
                async move { store.list_livestock(&params).await }
            })
            .await?;
        Ok(rows.into_iter().map(Record::Livestock).collect())
    }

    async fn fetch_operators(&self, token: &CancellationToken) -> Result<Vec<Record>, FetchError> {
        let store = Arc::clone(&self.store);
        let rows = self
            .fetch_all(RecordKind::Operator, token, |params| {
                let store = Arc::clone(&store);
                async move { store.list_operators(&params).await }
            })
            .await?;
        Ok(rows.into_iter().map(Record::Operator).collect())
    }

    /// Walk a list endpoint page by page until a short page or `max_pages`
    async fn fetch_all<T, F, Fut>(
        &self,
        kind: RecordKind,
        token: &CancellationToken,
        mut list: F,
    ) -> Result<Vec<T>, FetchError>
    where
        F: FnMut(ListParams) -> Fut,
        Fut: Future<Output = Result<ListPage<T>, StoreError>>,
    {
        let mut params = ListParams::first(self.settings.page_size, None);
        let mut rows = Vec::new();

        loop {
            let page = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(FetchError::Cancelled),
                page = list(params.clone()) => page.map_err(|source| FetchError::Store { kind, source })?,
            };

            debug!(kind = %kind, page = params.page, rows = page.rows.len(), "Fetched page");
            let full = page.is_full(params.page_size);
            rows.extend(page.rows);

            if !full {
                break;
            }
            if params.page >= self.settings.max_pages {
                warn!(kind = %kind, max_pages = self.settings.max_pages, "Page limit reached, listing truncated");
                break;
            }
            params = params.next();
        }

        Ok(rows)
    }

    /// Fetch detail for farmers listed without their nested rows
    async fn hydrate(
        &self,
        farmers: Vec<Farmer>,
        token: &CancellationToken,
    ) -> Result<Vec<Farmer>, FetchError> {
        let missing = farmers.iter().filter(|f| f.lacks_nested_rows()).count();
        if !self.settings.hydrate_nested || missing == 0 {
            return Ok(farmers);
        }
        debug!(missing, "Hydrating farmers without nested rows");

        let hydrated = futures::stream::iter(farmers.into_iter().map(|farmer| {
            let store = Arc::clone(&self.store);
            async move { hydrate_one(store.as_ref(), farmer).await }
        }))
        .buffered(self.settings.hydrate_concurrency)
        .collect::<Vec<_>>();

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(FetchError::Cancelled),
            farmers = hydrated => Ok(farmers),
        }
    }
}

async fn hydrate_one(store: &dyn RecordStore, mut farmer: Farmer) -> Farmer {
    if !farmer.lacks_nested_rows() {
        return farmer;
    }
    let Some(id) = farmer.id.clone() else {
        return farmer;
    };

    match store.get_farmer(&id).await {
        Ok(detail) => {
            farmer.crops = farmer.crops.or(detail.crops);
            farmer.rice = farmer.rice.or(detail.rice);
        }
        Err(e) => {
            warn!(farmer_id = %id, error = %e, "Farmer detail unavailable, nested rows skipped");
        }
    }
    farmer
}
