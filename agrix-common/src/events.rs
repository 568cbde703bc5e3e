//! Event types for the agrix event system
//!
//! Fetch lifecycle events are broadcast through [`EventBus`] so that any
//! number of observers (CLI progress output, tests, a UI bridge) can follow
//! what the fetch orchestrator is doing without being coupled to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Agrix event types
///
/// Every variant names the view it belongs to, the record kind being
/// fetched (as its wire name, e.g. `"crops"`) and the fetch it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgrixEvent {
    /// A bulk fetch was issued
    FetchStarted {
        view: String,
        kind: String,
        fetch_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A bulk fetch resolved with data
    FetchCompleted {
        view: String,
        kind: String,
        fetch_id: Uuid,
        /// Number of records in the resulting snapshot
        records: usize,
        /// Served from the snapshot cache instead of the store
        cached: bool,
        timestamp: DateTime<Utc>,
    },

    /// A fetch was superseded or cancelled; its result was discarded
    FetchCancelled {
        view: String,
        kind: String,
        fetch_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A fetch failed with a network or parse error
    FetchFailed {
        view: String,
        kind: String,
        fetch_id: Uuid,
        error: String,
        /// Whether a previous snapshot is still being shown
        snapshot_retained: bool,
        timestamp: DateTime<Utc>,
    },

    /// The view's snapshot was replaced
    SnapshotReplaced {
        view: String,
        kind: String,
        fetch_id: Uuid,
        kind_changed: bool,
        timestamp: DateTime<Utc>,
    },
}

impl AgrixEvent {
    /// Fetch this event belongs to
    pub fn fetch_id(&self) -> Uuid {
        match self {
            AgrixEvent::FetchStarted { fetch_id, .. }
            | AgrixEvent::FetchCompleted { fetch_id, .. }
            | AgrixEvent::FetchCancelled { fetch_id, .. }
            | AgrixEvent::FetchFailed { fetch_id, .. }
            | AgrixEvent::SnapshotReplaced { fetch_id, .. } => *fetch_id,
        }
    }
}

/// Broadcast bus for [`AgrixEvent`]s
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AgrixEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    ///
    /// # Examples
    ///
    /// ```
    /// use agrix_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<AgrixEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: AgrixEvent,
    ) -> Result<usize, broadcast::error::SendError<AgrixEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: AgrixEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
