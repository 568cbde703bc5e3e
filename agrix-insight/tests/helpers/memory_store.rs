//! Scriptable in-memory record store

use agrix_insight::model::{Farmer, LivestockRecord, OperatorRecord, RecordId};
use agrix_insight::store::{ListPage, ListParams, RecordStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Build a farmer from JSON
pub fn farmer(value: Value) -> Farmer {
    serde_json::from_value(value).unwrap()
}

/// One scripted answer to a farmer list call
struct ScriptedFarmers {
    delay: Duration,
    farmers: Vec<Farmer>,
}

#[derive(Default)]
pub struct MemoryStore {
    pub farmers: Vec<Farmer>,
    pub details: HashMap<RecordId, Farmer>,
    pub livestock: Vec<LivestockRecord>,
    pub operators: Vec<OperatorRecord>,
    /// Delay applied to every list call
    pub latency: Duration,
    script: Mutex<VecDeque<ScriptedFarmers>>,
    fail: AtomicBool,
    farmer_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_farmers(mut self, farmers: Vec<Farmer>) -> Self {
        self.farmers = farmers;
        self
    }

    pub fn with_detail(mut self, detail: Farmer) -> Self {
        let id = detail.id.clone().unwrap();
        self.details.insert(id, detail);
        self
    }

    pub fn with_livestock(mut self, rows: Vec<Value>) -> Self {
        self.livestock = rows.into_iter().map(|v| serde_json::from_value(v).unwrap()).collect();
        self
    }

    pub fn with_operators(mut self, rows: Vec<Value>) -> Self {
        self.operators = rows.into_iter().map(|v| serde_json::from_value(v).unwrap()).collect();
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue the answer of the next unscripted farmer list call
    pub fn script_farmers(self, delay: Duration, farmers: Vec<Farmer>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedFarmers { delay, farmers });
        self
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn farmer_calls(&self) -> usize {
        self.farmer_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    /// Every list call of any kind
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(StoreError::Api(503, "store unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    async fn page_of<T: Clone>(&self, rows: &[T], params: &ListParams) -> Result<ListPage<T>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.check_failure()?;

        let size = params.page_size as usize;
        let start = (params.page as usize - 1) * size;
        let page = rows.iter().skip(start).take(size).cloned().collect();
        Ok(ListPage::new(page))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_farmers(&self, params: &ListParams) -> Result<ListPage<Farmer>, StoreError> {
        self.farmer_calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(ScriptedFarmers { delay, farmers }) => {
                self.list_calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                self.check_failure()?;
                Ok(ListPage::new(farmers))
            }
            None => self.page_of(&self.farmers, params).await,
        }
    }

    async fn get_farmer(&self, id: &RecordId) -> Result<Farmer, StoreError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.details
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("farmer {id}")))
    }

    async fn list_livestock(
        &self,
        params: &ListParams,
    ) -> Result<ListPage<LivestockRecord>, StoreError> {
        self.page_of(&self.livestock, params).await
    }

    async fn list_operators(
        &self,
        params: &ListParams,
    ) -> Result<ListPage<OperatorRecord>, StoreError> {
        self.page_of(&self.operators, params).await
    }
}
