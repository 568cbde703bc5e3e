//! HTTP record store client

use super::envelope::{decode_one, decode_rows};
use super::{ListPage, ListParams, RecordStore, StoreError};
use crate::model::{Farmer, LivestockRecord, OperatorRecord, RecordId};
use agrix_common::config::StoreConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("agrix-insight/", env!("CARGO_PKG_VERSION"));

/// Record store reached over its JSON API
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpRecordStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &ListParams,
    ) -> Result<ListPage<T>, StoreError> {
        let url = format!("{}/{}", self.base_url, resource);

        let mut query: Vec<(&str, String)> = vec![
            ("page", params.page.to_string()),
            ("limit", params.page_size.to_string()),
        ];
        if let Some(search) = params.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query.push(("search", search.trim().to_string()));
        }

        tracing::debug!(url = %url, page = params.page, limit = params.page_size, "Listing records");

        let body = self.get_json(&url, &query, resource).await?;
        decode_rows(body)
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<Value, StoreError> {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(what.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StoreError::Api(status.as_u16(), error_text));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list_farmers(&self, params: &ListParams) -> Result<ListPage<Farmer>, StoreError> {
        self.list("farmers", params).await
    }

    async fn get_farmer(&self, id: &RecordId) -> Result<Farmer, StoreError> {
        let url = format!("{}/farmers/{}", self.base_url, id);
        tracing::debug!(url = %url, "Fetching farmer detail");

        let body = self.get_json(&url, &[], &format!("farmer {id}")).await?;
        decode_one(body)
    }

    async fn list_livestock(
        &self,
        params: &ListParams,
    ) -> Result<ListPage<LivestockRecord>, StoreError> {
        self.list("livestock", params).await
    }

    async fn list_operators(
        &self,
        params: &ListParams,
    ) -> Result<ListPage<OperatorRecord>, StoreError> {
        self.list("operators", params).await
    }
}
