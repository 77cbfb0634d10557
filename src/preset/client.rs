//! Async HTTP client for the preset API (`/api/StrudelPreset`).
//!
//! Status codes map onto the gateway's error kinds: 400 is a validation
//! rejection, 404 is `NotFound`, anything else that isn't a success (and
//! every network failure) is a transport failure for that operation.

use std::sync::Arc;

use log::{debug, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::CoreConfig;
use crate::error::{Operation, PresetError, PresetResult, ValidationError};
use crate::preset::store::{PresetStore, normalize_query};
use crate::preset::types::{Preset, PresetId, PresetSummary, SavePresetRequest};

const PRESET_ROUTE: &str = "/api/StrudelPreset";

#[derive(Debug, Clone)]
pub struct PresetClient {
    http: reqwest::Client,
    base_url: String,
}

impl PresetClient {
    pub fn new(base_url: impl Into<String>) -> PresetResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("strudel-reactor-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PresetError::transport(Operation::Load, e))?;
        Ok(PresetClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &CoreConfig) -> PresetResult<Self> {
        Self::new(config.api_base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}{PRESET_ROUTE}{suffix}", self.base_url)
    }

    /// Save a preset. Invalid requests are rejected locally, before any
    /// network traffic.
    pub async fn save(&self, request: &SavePresetRequest) -> PresetResult<()> {
        request.validate()?;

        let op = Operation::Save;
        let response = self
            .http
            .post(self.endpoint(""))
            .json(request)
            .send()
            .await
            .map_err(|e| PresetError::transport(op, e))?;

        match response.status() {
            s if s.is_success() => {
                debug!("saved preset '{}'", request.name);
                Ok(())
            }
            StatusCode::BAD_REQUEST => {
                let detail = response.text().await.unwrap_or_default();
                Err(ValidationError::Rejected(detail).into())
            }
            s => Err(unexpected_status(op, s, response).await),
        }
    }

    pub async fn list_all(&self) -> PresetResult<Vec<PresetSummary>> {
        self.get_json(Operation::List, self.http.get(self.endpoint(""))).await
    }

    /// Search by name; a blank query lists everything.
    pub async fn search_by_name(&self, query: &str) -> PresetResult<Vec<PresetSummary>> {
        match normalize_query(query) {
            None => self.list_all().await,
            Some(needle) => {
                let request = self
                    .http
                    .get(self.endpoint("/search"))
                    .query(&[("q", needle)]);
                self.get_json(Operation::Search, request).await
            }
        }
    }

    pub async fn get_by_id(&self, id: PresetId) -> PresetResult<Preset> {
        let op = Operation::Load;
        let response = self
            .http
            .get(self.endpoint(&format!("/{id}")))
            .send()
            .await
            .map_err(|e| PresetError::transport(op, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(PresetError::NotFound { id }),
            s if s.is_success() => response
                .json()
                .await
                .map_err(|e| PresetError::transport(op, e)),
            s => Err(unexpected_status(op, s, response).await),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        op: Operation,
        request: reqwest::RequestBuilder,
    ) -> PresetResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| PresetError::transport(op, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(unexpected_status(op, status, response).await);
        }
        response.json().await.map_err(|e| PresetError::transport(op, e))
    }
}

async fn unexpected_status(
    op: Operation,
    status: StatusCode,
    response: reqwest::Response,
) -> PresetError {
    let body = response.text().await.unwrap_or_default();
    warn!("preset {op} returned {status}: {body}");
    PresetError::transport(op, format!("HTTP {status} {body}"))
}

// ── Blocking Stores on the Runtime ──────────────────────────

/// Runs a blocking [`PresetStore`] on tokio's blocking pool, so async callers
/// are suspended rather than stalled while the store works.
pub struct AsyncPresetStore<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for AsyncPresetStore<S> {
    fn clone(&self) -> Self {
        AsyncPresetStore {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: PresetStore + ?Sized + 'static> AsyncPresetStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        AsyncPresetStore { store }
    }

    async fn run<T, F>(&self, op: Operation, f: F) -> PresetResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> PresetResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| PresetError::transport(op, e))?
    }

    pub async fn save(&self, request: SavePresetRequest) -> PresetResult<PresetId> {
        self.run(Operation::Save, move |s| s.save(&request)).await
    }

    pub async fn list_all(&self) -> PresetResult<Vec<PresetSummary>> {
        self.run(Operation::List, |s| s.list_all()).await
    }

    pub async fn search_by_name(&self, query: String) -> PresetResult<Vec<PresetSummary>> {
        self.run(Operation::Search, move |s| s.search_by_name(&query)).await
    }

    pub async fn get_by_id(&self, id: PresetId) -> PresetResult<Preset> {
        self.run(Operation::Load, move |s| s.get_by_id(id)).await
    }
}

// ── Tests ───────────────────────────────────────────────────
