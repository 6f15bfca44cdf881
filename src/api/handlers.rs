//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{JsonEncoder, Store};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, MultiGetRequest,
    MultiGetResponse, MultiSetRequest, MultiSetResponse, SetRequest, SetResponse, StatsResponse,
};

/// Store type served over HTTP: arbitrary JSON values, `null` meaning "no value".
pub type JsonStore = Store<Value, JsonEncoder<Value>>;

/// Application state shared across all handlers.
///
/// The store guards itself, so handlers share it through a plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<JsonStore>,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: JsonStore) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Fails if the configured limits are rejected by the store.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = Store::builder(JsonEncoder::new())
            .config(config.store_config())
            .build()?;
        Ok(Self::new(cache))
    }
}

/// Handler for PUT /set
///
/// Stores a JSON value with an optional `ttl` or `expires_at`.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }
    let ttl = req.resolve_ttl()?;
    let stored = !req.value.is_null();

    state.cache.write(&req.key, req.value, ttl)?;

    Ok(Json(SetResponse::new(req.key, stored)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.read(&key)? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for POST /mget
///
/// Reads several keys at once; missing keys are omitted from the result.
pub async fn multi_get_handler(
    State(state): State<AppState>,
    Json(req): Json<MultiGetRequest>,
) -> Result<Json<MultiGetResponse>> {
    let entries = state.cache.read_many(req.keys)?;
    Ok(Json(MultiGetResponse { entries }))
}

/// Handler for PUT /mset
///
/// Writes several pairs at once and reports which were stored.
pub async fn multi_set_handler(
    State(state): State<AppState>,
    Json(req): Json<MultiSetRequest>,
) -> Result<Json<MultiSetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }
    let ttl = req.resolve_ttl()?;

    let written = state.cache.write_many(req.entries, ttl)?;

    Ok(Json(MultiSetResponse::new(written.into_keys())))
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    match state.cache.delete(&key)? {
        Some(value) => Ok(Json(DeleteResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /clear
///
/// Removes every entry.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.cache.size();
    state.cache.clear();
    Json(ClearResponse::new(cleared))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().into())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
