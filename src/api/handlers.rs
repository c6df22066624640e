//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.
//!
//! Cache operations block on SQLite, so every handler runs its operation on
//! the blocking thread pool.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::FileCache;
use crate::config::ServerConfig;
use crate::error::{CacheError, Result};
use crate::models::{
    AddResponse, DeleteManyResponse, DeleteResponse, GetManyResponse, GetResponse,
    HasKeyResponse, HealthResponse, KeysRequest, SetManyRequest, SetManyResponse, SetRequest,
    SetResponse, StatsResponse, TouchRequest, TouchResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared file cache
    pub cache: Arc<FileCache>,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: FileCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Opens the cache described by the server configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let cache = FileCache::open(config.location.clone(), config.cache.clone())?;
        Ok(Self::new(cache))
    }

    /// Runs a cache operation on the blocking thread pool.
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&FileCache) -> Result<T> + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || op(&cache))
            .await
            .map_err(|e| CacheError::Internal(format!("cache task failed: {}", e)))?
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::Validation(error_msg));
    }

    let key = req.key.clone();
    state
        .run(move |cache| cache.set(&req.key, &req.value, req.timeout()))
        .await?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for POST /add
pub async fn add_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<AddResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::Validation(error_msg));
    }

    let key = req.key.clone();
    let added = state
        .run(move |cache| cache.add(&req.key, &req.value, req.timeout()))
        .await?;

    Ok(Json(AddResponse { key, added }))
}

/// Handler for GET /get/:key
///
/// Responds 404 when no live entry exists.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let lookup = key.clone();
    let value = state
        .run(move |cache| cache.get::<Value>(&lookup))
        .await?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for POST /touch/:key
pub async fn touch_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<TouchRequest>,
) -> Result<Json<TouchResponse>> {
    let lookup = key.clone();
    let touched = state
        .run(move |cache| cache.touch(&lookup, req.timeout()))
        .await?;

    Ok(Json(TouchResponse { key, touched }))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let lookup = key.clone();
    let deleted = state.run(move |cache| cache.delete(&lookup)).await?;

    Ok(Json(DeleteResponse { key, deleted }))
}

/// Handler for GET /has/:key
pub async fn has_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<HasKeyResponse>> {
    let lookup = key.clone();
    let present = state.run(move |cache| cache.has_key(&lookup)).await?;

    Ok(Json(HasKeyResponse { key, present }))
}

/// Handler for POST /get_many
pub async fn get_many_handler(
    State(state): State<AppState>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<GetManyResponse>> {
    let values: HashMap<String, Value> = state
        .run(move |cache| cache.get_many(&req.keys))
        .await?;

    Ok(Json(GetManyResponse { values }))
}

/// Handler for PUT /set_many
pub async fn set_many_handler(
    State(state): State<AppState>,
    Json(req): Json<SetManyRequest>,
) -> Result<Json<SetManyResponse>> {
    let failed = state
        .run(move |cache| {
            let timeout = req.timeout();
            cache.set_many(req.items, timeout)
        })
        .await?;

    Ok(Json(SetManyResponse { failed }))
}

/// Handler for POST /delete_many
pub async fn delete_many_handler(
    State(state): State<AppState>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<DeleteManyResponse>> {
    let deleted = state
        .run(move |cache| cache.delete_many(&req.keys))
        .await?;

    Ok(Json(DeleteManyResponse { deleted }))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    state.run(|cache| cache.clear()).await?;
    Ok(Json(serde_json::json!({ "message": "Cache cleared" })))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.run(|cache| cache.stats()).await?;
    Ok(Json(StatsResponse::from(stats)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
