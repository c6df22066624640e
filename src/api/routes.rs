//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_handler, clear_handler, delete_handler, delete_many_handler, get_handler,
    get_many_handler, has_key_handler, health_handler, set_handler, set_many_handler,
    stats_handler, touch_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set` - Store a value
/// - `POST /add` - Store a value only if the key is absent
/// - `GET /get/:key` - Retrieve a value by key
/// - `POST /touch/:key` - Refresh a key's expiry
/// - `DELETE /del/:key` - Delete a key
/// - `GET /has/:key` - Check whether a key is live
/// - `POST /get_many` - Retrieve several keys
/// - `PUT /set_many` - Store several values
/// - `POST /delete_many` - Delete several keys
/// - `DELETE /clear` - Delete everything
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/set", put(set_handler))
        .route("/add", post(add_handler))
        .route("/get/:key", get(get_handler))
        .route("/touch/:key", post(touch_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/has/:key", get(has_key_handler))
        .route("/get_many", post(get_many_handler))
        .route("/set_many", put(set_many_handler))
        .route("/delete_many", post(delete_many_handler))
        .route("/clear", delete(clear_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
