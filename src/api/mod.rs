//! API Module
//!
//! HTTP handlers and routing for serving a file cache over a REST API.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
