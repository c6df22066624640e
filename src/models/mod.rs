//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{KeysRequest, SetManyRequest, SetRequest, TouchRequest};
pub use responses::{
    AddResponse, DeleteManyResponse, DeleteResponse, ErrorResponse, GetManyResponse, GetResponse,
    HasKeyResponse, HealthResponse, SetManyResponse, SetResponse, StatsResponse, TouchResponse,
};
