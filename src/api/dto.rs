//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! Records themselves are serialized directly.

use serde::{Deserialize, Serialize};

/// Publish request
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    /// Payload of the new record; `null` or missing is rejected
    #[serde(default)]
    pub content: Option<String>,
}

/// Query parameters of `GET /getByTime`
#[derive(Debug, Deserialize)]
pub struct TimeRangeParams {
    /// Start time, ISO 8601 local date-time (inclusive)
    pub start: String,
    /// End time, ISO 8601 local date-time (inclusive)
    pub end: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Index status: "ok" or "error"
    pub index: String,
    /// Index backend name
    pub backend: String,
    /// Number of stored records
    pub records: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}
