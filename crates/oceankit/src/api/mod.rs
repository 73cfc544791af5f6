//! Transport trait and implementations for the DigitalOcean v2 API.
//!
//! This module provides the [`CloudApi`] trait the resource builders
//! talk through. The primary implementation is [`http::HttpApi`];
//! tests substitute an in-memory fake.
//!
//! Implementations return [`ApiResponse`] only for success statuses;
//! any non-2xx answer becomes [`Error::Rejected`] carrying the original
//! request and the decoded error body.

pub mod http;

pub use http::HttpApi;

use serde_json::Value as Json;

use crate::error::Result;

/// A decoded API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code (always 2xx).
    pub code: u16,
    /// Decoded JSON body; `Null` for empty bodies such as 204.
    pub data: Json,
}

/// Blocking transport to the DigitalOcean API.
///
/// One method per verb the resource builders need. Endpoints are given
/// relative to the API root, e.g. `droplets` or `vpcs/{id}`.
pub trait CloudApi {
    /// POST a JSON payload.
    fn post(&self, endpoint: &str, data: &Json) -> Result<ApiResponse>;

    /// GET with query parameters.
    fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<ApiResponse>;

    /// DELETE a resource.
    fn delete(&self, endpoint: &str) -> Result<ApiResponse>;
}
