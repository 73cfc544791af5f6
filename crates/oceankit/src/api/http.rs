//! HTTP transport over the DigitalOcean REST API.
//!
//! This module provides the [`HttpApi`] implementation of [`CloudApi`]
//! backed by a blocking `ureq` agent.
//!
//! # Rate Limiting
//!
//! The DigitalOcean API rate-limits tokens to 5000 requests per hour.
//! The client does not retry on 429; callers see the rejection.

use serde_json::Value as Json;
use ureq::Agent;

use crate::api::{ApiResponse, CloudApi};
use crate::error::{Error, Result};

/// Default API root.
const API_BASE: &str = "https://api.digitalocean.com/v2";

/// Blocking DigitalOcean API client.
///
/// Authenticates every request with a bearer token.
///
/// # Example
///
/// ```no_run
/// use oceankit::api::{CloudApi, HttpApi};
///
/// let api = HttpApi::new("dop_v1_example_token");
/// let response = api.get("droplets", &[]).unwrap();
/// println!("{} droplets", response.data["droplets"].as_array().unwrap().len());
/// ```
pub struct HttpApi {
    /// HTTP agent for requests.
    agent: Agent,
    /// API base URL.
    base_url: String,
    /// Bearer token sent with every request.
    token: String,
}

impl HttpApi {
    /// Create a client against the public API.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, API_BASE)
    }

    /// Create a client with a custom API base (for testing).
    #[must_use]
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        // Status handling is ours: rejections must carry the decoded
        // error body, so the agent must not turn non-2xx into Err.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Get the current API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for an endpoint.
    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Decode a response, mapping non-success statuses to
    /// [`Error::Rejected`].
    fn finish(
        &self,
        method: &str,
        endpoint: &str,
        payload: Option<&Json>,
        mut response: ureq::http::Response<ureq::Body>,
    ) -> Result<ApiResponse> {
        let code = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| Error::Transport {
                message: e.to_string(),
            })?;
        let data = if text.is_empty() {
            Json::Null
        } else {
            serde_json::from_str(&text)?
        };

        if !(200..300).contains(&code) {
            return Err(Error::Rejected {
                method: method.to_string(),
                endpoint: endpoint.to_string(),
                code,
                body: data,
                payload: payload.cloned(),
            });
        }
        Ok(ApiResponse { code, data })
    }
}

impl CloudApi for HttpApi {
    fn post(&self, endpoint: &str, data: &Json) -> Result<ApiResponse> {
        let response = self
            .agent
            .post(self.url(endpoint))
            .header("Authorization", self.auth_header())
            .send_json(data)
            .map_err(|e| Error::Transport {
                message: e.to_string(),
            })?;
        self.finish("POST", endpoint, Some(data), response)
    }

    fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<ApiResponse> {
        let mut request = self
            .agent
            .get(self.url(endpoint))
            .header("Authorization", self.auth_header());
        for (key, value) in params {
            request = request.query(*key, *value);
        }
        let response = request.call().map_err(|e| Error::Transport {
            message: e.to_string(),
        })?;
        self.finish("GET", endpoint, None, response)
    }

    fn delete(&self, endpoint: &str) -> Result<ApiResponse> {
        let response = self
            .agent
            .delete(self.url(endpoint))
            .header("Authorization", self.auth_header())
            .call()
            .map_err(|e| Error::Transport {
                message: e.to_string(),
            })?;
        self.finish("DELETE", endpoint, None, response)
    }
}
