//! Request Executor
//!
//! Sends requests to the grid and classifies the outcome.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};

use crate::error::{GridError, Result};
use super::{Endpoint, RawResponse, RequestSpec};

/// Executes requests against one grid
pub struct Executor {
    http: Client,
    base_url: String,
    query_url: String,
}

impl Executor {
    /// Create an executor for `base_url`
    ///
    /// The client keeps a cookie store for the lifetime of the executor, so
    /// the grid's session cookie is sent back on every request.
    pub fn new(base_url: &str, strict_ssl: bool) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(!strict_ssl)
            .build()
            .map_err(|e| GridError::Config(format!("Cannot create HTTP client: {}", e)))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let query_url = query_base_url(&base_url);

        Ok(Self {
            http,
            base_url,
            query_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    /// Full URL of a request against `map`
    ///
    /// The map name is percent-encoded so it always stays one path segment.
    pub fn url_for(&self, map: &str, spec: &RequestSpec) -> String {
        let base = match spec.endpoint {
            Endpoint::Data => &self.base_url,
            Endpoint::Query => &self.query_url,
        };
        format!("{}/{}{}", base, urlencoding::encode(map), spec.path)
    }

    /// Send a request against the grid map `map`
    ///
    /// Returns the response for 2xx statuses, `GridError::Remote` for any
    /// other status and `GridError::Connectivity` when no response arrived.
    pub async fn execute(&self, map: &str, spec: RequestSpec) -> Result<RawResponse> {
        let url = self.url_for(map, &spec);
        tracing::debug!(method = %spec.method, %url, query = ?spec.query, "grid request");

        let mut request = self.http.request(spec.method, &url);
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(content_type) = spec.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        if let Some(body) = spec.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!(%url, "grid request failed: {}", e);
            GridError::Connectivity(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        if !status.is_success() {
            tracing::debug!(
                code = status.as_u16(),
                body = %String::from_utf8_lossy(&body),
                "grid error response"
            );
            return Err(error_from_response(status, &body));
        }

        tracing::debug!(code = status.as_u16(), len = body.len(), "grid response");
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Derive the query URL from the data URL
///
/// `.../v1/grids/Grid1` becomes `.../v1/query/Grid1`; a trailing slash is
/// dropped because the query API rejects it.
pub fn query_base_url(base_url: &str) -> String {
    base_url
        .replacen("/v1/grids/", "/v1/query/", 1)
        .trim_end_matches('/')
        .to_string()
}

/// Build a `GridError::Remote` from a non-2xx response
///
/// The grid labels error bodies with unrelated content types, so the body is
/// treated as JSON whenever it looks like a JSON object.
pub fn error_from_response(status: StatusCode, body: &[u8]) -> GridError {
    let text = String::from_utf8_lossy(body);

    let looks_like_json = text.starts_with('{') && text.ends_with('}');
    let from_json = if looks_like_json {
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => value
                .get("error")
                .and_then(|e| e.as_str())
                .map(str::to_string),
            Err(e) => {
                tracing::debug!("Cannot parse JSON error body {:?}: {}", text, e);
                None
            }
        }
    } else {
        None
    };

    let message = match from_json {
        Some(message) => message,
        None if !text.is_empty() => text.into_owned(),
        None => format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string(),
    };

    GridError::Remote {
        status: status.as_u16(),
        message,
    }
}
