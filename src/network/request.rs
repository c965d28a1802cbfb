//! Request and response definitions

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

/// Which REST surface a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `{base_url}/{map}` - key/value data
    Data,

    /// `{query_base_url}/{map}` - key queries
    Query,
}

/// A request relative to one grid map
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub endpoint: Endpoint,

    /// Appended to the map URL; empty or starting with `/`
    pub path: String,

    pub query: Vec<(&'static str, String)>,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<&'static str>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: Endpoint::Data,
            path: path.into(),
            query: Vec::new(),
            body: None,
            content_type: None,
        }
    }

    /// Request for a single key, with the key percent-encoded
    pub fn for_key(method: Method, key: &str) -> Self {
        Self::new(method, format!("/{}", urlencoding::encode(key)))
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn query(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>, content_type: &'static str) -> Self {
        self.body = Some(body);
        self.content_type = Some(content_type);
        self
    }
}

/// A successful (2xx) response
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}
