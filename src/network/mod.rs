//! Network Module
//!
//! HTTP plumbing between the connector and the grid's REST API.
//!
//! ## Architecture
//! - One `reqwest::Client` per connector, carrying the session cookie jar
//! - Requests described by [`RequestSpec`], relative to a grid map
//! - Non-2xx answers turned into `GridError::Remote` by the executor

mod request;
mod executor;

pub use request::{Endpoint, RawResponse, RequestSpec};
pub use executor::{error_from_response, query_base_url, Executor};
