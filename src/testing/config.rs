//! Suite definition types
//!
//! Defines the data structures for deserializing YAML suite files.

use serde::Deserialize;

use super::compare::MetricSeries;
use crate::process::ManagedApp;

/// A complete suite loaded from a YAML file
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TestSchema {
    /// Applications to start before the queries run
    #[serde(default)]
    pub apps: Vec<ManagedApp>,
    /// Queries to send, in order
    #[serde(default)]
    pub queries: Vec<ScriptedQuery>,
}

/// One scripted request and the response it must produce
#[derive(Deserialize, Debug, Clone)]
pub struct ScriptedQuery {
    /// Base URL, e.g. `http://127.0.0.1:8081`
    pub endpoint: String,
    /// Path and query string appended to the endpoint
    #[serde(rename = "URL", alias = "path")]
    pub path: String,
    /// Seconds to wait before sending the request
    #[serde(default)]
    pub delay: i64,
    /// HTTP method
    #[serde(rename = "type", alias = "method", default = "default_method")]
    pub method: String,
    /// Request payload, sent for every method but GET
    #[serde(default)]
    pub body: String,
    #[serde(rename = "expectedResponse")]
    pub expected: ExpectedResponse,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Expected status, content type and body of a response
#[derive(Deserialize, Debug, Clone)]
pub struct ExpectedResponse {
    #[serde(rename = "httpCode")]
    pub http_code: u16,
    #[serde(rename = "contentType")]
    pub content_type: String,
    /// Only the first entry is used for body validation
    #[serde(rename = "expectedResults", default)]
    pub results: Vec<ExpectedResult>,
}

/// Expected body: digests for images, series for JSON
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ExpectedResult {
    /// Accepted lowercase hex SHA-256 digests of the body
    #[serde(rename = "sha256", default)]
    pub hashes: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<MetricSeries>,
}
