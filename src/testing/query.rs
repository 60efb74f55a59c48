//! Scripted query execution
//!
//! Sends one request per [`ScriptedQuery`] and collects every way the
//! response differs from what the query expects. Failures never escape as
//! errors: each query yields a (possibly empty) list of descriptions.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};

use super::config::ScriptedQuery;
use super::validate::validate;
use crate::common::{Error, Result};

/// Sends scripted queries and validates their responses
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    client: Client,
}

impl QueryExecutor {
    /// Client without timeouts or retries
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Run one query, returning failure descriptions
    pub async fn execute(&self, query: &ScriptedQuery) -> Vec<String> {
        let mut failures = Vec::new();

        let delay = match request_delay(query.delay) {
            Ok(delay) => delay,
            Err(e) => {
                failures.push(format!("failed parse duration: {}", e));
                return failures;
            }
        };
        if !delay.is_zero() {
            tracing::debug!(delay_secs = delay.as_secs(), "waiting before request");
            tokio::time::sleep(delay).await;
        }

        let url = match request_url(&query.endpoint, &query.path) {
            Ok(url) => url,
            Err(e) => {
                failures.push(format!("failed to parse URL: {}", e));
                return failures;
            }
        };

        let method = match Method::from_bytes(query.method.as_bytes()) {
            Ok(method) => method,
            Err(e) => {
                failures.push(format!("failed to prepare the request: {}", e));
                return failures;
            }
        };

        tracing::info!(
            endpoint = %query.endpoint,
            original_url = %query.path,
            method = %method,
            "sending request"
        );
        tracing::debug!(url = %url, "normalized request target");

        let mut request = self.client.request(method, url);
        if query.method != "GET" {
            request = request.body(query.body.clone());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                failures.push(format!("failed to perform the request: {}", e));
                return failures;
            }
        };

        let status = response.status().as_u16();
        if status != query.expected.http_code {
            failures.push(format!(
                "unexpected status code, got {}, expected {}",
                status, query.expected.http_code
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if content_type != query.expected.content_type {
            failures.push(format!(
                "unexpected content-type, got {}, expected {}",
                content_type, query.expected.content_type
            ));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                failures.push(format!("failed to read body: {}", e));
                return failures;
            }
        };
        tracing::debug!(status, content_type = %content_type, bytes = body.len(), "received response");

        // Only the first expected result takes part in validation
        match query.expected.results.first() {
            Some(expected) => failures.extend(validate(&content_type, &body, expected)),
            None => failures.push("no expected results configured".to_string()),
        }

        failures
    }
}

/// Convert the configured delay in seconds into a wait duration
pub fn request_delay(delay_secs: i64) -> Result<Duration> {
    u64::try_from(delay_secs)
        .map(Duration::from_secs)
        .map_err(|_| Error::NegativeDelay(delay_secs))
}

/// Join endpoint and path into the request target
///
/// The query string is re-encoded with its parameters sorted by key. Every
/// parameter survives, repeated keys keep their relative order, and any
/// fragment is dropped.
pub fn request_url(endpoint: &str, path: &str) -> Result<Url> {
    let raw = format!("{}{}", endpoint, path);
    let mut url = Url::parse(&raw).map_err(|e| Error::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })?;
    url.set_fragment(None);

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    if pairs.is_empty() {
        url.set_query(None);
        return Ok(url);
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_delay() {
        assert_eq!(request_delay(0).unwrap(), Duration::ZERO);
        assert_eq!(request_delay(3).unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn test_request_delay_negative_is_typed() {
        let err = request_delay(-1).unwrap_err();
        assert!(matches!(err, Error::NegativeDelay(-1)));
        assert_eq!(err.to_string(), "delay must not be negative, got -1s");
        assert!(matches!(
            request_delay(i64::MIN),
            Err(Error::NegativeDelay(i64::MIN))
        ));
    }

    #[test]
    fn test_request_url_sorts_and_keeps_params() {
        let url = request_url(
            "http://127.0.0.1:8081",
            "/render?target=b&format=json&target=a&from=-1h",
        )
        .unwrap();
        assert_eq!(url.path(), "/render");
        assert_eq!(
            url.query(),
            Some("format=json&from=-1h&target=b&target=a")
        );
    }

    #[test]
    fn test_request_url_reencodes_values() {
        let url = request_url(
            "http://localhost",
            "/render?target=sumSeries(a.*)&title=two%20words",
        )
        .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("target".to_string(), "sumSeries(a.*)".to_string()),
                ("title".to_string(), "two words".to_string()),
            ]
        );
    }

    #[test]
    fn test_request_url_without_query() {
        let url = request_url("http://localhost:8080", "/metrics/find#frag").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/metrics/find");
    }

    #[test]
    fn test_request_url_malformed() {
        assert!(request_url("not a url", "/render").is_err());
        assert!(request_url("http://[::1", "/render").is_err());
    }

    #[test]
    fn test_request_url_error_names_the_url() {
        match request_url("not a url", "/render") {
            Err(Error::InvalidUrl { url, reason }) => {
                assert_eq!(url, "not a url/render");
                assert!(!reason.is_empty());
            }
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_reports_negative_delay() {
        let query: ScriptedQuery = serde_yaml::from_str(
            r#"
endpoint: "http://127.0.0.1:1"
URL: "/render"
delay: -5
type: "GET"
expectedResponse:
  httpCode: 200
  contentType: "application/json"
"#,
        )
        .unwrap();

        let failures = QueryExecutor::new().execute(&query).await;

        assert_eq!(
            failures,
            vec!["failed parse duration: delay must not be negative, got -5s".to_string()]
        );
    }
}
