//! Response body validation
//!
//! Dispatches on the observed content type: rendered images are checked by
//! digest, JSON bodies are decoded into series and compared structurally.

use base64::Engine as _;
use sha2::{Digest, Sha256};

use super::compare::{compare, MetricSeries};
use super::config::ExpectedResult;

pub const CONTENT_TYPE_PNG: &str = "image/png";
pub const CONTENT_TYPE_SVG: &str = "image/svg+xml";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Validate a response body, returning failure descriptions
///
/// An empty list means the body is as expected.
pub fn validate(content_type: &str, body: &[u8], expected: &ExpectedResult) -> Vec<String> {
    match content_type {
        CONTENT_TYPE_PNG | CONTENT_TYPE_SVG => validate_digest(body, &expected.hashes),
        CONTENT_TYPE_JSON => validate_metrics(body, &expected.metrics),
        other => vec![format!("unsupported content-type: got '{}'", other)],
    }
}

/// Lowercase hex SHA-256 of a body
pub fn sha256_hex(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

fn validate_digest(body: &[u8], candidates: &[String]) -> Vec<String> {
    let digest = sha256_hex(body);
    if candidates
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(&digest))
    {
        return Vec::new();
    }

    let encoded = base64::engine::general_purpose::STANDARD.encode(body);
    vec![format!(
        "sha256 mismatch, got '{}', expected {:?}, encoded body: '{}'",
        digest, candidates, encoded
    )]
}

fn validate_metrics(body: &[u8], expected: &[MetricSeries]) -> Vec<String> {
    let observed: Vec<MetricSeries> = match serde_json::from_slice(body) {
        Ok(series) => series,
        Err(e) => return vec![format!("failed to parse response: {}", e)],
    };

    if observed.len() != expected.len() {
        return vec![format!(
            "unexpected amount of results, got {}, expected {}",
            observed.len(),
            expected.len()
        )];
    }

    observed
        .iter()
        .zip(expected)
        .flat_map(|(got, want)| compare(got, want))
        .map(|mismatch| format!("metrics are not equal: {}", mismatch))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::datapoint::Sample;

    const PNG_BODY: &[u8] = b"\x89PNG\r\n\x1a\nfake image payload";

    fn hashes_with(digest: Option<String>) -> ExpectedResult {
        let mut hashes = vec!["00".repeat(32), "ff".repeat(32)];
        hashes.push(digest.unwrap_or_else(|| "ab".repeat(32)));
        ExpectedResult {
            hashes,
            metrics: Vec::new(),
        }
    }

    fn series(target: &str, points: &[(f64, i64)]) -> MetricSeries {
        MetricSeries::new(
            target,
            points.iter().map(|&(v, t)| Sample::new(v, t)).collect(),
        )
    }

    fn two_series() -> ExpectedResult {
        ExpectedResult {
            hashes: Vec::new(),
            metrics: vec![
                series("a", &[(1.0, 100), (2.0, 200)]),
                series("b", &[(3.0, 100), (4.0, 200)]),
            ],
        }
    }

    #[test]
    fn test_png_matching_one_candidate() {
        let expected = hashes_with(Some(sha256_hex(PNG_BODY)));
        assert!(validate(CONTENT_TYPE_PNG, PNG_BODY, &expected).is_empty());
    }

    #[test]
    fn test_png_matching_uppercase_candidate() {
        let expected = hashes_with(Some(sha256_hex(PNG_BODY).to_uppercase()));
        assert!(validate(CONTENT_TYPE_PNG, PNG_BODY, &expected).is_empty());
    }

    #[test]
    fn test_png_matching_no_candidate() {
        let failures = validate(CONTENT_TYPE_PNG, PNG_BODY, &hashes_with(None));
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains(&sha256_hex(PNG_BODY)));
        let encoded = base64::engine::general_purpose::STANDARD.encode(PNG_BODY);
        assert!(failures[0].contains(&encoded));
    }

    #[test]
    fn test_svg_is_hashed() {
        let body = b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>";
        let expected = hashes_with(Some(sha256_hex(body)));
        assert!(validate(CONTENT_TYPE_SVG, body, &expected).is_empty());
        assert_eq!(validate(CONTENT_TYPE_SVG, body, &hashes_with(None)).len(), 1);
    }

    #[test]
    fn test_json_identical_series() {
        let body = br#"[{"target":"a","datapoints":[[1,100],[2,200]],"tags":{}},
                        {"target":"b","datapoints":[[3,100],[4,200]],"tags":{}}]"#;
        assert!(validate(CONTENT_TYPE_JSON, body, &two_series()).is_empty());
    }

    #[test]
    fn test_json_one_changed_value() {
        let body = br#"[{"target":"a","datapoints":[[1,100],[5,200]]},
                        {"target":"b","datapoints":[[3,100],[4,200]]}]"#;
        let failures = validate(CONTENT_TYPE_JSON, body, &two_series());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("'a'"));
    }

    #[test]
    fn test_json_failures_across_pairs_accumulate() {
        let body = br#"[{"target":"x","datapoints":[]},{"target":"b","datapoints":[[3,100]]}]"#;
        let failures = validate(CONTENT_TYPE_JSON, body, &two_series());
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn test_json_series_count_mismatch() {
        let body = br#"[{"target":"a","datapoints":[[1,100],[2,200]]}]"#;
        let failures = validate(CONTENT_TYPE_JSON, body, &two_series());
        assert_eq!(failures, vec!["unexpected amount of results, got 1, expected 2"]);
    }

    #[test]
    fn test_json_malformed_body() {
        let failures = validate(CONTENT_TYPE_JSON, b"{not json", &two_series());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("failed to parse response"));
    }

    #[test]
    fn test_json_malformed_datapoint() {
        let body = br#"[{"target":"a","datapoints":[[1,100,7],[2,200]]},
                        {"target":"b","datapoints":[[3,100],[4,200]]}]"#;
        let failures = validate(CONTENT_TYPE_JSON, body, &two_series());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("expected 2 elements"));
    }

    #[test]
    fn test_unsupported_content_type() {
        let failures = validate("text/plain", b"whatever", &two_series());
        assert_eq!(failures, vec!["unsupported content-type: got 'text/plain'"]);
    }
}
