//! Time-series sample decoding
//!
//! A sample is always encoded as a two-element pair `[value, timestamp]`.
//! It arrives either as a list (JSON arrays in responses, YAML lists in
//! suite files) or as a single comma-joined string such as `"[1.5,60]"`.
//! Both forms funnel into the same numeric conversion.

use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

/// A single point of a time series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Epoch seconds
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(value: f64, timestamp: i64) -> Self {
        Self { timestamp, value }
    }

    /// Encode back into the `[value,timestamp]` textual form
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.value, self.timestamp)
    }
}

/// Decode a sample from an already-split list of elements
pub fn decode_pair<S: AsRef<str>>(elements: &[S]) -> Result<Sample> {
    if elements.len() != 2 {
        return Err(Error::malformed_sample(format!(
            "expected 2 elements in datapoint, got {}",
            elements.len()
        )));
    }
    parse_sample(elements[0].as_ref(), elements[1].as_ref())
}

/// Decode a sample from a comma-joined bracketed string like `[1.5,60]`
///
/// Exactly one opening bracket is stripped from the value token and one
/// closing bracket from the timestamp token.
pub fn decode_embedded(raw: &str) -> Result<Sample> {
    let pieces: Vec<&str> = raw.trim().split(',').collect();
    if pieces.len() != 2 {
        return Err(Error::malformed_sample(format!(
            "expected 2 elements in datapoint '{}', got {}",
            raw,
            pieces.len()
        )));
    }

    let value = pieces[0]
        .strip_prefix(&['[', '(', '{'][..])
        .ok_or_else(|| {
            Error::malformed_sample(format!("missing opening bracket in datapoint '{}'", raw))
        })?;
    let timestamp = pieces[1]
        .strip_suffix(&[']', ')', '}'][..])
        .ok_or_else(|| {
            Error::malformed_sample(format!("missing closing bracket in datapoint '{}'", raw))
        })?;

    parse_sample(value, timestamp)
}

fn parse_sample(value: &str, timestamp: &str) -> Result<Sample> {
    let timestamp: i64 = timestamp.trim().parse().map_err(|e| {
        Error::malformed_sample(format!("failed to parse timestamp '{}': {}", timestamp, e))
    })?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| Error::malformed_sample(format!("failed to parse value '{}': {}", value, e)))?;
    Ok(Sample::new(value, timestamp))
}

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.value)?;
        seq.serialize_element(&self.timestamp)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Sample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(SampleVisitor)
    }
}

struct SampleVisitor;

impl<'de> Visitor<'de> for SampleVisitor {
    type Value = Sample;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a [value, timestamp] pair")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Sample, A::Error> {
        let mut elements = Vec::with_capacity(2);
        while let Some(scalar) = seq.next_element::<Scalar>()? {
            elements.push(scalar);
        }
        // Integral floats such as 60.0 must not pass as timestamps
        if let [_, Scalar::Float(timestamp)] = elements.as_slice() {
            return Err(de::Error::custom(Error::malformed_sample(format!(
                "failed to parse timestamp '{:?}': not an integer",
                timestamp
            ))));
        }
        let elements: Vec<String> = elements.into_iter().map(Scalar::into_text).collect();
        decode_pair(&elements).map_err(de::Error::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Sample, E> {
        decode_embedded(v).map_err(de::Error::custom)
    }
}

/// Any scalar pair element, tagged with the kind of number it arrived as
enum Scalar {
    Int(String),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Int(text) | Scalar::Text(text) => text,
            Scalar::Float(v) => v.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Scalar, E> {
        Ok(Scalar::Int(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Scalar, E> {
        Ok(Scalar::Int(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Scalar, E> {
        Ok(Scalar::Float(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Scalar, E> {
        Ok(Scalar::Text(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Scalar, E> {
        Ok(Scalar::Text(v.to_string()))
    }

    // null datapoints carry no value and fail numeric conversion later
    fn visit_unit<E: de::Error>(self) -> std::result::Result<Scalar, E> {
        Ok(Scalar::Text("null".to_string()))
    }
}
