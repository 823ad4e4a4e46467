//! Metric value types, wire schema and the canonical signing message

use crate::utils::error::{MetricError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places used for gauge values inside the canonical message.
/// Signer and verifier must agree on this exactly.
pub const GAUGE_HASH_PRECISION: usize = 3;

/// Metric kind tag. Unknown tags are preserved so they can be rejected
/// with a dedicated error instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MetricKind {
    /// Accumulating integer
    Counter,
    /// Last-write-wins float
    Gauge,
    /// Anything else seen on the wire
    Other(String),
}

impl MetricKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Other(other) => other,
        }
    }

    /// Reject kinds other than counter and gauge
    pub fn ensure_supported(&self) -> Result<()> {
        match self {
            MetricKind::Other(other) => Err(MetricError::unsupported_type(other.clone())),
            _ => Ok(()),
        }
    }
}

impl From<&str> for MetricKind {
    fn from(value: &str) -> Self {
        match value {
            "counter" => MetricKind::Counter,
            "gauge" => MetricKind::Gauge,
            other => MetricKind::Other(other.to_string()),
        }
    }
}

impl From<String> for MetricKind {
    fn from(value: String) -> Self {
        MetricKind::from(value.as_str())
    }
}

impl From<MetricKind> for String {
    fn from(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated metric payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Counter(i64),
    Gauge(f64),
}

impl MetricValue {
    /// Kind matching this value
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricValue::Counter(_) => MetricKind::Counter,
            MetricValue::Gauge(_) => MetricKind::Gauge,
        }
    }

    /// Parse a positional path value according to `kind`
    pub fn parse(kind: &MetricKind, raw: &str) -> Result<Self> {
        match kind {
            MetricKind::Counter => Ok(MetricValue::Counter(raw.trim().parse::<i64>()?)),
            MetricKind::Gauge => {
                let value = raw.trim().parse::<f64>()?;
                if !value.is_finite() {
                    return Err(MetricError::validation("Gauge value must be finite"));
                }
                Ok(MetricValue::Gauge(value))
            }
            MetricKind::Other(other) => Err(MetricError::unsupported_type(other.clone())),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Counter(delta) => write!(f, "{}", delta),
            MetricValue::Gauge(value) => write!(f, "{}", value),
        }
    }
}

/// One metric on the wire
///
/// Exactly one of `delta` (counter) or `value` (gauge) is populated; the
/// other one is omitted when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MetricKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// Collection used for batches and full dumps. Order carries no meaning.
pub type Metrics = Vec<Metric>;

impl Metric {
    /// New unsigned counter
    pub fn counter(id: impl Into<String>, delta: i64) -> Self {
        Self::from_value(id, MetricValue::Counter(delta))
    }

    /// New unsigned gauge
    pub fn gauge(id: impl Into<String>, value: f64) -> Self {
        Self::from_value(id, MetricValue::Gauge(value))
    }

    /// New unsigned metric from a validated value
    pub fn from_value(id: impl Into<String>, value: MetricValue) -> Self {
        let (delta, gauge) = match value {
            MetricValue::Counter(delta) => (Some(delta), None),
            MetricValue::Gauge(v) => (None, Some(v)),
        };
        Self {
            id: id.into(),
            kind: value.kind(),
            delta,
            value: gauge,
            hash: None,
        }
    }

    /// Check the kind/value invariants and return the typed value
    pub fn validate(&self) -> Result<MetricValue> {
        if self.id.is_empty() {
            return Err(MetricError::validation("Metric id must not be empty"));
        }
        self.kind.ensure_supported()?;

        match (&self.kind, self.delta, self.value) {
            (_, Some(_), Some(_)) => Err(MetricError::validation(format!(
                "Metric '{}' carries both delta and value",
                self.id
            ))),
            (MetricKind::Counter, Some(delta), None) => Ok(MetricValue::Counter(delta)),
            (MetricKind::Gauge, None, Some(value)) if value.is_finite() => {
                Ok(MetricValue::Gauge(value))
            }
            (MetricKind::Gauge, None, Some(_)) => Err(MetricError::validation(format!(
                "Gauge '{}' must be finite",
                self.id
            ))),
            (kind, _, _) => Err(MetricError::validation(format!(
                "Metric '{}' is missing its {} value",
                self.id, kind
            ))),
        }
    }

    /// Canonical message used as HMAC input
    pub fn canonical_message(&self) -> Result<String> {
        Ok(canonical_message(&self.id, &self.validate()?))
    }

    /// Human readable value, as served by the text endpoints
    pub fn display_value(&self) -> Option<String> {
        match &self.kind {
            MetricKind::Counter => self.delta.map(|delta| delta.to_string()),
            MetricKind::Gauge => self.value.map(|value| value.to_string()),
            MetricKind::Other(_) => None,
        }
    }
}

/// `"{id}:counter:{delta}"` or `"{id}:gauge:{value:.3}"`
pub fn canonical_message(id: &str, value: &MetricValue) -> String {
    match value {
        MetricValue::Counter(delta) => format!("{}:counter:{}", id, delta),
        MetricValue::Gauge(value) => {
            format!("{}:gauge:{:.*}", id, GAUGE_HASH_PRECISION, value)
        }
    }
}

/// Render a dump as `name = value` lines, sorted by name then kind
pub fn render_text(metrics: &[Metric]) -> String {
    let mut lines: Vec<(&str, &str, String)> = metrics
        .iter()
        .filter_map(|m| {
            m.display_value()
                .map(|value| (m.id.as_str(), m.kind.as_str(), value))
        })
        .collect();
    lines.sort();

    lines
        .into_iter()
        .map(|(id, _, value)| format!("{} = {}\n", id, value))
        .collect()
}
