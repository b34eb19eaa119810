//! Verifier output types
//!
//! A [`VerificationResult`] is what a single verifier invocation produces. It is
//! immutable once handed to the controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Outcome of a single test or of a whole verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    Pass,
    Fail,
    Warning,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pass => "PASS",
            VerificationStatus::Fail => "FAIL",
            VerificationStatus::Warning => "WARNING",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PASS" => Ok(VerificationStatus::Pass),
            "FAIL" => Ok(VerificationStatus::Fail),
            "WARNING" | "WARN" => Ok(VerificationStatus::Warning),
            _ => anyhow::bail!("Invalid verification status: {s}. Use: pass, fail, warning"),
        }
    }
}

/// A single value in a detail payload.
///
/// The vocabulary is deliberately small so that payloads serialize the same way
/// in every consumer: flags, integer counts, floating point measurements, text,
/// and lists of text.
///
/// JSON has no NaN or infinity, so non-finite measurements are written as
/// text (`"NaN"`, `"inf"`, `"-inf"`) and read back as [`DetailValue::Text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Flag(bool),
    Count(i64),
    #[serde(serialize_with = "serialize_measure")]
    Measure(f64),
    Text(String),
    List(Vec<String>),
}

impl From<bool> for DetailValue {
    fn from(value: bool) -> Self {
        DetailValue::Flag(value)
    }
}

impl From<i64> for DetailValue {
    fn from(value: i64) -> Self {
        DetailValue::Count(value)
    }
}

impl From<u64> for DetailValue {
    fn from(value: u64) -> Self {
        DetailValue::Count(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for DetailValue {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            DetailValue::Measure(value)
        } else {
            DetailValue::Text(value.to_string())
        }
    }
}

fn serialize_measure<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.collect_str(value)
    }
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        DetailValue::Text(value.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(value: String) -> Self {
        DetailValue::Text(value)
    }
}

impl From<Vec<String>> for DetailValue {
    fn from(value: Vec<String>) -> Self {
        DetailValue::List(value)
    }
}

/// Structured key-value payload attached to a detail
pub type DetailData = BTreeMap<String, DetailValue>;

/// Leaf fact produced by a verifier: one test against one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationDetail {
    pub component: String,
    pub test: String,
    pub result: VerificationStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: DetailData,
}

impl VerificationDetail {
    pub fn new(
        component: impl Into<String>,
        test: impl Into<String>,
        result: VerificationStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            test: test.into(),
            result,
            message: message.into(),
            data: DetailData::new(),
        }
    }

    pub fn pass(component: &str, test: &str, message: impl Into<String>) -> Self {
        Self::new(component, test, VerificationStatus::Pass, message)
    }

    pub fn fail(component: &str, test: &str, message: impl Into<String>) -> Self {
        Self::new(component, test, VerificationStatus::Fail, message)
    }

    pub fn warning(component: &str, test: &str, message: impl Into<String>) -> Self {
        Self::new(component, test, VerificationStatus::Warning, message)
    }

    /// Attach a payload entry, replacing any previous value for `key`
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<DetailValue>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Non-fatal observation reported by a verifier outside its test details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationWarning {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

impl VerificationWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            component: None,
        }
    }
}

/// Outcome of one verifier invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub module: String,
    pub status: VerificationStatus,
    pub timestamp: DateTime<Utc>,
    /// Wall time of the invocation in milliseconds
    pub duration_ms: u64,
    #[serde(default)]
    pub details: Vec<VerificationDetail>,
    /// Execution errors: the verifier could not complete its work
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<VerificationWarning>,
}

impl VerificationResult {
    pub fn new(module: impl Into<String>, status: VerificationStatus) -> Self {
        Self {
            module: module.into(),
            status,
            timestamp: Utc::now(),
            duration_ms: 0,
            details: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Build a result whose status is derived from its details: any FAIL detail
    /// fails the module, otherwise any WARNING detail warns, otherwise it passes.
    pub fn from_details(module: impl Into<String>, details: Vec<VerificationDetail>) -> Self {
        let status = if details
            .iter()
            .any(|d| d.result == VerificationStatus::Fail)
        {
            VerificationStatus::Fail
        } else if details
            .iter()
            .any(|d| d.result == VerificationStatus::Warning)
        {
            VerificationStatus::Warning
        } else {
            VerificationStatus::Pass
        };

        let mut result = Self::new(module, status);
        result.details = details;
        result
    }

    /// Synthetic result for a verifier that could not run to completion.
    ///
    /// Carries one FAIL detail describing the cause and the cause as an
    /// execution error, so it counts as a critical issue.
    pub fn execution_failure(module: &str, cause: impl Into<String>, duration_ms: u64) -> Self {
        let cause = cause.into();
        let mut result = Self::new(module, VerificationStatus::Fail);
        result.duration_ms = duration_ms;
        result
            .details
            .push(VerificationDetail::fail(module, "execution", cause.clone()));
        result.errors.push(cause);
        result
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn count(&self, status: VerificationStatus) -> usize {
        self.details.iter().filter(|d| d.result == status).count()
    }
}
