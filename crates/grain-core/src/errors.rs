//! Structured error types and failure tallies shared across grain crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`GrainError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (polygon sizes, class indices, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type for the grading pipeline.
///
/// Every variant except [`GrainError::Config`] and [`GrainError::Serde`] is a
/// per-item failure: callers record it in a [`FailureTally`] and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum GrainError {
    /// Malformed or zero-measure polygon.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(ErrorInfo),
    /// Concavity computation unsupported for the polygon's point ordering.
    #[error("split error: {0}")]
    Split(ErrorInfo),
    /// A class or batch received no particles.
    #[error("empty class: {0}")]
    EmptyClass(ErrorInfo),
    /// Gaussian intersection solver did not converge.
    #[error("root find error: {0}")]
    RootFind(ErrorInfo),
    /// Systemic misconfiguration; aborts the run.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization, schema and filesystem errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl GrainError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            GrainError::DegenerateGeometry(info)
            | GrainError::Split(info)
            | GrainError::EmptyClass(info)
            | GrainError::RootFind(info)
            | GrainError::Config(info)
            | GrainError::Serde(info) => info,
        }
    }

    /// Maps the error onto the failure bucket used in run summaries.
    pub fn kind(&self) -> FailureKind {
        match self {
            GrainError::DegenerateGeometry(_) => FailureKind::DegenerateGeometry,
            GrainError::Split(_) => FailureKind::SplitError,
            GrainError::EmptyClass(_) => FailureKind::EmptyClass,
            GrainError::RootFind(_) => FailureKind::RootFind,
            GrainError::Config(_) | GrainError::Serde(_) => FailureKind::ImageFailed,
        }
    }

    /// Shorthand for a degenerate geometry error.
    pub fn degenerate(code: &str, message: impl Into<String>) -> Self {
        GrainError::DegenerateGeometry(ErrorInfo::new(code, message))
    }

    /// Shorthand for a configuration error.
    pub fn config(code: &str, message: impl Into<String>) -> Self {
        GrainError::Config(ErrorInfo::new(code, message))
    }
}

/// Bucket under which an isolated failure is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Polygon dropped because its geometry was unusable.
    DegenerateGeometry,
    /// Polygon kept unsplit after concavity analysis failed.
    SplitError,
    /// Class or batch without particles.
    EmptyClass,
    /// Boundary fell back to the midpoint of means.
    RootFind,
    /// Recursion hit the configured depth limit and was accepted as is.
    DepthLimit,
    /// A whole image could not be processed.
    ImageFailed,
}

/// Counts of isolated failures, merged by addition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureTally {
    /// Failure counts keyed by kind.
    #[serde(default)]
    pub counts: BTreeMap<FailureKind, u64>,
}

impl FailureTally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one failure of the given kind.
    pub fn record(&mut self, kind: FailureKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
    }

    /// Records the bucket of a concrete error.
    pub fn record_error(&mut self, err: &GrainError) {
        self.record(err.kind());
    }

    /// Adds every count from `other` into this tally.
    pub fn merge(&mut self, other: &FailureTally) {
        for (kind, count) in &other.counts {
            *self.counts.entry(*kind).or_insert(0) += count;
        }
    }

    /// Returns the count for a single kind.
    pub fn get(&self, kind: FailureKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Total number of failures across all kinds.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Returns true when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
