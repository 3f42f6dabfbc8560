//! Error types for the polidoc-pipeline crate.
//!
//! A single closed taxonomy (spec §7) covers every failure mode the
//! orchestrator can observe. Every phase returns either its output or one of
//! these kinds; there is no retry and no partial success below phase 7.

use std::fmt;
use std::io;

use thiserror::Error;

/// Main result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Comprehensive error type for all pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid schema, missing file, unreadable path, or active-phase mismatch.
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description.
        message: String,
        /// Config field that caused the error, if known.
        field: Option<String>,
    },

    /// Questionnaire or chunk hash did not match the declared/expected value.
    #[error("hash mismatch: {message}")]
    HashMismatch {
        /// Human-readable description.
        message: String,
        /// Hash that was expected.
        expected: String,
        /// Hash that was actually computed.
        actual: String,
    },

    /// Input or output contract violation at a phase boundary.
    #[error("validation error in phase {phase}: {message}")]
    Validation {
        /// Phase index where validation failed.
        phase: usize,
        /// Human-readable description.
        message: String,
    },

    /// A post-execution invariant failed.
    #[error("invariant violated in phase {phase}: {message}")]
    Invariant {
        /// Phase index where the invariant failed.
        phase: usize,
        /// Name of the invariant that failed.
        invariant: String,
        /// Human-readable description.
        message: String,
    },

    /// Fewer items than expected when abort-on-insufficient is set.
    #[error("coverage shortfall in phase {phase}: {message}")]
    Coverage {
        /// Phase index where the shortfall occurred.
        phase: usize,
        /// Human-readable description.
        message: String,
        /// Expected item count.
        expected: usize,
        /// Actual item count observed.
        actual: usize,
    },

    /// Weights missing, non-finite, or summing outside tolerance when
    /// fallback is forbidden.
    #[error("weight error: {message}")]
    Weight {
        /// Human-readable description.
        message: String,
        /// Weight table that caused the error.
        table: Option<String>,
    },

    /// No matching chunk, or the matched chunk's tags disagree with the
    /// question's.
    #[error("routing error: {message}")]
    Routing {
        /// Identifier of the question that failed to route.
        question_id: String,
        /// Human-readable description.
        message: String,
    },

    /// Cluster membership violation: missing mandatory member, duplicate, or
    /// an area outside the cluster's declared membership.
    #[error("hermeticity error in cluster {cluster_id}: {message}")]
    Hermeticity {
        /// Cluster whose membership was violated.
        cluster_id: String,
        /// Human-readable description.
        message: String,
    },

    /// Per-phase timeout budget exceeded.
    #[error("phase {phase} timed out after {elapsed_ms}ms (limit {limit_ms}ms)")]
    Timeout {
        /// Phase index that timed out.
        phase: usize,
        /// Elapsed time when the timeout fired.
        elapsed_ms: u64,
        /// Configured timeout budget.
        limit_ms: u64,
    },

    /// Unexpected internal fault. Only phase 7 is permitted to catch this
    /// kind and still emit a (flagged) fallback result.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable description.
        message: String,
        /// Additional context.
        context: Option<String>,
    },

    /// I/O related errors (file reads, document ingestion).
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable description.
        message: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Serialization/deserialization errors.
    #[error("serialization error: {message}")]
    Serialization {
        /// Human-readable description.
        message: String,
        /// Data format being (de)serialized.
        format: Option<String>,
    },
}

impl PipelineError {
    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context.
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new hash-mismatch error.
    pub fn hash_mismatch(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::HashMismatch {
            message: message.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a new validation error scoped to a phase.
    pub fn validation(phase: usize, message: impl Into<String>) -> Self {
        Self::Validation {
            phase,
            message: message.into(),
        }
    }

    /// Create a new invariant error scoped to a phase.
    pub fn invariant(
        phase: usize,
        invariant: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Invariant {
            phase,
            invariant: invariant.into(),
            message: message.into(),
        }
    }

    /// Create a new coverage-shortfall error.
    pub fn coverage(
        phase: usize,
        message: impl Into<String>,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::Coverage {
            phase,
            message: message.into(),
            expected,
            actual,
        }
    }

    /// Create a new weight error.
    pub fn weight(message: impl Into<String>) -> Self {
        Self::Weight {
            message: message.into(),
            table: None,
        }
    }

    /// Create a new weight error naming the offending table.
    pub fn weight_table(message: impl Into<String>, table: impl Into<String>) -> Self {
        Self::Weight {
            message: message.into(),
            table: Some(table.into()),
        }
    }

    /// Create a new routing error.
    pub fn routing(question_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Routing {
            question_id: question_id.into(),
            message: message.into(),
        }
    }

    /// Create a new hermeticity error.
    pub fn hermeticity(cluster_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Hermeticity {
            cluster_id: cluster_id.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(phase: usize, elapsed_ms: u64, limit_ms: u64) -> Self {
        Self::Timeout {
            phase,
            elapsed_ms,
            limit_ms,
        }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new I/O error with context.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// The phase index this error terminated, if it is phase-scoped.
    pub fn phase_index(&self) -> Option<usize> {
        match self {
            Self::Validation { phase, .. }
            | Self::Invariant { phase, .. }
            | Self::Coverage { phase, .. }
            | Self::Timeout { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Add context to an existing error.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        if let Self::Internal { context: ctx, .. } = &mut self {
            *ctx = Some(context.into());
        }
        self
    }
}

impl From<io::Error> for PipelineError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON error: {err}"),
            format: Some("json".to_string()),
        }
    }
}

impl From<serde_yaml::Error> for PipelineError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML error: {err}"),
            format: Some("yaml".to_string()),
        }
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
            field: None,
        }
    }
}

/// Result extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PipelineError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

/// A structured validation failure, accumulated rather than raised
/// immediately so the envelope can report every violation at once.
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    /// Name of the check that failed.
    pub check: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.check, self.message)
    }
}
