use thiserror::Error;

/// Core error types for krmgen operations
///
/// Every variant aborts the whole invocation: the engine computes a full
/// replacement snapshot or nothing. There is no merge-conflict variant
/// because key-based matching makes every merge outcome deterministic.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No document matches workload discriminator {kind}/{api_version}")]
    FactNotFound { kind: String, api_version: String },

    #[error(
        "{count} documents match workload discriminator {kind}/{api_version}, expected exactly one"
    )]
    AmbiguousFactSource {
        kind: String,
        api_version: String,
        count: usize,
    },

    #[error("Malformed document {kind}/{name}: {reason}")]
    MalformedDocument {
        kind: String,
        name: String,
        reason: String,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a new FactNotFound error
    pub fn fact_not_found(kind: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self::FactNotFound {
            kind: kind.into(),
            api_version: api_version.into(),
        }
    }

    /// Create a new AmbiguousFactSource error
    pub fn ambiguous_fact_source(
        kind: impl Into<String>,
        api_version: impl Into<String>,
        count: usize,
    ) -> Self {
        Self::AmbiguousFactSource {
            kind: kind.into(),
            api_version: api_version.into(),
            count,
        }
    }

    /// Create a new MalformedDocument error
    pub fn malformed_document(
        kind: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedDocument {
            kind: kind.into(),
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::FactNotFound { .. } | Self::AmbiguousFactSource { .. } => {
                ErrorCategory::FactSource
            }
            Self::MalformedDocument { .. } => ErrorCategory::Document,
            Self::Json(_) => ErrorCategory::Serialization,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    FactSource,
    Document,
    Serialization,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::FactSource => write!(f, "fact_source"),
            Self::Document => write!(f, "document"),
            Self::Serialization => write!(f, "serialization"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
