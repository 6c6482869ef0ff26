//! Error types for fedsearch

use thiserror::Error;

/// Result type alias using fedsearch's Error
pub type Result<T> = std::result::Result<T, Error>;

/// fedsearch error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Query errors (E001-E099)
    #[error("Invalid search query syntax near '{fragment}'")]
    SyntaxRejection { fragment: String },

    // Configuration errors (E100-E199)
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Downstream errors (E200-E299)
    #[error("Search backend unavailable: {0}")]
    DownstreamUnavailable(String),

    #[error("Resource resolution failed: {0}")]
    Resolver(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a syntax rejection for the offending query fragment
    pub fn syntax(fragment: impl Into<String>) -> Self {
        Self::SyntaxRejection {
            fragment: fragment.into(),
        }
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::SyntaxRejection { .. } => "E001",
            Self::Configuration(_) => "E100",
            Self::DownstreamUnavailable(_) => "E200",
            Self::Resolver(_) => "E201",
            Self::Database(_) => "E400",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::SyntaxRejection { fragment } => {
                Some(format!("Check quoting and operators around '{}'", fragment))
            }
            Self::Configuration(_) => Some(
                "Valid search.visibility_scope values: classic, discoverable, public, public_or_unlisted"
                    .to_string(),
            ),
            Self::DownstreamUnavailable(_) => Some("Check the search index connection".to_string()),
            _ => None,
        }
    }

    /// Whether this error only means the query is invalid in one backend's dialect
    pub fn is_syntax_rejection(&self) -> bool {
        matches!(self, Self::SyntaxRejection { .. })
    }

    /// Whether this error is a connectivity failure of the index or query compiler
    pub fn is_downstream_unavailable(&self) -> bool {
        matches!(self, Self::DownstreamUnavailable(_))
    }
}
