use thiserror::Error;

/// Result type alias for chain analysis operations
pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors that can occur while reading facts or deriving chain views
#[derive(Error, Debug)]
pub enum ChainError {
    /// Chain hash, candidate number or certificate hash has no backing facts
    #[error("not found: {resource}")]
    NotFound {
        /// Description of the resource that wasn't found
        resource: String,
    },

    /// Hash is not a hexadecimal string
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    /// Hash prefix matches more than one entity
    #[error("ambiguous prefix {prefix}: {matches} matches")]
    Ambiguous {
        /// The prefix that was looked up
        prefix: String,
        /// How many entities share it
        matches: usize,
    },

    /// Backing store failed to answer a lookup
    #[error("store error: {0}")]
    Store(String),

    /// Configuration is invalid or missing required fields
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChainError {
    /// Shorthand for a [`ChainError::NotFound`] with a formatted resource.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Returns true if the error means the requested facts do not exist
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the HTTP status code a front end should answer with.
    ///
    /// Only user-facing kinds map to a status; everything else is internal.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::InvalidHash(_) | Self::Ambiguous { .. } => Some(400),
            _ => None,
        }
    }
}
