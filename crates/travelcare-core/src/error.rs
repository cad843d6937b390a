use thiserror::Error;

/// Top-level error type for TravelCare.
///
/// Subsystem crates define their own error types and convert into this one
/// where they cross the composition root.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TravelCareError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for TravelCareError {
    fn from(err: toml::de::Error) -> Self {
        TravelCareError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for TravelCareError {
    fn from(err: toml::ser::Error) -> Self {
        TravelCareError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for TravelCareError {
    fn from(err: serde_json::Error) -> Self {
        TravelCareError::Serialization(err.to_string())
    }
}

impl From<crate::auth::AuthError> for TravelCareError {
    fn from(err: crate::auth::AuthError) -> Self {
        TravelCareError::Auth(err.to_string())
    }
}

/// A specialized `Result` type for TravelCare operations.
pub type Result<T> = std::result::Result<T, TravelCareError>;
