//! Error types for the Ondo Finance connector.
//!
//! # Design
//! `ApiError` covers everything that can go wrong for a single item:
//! configuration problems (unknown resource or operation, bad parameters),
//! credential problems, and failures reported by the remote API or the
//! transport. `ExecutionError` is what a whole run returns: either a setup
//! failure that happened before any item was processed, or the first item
//! failure in strict mode.

use thiserror::Error;

/// Errors produced while resolving, building, dispatching or parsing a
/// single request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("The resource \"{0}\" is not supported")]
    UnsupportedResource(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// The typed payload belongs to a different resource than the one
    /// selected for the run.
    #[error("resource mismatch: expected {expected}, got {actual}")]
    ResourceMismatch { expected: String, actual: String },

    #[error("missing required parameter \"{name}\" for item {item}")]
    MissingParameter { name: String, item: usize },

    #[error("invalid parameter \"{name}\" for item {item}: {reason}")]
    InvalidParameter {
        name: String,
        item: usize,
        reason: String,
    },

    #[error("No credentials provided: {0}")]
    MissingCredentials(String),

    /// The server returned 404.
    #[error("Not Found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Configuration errors come from the node setup rather than the remote
    /// side.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ApiError::UnsupportedResource(_)
                | ApiError::UnknownOperation(_)
                | ApiError::ResourceMismatch { .. }
                | ApiError::MissingParameter { .. }
                | ApiError::InvalidParameter { .. }
        )
    }

    /// HTTP status attached to the error, if the server produced one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure reported by a `Transport` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport(err.message)
    }
}

/// Errors that terminate a whole execution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// Raised before the item loop started (unsupported resource, missing
    /// credentials). Never downgraded to an error record.
    #[error(transparent)]
    Setup(ApiError),

    /// First item failure in strict mode. Displays as the cause alone.
    #[error("{source}")]
    Item {
        item: usize,
        #[source]
        source: ApiError,
    },
}

impl ExecutionError {
    /// The underlying per-request error.
    pub fn api_error(&self) -> &ApiError {
        match self {
            ExecutionError::Setup(err) => err,
            ExecutionError::Item { source, .. } => source,
        }
    }

    /// Index of the failing item, if the failure happened inside the loop.
    pub fn item(&self) -> Option<usize> {
        match self {
            ExecutionError::Setup(_) => None,
            ExecutionError::Item { item, .. } => Some(*item),
        }
    }
}

/// Errors raised while loading `Settings`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Figment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}
