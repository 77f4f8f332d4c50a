//! Error types for the public interface of the library.
//!
//! Internally, functions return `Res<T>`, which is an `anyhow::Result`. At the public boundary
//! (commands and the `App` controller) errors are classified with an `ErrorType` so that callers
//! can tell a storage problem from a failed categorization without parsing messages.

use crate::categorize::CategorizeError;
use std::fmt::{Debug, Display, Formatter};

/// The crate-internal result type.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The broad classification of an `Error`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The data directory or its `config.json` is missing or invalid.
    Config,
    /// The ledger file could not be read or written.
    Storage,
    /// No transaction exists with the requested ID.
    NotFound,
    /// The inference service failed or returned something that could not be parsed.
    Categorization,
    /// The request itself was invalid, e.g. an empty update.
    Request,
    /// Anything else.
    Internal,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// The public error type. It carries an `ErrorType` along with the underlying error chain.
pub struct Error {
    error_type: ErrorType,
    source: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, source: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            source: source.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// When the error came from the inference service, returns the specific failure.
    pub fn categorize_error(&self) -> Option<&CategorizeError> {
        self.source.downcast_ref::<CategorizeError>()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.source)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let inner: &(dyn std::error::Error + 'static) = self.source.as_ref();
        Some(inner)
    }
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::new(ErrorType::Internal, value)
    }
}

/// Converts an internal result into the public `Result` by tagging the error with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
