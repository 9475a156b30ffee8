//! The public error type.
//!
//! Internally we build errors with `anyhow` and its `Context` trait. At module boundaries those
//! errors are tagged with an `ErrorType` via `IntoResult::pub_result` so that callers (the CLI,
//! the route layer, tests) can tell a bad certificate apart from an unreachable host or a body
//! that would not decode.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

pub type Result<T> = std::result::Result<T, Error>;

/// Classifies an `Error` by the stage of ingestion that produced it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Missing or invalid access token, certificate, key or settings. Fatal at startup.
    Config,
    /// A request could not be constructed, e.g. a malformed URL.
    Request,
    /// Connect, TLS handshake, timeout or body-read failures.
    Transport,
    /// The upstream answered with a non-success HTTP status.
    Status,
    /// The upstream body was not the JSON we expected.
    Decode,
    /// The local HTTP service could not be started or failed while running.
    Service,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error carrying its `ErrorType` and the underlying `anyhow` chain.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:#}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {}

/// Converts any `Result` whose error can become an `anyhow::Error` into a crate `Result`, tagging
/// the error with `error_type`.
pub trait IntoResult<T> {
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
