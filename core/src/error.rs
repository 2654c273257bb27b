//! Error types for building and executing requests.
//!
//! # Design
//! Failures are split by when they can happen. `ConstructionError`s are
//! recorded while the builder chain runs and only reported, all together, by
//! `end()`. `EncodeError` comes from the body strategy at execution time,
//! before any I/O. `TransportError` means I/O was attempted. `Error::Decode`
//! is only produced by `end_struct` after a successful round-trip and keeps
//! the response so the raw bytes are not lost.

use std::fmt;

use thiserror::Error;

use crate::http::{HttpResponse, ResponseHead};

/// A failure recorded while configuring a builder.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("invalid url {input:?}: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("query encoding failed: {0}")]
    QueryEncoding(#[source] serde_urlencoded::ser::Error),

    #[error("form encoding failed: {0}")]
    FormEncoding(#[source] serde_urlencoded::ser::Error),
}

/// Every construction error of one builder chain, in the order recorded.
#[derive(Debug, Default)]
pub struct Errors(Vec<ConstructionError>);

impl Errors {
    pub fn push(&mut self, err: ConstructionError) {
        self.0.push(err);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConstructionError> {
        self.0.iter()
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            1 => write!(f, "1 error occurred: ")?,
            n => write!(f, "{n} errors occurred: ")?,
        }
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a ConstructionError;
    type IntoIter = std::slice::Iter<'a, ConstructionError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The body strategy could not produce its payload.
#[derive(Debug, Error)]
#[error("failed to encode JSON body: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Failure inside the transport, after the request left the builder.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("reading response body failed: {0}")]
    Read(#[source] std::io::Error),
}

impl TransportError {
    /// True when the failure came from the context, not the network.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TransportError::Cancelled | TransportError::DeadlineExceeded)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::DeadlineExceeded)
    }
}

/// Errors returned by `RequestBuilder::end` and friends.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Construction(Errors),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("{source}")]
    Transport {
        #[source]
        source: TransportError,
        /// Set when the status line and headers arrived before the failure.
        head: Option<ResponseHead>,
    },

    #[error("failed to decode response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        response: Box<HttpResponse>,
    },
}

impl Error {
    pub fn construction_errors(&self) -> Option<&Errors> {
        match self {
            Error::Construction(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport { source, .. } if source.is_timeout())
    }

    /// The response that came back, if any, despite the error.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Error::Decode { response, .. } => Some(response),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(source: TransportError) -> Self {
        Error::Transport { source, head: None }
    }
}
