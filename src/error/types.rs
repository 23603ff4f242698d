//! Error types

use thiserror::Error;

/// Result alias used across the SDK.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Errors produced by the SDK.
///
/// Every variant is cheap to clone so a single failure can be replayed to
/// several consumers (see `ApexStream::tee`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    /// Invalid or missing client configuration (API key, base URL, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Channel could not be established or the connection broke
    #[error("Transport error: {0}")]
    Transport(String),

    /// A metadata value could not be encoded as an ASCII header
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// The remote service answered with a non-OK gRPC status
    #[error("RPC failed ({code:?}): {message}")]
    Rpc { code: tonic::Code, message: String },

    /// A non-gRPC stream source reported a failure
    #[error("Stream source error: {0}")]
    Source(String),

    /// The stream was already iterated once
    #[error("Cannot iterate over a consumed stream, use `.tee()` to split the stream.")]
    StreamConsumed,

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(String),

    /// I/O failure while writing or reading stream bytes
    #[error("IO error: {0}")]
    Io(String),
}

impl SdkError {
    /// Build an RPC error from a code and message.
    pub fn rpc(code: tonic::Code, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// gRPC status code, when the error came from the remote service.
    pub fn code(&self) -> Option<tonic::Code> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether this is the double-consumption error.
    pub fn is_stream_consumed(&self) -> bool {
        matches!(self, Self::StreamConsumed)
    }

    /// Whether the remote call was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.code() == Some(tonic::Code::Cancelled)
    }

    /// Whether the remote service rejected the credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.code(),
            Some(tonic::Code::Unauthenticated | tonic::Code::PermissionDenied)
        )
    }
}
