//! Type Conversions for SdkError
//!
//! From implementations for the error types the SDK's dependencies produce.

use super::types::SdkError;

impl From<tonic::Status> for SdkError {
    fn from(status: tonic::Status) -> Self {
        Self::Rpc {
            code: status.code(),
            message: status.message().to_string(),
        }
    }
}

impl From<tonic::transport::Error> for SdkError {
    fn from(err: tonic::transport::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<tonic::metadata::errors::InvalidMetadataValue> for SdkError {
    fn from(err: tonic::metadata::errors::InvalidMetadataValue) -> Self {
        Self::InvalidMetadata(err.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<std::io::Error> for SdkError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<SdkError> for std::io::Error {
    fn from(err: SdkError) -> Self {
        match err {
            SdkError::Io(message) => std::io::Error::other(message),
            other => std::io::Error::other(other),
        }
    }
}
