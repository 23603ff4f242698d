//! Error Handling Module
//!
//! - Core error type (`SdkError`) shared by every client and the streaming layer
//! - Conversions from tonic, serde and I/O errors
//!
//! # Example
//!
//! ```rust,ignore
//! use macrocosmos::error::SdkError;
//!
//! let error = SdkError::from(tonic::Status::not_found("no such job"));
//! assert_eq!(error.code(), Some(tonic::Code::NotFound));
//! ```

mod conversions;
pub mod types;

pub use types::*;
