//! Streaming
//!
//! Adapts server-pushed gRPC responses into single-use, cancellable Rust
//! streams, with support for splitting and JSON-lines byte encoding.

pub mod abort;
pub mod bytes;
pub mod source;
pub mod stream;
mod tee;

pub use abort::{AbortController, AbortSignal};
pub use bytes::{ByteStream, encode_json_line};
pub use source::{EventSink, GrpcSource, SourceEvent, StreamSource};
pub use stream::{ApexStream, ItemStream};
