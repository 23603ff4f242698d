//! # macrocosmos - Rust SDK for the Macrocosmos APIs
//!
//! Typed async clients for the Macrocosmos gRPC services:
//!
//! - **Apex**: chat completions (unary and streaming), web retrieval and
//!   deep-research jobs
//! - **Gravity**: crawler tasks and dataset builds
//! - **Billing**: credit usage
//! - **SN13**: topic listing, Reddit topic validation and on-demand data
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use macrocosmos::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let client = ApexClient::builder()
//!         .api_key("your-api-key")
//!         .app_name("my-app")
//!         .build()?;
//!
//!     let request = ChatCompletionRequest {
//!         messages: vec![ChatMessage::user("What is the capital of Australia?")],
//!         ..Default::default()
//!     };
//!
//!     let mut stream = client.chat_completion_stream(request).await?;
//!     let mut chunks = stream.stream()?;
//!     while let Some(chunk) = chunks.next().await {
//!         print!("{}", chunk?.delta_text());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! Server-streaming calls return an [`ApexStream`](streaming::ApexStream): a
//! single-use, cancellable sequence that can be split with `tee()` or turned
//! into JSON-lines bytes with `byte_stream()`.

#![deny(unsafe_code)]

pub mod apex;
pub mod billing;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod gravity;
pub mod proto;
pub mod sn13;
pub mod streaming;
pub mod telemetry;

pub use error::{Result, SdkError};

/// Commonly used types, clients and traits.
pub mod prelude {
    pub use crate::apex::{
        ApexClient, ChatCompletion, DeepResearch, DeepResearchJobParams, JobStatus,
    };
    pub use crate::billing::BillingClient;
    pub use crate::client::{BaseClient, ServiceClient};
    pub use crate::config::{ClientBuilder, ClientConfig};
    pub use crate::error::{Result, SdkError};
    pub use crate::gravity::GravityClient;
    pub use crate::proto::apex::{
        ChatCompletionChunkResponse, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
        SamplingParameters, WebRetrievalRequest, WebRetrievalResponse,
    };
    pub use crate::sn13::Sn13Client;
    pub use crate::streaming::{AbortController, AbortSignal, ApexStream, ByteStream, ItemStream};
}
