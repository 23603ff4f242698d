//! Apex
//!
//! Chat completions (unary and streaming), web retrieval and deep research
//! jobs.

mod client;
mod deep_research;
mod types;

pub use client::{ApexClient, ChatCompletion};
pub use deep_research::{DeepResearch, DeepResearchJobParams, default_sampling_parameters};
pub use types::JobStatus;
