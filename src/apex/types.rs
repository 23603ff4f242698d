//! Convenience methods on the Apex protobuf messages.

use serde::Deserialize;

use crate::proto::apex::{
    ChatCompletionChunkResponse, ChatCompletionResponse, ChatMessage, DeepResearcherResultChunk,
    GetDeepResearcherJobResponse,
};

impl ChatMessage {
    /// Message with an arbitrary role.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

impl ChatCompletionResponse {
    /// Content of the first choice, or `""`.
    pub fn text(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .map_or("", |message| message.content.as_str())
    }
}

impl ChatCompletionChunkResponse {
    /// Delta content of the first choice, or `""`.
    pub fn delta_text(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.delta.as_ref())
            .map_or("", |delta| delta.content.as_str())
    }

    /// Finish reason of the first choice, when the server set one.
    pub fn finish_reason(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.finish_reason.as_str())
            .filter(|reason| !reason.is_empty())
    }
}

#[derive(Deserialize)]
struct ChunkContent {
    content: String,
}

impl DeepResearcherResultChunk {
    /// Text of the chunk.
    ///
    /// The service sends each chunk as a JSON list whose first element holds
    /// a `content` field. Returns `None` when the chunk has another shape.
    pub fn content(&self) -> Option<String> {
        let parsed: Vec<ChunkContent> = serde_json::from_str(&self.chunk).ok()?;
        parsed.into_iter().next().map(|c| c.content)
    }
}

/// Lifecycle state of a deep research job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Other(String),
}

impl From<&str> for JobStatus {
    fn from(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "queued" | "pending" => Self::Queued,
            "running" | "processing" | "in_progress" => Self::Running,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Other(status.to_string()),
        }
    }
}

impl JobStatus {
    /// Whether polling can stop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl GetDeepResearcherJobResponse {
    pub fn job_status(&self) -> JobStatus {
        JobStatus::from(self.status.as_str())
    }

    /// Result chunks with a sequence id above `last_seq_id`, in order.
    pub fn chunks_after(&self, last_seq_id: i64) -> impl Iterator<Item = &DeepResearcherResultChunk> {
        let mut chunks: Vec<_> = self
            .result
            .iter()
            .filter(|chunk| chunk.seq_id > last_seq_id)
            .collect();
        chunks.sort_by_key(|chunk| chunk.seq_id);
        chunks.into_iter()
    }

    /// Content of the chunk with the highest sequence id.
    pub fn final_answer(&self) -> Option<String> {
        self.result
            .iter()
            .max_by_key(|chunk| chunk.seq_id)
            .and_then(DeepResearcherResultChunk::content)
    }
}
