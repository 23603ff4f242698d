//! Deep research jobs
//!
//! A deep research job is a long-running chat completion executed by the
//! service in the background. Submit it once, then poll with
//! [`DeepResearch::get_job_results`] until the status is terminal.

use super::client::ApexClient;
use crate::error::Result;
use crate::proto::apex::{
    ChatCompletionRequest, ChatMessage, GetDeepResearcherJobResponse, SamplingParameters,
    SubmitDeepResearcherJobResponse,
};

const TASK: &str = "InferenceTask";
const INFERENCE_MODE: &str = "Chain-of-Thought";

/// Sampling parameters used when a job does not specify its own.
pub fn default_sampling_parameters() -> SamplingParameters {
    SamplingParameters {
        temperature: 0.7,
        top_p: 0.95,
        max_new_tokens: 8192,
        do_sample: false,
        ..Default::default()
    }
}

/// User-settable parameters of a deep research job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeepResearchJobParams {
    pub messages: Vec<ChatMessage>,
    /// Miner UIDs; empty lets the service choose
    pub uids: Vec<i64>,
    pub model: Option<String>,
    pub seed: Option<i64>,
    pub sampling_parameters: Option<SamplingParameters>,
}

impl DeepResearchJobParams {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn uids(mut self, uids: Vec<i64>) -> Self {
        self.uids = uids;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub const fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn sampling_parameters(mut self, parameters: SamplingParameters) -> Self {
        self.sampling_parameters = Some(parameters);
        self
    }

    /// Full request with the fields the deep researcher requires.
    pub fn into_request(self) -> ChatCompletionRequest {
        ChatCompletionRequest {
            messages: self.messages,
            uids: self.uids,
            model: self.model.unwrap_or_default(),
            seed: self.seed.unwrap_or_default(),
            sampling_parameters: Some(
                self.sampling_parameters
                    .unwrap_or_else(default_sampling_parameters),
            ),
            task: TASK.to_string(),
            mixture: false,
            inference_mode: INFERENCE_MODE.to_string(),
            stream: true,
            ..Default::default()
        }
    }
}

/// Deep research operations of an [`ApexClient`].
#[derive(Debug, Clone, Copy)]
pub struct DeepResearch<'a> {
    client: &'a ApexClient,
}

impl<'a> DeepResearch<'a> {
    pub fn new(client: &'a ApexClient) -> Self {
        Self { client }
    }

    /// Submit a job with the deep researcher defaults applied.
    pub async fn create_job(
        &self,
        params: DeepResearchJobParams,
    ) -> Result<SubmitDeepResearcherJobResponse> {
        let request = params.into_request();
        let response = self.client.submit_deep_researcher_job(request).await?;
        tracing::info!(
            target: "macrocosmos::apex",
            job_id = %response.job_id,
            status = %response.status,
            "deep research job submitted"
        );
        Ok(response)
    }

    /// Current status and results of a job.
    pub async fn get_job_results(
        &self,
        job_id: impl Into<String>,
    ) -> Result<GetDeepResearcherJobResponse> {
        self.client.get_deep_researcher_job(job_id).await
    }
}
