//! Apex client

use tonic::transport::Channel;

use super::deep_research::DeepResearch;
use crate::client::{BaseClient, ServiceClient};
use crate::constants::{ENV_API_KEY, ENV_APEX_API_KEY};
use crate::error::Result;
use crate::proto::apex::apex_service_client::ApexServiceClient;
use crate::proto::apex::{
    ChatCompletionChunkResponse, ChatCompletionRequest, ChatCompletionResponse,
    GetDeepResearcherJobRequest, GetDeepResearcherJobResponse, SubmitDeepResearcherJobResponse,
    WebRetrievalRequest, WebRetrievalResponse,
};
use crate::streaming::{AbortController, ApexStream, GrpcSource};

/// Result of [`ApexClient::create_chat_completion`].
#[derive(Debug)]
pub enum ChatCompletion {
    /// `stream` was false
    Response(ChatCompletionResponse),
    /// `stream` was true
    Stream(ApexStream<ChatCompletionChunkResponse>),
}

/// Client for the Apex service.
#[derive(Debug, Clone)]
pub struct ApexClient {
    base: BaseClient,
}

impl ServiceClient for ApexClient {
    const SERVICE: &'static str = "apex.v1.ApexService";
    const API_KEY_VARS: &'static [&'static str] = &[ENV_APEX_API_KEY, ENV_API_KEY];

    fn from_base(base: BaseClient) -> Self {
        Self { base }
    }

    fn base(&self) -> &BaseClient {
        &self.base
    }
}

impl ApexClient {
    fn grpc(&self) -> ApexServiceClient<Channel> {
        ApexServiceClient::new(self.base.channel())
    }

    /// Unary chat completion.
    ///
    /// The configured timeout is sent as the call deadline.
    pub async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        const METHOD: &str = "ChatCompletion";
        self.base.trace_call(Self::SERVICE, METHOD);
        let mut request = self.base.request(request)?;
        request.set_timeout(self.base.config().timeout);
        self.grpc()
            .chat_completion(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }

    /// Streaming chat completion.
    ///
    /// `stream` is forced to `true`. The returned stream owns a fresh
    /// [`AbortController`].
    pub async fn chat_completion_stream(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ApexStream<ChatCompletionChunkResponse>> {
        self.chat_completion_stream_with_controller(request, AbortController::new())
            .await
    }

    /// Streaming chat completion stopped by a caller-supplied controller.
    pub async fn chat_completion_stream_with_controller(
        &self,
        mut request: ChatCompletionRequest,
        controller: AbortController,
    ) -> Result<ApexStream<ChatCompletionChunkResponse>> {
        const METHOD: &str = "ChatCompletionStream";
        self.base.trace_call(Self::SERVICE, METHOD);
        request.stream = true;
        let request = self.base.request(request)?;
        let response = self
            .grpc()
            .chat_completion_stream(request)
            .await
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))?;

        let source = GrpcSource::new(response.into_inner()).with_method(METHOD);
        Ok(ApexStream::from_source(source, controller))
    }

    /// Unary or streaming completion, chosen by `request.stream`.
    pub async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletion> {
        if request.stream {
            self.chat_completion_stream(request)
                .await
                .map(ChatCompletion::Stream)
        } else {
            self.chat_completion(request)
                .await
                .map(ChatCompletion::Response)
        }
    }

    /// Search the web through the Apex miners.
    pub async fn web_retrieval(&self, request: WebRetrievalRequest) -> Result<WebRetrievalResponse> {
        const METHOD: &str = "WebRetrieval";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(request)?;
        self.grpc()
            .web_retrieval(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }

    /// Submit a deep researcher job. See [`DeepResearch`] for a variant that
    /// fills in the required defaults.
    pub async fn submit_deep_researcher_job(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<SubmitDeepResearcherJobResponse> {
        const METHOD: &str = "SubmitDeepResearcherJob";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(request)?;
        self.grpc()
            .submit_deep_researcher_job(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }

    /// Status and partial results of a deep researcher job.
    pub async fn get_deep_researcher_job(
        &self,
        job_id: impl Into<String>,
    ) -> Result<GetDeepResearcherJobResponse> {
        const METHOD: &str = "GetDeepResearcherJob";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(GetDeepResearcherJobRequest {
            job_id: job_id.into(),
        })?;
        self.grpc()
            .get_deep_researcher_job(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }

    /// Deep research helper bound to this client.
    pub fn deep_research(&self) -> DeepResearch<'_> {
        DeepResearch::new(self)
    }
}
