//! SN13
//!
//! Topic listing, Reddit topic validation and on-demand social data.

use tonic::transport::Channel;

use crate::client::{BaseClient, ServiceClient};
use crate::constants::ENV_API_KEY;
use crate::error::Result;
use crate::proto::sn13::sn13_service_client::Sn13ServiceClient;
use crate::proto::sn13::{
    ListTopicsRequest, ListTopicsResponse, OnDemandDataRequest, OnDemandDataResponse,
    ValidateRedditTopicRequest, ValidateRedditTopicResponse,
};

/// Client for the SN13 service.
#[derive(Debug, Clone)]
pub struct Sn13Client {
    base: BaseClient,
}

impl ServiceClient for Sn13Client {
    const SERVICE: &'static str = "sn13.v1.Sn13Service";
    const API_KEY_VARS: &'static [&'static str] = &[ENV_API_KEY];

    fn from_base(base: BaseClient) -> Self {
        Self { base }
    }

    fn base(&self) -> &BaseClient {
        &self.base
    }
}

impl Sn13Client {
    fn grpc(&self) -> Sn13ServiceClient<Channel> {
        Sn13ServiceClient::new(self.base.channel())
    }

    /// Topics with their collected data volume for one source.
    pub async fn list_topics(&self, source: impl Into<String>) -> Result<ListTopicsResponse> {
        const METHOD: &str = "ListTopics";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(ListTopicsRequest {
            source: source.into(),
        })?;
        self.grpc()
            .list_topics(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }

    /// Check that a subreddit exists and whether it is restricted.
    pub async fn validate_reddit_topic(
        &self,
        topic: impl Into<String>,
    ) -> Result<ValidateRedditTopicResponse> {
        const METHOD: &str = "ValidateRedditTopic";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(ValidateRedditTopicRequest {
            topic: topic.into(),
        })?;
        self.grpc()
            .validate_reddit_topic(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }

    /// Fetch fresh posts matching usernames, keywords and a date range.
    pub async fn on_demand_data(&self, request: OnDemandDataRequest) -> Result<OnDemandDataResponse> {
        const METHOD: &str = "OnDemandData";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(request)?;
        self.grpc()
            .on_demand_data(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }
}
