//! Gravity
//!
//! Crawler tasks that collect social data, and dataset builds from their
//! output.

use tonic::transport::Channel;

use crate::client::{BaseClient, ServiceClient};
use crate::constants::{ENV_API_KEY, ENV_GRAVITY_API_KEY};
use crate::error::Result;
use crate::proto::gravity::gravity_service_client::GravityServiceClient;
use crate::proto::gravity::{
    BuildDatasetRequest, BuildDatasetResponse, CancelDatasetRequest, CancelDatasetResponse,
    CancelGravityTaskRequest, CancelGravityTaskResponse, CreateGravityTaskRequest,
    CreateGravityTaskResponse, GetCrawlerRequest, GetCrawlerResponse, GetDatasetRequest,
    GetDatasetResponse, GetGravityTasksRequest, GetGravityTasksResponse,
};

/// Client for the Gravity service.
#[derive(Debug, Clone)]
pub struct GravityClient {
    base: BaseClient,
}

impl ServiceClient for GravityClient {
    const SERVICE: &'static str = "gravity.v1.GravityService";
    const API_KEY_VARS: &'static [&'static str] = &[ENV_GRAVITY_API_KEY, ENV_API_KEY];

    fn from_base(base: BaseClient) -> Self {
        Self { base }
    }

    fn base(&self) -> &BaseClient {
        &self.base
    }
}

impl GravityClient {
    fn grpc(&self) -> GravityServiceClient<Channel> {
        GravityServiceClient::new(self.base.channel())
    }

    /// List gravity tasks, or one task when `gravity_task_id` is set.
    pub async fn get_gravity_tasks(
        &self,
        request: GetGravityTasksRequest,
    ) -> Result<GetGravityTasksResponse> {
        const METHOD: &str = "GetGravityTasks";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(request)?;
        self.grpc()
            .get_gravity_tasks(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }

    pub async fn get_crawler(&self, crawler_id: impl Into<String>) -> Result<GetCrawlerResponse> {
        const METHOD: &str = "GetCrawler";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(GetCrawlerRequest {
            crawler_id: crawler_id.into(),
        })?;
        self.grpc()
            .get_crawler(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }

    pub async fn create_gravity_task(
        &self,
        request: CreateGravityTaskRequest,
    ) -> Result<CreateGravityTaskResponse> {
        const METHOD: &str = "CreateGravityTask";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(request)?;
        let response = self
            .grpc()
            .create_gravity_task(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))?;
        tracing::info!(
            target: "macrocosmos::gravity",
            gravity_task_id = %response.gravity_task_id,
            "gravity task created"
        );
        Ok(response)
    }

    /// Start building a dataset from a crawler's data.
    pub async fn build_dataset(&self, request: BuildDatasetRequest) -> Result<BuildDatasetResponse> {
        const METHOD: &str = "BuildDataset";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(request)?;
        self.grpc()
            .build_dataset(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }

    pub async fn get_dataset(&self, dataset_id: impl Into<String>) -> Result<GetDatasetResponse> {
        const METHOD: &str = "GetDataset";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(GetDatasetRequest {
            dataset_id: dataset_id.into(),
        })?;
        self.grpc()
            .get_dataset(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }

    pub async fn cancel_gravity_task(
        &self,
        gravity_task_id: impl Into<String>,
    ) -> Result<CancelGravityTaskResponse> {
        const METHOD: &str = "CancelGravityTask";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(CancelGravityTaskRequest {
            gravity_task_id: gravity_task_id.into(),
        })?;
        self.grpc()
            .cancel_gravity_task(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }

    pub async fn cancel_dataset(
        &self,
        dataset_id: impl Into<String>,
    ) -> Result<CancelDatasetResponse> {
        const METHOD: &str = "CancelDataset";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(CancelDatasetRequest {
            dataset_id: dataset_id.into(),
        })?;
        self.grpc()
            .cancel_dataset(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }
}
