//! Billing

use tonic::transport::Channel;

use crate::client::{BaseClient, ServiceClient};
use crate::constants::ENV_API_KEY;
use crate::error::Result;
use crate::proto::billing::billing_service_client::BillingServiceClient;
use crate::proto::billing::{GetUsageRequest, GetUsageResponse};

/// Client for the Billing service.
#[derive(Debug, Clone)]
pub struct BillingClient {
    base: BaseClient,
}

impl ServiceClient for BillingClient {
    const SERVICE: &'static str = "billing.v1.BillingService";
    const API_KEY_VARS: &'static [&'static str] = &[ENV_API_KEY];

    fn from_base(base: BaseClient) -> Self {
        Self { base }
    }

    fn base(&self) -> &BaseClient {
        &self.base
    }
}

impl BillingClient {
    /// Credit balance and billing rates, optionally for one product.
    pub async fn get_usage(&self, product_type: Option<String>) -> Result<GetUsageResponse> {
        const METHOD: &str = "GetUsage";
        self.base.trace_call(Self::SERVICE, METHOD);
        let request = self.base.request(GetUsageRequest { product_type })?;
        BillingServiceClient::<Channel>::new(self.base.channel())
            .get_usage(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|status| self.base.rpc_error(Self::SERVICE, METHOD, status))
    }
}
