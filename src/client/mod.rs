//! Base client shared by every service client
//!
//! [`BaseClient`] owns the resolved [`ClientConfig`], the lazily connected
//! channel and the per-request metadata. Service clients wrap one and add
//! typed RPC methods.

use std::sync::{Arc, OnceLock};

use secrecy::ExposeSecret;
use tonic::metadata::{AsciiMetadataValue, MetadataMap};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use crate::config::{ClientBuilder, ClientConfig};
use crate::constants::{CLIENT_NAME, VERSION};
use crate::error::{Result, SdkError};

/// Implemented by every service client.
pub trait ServiceClient: Sized {
    /// Fully qualified gRPC service name, used in log records.
    const SERVICE: &'static str;

    /// Environment variables checked, in order, for the API key.
    const API_KEY_VARS: &'static [&'static str];

    /// Wrap a prepared base client.
    fn from_base(base: BaseClient) -> Self;

    /// Access the base client.
    fn base(&self) -> &BaseClient;

    /// Builder with environment fallbacks.
    fn builder() -> ClientBuilder<Self> {
        ClientBuilder::new()
    }

    /// Client from an explicit configuration.
    fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_base(BaseClient::new(config)?))
    }

    /// Client configured entirely from the environment.
    fn from_env() -> Result<Self> {
        Self::builder().build()
    }
}

/// Connection and credential plumbing.
#[derive(Clone)]
pub struct BaseClient {
    config: Arc<ClientConfig>,
    endpoint: Endpoint,
    channel: Arc<OnceLock<Channel>>,
}

impl std::fmt::Debug for BaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseClient")
            .field("config", &self.config)
            .field("connected", &self.channel.get().is_some())
            .finish()
    }
}

impl BaseClient {
    /// Prepare the endpoint. No connection is made until the first RPC.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let uri = config.endpoint_uri();
        let mut endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| SdkError::Configuration(format!("Invalid base URL '{uri}': {e}")))?;

        if config.secure {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_webpki_roots())
                .map_err(SdkError::from)?;
        } else {
            tracing::warn!(
                target: "macrocosmos::client",
                endpoint = %uri,
                "using an insecure channel; credentials are sent in plaintext"
            );
        }

        tracing::debug!(
            target: "macrocosmos::client",
            endpoint = %uri,
            app_name = %config.app_name,
            secure = config.secure,
            "client configured"
        );

        Ok(Self {
            config: Arc::new(config),
            endpoint,
            channel: Arc::new(OnceLock::new()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Channel shared by every clone of this client, connected on first use.
    pub fn channel(&self) -> Channel {
        self.channel
            .get_or_init(|| self.endpoint.connect_lazy())
            .clone()
    }

    /// Metadata attached to every request.
    pub fn metadata(&self) -> Result<MetadataMap> {
        let mut metadata = MetadataMap::new();
        metadata.insert(
            "authorization",
            ascii(format!("Bearer {}", self.config.api_key.expose_secret()))?,
        );
        metadata.insert("x-source", ascii(self.config.app_name.clone())?);
        metadata.insert("x-client-id", AsciiMetadataValue::from_static(CLIENT_NAME));
        metadata.insert("x-client-version", AsciiMetadataValue::from_static(VERSION));
        metadata.insert("x-forwarded-user", ascii(self.config.user_id.clone())?);
        Ok(metadata)
    }

    /// Wrap a message in a request carrying the SDK metadata.
    pub fn request<M>(&self, message: M) -> Result<tonic::Request<M>> {
        let mut request = tonic::Request::new(message);
        *request.metadata_mut() = self.metadata()?;
        Ok(request)
    }

    /// Log a failed RPC and convert its status.
    pub fn rpc_error(&self, service: &str, method: &str, status: tonic::Status) -> SdkError {
        tracing::warn!(
            target: "macrocosmos::client",
            service,
            method,
            code = ?status.code(),
            status_message = status.message(),
            "RPC failed"
        );
        status.into()
    }

    /// Log the start of an RPC.
    pub(crate) fn trace_call(&self, service: &str, method: &str) {
        tracing::debug!(target: "macrocosmos::client", service, method, "RPC issued");
    }
}

fn ascii(value: String) -> Result<AsciiMetadataValue> {
    AsciiMetadataValue::try_from(value).map_err(SdkError::from)
}
