//! Client configuration
//!
//! [`ClientConfig`] holds everything a service client needs to reach the API;
//! [`ClientBuilder`] assembles one from explicit settings and environment
//! fallbacks.

use std::marker::PhantomData;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::client::{BaseClient, ServiceClient};
use crate::constants::{
    DEFAULT_APP_NAME, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, ENV_BASE_URL, ENV_USE_HTTPS,
};
use crate::error::{Result, SdkError};
use crate::telemetry::mask_sensitive_value;

/// Resolved client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// API key sent as `authorization: Bearer <key>`
    pub api_key: SecretString,
    /// Host (and optional port), with or without scheme
    pub base_url: String,
    /// Sent as `x-source`
    pub app_name: String,
    /// TLS on or off
    pub secure: bool,
    /// Sent as `x-forwarded-user`; used with service account keys
    pub user_id: String,
    /// Deadline applied to chat completion calls
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &mask_sensitive_value(self.api_key.expose_secret()))
            .field("base_url", &self.base_url)
            .field("app_name", &self.app_name)
            .field("secure", &self.secure)
            .field("user_id", &self.user_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Config with defaults for everything except the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            secure: true,
            user_id: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(SdkError::Configuration("API key is required".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(SdkError::Configuration("Base URL is required".to_string()));
        }
        Ok(())
    }

    /// Endpoint URI for the channel.
    ///
    /// A base URL that already carries a scheme is used unchanged.
    pub fn endpoint_uri(&self) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            return base.to_string();
        }
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{base}")
    }
}

/// Read an environment variable, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// TLS default: on unless `MACROCOSMOS_USE_HTTPS` is exactly `false`.
fn secure_from_env() -> bool {
    std::env::var(ENV_USE_HTTPS).map_or(true, |v| v != "false")
}

/// Builder for any service client.
///
/// ```rust,no_run
/// use macrocosmos::prelude::*;
///
/// let client = ApexClient::builder()
///     .api_key("your-api-key")
///     .app_name("my-app")
///     .build()?;
/// # Ok::<(), macrocosmos::SdkError>(())
/// ```
pub struct ClientBuilder<C> {
    api_key: Option<SecretString>,
    base_url: Option<String>,
    app_name: Option<String>,
    secure: Option<bool>,
    user_id: Option<String>,
    timeout: Option<Duration>,
    _client: PhantomData<fn() -> C>,
}

impl<C> Default for ClientBuilder<C> {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            app_name: None,
            secure: None,
            user_id: None,
            timeout: None,
            _client: PhantomData,
        }
    }
}

impl<C> std::fmt::Debug for ClientBuilder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("has_api_key", &self.api_key.is_some())
            .field("base_url", &self.base_url)
            .field("app_name", &self.app_name)
            .field("secure", &self.secure)
            .field("user_id", &self.user_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<C: ServiceClient> ClientBuilder<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Set the base URL
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the app name reported as `x-source`
    pub fn app_name<S: Into<String>>(mut self, app_name: S) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Use TLS (default) or plaintext HTTP/2
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Set the forwarded user id (service account keys)
    pub fn user_id<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the chat completion deadline
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the configuration without building a client.
    pub fn into_config(self) -> Result<ClientConfig> {
        // Priority: explicit value > service-specific env var > shared env var
        let api_key = self
            .api_key
            .filter(|k| !k.expose_secret().trim().is_empty())
            .or_else(|| {
                C::API_KEY_VARS
                    .iter()
                    .find_map(|name| env_var(name))
                    .map(SecretString::from)
            })
            .ok_or_else(|| SdkError::Configuration("API key is required".to_string()))?;

        let config = ClientConfig {
            api_key,
            base_url: self
                .base_url
                .or_else(|| env_var(ENV_BASE_URL))
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            app_name: self
                .app_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            secure: self.secure.unwrap_or_else(secure_from_env),
            user_id: self.user_id.unwrap_or_default(),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build the client
    pub fn build(self) -> Result<C> {
        let config = self.into_config()?;
        Ok(C::from_base(BaseClient::new(config)?))
    }
}
