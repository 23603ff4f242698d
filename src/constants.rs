//! SDK identity, endpoints and environment variable names.

/// Client name reported in the `x-client-id` metadata entry.
pub const CLIENT_NAME: &str = "macrocosmos-rust-sdk";

/// Crate version reported in the `x-client-version` metadata entry.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API host (no scheme; the scheme follows the TLS setting).
pub const DEFAULT_BASE_URL: &str = "constellation.api.cloud.macrocosmos.ai";

/// App name sent as `x-source` when the caller does not set one.
pub const DEFAULT_APP_NAME: &str = "unknown";

/// Default deadline for Apex chat completions, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Environment variables
// ============================================================================

/// Overrides [`DEFAULT_BASE_URL`].
pub const ENV_BASE_URL: &str = "MACROCOSMOS_BASE_URL";

/// Set to `false` to use plaintext HTTP/2 instead of TLS.
pub const ENV_USE_HTTPS: &str = "MACROCOSMOS_USE_HTTPS";

/// Shared API key used by every service client.
pub const ENV_API_KEY: &str = "MACROCOSMOS_API_KEY";

/// Apex-specific API key, checked before [`ENV_API_KEY`].
pub const ENV_APEX_API_KEY: &str = "APEX_API_KEY";

/// Gravity-specific API key, checked before [`ENV_API_KEY`].
pub const ENV_GRAVITY_API_KEY: &str = "GRAVITY_API_KEY";
