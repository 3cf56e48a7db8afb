//! OAuth2 configuration types.

use crate::error::{OAuth2Error, OAuth2Result};
use profile_link_core::OptionsStore;

pub const OPTION_DOMAIN: &str = "domain";
pub const OPTION_CLIENT_ID: &str = "client_id";
pub const OPTION_CLIENT_SECRET: &str = "client_secret";

/// Provider tenant and client credentials, read from the options store on
/// every flow step.
#[derive(Clone)]
pub struct ProviderConfig {
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl ProviderConfig {
    /// Read the provider settings, failing when any of them is missing or empty.
    pub fn from_options(options: &dyn OptionsStore) -> OAuth2Result<Self> {
        Ok(Self {
            domain: required(options, OPTION_DOMAIN)?,
            client_id: required(options, OPTION_CLIENT_ID)?,
            client_secret: required(options, OPTION_CLIENT_SECRET)?,
        })
    }

    /// Only the domain is needed for the userinfo call.
    pub fn domain_from_options(options: &dyn OptionsStore) -> OAuth2Result<String> {
        required(options, OPTION_DOMAIN)
    }

    /// Whether the options store holds a complete provider configuration.
    pub fn is_configured(options: &dyn OptionsStore) -> bool {
        Self::from_options(options).is_ok()
    }
}

fn required(options: &dyn OptionsStore, key: &str) -> OAuth2Result<String> {
    match options.get(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(OAuth2Error::ConfigError(format!("{} is not set", key))),
    }
}

/// HTTP client settings for talking to the provider.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL scheme for the token and userinfo endpoints.
    pub scheme: String,
    pub http_timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            http_timeout_seconds: 30,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }
}
