//! Configuration for the profile link server
//!
//! Sources, later ones winning:
//! - Default values
//! - Configuration file (`config.toml`, or `PROFILE_LINK_CONFIG_FILE`)
//! - Environment variables with the `PROFILE_LINK` prefix, `__` between
//!   sections, e.g. `PROFILE_LINK__PROVIDER__DOMAIN`

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File};
use profile_link_core::StaticOptions;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,

    /// Identity provider tenant and client credentials
    pub provider: ProviderSettings,

    pub storage: StorageConfig,

    pub logging: LoggingConfig,

    /// Session cookie values accepted by the server
    pub sessions: Vec<SessionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to (default: 127.0.0.1)
    pub host: IpAddr,

    /// Port to bind to (default: 3000)
    pub port: u16,

    /// Externally visible base URL; the provider redirects back here
    pub public_url: String,

    /// Path of the profile edit page, relative to `public_url`
    pub profile_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,

    /// Scheme for token and userinfo calls (default: https)
    pub scheme: String,

    pub http_timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding linked claims; kept in memory when unset
    pub profiles_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, json, compact)
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    pub token: String,
    pub user_id: u64,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            public_url: "http://127.0.0.1:3000/".to_string(),
            profile_path: "profile".to_string(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            domain: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            scheme: "https".to_string(),
            http_timeout_seconds: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ProviderSettings {
    /// Options store view of the provider settings.
    pub fn options(&self) -> StaticOptions {
        StaticOptions::new()
            .with("domain", &self.domain)
            .with("client_id", &self.client_id)
            .with("client_secret", &self.client_secret)
    }
}

impl Config {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_path = std::env::var("PROFILE_LINK_CONFIG_FILE")
            .unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            info!("Loading configuration from {}", config_path);
            builder = builder.add_source(File::with_name(&config_path));
        } else {
            debug!("No config file found at {}, using defaults", config_path);
        }

        builder = builder.add_source(
            Environment::with_prefix("PROFILE_LINK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let settings: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        self.home_url()?;
        self.profile_edit_url()?;

        if self.provider.http_timeout_seconds == 0 {
            anyhow::bail!("Provider HTTP timeout must be greater than 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}'. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        let valid_formats = ["pretty", "json", "compact"];
        let format_lower = self.logging.format.to_lowercase();
        if !valid_formats.contains(&format_lower.as_str()) {
            anyhow::bail!(
                "Invalid log format '{}'. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            );
        }

        for session in &self.sessions {
            if session.token.is_empty() {
                anyhow::bail!(
                    "Session for user {} has an empty token",
                    session.user_id
                );
            }
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    /// Site home; the provider's redirect target.
    pub fn home_url(&self) -> Result<Url> {
        let mut base = self.server.public_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)
            .with_context(|| format!("Invalid public_url '{}'", base))
    }

    pub fn profile_edit_url(&self) -> Result<Url> {
        self.home_url()?
            .join(self.server.profile_path.trim_start_matches('/'))
            .with_context(|| format!("Invalid profile_path '{}'", self.server.profile_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.socket_addr().port(), 3000);
        assert_eq!(
            config.home_url().unwrap().as_str(),
            "http://127.0.0.1:3000/"
        );
        assert_eq!(
            config.profile_edit_url().unwrap().as_str(),
            "http://127.0.0.1:3000/profile"
        );
    }

    #[test]
    fn test_public_url_without_trailing_slash() {
        let mut config = Config::default();
        config.server.public_url = "https://site.example/blog".to_string();
        config.server.profile_path = "/wp-admin/profile".to_string();

        assert_eq!(
            config.home_url().unwrap().as_str(),
            "https://site.example/blog/"
        );
        assert_eq!(
            config.profile_edit_url().unwrap().as_str(),
            "https://site.example/blog/wp-admin/profile"
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.public_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.provider.http_timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sessions.push(SessionEntry {
            token: String::new(),
            user_id: 7,
            capabilities: vec![],
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_options() {
        use profile_link_core::OptionsStore;

        let settings = ProviderSettings {
            domain: "tenant.auth0.com".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            ..ProviderSettings::default()
        };

        let options = settings.options();
        assert_eq!(options.get("domain").as_deref(), Some("tenant.auth0.com"));
        assert_eq!(options.get("client_secret").as_deref(), Some("secret"));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let source = r#"
            [server]
            port = 8080
            public_url = "https://site.example"

            [provider]
            domain = "tenant.auth0.com"
            client_id = "client"
            client_secret = "secret"

            [[sessions]]
            token = "admin-session"
            user_id = 1
            capabilities = ["edit_users"]
        "#;

        let config: Config = ConfigBuilder::builder()
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.provider.scheme, "https");
        assert_eq!(config.sessions.len(), 1);
        assert_eq!(config.sessions[0].capabilities, vec!["edit_users"]);
        config.validate().unwrap();
    }
}
