//! HTTP client for the provider's token and userinfo endpoints.

use crate::config::{ClientConfig, ProviderConfig};
use crate::error::{OAuth2Error, OAuth2Result};
use crate::types::{AccessToken, AuthorizationCode, TokenResponse, is_empty_value};
use profile_link_core::IdentityClaims;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    code: &'a str,
}

/// Stateless wrapper around the two provider calls. Each call is attempted
/// once; retrying means starting the login again.
#[derive(Clone)]
pub struct ProviderClient {
    http_client: Client,
    config: ClientConfig,
}

impl ProviderClient {
    pub fn new(config: ClientConfig) -> OAuth2Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn token_endpoint(&self, domain: &str) -> OAuth2Result<Url> {
        self.endpoint(domain, "/oauth/token")
    }

    pub fn userinfo_endpoint(&self, domain: &str) -> OAuth2Result<Url> {
        self.endpoint(domain, "/userinfo")
    }

    fn endpoint(&self, domain: &str, path: &str) -> OAuth2Result<Url> {
        let domain = domain.trim_end_matches('/');
        if domain.is_empty() {
            return Err(OAuth2Error::ConfigError("domain is not set".to_string()));
        }
        Ok(Url::parse(&format!("{}://{}{}", self.config.scheme, domain, path))?)
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Only an exact 200 with a non-empty `access_token` in the body counts as
    /// success; the raw status and body are kept on every failure.
    pub async fn exchange_code(
        &self,
        provider: &ProviderConfig,
        redirect_uri: &str,
        code: &AuthorizationCode,
    ) -> OAuth2Result<AccessToken> {
        let endpoint = self.token_endpoint(&provider.domain)?;
        let request = TokenRequest {
            grant_type: "authorization_code",
            client_id: &provider.client_id,
            client_secret: &provider.client_secret,
            redirect_uri,
            code: code.as_str(),
        };

        let response = self
            .http_client
            .post(endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            warn!("Token exchange returned status {}", status.as_u16());
            return Err(OAuth2Error::TokenExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        let token = serde_json::from_str::<TokenResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.access_token)
            .filter(|token| !is_empty_value(token));

        match token {
            Some(token) => {
                info!("Successfully exchanged code for access token");
                Ok(AccessToken::new(token))
            }
            None => {
                warn!("Token exchange response had no access token");
                Err(OAuth2Error::TokenExchangeFailed {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// Fetch the userinfo claims for an access token.
    pub async fn fetch_user_info(
        &self,
        domain: &str,
        access_token: &AccessToken,
    ) -> OAuth2Result<IdentityClaims> {
        let endpoint = self.userinfo_endpoint(domain)?;

        let response = self
            .http_client
            .get(endpoint)
            .bearer_auth(access_token.as_str())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            warn!("User info request returned status {}", status.as_u16());
            return Err(OAuth2Error::UserInfoFailed {
                status: status.as_u16(),
                body,
            });
        }

        let claims = serde_json::from_str(&body)
            .ok()
            .and_then(|value| IdentityClaims::from_value(value).ok());

        match claims {
            Some(claims) => {
                debug!(
                    "Successfully retrieved user info for subject: {}",
                    claims.subject()
                );
                Ok(claims)
            }
            None => {
                warn!("User info response was empty or had no subject");
                Err(OAuth2Error::UserInfoFailed {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
