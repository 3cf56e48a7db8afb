//! Two-step exchange: authorization code to access token, then access token
//! to userinfo claims stored against the local user.
//!
//! No flow state is kept on the server. The access token travels to the
//! second step on the browser redirect, so each step only sees its own
//! request.

use crate::client::ProviderClient;
use crate::config::ProviderConfig;
use crate::error::{ErrorKind, OAuth2Error};
use crate::types::{AccessToken, AuthorizationCode, FlowState, FlowStep};
use crate::urls::FlowUrls;
use profile_link_core::{ErrorSink, LocalUserId, OptionsStore, ProfileStore};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

const CODE_STEP: &str = "handle_code_callback";
const USERINFO_STEP: &str = "handle_token_delivery";

#[derive(Clone)]
pub struct ExchangeCoordinator {
    client: ProviderClient,
    options: Arc<dyn OptionsStore>,
    profiles: Arc<dyn ProfileStore>,
    errors: Arc<dyn ErrorSink>,
    urls: FlowUrls,
}

impl ExchangeCoordinator {
    pub fn new(
        client: ProviderClient,
        options: Arc<dyn OptionsStore>,
        profiles: Arc<dyn ProfileStore>,
        errors: Arc<dyn ErrorSink>,
        urls: FlowUrls,
    ) -> Self {
        Self {
            client,
            options,
            profiles,
            errors,
            urls,
        }
    }

    pub fn urls(&self) -> &FlowUrls {
        &self.urls
    }

    pub fn options(&self) -> &dyn OptionsStore {
        self.options.as_ref()
    }

    pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
        &self.profiles
    }

    /// Exchange the callback's code and send the browser to the profile page
    /// with either the token or the failure marker.
    #[instrument(skip(self, code))]
    pub async fn handle_code_callback(&self, code: &AuthorizationCode) -> FlowStep {
        let result = match ProviderConfig::from_options(self.options.as_ref()) {
            Ok(provider) => {
                self.client
                    .exchange_code(&provider, self.urls.home_url.as_str(), code)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(token) => {
                info!("Authorization code exchanged, delivering token to profile page");
                FlowStep::redirect(
                    FlowState::AwaitingUserInfo,
                    self.urls.profile_with_token(token.as_str()),
                )
            }
            Err(e) => {
                self.report(CODE_STEP, &e);
                FlowStep::redirect(FlowState::Failed, self.urls.profile_with_failure())
            }
        }
    }

    /// Fetch userinfo for a delivered token and store it for `user`.
    ///
    /// Failures fall through without a redirect so the page renders in its
    /// "not connected" state.
    #[instrument(skip(self, token))]
    pub async fn handle_token_delivery(&self, user: LocalUserId, token: &AccessToken) -> FlowStep {
        let claims = match ProviderConfig::domain_from_options(self.options.as_ref()) {
            Ok(domain) => self.client.fetch_user_info(&domain, token).await,
            Err(e) => Err(e),
        };

        let claims = match claims {
            Ok(claims) => claims,
            Err(e) => {
                self.report(USERINFO_STEP, &e);
                return FlowStep::fall_through(FlowState::Failed);
            }
        };

        let subject = claims.subject().to_string();
        if let Err(e) = self.profiles.set(user, claims).await {
            error!("Failed to store claims for user {}: {}", user, e);
            self.errors.record(USERINFO_STEP, &e.to_string());
            return FlowStep::fall_through(FlowState::Failed);
        }

        info!("Linked user {} to provider subject {}", user, subject);
        FlowStep::redirect(FlowState::Complete, self.urls.profile())
    }

    fn report(&self, step: &str, e: &OAuth2Error) {
        match e.kind() {
            ErrorKind::Configuration => error!("Provider is not configured: {}", e),
            ErrorKind::Transport => warn!("Provider unreachable: {}", e),
            ErrorKind::Protocol => warn!("Provider rejected request: {}", e),
        }

        let message = match e {
            OAuth2Error::TokenExchangeFailed { status, body }
            | OAuth2Error::UserInfoFailed { status, body } => {
                format!("{} - Code: {}", body, status)
            }
            other => other.to_string(),
        };
        self.errors.record(step, &message);
    }
}
