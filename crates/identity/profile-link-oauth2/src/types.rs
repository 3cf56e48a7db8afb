//! OAuth2 protocol types.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Authorization code handed back by the provider on the callback redirect.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationCode(String);

impl AuthorizationCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthorizationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthorizationCode(<redacted>)")
    }
}

/// Access token issued by the code exchange. Lives for one flow and is never
/// persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// The one-shot token query parameter as seen on an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenParam {
    /// Not part of the request at all.
    Absent,
    /// Present but empty or the failure marker, i.e. the code exchange failed.
    Empty,
    /// A token to exchange for userinfo.
    Present(AccessToken),
}

impl TokenParam {
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            None => TokenParam::Absent,
            Some(v) if is_empty_value(v) => TokenParam::Empty,
            Some(v) => TokenParam::Present(AccessToken::new(v)),
        }
    }

    pub fn is_failure_notice(&self) -> bool {
        matches!(self, TokenParam::Empty)
    }
}

/// Emptiness as the host treats query values: `""` and `"0"` are both empty.
pub(crate) fn is_empty_value(value: &str) -> bool {
    value.is_empty() || value == "0"
}

/// Token endpoint response. Only `access_token` is required by the flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
    pub id_token: Option<String>,
}

/// Position of a single request in the linking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Idle,
    AwaitingCode,
    AwaitingUserInfo,
    Complete,
    Failed,
}

/// Result of running one flow step for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStep {
    pub state: FlowState,
    /// Where to send the browser. A redirect ends the request.
    pub redirect: Option<Url>,
}

impl FlowStep {
    pub fn idle() -> Self {
        Self {
            state: FlowState::Idle,
            redirect: None,
        }
    }

    pub fn redirect(state: FlowState, to: Url) -> Self {
        Self {
            state,
            redirect: Some(to),
        }
    }

    pub fn fall_through(state: FlowState) -> Self {
        Self {
            state,
            redirect: None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        self.redirect.is_some()
    }
}
