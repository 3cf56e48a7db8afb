//! Request classification and the two lifecycle entry points.

use crate::coordinator::ExchangeCoordinator;
use crate::types::{AuthorizationCode, FlowStep, TokenParam, is_empty_value};
use profile_link_core::LocalUserId;
use serde::Deserialize;
use tracing::debug;

/// Flow-related query parameters of an inbound request. Absent and empty
/// values stay distinct.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowQuery {
    #[serde(rename = "auth0-profile")]
    pub marker: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "auth0-profile-token")]
    pub token: Option<String>,
}

impl FlowQuery {
    fn has_marker(&self) -> bool {
        self.marker.as_deref().is_some_and(|m| !is_empty_value(m))
    }

    pub fn token_param(&self) -> TokenParam {
        TokenParam::from_query(self.token.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowRequest {
    NotAFlow,
    /// Provider callback: marker and code present.
    CodeCallback(AuthorizationCode),
    /// Token delivered back to the profile page, marker absent.
    TokenDelivery(TokenParam),
}

impl FlowRequest {
    /// Exactly one classification per request.
    pub fn classify(query: &FlowQuery) -> Self {
        if query.has_marker() {
            return match query.code.as_deref() {
                Some(code) if !is_empty_value(code) => {
                    FlowRequest::CodeCallback(AuthorizationCode::new(code))
                }
                _ => FlowRequest::NotAFlow,
            };
        }

        match query.token_param() {
            TokenParam::Absent => FlowRequest::NotAFlow,
            param => FlowRequest::TokenDelivery(param),
        }
    }
}

/// Hooks the surrounding service calls at its two pipeline stages.
#[derive(Clone)]
pub struct FlowEntryPoint {
    coordinator: ExchangeCoordinator,
}

impl FlowEntryPoint {
    pub fn new(coordinator: ExchangeCoordinator) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &ExchangeCoordinator {
        &self.coordinator
    }

    /// Early request setup, before the user is authenticated. Handles the
    /// provider callback.
    pub async fn on_request_setup(&self, query: &FlowQuery) -> FlowStep {
        match FlowRequest::classify(query) {
            FlowRequest::CodeCallback(code) => {
                debug!("Profile link callback received");
                self.coordinator.handle_code_callback(&code).await
            }
            _ => FlowStep::idle(),
        }
    }

    /// Authenticated setup. Exchanges a delivered token for the user's
    /// claims; an empty token is left for the page to report.
    pub async fn on_privileged_setup(&self, query: &FlowQuery, user: LocalUserId) -> FlowStep {
        match FlowRequest::classify(query) {
            FlowRequest::TokenDelivery(TokenParam::Present(token)) => {
                debug!("Profile link token delivered for user {}", user);
                self.coordinator.handle_token_delivery(user, &token).await
            }
            _ => FlowStep::idle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccessToken;

    fn query(marker: Option<&str>, code: Option<&str>, token: Option<&str>) -> FlowQuery {
        FlowQuery {
            marker: marker.map(String::from),
            code: code.map(String::from),
            token: token.map(String::from),
        }
    }

    #[test]
    fn test_classify_plain_request() {
        assert_eq!(
            FlowRequest::classify(&FlowQuery::default()),
            FlowRequest::NotAFlow
        );
        assert_eq!(
            FlowRequest::classify(&query(None, Some("abc123"), None)),
            FlowRequest::NotAFlow
        );
    }

    #[test]
    fn test_classify_code_callback() {
        assert_eq!(
            FlowRequest::classify(&query(Some("1"), Some("abc123"), None)),
            FlowRequest::CodeCallback(AuthorizationCode::new("abc123"))
        );
        // A marker without a code is not actionable.
        assert_eq!(
            FlowRequest::classify(&query(Some("1"), Some(""), None)),
            FlowRequest::NotAFlow
        );
        assert_eq!(
            FlowRequest::classify(&query(Some("0"), Some("abc123"), None)),
            FlowRequest::NotAFlow
        );
    }

    #[test]
    fn test_classify_token_delivery() {
        assert_eq!(
            FlowRequest::classify(&query(None, None, Some("tok_xyz"))),
            FlowRequest::TokenDelivery(TokenParam::Present(AccessToken::new("tok_xyz")))
        );
        assert_eq!(
            FlowRequest::classify(&query(None, None, Some(""))),
            FlowRequest::TokenDelivery(TokenParam::Empty)
        );
        assert_eq!(
            FlowRequest::classify(&query(None, None, Some("0"))),
            FlowRequest::TokenDelivery(TokenParam::Empty)
        );
    }

    #[test]
    fn test_marker_takes_priority_over_token() {
        assert_eq!(
            FlowRequest::classify(&query(Some("1"), Some("abc123"), Some("tok_xyz"))),
            FlowRequest::CodeCallback(AuthorizationCode::new("abc123"))
        );
        // Marker present without a code: neither handler runs.
        assert_eq!(
            FlowRequest::classify(&query(Some("1"), None, Some("tok_xyz"))),
            FlowRequest::NotAFlow
        );
    }

    #[test]
    fn test_query_deserializes_three_way() {
        let parsed: FlowQuery =
            serde_json::from_value(serde_json::json!({"auth0-profile-token": ""})).unwrap();
        assert_eq!(parsed.token.as_deref(), Some(""));
        assert_eq!(parsed.token_param(), TokenParam::Empty);

        let parsed: FlowQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(parsed.token_param(), TokenParam::Absent);
    }
}
