//! Session cookie authentication for the profile pages.

use crate::app::AppState;
use crate::config::SessionEntry;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use profile_link_core::LocalUserId;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub const SESSION_COOKIE: &str = "session";
pub const EDIT_USERS: &str = "edit_users";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid session")]
    InvalidSession,

    #[error("Missing capability: {0}")]
    MissingCapability(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::AuthenticationRequired | AuthError::InvalidSession => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::MissingCapability(_) => StatusCode::FORBIDDEN,
        };
        (status, self.to_string()).into_response()
    }
}

/// A local user resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: LocalUserId,
    pub capabilities: HashSet<String>,
}

impl SessionUser {
    pub fn can(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn require(&self, capability: &str) -> Result<(), AuthError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(AuthError::MissingCapability(capability.to_string()))
        }
    }
}

/// Fixed table of session tokens, standing in for the host's user system.
#[derive(Debug, Clone, Default)]
pub struct SessionAuthenticator {
    sessions: HashMap<String, SessionUser>,
}

impl SessionAuthenticator {
    pub fn new(entries: &[SessionEntry]) -> Self {
        let sessions = entries
            .iter()
            .map(|entry| {
                (
                    entry.token.clone(),
                    SessionUser {
                        user_id: LocalUserId(entry.user_id),
                        capabilities: entry.capabilities.iter().cloned().collect(),
                    },
                )
            })
            .collect();
        Self { sessions }
    }

    pub fn authenticate(&self, token: &str) -> Result<SessionUser, AuthError> {
        self.sessions
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidSession)
    }
}

/// Extractor for handlers that need the authenticated local user.
pub struct CurrentUser(pub SessionUser);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar
            .get(SESSION_COOKIE)
            .ok_or(AuthError::AuthenticationRequired)?;

        state.sessions.authenticate(cookie.value()).map(CurrentUser)
    }
}
