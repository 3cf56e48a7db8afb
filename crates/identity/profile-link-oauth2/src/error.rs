//! OAuth2 error types.

use thiserror::Error;

pub type OAuth2Result<T> = Result<T, OAuth2Error>;

#[derive(Debug, Error)]
pub enum OAuth2Error {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Token exchange failed: {body} - Code: {status}")]
    TokenExchangeFailed { status: u16, body: String },

    #[error("User info request failed: {body} - Code: {status}")]
    UserInfoFailed { status: u16, body: String },

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),
}

/// Coarse classification used when deciding how a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The provider could not be reached.
    Transport,
    /// The provider answered with a non-200 status or an unusable body.
    Protocol,
    /// Domain or client credentials are missing or malformed.
    Configuration,
}

impl OAuth2Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OAuth2Error::HttpError(_) => ErrorKind::Transport,
            OAuth2Error::TokenExchangeFailed { .. } | OAuth2Error::UserInfoFailed { .. } => {
                ErrorKind::Protocol
            }
            OAuth2Error::ConfigError(_) | OAuth2Error::UrlError(_) => ErrorKind::Configuration,
        }
    }

    /// Provider status code, when the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            OAuth2Error::TokenExchangeFailed { status, .. }
            | OAuth2Error::UserInfoFailed { status, .. } => Some(*status),
            OAuth2Error::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
