//! OAuth2 authorization code flow that links provider claims to a local
//! user profile.
//!
//! The flow spans two browser round trips and keeps no server-side state:
//!
//! 1. The provider redirects to the site with the flow marker and a `code`.
//!    [`FlowEntryPoint::on_request_setup`] exchanges the code for an access
//!    token and redirects to the profile page carrying the token (or the
//!    failure marker).
//! 2. The authenticated profile request carries the token.
//!    [`FlowEntryPoint::on_privileged_setup`] exchanges it for userinfo claims
//!    and stores them for the current user.

mod client;
mod config;
mod coordinator;
mod entry;
mod error;
pub mod render;
mod types;
mod urls;


pub use client::ProviderClient;
pub use config::{ClientConfig, ProviderConfig};
pub use coordinator::ExchangeCoordinator;
pub use entry::{FlowEntryPoint, FlowQuery, FlowRequest};
pub use error::{ErrorKind, OAuth2Error, OAuth2Result};
pub use types::{AccessToken, AuthorizationCode, FlowState, FlowStep, TokenParam, TokenResponse};
pub use urls::{
    CODE_PARAM, FAILURE_MARKER, FLOW_MARKER_PARAM, FlowUrls, TOKEN_PARAM, authorization_url,
    with_query_arg, without_query_arg,
};

// Re-export common types for convenience
pub use profile_link_core::{IdentityClaims, LocalUserId};
