//! HTTP host for the profile linking flow.
//!
//! Runs the provider callback as router-wide middleware and the token
//! delivery step inside the authenticated profile page.

pub mod app;
pub mod auth;
pub mod config;
pub mod telemetry;

pub use app::{AppState, router};
pub use config::Config;
