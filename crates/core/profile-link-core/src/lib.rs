//! Core types and collaborator traits for linking local user profiles to
//! identity-provider claims.
//!
//! The host system owns users, configuration and diagnostics. This crate
//! describes the contracts the linking flow needs from it:
//!
//! - [`ProfileStore`] keeps one [`IdentityClaims`] object per [`LocalUserId`]
//! - [`OptionsStore`] exposes the provider domain and client credentials
//! - [`ErrorSink`] receives fire-and-forget diagnostic entries

mod claims;
mod error;
mod options;
mod sink;
mod store;
mod user;

pub use claims::{ClaimsError, IdentityClaims};
pub use error::{StoreError, StoreResult};
pub use options::{OptionsStore, StaticOptions};
pub use sink::{ErrorLogEntry, ErrorSink, RecentErrorSink, TracingErrorSink};
pub use store::{FileProfileStore, InMemoryProfileStore, ProfileStore};
pub use user::LocalUserId;
