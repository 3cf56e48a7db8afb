//! Router, shared state and page handlers.

use crate::auth::{AuthError, CurrentUser, EDIT_USERS, SessionAuthenticator};
use crate::config::Config;
use anyhow::Context;
use axum::extract::{Path, Query, Request, State};
use axum::http::{StatusCode, Uri, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use profile_link_core::{
    ErrorLogEntry, FileProfileStore, InMemoryProfileStore, LocalUserId, ProfileStore,
    RecentErrorSink, StoreError,
};
use profile_link_oauth2::render::{
    ProfileView, escape_html, render_claims_table, render_own_profile,
};
use profile_link_oauth2::{
    ClientConfig, ExchangeCoordinator, FlowEntryPoint, FlowQuery, FlowUrls, ProviderClient,
    ProviderConfig, authorization_url,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use url::Url;

#[derive(Clone)]
pub struct AppState {
    pub entry: FlowEntryPoint,
    pub sessions: Arc<SessionAuthenticator>,
    pub errors: Arc<RecentErrorSink>,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = ProviderClient::new(
            ClientConfig::new()
                .with_scheme(config.provider.scheme.clone())
                .with_http_timeout(config.provider.http_timeout_seconds),
        )
        .context("Failed to build provider HTTP client")?;

        let profiles: Arc<dyn ProfileStore> = match &config.storage.profiles_file {
            Some(path) => {
                info!("Storing linked profiles in {}", path.display());
                Arc::new(FileProfileStore::new(path))
            }
            None => {
                info!("Storing linked profiles in memory");
                Arc::new(InMemoryProfileStore::new())
            }
        };

        let errors = Arc::new(RecentErrorSink::new());
        let urls = FlowUrls::new(config.home_url()?, config.profile_edit_url()?);

        let coordinator = ExchangeCoordinator::new(
            client,
            Arc::new(config.provider.options()),
            profiles,
            errors.clone(),
            urls,
        );

        Ok(Self {
            entry: FlowEntryPoint::new(coordinator),
            sessions: Arc::new(SessionAuthenticator::new(&config.sessions)),
            errors,
        })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Profile store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Auth(e) => e.into_response(),
            AppError::Store(e) => {
                error!("Profile store error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/profile", get(own_profile))
        .route("/users/{id}/profile", get(user_profile))
        .route("/admin/errors", get(error_log))
        .layer(middleware::from_fn_with_state(state.clone(), request_setup))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs on every request before authentication. A provider callback ends
/// here with a redirect.
async fn request_setup(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let query = flow_query(request.uri());
    let step = state.entry.on_request_setup(&query).await;

    match step.redirect {
        Some(to) => found(&to),
        None => next.run(request).await,
    }
}

async fn home() -> Html<String> {
    Html(page("Home", r#"<p><a href="profile">Your profile</a></p>"#))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn own_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    uri: Uri,
) -> Result<Response, AppError> {
    let query = flow_query(&uri);
    let step = state.entry.on_privileged_setup(&query, user.user_id).await;
    if let Some(to) = step.redirect {
        return Ok(found(&to));
    }

    let coordinator = state.entry.coordinator();
    let claims = coordinator.profiles().get(user.user_id).await?;
    let login_url = ProviderConfig::from_options(coordinator.options())
        .ok()
        .map(|provider| {
            authorization_url(&provider.domain, &provider.client_id, coordinator.urls())
        });
    let token = query.token_param();

    let section = render_own_profile(&ProfileView {
        claims: claims.as_ref(),
        token: &token,
        can_edit_users: user.can(EDIT_USERS),
        authorization_url: login_url.as_deref(),
    });

    Ok(Html(page("Profile", &section)).into_response())
}

async fn user_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<u64>,
) -> Result<Html<String>, AppError> {
    user.require(EDIT_USERS)?;

    let target = LocalUserId(id);
    let claims = state.entry.coordinator().profiles().get(target).await?;
    let title = format!("User {}", target);

    Ok(Html(page(&title, &render_claims_table(claims.as_ref()))))
}

async fn error_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ErrorLogEntry>>, AppError> {
    user.require(EDIT_USERS)?;
    Ok(Json(state.errors.entries()))
}

/// Malformed query strings are treated as carrying no flow parameters.
fn flow_query(uri: &Uri) -> FlowQuery {
    Query::<FlowQuery>::try_from_uri(uri)
        .map(|Query(query)| query)
        .unwrap_or_default()
}

fn found(to: &Url) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, to.as_str())]).into_response()
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head>\
         <body><h1>{}</h1>{}</body></html>",
        escape_html(title),
        escape_html(title),
        body
    )
}
