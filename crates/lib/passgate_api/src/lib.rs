//! # passgate_api
//!
//! HTTP token authority and role administration API.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use passgate_core::store::CredentialStore;

use crate::config::ApiConfig;
use crate::handlers::{roles, token};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Credential, role, and refresh token store.
    pub store: Arc<CredentialStore>,
    /// API configuration.
    pub config: ApiConfig,
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/auth", post(token::authenticate_client))
        .route("/api/token/get-token", post(token::get_token))
        .route("/api/token/refresh-token", post(token::refresh_token));

    // Protected routes (require auth; each handler declares its permission)
    let protected = Router::new()
        .route("/api/roles", get(roles::list_roles))
        .route(
            "/api/roles/{role}/permissions",
            get(roles::role_permissions).put(roles::update_role_permissions),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
