//! Token endpoints: client authentication, user login, and refresh.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiResult;
use crate::services::token::{self, TokenResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCredentialsRequest {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTokenRequest {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// The (possibly expired) access token the refresh token was issued with.
    pub token: String,
    pub refresh_token: String,
}

/// POST /auth — exchange client credentials for a scope-claim token.
pub async fn authenticate_client(
    State(state): State<AppState>,
    Json(body): Json<ClientCredentialsRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let grant = token::authenticate_client(
        &state.store,
        &body.client_id,
        &body.client_secret,
        state.config.signing_secret.as_bytes(),
    )?;
    Ok(Json(grant))
}

/// POST /api/token/get-token — exchange user credentials for a
/// permission-claim token plus a refresh token.
pub async fn get_token(
    State(state): State<AppState>,
    Json(body): Json<UserTokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let grant = token::authenticate_user(
        &state.store,
        &body.user_name,
        &body.password,
        state.config.signing_secret.as_bytes(),
    )?;
    Ok(Json(grant))
}

/// POST /api/token/refresh-token — rotate a token pair.
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let grant = token::refresh_grant(
        &state.store,
        &body.token,
        &body.refresh_token,
        state.config.signing_secret.as_bytes(),
    )?;
    Ok(Json(grant))
}
