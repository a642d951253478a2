// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login, refresh, session and logout endpoints.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};

use crate::auth::{Auth, AuthError, AuthService, IssuedCredentials};
use crate::error::ApiError;
use crate::models::{LoginRequest, SessionResponse, TokenResponse};
use crate::state::AppState;

/// Body and cookie for freshly issued credentials.
///
/// `now` must be the instant the credentials were issued at, so the cookie's
/// `Max-Age` equals the refresh lifetime.
fn credentials_response(
    auth: &AuthService,
    issued: IssuedCredentials,
    now: DateTime<Utc>,
) -> Result<(StatusCode, HeaderMap, Json<TokenResponse>), ApiError> {
    let mut headers = HeaderMap::new();
    if let Some(refresh) = &issued.refresh {
        headers.insert(
            SET_COOKIE,
            auth.cookie().build(&refresh.token, refresh.expires_at, now)?,
        );
    }
    Ok((
        StatusCode::CREATED,
        headers,
        Json(TokenResponse::bearer(
            issued.access_token,
            issued.access_expires_at,
        )),
    ))
}

/// Exchange credentials for an access token and a refresh cookie.
///
/// Unknown accounts and wrong passwords produce the same 401 response.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Credentials issued; refresh credential set as cookie", body = TokenResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 503, description = "Store temporarily unavailable"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(StatusCode, HeaderMap, Json<TokenResponse>), ApiError> {
    let now = Utc::now();
    let issued = state
        .auth
        .login(&request.identifier, &request.password, now)
        .await?;
    credentials_response(&state.auth, issued, now)
}

/// Exchange the refresh cookie for a new access token.
#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    tag = "Auth",
    responses(
        (status = 201, description = "New access credential", body = TokenResponse),
        (status = 401, description = "Missing, invalid or expired refresh credential"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, HeaderMap, Json<TokenResponse>), ApiError> {
    let token = state
        .auth
        .cookie()
        .read(&headers)
        .ok_or(AuthError::AuthenticationRequired)?;
    let now = Utc::now();
    let issued = state.auth.refresh(&token, now).await?;
    credentials_response(&state.auth, issued, now)
}

/// The current session's user.
#[utoipa::path(
    get,
    path = "/v1/auth/session",
    tag = "Auth",
    security(("bearer" = []), ("cookie" = [])),
    responses(
        (status = 200, description = "Authenticated session", body = SessionResponse),
        (status = 401, description = "No valid session"),
    )
)]
pub async fn session(Auth(user): Auth) -> Json<SessionResponse> {
    Json(user.into())
}

/// Revoke the caller's opaque credentials and clear the refresh cookie.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    security(("bearer" = []), ("cookie" = [])),
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "No valid session"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    state.auth.logout(&user).await?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, state.auth.cookie().clear()?);
    Ok((StatusCode::NO_CONTENT, headers))
}
