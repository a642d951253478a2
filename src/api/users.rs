// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{ActivateRequest, RegisterRequest, RegisterResponse, UserResponse};
use crate::state::AppState;

/// Create an account.
///
/// The account starts inactive; the response carries the one-time activation
/// token.
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid email, name or password"),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let (identity, token) = state
        .auth
        .register(
            &request.email,
            &request.display_name,
            &request.password,
            Utc::now(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse::from(&identity),
            activation_token: token.plaintext,
            activation_expires_at: token.expiry,
        }),
    ))
}

/// Activate an account with its activation token.
#[utoipa::path(
    put,
    path = "/v1/users/activate",
    tag = "Users",
    request_body = ActivateRequest,
    responses(
        (status = 200, description = "Account activated", body = UserResponse),
        (status = 401, description = "Unknown or expired activation token"),
    )
)]
pub async fn activate(
    State(state): State<AppState>,
    Json(request): Json<ActivateRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let identity = state.auth.activate(&request.token, Utc::now()).await?;
    Ok(Json(UserResponse::from(&identity)))
}

/// Get the current authenticated user's account.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Account no longer exists"),
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<UserResponse>, ApiError> {
    let identity = state
        .auth
        .find_identity(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("account not found"))?;
    Ok(Json(UserResponse::from(&identity)))
}
