// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Variants stay distinct internally so they can be logged and tested, but the
//! HTTP mapping collapses them: every token failure produces the
//! same body, and unknown identifiers produce the same body as wrong passwords.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Authentication error type.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown identifier or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Signed token is past its expiry.
    #[error("token has expired")]
    TokenExpired,
    /// Bad signature, wrong algorithm, wrong token kind or undecodable.
    #[error("token is malformed")]
    TokenMalformed,
    /// Opaque token could not be resolved (absent, expired or wrong scope).
    #[error("token not found")]
    TokenNotFound,
    /// No credential was presented on a route that needs an identity.
    #[error("authentication required")]
    AuthenticationRequired,
    /// The backing store timed out or failed.
    #[error("store unavailable: {0}")]
    StoreTransient(String),
    /// Invalid startup configuration.
    #[error("misconfiguration: {0}")]
    Misconfiguration(String),
    /// A handler asked for the principal but the gate never ran.
    #[error("no principal bound to request")]
    PrincipalUnbound,
    /// Unexpected failure inside the auth core.
    #[error("internal authentication error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable, client-facing error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::TokenExpired | AuthError::TokenMalformed | AuthError::TokenNotFound => {
                "invalid_token"
            }
            AuthError::AuthenticationRequired => "authentication_required",
            AuthError::StoreTransient(_) => "temporarily_unavailable",
            AuthError::Misconfiguration(_)
            | AuthError::PrincipalUnbound
            | AuthError::Internal(_) => "internal_error",
        }
    }

    /// Generic message shown to clients. Never includes internal detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid authentication credentials",
            AuthError::TokenExpired | AuthError::TokenMalformed | AuthError::TokenNotFound => {
                "invalid or expired authentication token"
            }
            AuthError::AuthenticationRequired => {
                "you must be authenticated to access this resource"
            }
            AuthError::StoreTransient(_) => {
                "the server is temporarily unable to process your request"
            }
            AuthError::Misconfiguration(_)
            | AuthError::PrincipalUnbound
            | AuthError::Internal(_) => "the server encountered a problem processing your request",
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenMalformed
            | AuthError::TokenNotFound
            | AuthError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AuthError::StoreTransient(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Misconfiguration(_)
            | AuthError::PrincipalUnbound
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error came from a presented token that failed validation.
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            AuthError::TokenExpired | AuthError::TokenMalformed | AuthError::TokenNotFound
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header::WWW_AUTHENTICATE;

    async fn body_of(err: AuthError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn token_failures_share_one_response() {
        let expired = body_of(AuthError::TokenExpired).await;
        let malformed = body_of(AuthError::TokenMalformed).await;
        let missing = body_of(AuthError::TokenNotFound).await;

        assert_eq!(expired.0, StatusCode::UNAUTHORIZED);
        assert_eq!(expired, malformed);
        assert_eq!(expired, missing);
    }

    #[tokio::test]
    async fn store_detail_never_reaches_the_body() {
        let (status, body) =
            body_of(AuthError::StoreTransient("connection reset by 10.0.0.7".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.contains("10.0.0.7"));
        assert!(body.contains("temporarily_unavailable"));
    }

    #[tokio::test]
    async fn unauthorized_advertises_bearer_scheme() {
        let response = AuthError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn unbound_principal_is_a_server_error() {
        assert_eq!(
            AuthError::PrincipalUnbound.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
