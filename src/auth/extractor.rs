// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the principal bound by the gate.
//!
//! Use `Auth` in handlers that need a signed-in caller:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! and `CurrentPrincipal` where anonymous callers are welcome too.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::error;

use super::principal::Principal;
use super::{AuthError, AuthenticatedUser};

/// The principal bound to this request.
///
/// Rejects with `PrincipalUnbound` (500) if the route is not behind a gate.
pub struct CurrentPrincipal(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for CurrentPrincipal {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(principal) => Ok(CurrentPrincipal(principal.clone())),
            None => {
                error!(path = %parts.uri.path(), "handler reached without a bound principal");
                Err(AuthError::PrincipalUnbound)
            }
        }
    }
}

/// An authenticated, non-anonymous caller.
pub struct Auth(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentPrincipal(principal) = CurrentPrincipal::from_request_parts(parts, state).await?;
        match principal {
            Principal::User(user) => Ok(Auth(user)),
            Principal::Anonymous => Err(AuthError::AuthenticationRequired),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts() -> Parts {
        Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "user_123".to_string(),
            display_name: "Ada".to_string(),
            expires_at: 0,
        }
    }

    #[tokio::test]
    async fn unbound_principal_is_an_error() {
        let mut parts = parts();
        let result = CurrentPrincipal::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::PrincipalUnbound)));
    }

    #[tokio::test]
    async fn auth_rejects_anonymous() {
        let mut parts = parts();
        parts.extensions.insert(Principal::Anonymous);

        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::AuthenticationRequired)));
    }

    #[tokio::test]
    async fn auth_returns_bound_user() {
        let mut parts = parts();
        parts.extensions.insert(Principal::User(user()));

        let Auth(found) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found.user_id, "user_123");
    }

    #[tokio::test]
    async fn current_principal_allows_anonymous() {
        let mut parts = parts();
        parts.extensions.insert(Principal::Anonymous);

        let CurrentPrincipal(principal) = CurrentPrincipal::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(principal.is_anonymous());
    }
}
