// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request gate.
//!
//! Installed on a route group with `from_fn_with_state(gate, authenticate)`.
//! Every request that passes through it leaves with exactly one
//! [`Principal`] in its extensions:
//!
//! - no credential: [`Principal::Anonymous`], and the request continues
//! - a valid credential: [`Principal::User`], and the request continues
//! - a credential that fails to verify: 401, and the handler never runs
//!
//! ```rust,ignore
//! let gate = Gate::new(service.clone(), CredentialScheme::BearerJwt);
//! let protected = Router::new()
//!     .route("/me", get(me))
//!     .route_layer(middleware::from_fn_with_state(gate, authenticate));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, VARY},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::debug;

use super::cookie::CookieConfig;
use super::principal::Principal;
use super::service::{AuthService, CredentialScheme};
use super::AuthError;

/// Gate state: the shared service and the scheme of this route group.
#[derive(Clone)]
pub struct Gate {
    service: Arc<AuthService>,
    scheme: CredentialScheme,
}

impl Gate {
    pub fn new(service: Arc<AuthService>, scheme: CredentialScheme) -> Self {
        Self { service, scheme }
    }

    pub fn scheme(&self) -> CredentialScheme {
        self.scheme
    }

    async fn resolve(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let Some(credential) = extract_credential(self.scheme, self.service.cookie(), headers)?
        else {
            return Ok(Principal::Anonymous);
        };
        self.service
            .authenticate(self.scheme, &credential, Utc::now())
            .await
            .map(Principal::User)
    }
}

/// Gate middleware.
pub async fn authenticate(State(gate): State<Gate>, mut request: Request, next: Next) -> Response {
    let mut response = match gate.resolve(request.headers()).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => {
            debug!(scheme = ?gate.scheme, error = %e, "credential rejected");
            e.into_response()
        }
    };
    add_vary(response.headers_mut(), gate.scheme);
    response
}

fn add_vary(headers: &mut HeaderMap, scheme: CredentialScheme) {
    headers.append(VARY, HeaderValue::from_static("Authorization"));
    if scheme == CredentialScheme::SessionCookie {
        headers.append(VARY, HeaderValue::from_static("Cookie"));
    }
}

fn extract_credential(
    scheme: CredentialScheme,
    cookie: &CookieConfig,
    headers: &HeaderMap,
) -> Result<Option<String>, AuthError> {
    match scheme {
        CredentialScheme::BearerJwt | CredentialScheme::BearerOpaque => bearer_token(headers),
        CredentialScheme::SessionCookie => Ok(cookie.read(headers)),
    }
}

/// Token from `Authorization: Bearer <token>`.
///
/// A missing header is `Ok(None)`. A header in any other shape is a
/// presented-but-invalid credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::TokenMalformed)?;
    let (kind, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::TokenMalformed)?;
    let token = token.trim();
    if !kind.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::TokenMalformed);
    }
    Ok(Some(token.to_string()))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header::COOKIE, Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use chrono::TimeDelta;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::extractor::CurrentPrincipal;
    use crate::auth::service::testing::*;
    use crate::auth::AuthStrategy;

    async fn whoami(CurrentPrincipal(principal): CurrentPrincipal) -> String {
        match principal {
            Principal::Anonymous => "anonymous".to_string(),
            Principal::User(user) => user.user_id,
        }
    }

    fn app(service: Arc<AuthService>, scheme: CredentialScheme) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn_with_state(
                Gate::new(service, scheme),
                authenticate,
            ))
    }

    async fn call(app: Router, header: Option<(&str, String)>) -> (StatusCode, HeaderMap, String) {
        let mut builder = HttpRequest::builder().uri("/whoami");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn bearer_token_shapes() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).unwrap().is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers).unwrap().as_deref(), Some("abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(bearer_token(&headers).unwrap().as_deref(), Some("abc"));

        for bad in ["Basic dXNlcjpwdw==", "Bearer", "Bearer   ", "abc"] {
            headers.insert(AUTHORIZATION, HeaderValue::from_static(bad));
            assert!(matches!(
                bearer_token(&headers),
                Err(AuthError::TokenMalformed)
            ));
        }
    }

    #[tokio::test]
    async fn missing_credential_binds_anonymous() {
        let service = Arc::new(test_service(AuthStrategy::Jwt));
        let (status, headers, body) = call(app(service, CredentialScheme::BearerJwt), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
        assert_eq!(headers[VARY], "Authorization");
    }

    #[tokio::test]
    async fn valid_jwt_binds_user() {
        let service = Arc::new(test_service(AuthStrategy::Jwt));
        let identity = seed_user(&service, "a@example.com", "Ada").await;
        let pair = service.codec().issue_pair(&identity, Utc::now()).unwrap();

        let (status, _, body) = call(
            app(service, CredentialScheme::BearerJwt),
            Some(("authorization", format!("Bearer {}", pair.access_token))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, identity.id.to_string());
    }

    #[tokio::test]
    async fn invalid_credentials_stop_the_chain_with_one_shape() {
        let service = Arc::new(test_service(AuthStrategy::Jwt));
        let identity = seed_user(&service, "a@example.com", "Ada").await;
        let expired = service
            .codec()
            .issue_pair(&identity, Utc::now() - TimeDelta::hours(1))
            .unwrap();

        let (expired_status, expired_headers, expired_body) = call(
            app(service.clone(), CredentialScheme::BearerJwt),
            Some(("authorization", format!("Bearer {}", expired.access_token))),
        )
        .await;
        let (garbage_status, _, garbage_body) = call(
            app(service.clone(), CredentialScheme::BearerJwt),
            Some(("authorization", "Bearer not.a.jwt".to_string())),
        )
        .await;
        let (basic_status, _, basic_body) = call(
            app(service, CredentialScheme::BearerJwt),
            Some(("authorization", "Basic dXNlcjpwdw==".to_string())),
        )
        .await;

        assert_eq!(expired_status, StatusCode::UNAUTHORIZED);
        assert_eq!(garbage_status, StatusCode::UNAUTHORIZED);
        assert_eq!(basic_status, StatusCode::UNAUTHORIZED);
        assert_eq!(expired_body, garbage_body);
        assert_eq!(expired_body, basic_body);
        assert!(!expired_body.contains("anonymous"));
        assert_eq!(expired_headers[VARY], "Authorization");
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_token() {
        let service = Arc::new(test_service(AuthStrategy::Jwt));
        let identity = seed_user(&service, "a@example.com", "Ada").await;
        let pair = service.codec().issue_pair(&identity, Utc::now()).unwrap();

        let (status, _, _) = call(
            app(service, CredentialScheme::BearerJwt),
            Some(("authorization", format!("Bearer {}", pair.refresh_token))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn session_cookie_scheme_reads_cookie() {
        let service = Arc::new(test_service(AuthStrategy::Opaque));
        let identity = seed_user(&service, "a@example.com", "Ada").await;
        let issued = service
            .login("a@example.com", TEST_PASSWORD, Utc::now())
            .await
            .unwrap();
        let session = issued.refresh.unwrap();
        let cookie_name = service.cookie().name.clone();

        let (status, headers, body) = call(
            app(service.clone(), CredentialScheme::SessionCookie),
            Some(("cookie", format!("{cookie_name}={}", session.token))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, identity.id.to_string());
        let vary: Vec<_> = headers.get_all(VARY).iter().collect();
        assert_eq!(vary, ["Authorization", "Cookie"]);

        // A bearer header is not what this scheme reads.
        let (_, _, body) = call(
            app(service, CredentialScheme::SessionCookie),
            Some(("authorization", format!("Bearer {}", session.token))),
        )
        .await;
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn unknown_session_cookie_is_rejected() {
        let service = Arc::new(test_service(AuthStrategy::Opaque));
        let cookie_name = service.cookie().name.clone();
        let (status, _, _) = call(
            app(service, CredentialScheme::SessionCookie),
            Some((COOKIE.as_str(), format!("{cookie_name}=AAAAAAAAAAAAAAAAAAAAAAAAAA"))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn ungated_route_fails_loudly() {
        let app = Router::new().route("/whoami", get(whoami));
        let (status, _, body) = call(app, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("internal_error"));
    }
}
