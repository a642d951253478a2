// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{middleware::authenticate, opaque::TokenScope, AuthenticatedUser, Gate},
    models::{
        ActivateRequest, CreateSongRequest, LoginRequest, RegisterRequest, RegisterResponse,
        SessionResponse, Song, SongSummary, TokenResponse, UserResponse,
    },
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod songs;
pub mod users;

/// Build the application router.
///
/// Route groups:
/// - public: login, refresh, registration, activation, health
/// - session (gated with the strategy's session scheme): session, logout
/// - api (gated with the strategy's API scheme): songs, current user
pub fn router(state: AppState, trusted_origins: &[String]) -> Router {
    let strategy = state.auth.strategy();
    let api_gate = Gate::new(state.auth.clone(), strategy.api_scheme());
    let session_gate = Gate::new(state.auth.clone(), strategy.session_scheme());

    let public_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/users", post(users::register))
        .route("/users/activate", put(users::activate));

    let session_routes = Router::new()
        .route("/auth/session", get(auth::session))
        .route("/auth/logout", post(auth::logout))
        .route_layer(middleware::from_fn_with_state(session_gate, authenticate));

    let api_routes = Router::new()
        .route("/users/me", get(users::get_current_user))
        .route("/songs", get(songs::list_songs).post(songs::create_song))
        .route(
            "/songs/{song_id}",
            get(songs::get_song).delete(songs::delete_song),
        )
        .route_layer(middleware::from_fn_with_state(api_gate, authenticate));

    let v1_routes = public_routes
        .merge(session_routes)
        .merge(api_routes)
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(cors_layer(trusted_origins))
}

/// CORS for browser clients on the trusted origins. Credentials (the refresh
/// cookie) are only allowed for those origins.
fn cors_layer(trusted_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = trusted_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
            components.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    crate::auth::cookie::DEFAULT_COOKIE_NAME,
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        auth::login,
        auth::refresh,
        auth::session,
        auth::logout,
        users::register,
        users::activate,
        users::get_current_user,
        songs::list_songs,
        songs::get_song,
        songs::create_song,
        songs::delete_song
    ),
    components(
        schemas(
            Song,
            SongSummary,
            CreateSongRequest,
            LoginRequest,
            TokenResponse,
            SessionResponse,
            RegisterRequest,
            RegisterResponse,
            UserResponse,
            ActivateRequest,
            AuthenticatedUser,
            TokenScope
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Login, refresh, session and logout"),
        (name = "Users", description = "Registration, activation and the current account"),
        (name = "Songs", description = "Song records")
    )
)]
struct ApiDoc;
