// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use lyrics_server::api::router;
use lyrics_server::auth::{AccountError, AuthService};
use lyrics_server::config::{AppConfig, SeedUser, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV};
use lyrics_server::state::AppState;
use lyrics_server::storage::{InMemoryTokenStore, InMemoryUserStore, SongStore};
use lyrics_server::sweeper::TokenSweeper;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let auth = match AuthService::new(
        config.auth.clone(),
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryTokenStore::new()),
    ) {
        Ok(auth) => Arc::new(auth),
        Err(e) => {
            error!(error = %e, "Failed to initialize authentication");
            return ExitCode::FAILURE;
        }
    };

    if let Some(seed) = &config.seed_user {
        if let Err(e) = seed_account(&auth, seed).await {
            error!(error = %e, "Failed to create seed account");
            return ExitCode::FAILURE;
        }
    }

    let shutdown = CancellationToken::new();
    if let Some(interval) = config.sweep_interval {
        tokio::spawn(TokenSweeper::new(auth.clone(), interval).run(shutdown.clone()));
    }

    let app = router(
        AppState::new(auth, SongStore::new()),
        &config.trusted_origins,
    );

    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(
        addr = %config.bind_addr,
        strategy = ?config.auth.strategy,
        "Lyrics server listening (docs at /docs)"
    );

    let server_shutdown = shutdown.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Gracefully shutdown");
            server_shutdown.cancel();
        })
        .await;

    shutdown.cancel();
    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

/// Pretty or JSON logs, filtered by `RUST_LOG`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Register and activate the bootstrap account. An existing account is left as is.
async fn seed_account(auth: &AuthService, seed: &SeedUser) -> Result<(), AccountError> {
    let now = Utc::now();
    match auth
        .register(&seed.email, &seed.display_name, &seed.password, now)
        .await
    {
        Ok((identity, token)) => {
            auth.activate(&token.plaintext, now).await?;
            info!(user_id = %identity.id, "Seed account created");
            Ok(())
        }
        Err(AccountError::Duplicate) => {
            warn!(email = %seed.email, "Seed account already exists");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
