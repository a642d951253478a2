// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Expired Token Sweeper
//!
//! Background task that deletes opaque token records past their expiry.
//! Expired tokens never resolve whether or not they are swept; this only
//! keeps the store from growing without bound.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown, sharing
//! the token with the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::AuthService;

/// Periodic sweep of expired opaque tokens.
pub struct TokenSweeper {
    service: Arc<AuthService>,
    interval: Duration,
}

impl TokenSweeper {
    pub fn new(service: Arc<AuthService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Token sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Token sweeper shutting down");
                    return;
                }
            }

            self.sweep_step().await;
        }
    }

    /// Execute one sweep. Returns the number of records removed.
    pub async fn sweep_step(&self) -> u64 {
        match self.service.tokens().sweep_expired(Utc::now()).await {
            Ok(0) => {
                debug!("Token sweeper: nothing to remove");
                0
            }
            Ok(removed) => {
                info!(removed, "Token sweeper: removed expired tokens");
                removed
            }
            Err(e) => {
                warn!(error = %e, "Token sweeper: sweep failed");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::auth::opaque::TokenScope;
    use crate::auth::service::testing::test_service;
    use crate::auth::AuthStrategy;

    #[tokio::test]
    async fn sweep_step_removes_expired_records() {
        let service = Arc::new(test_service(AuthStrategy::Opaque));
        let past = Utc::now() - TimeDelta::hours(2);
        service
            .tokens()
            .issue("a@example.com", TokenScope::Session, TimeDelta::hours(1), past)
            .await
            .unwrap();
        service
            .tokens()
            .issue("a@example.com", TokenScope::Session, TimeDelta::hours(5), past)
            .await
            .unwrap();

        let sweeper = TokenSweeper::new(service, Duration::from_secs(60));
        assert_eq!(sweeper.sweep_step().await, 1);
        assert_eq!(sweeper.sweep_step().await, 0);
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let service = Arc::new(test_service(AuthStrategy::Opaque));
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(
            TokenSweeper::new(service, Duration::from_secs(3600)).run(shutdown.clone()),
        );

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
