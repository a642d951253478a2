// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Storage interfaces consumed by the authentication core.
//!
//! The core never talks to a database directly. It needs a way to find an
//! account by identifier and a key-value-ish token store keyed by token hash.
//! Every call goes through [`bounded`], which turns slow or failing stores into
//! [`AuthError::StoreTransient`] so a wedged backend can never hang a request.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::error;

use super::opaque::{TokenHash, TokenRecord, TokenScope};
use super::principal::Identity;
use super::AuthError;

/// Errors reported by store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Account lookup.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find an account by id or email. `Ok(None)` when nothing matches.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Identity>, StoreError>;

    /// Persist a new account. Fails with `Conflict` on a duplicate email.
    async fn insert(&self, identity: Identity) -> Result<Identity, StoreError>;

    /// Mark an account as activated and return the updated record.
    async fn activate(&self, identifier: &str) -> Result<Identity, StoreError>;
}

/// Opaque token persistence. Each operation must be atomic on its own.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, record: TokenRecord) -> Result<(), StoreError>;

    /// Fetch the unexpired record with this hash and scope.
    async fn fetch_by_hash_and_scope(
        &self,
        hash: &TokenHash,
        scope: TokenScope,
        now: DateTime<Utc>,
    ) -> Result<Option<TokenRecord>, StoreError>;

    /// Delete every token for the owner in the scope. Returns the number removed;
    /// deleting nothing is not an error.
    async fn delete_all_for_owner_and_scope(
        &self,
        owner: &str,
        scope: TokenScope,
    ) -> Result<u64, StoreError>;

    /// Delete every token whose expiry is at or before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Run a store call with a deadline.
///
/// Elapsed deadlines and store failures become `StoreTransient`; the detail is
/// logged here and never travels further than the error's own message.
pub async fn bounded<T, F>(timeout: Duration, operation: &'static str, call: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!(operation, error = %e, "store call failed");
            Err(AuthError::StoreTransient(format!("{operation}: {e}")))
        }
        Err(_) => {
            error!(
                operation,
                timeout_ms = timeout.as_millis() as u64,
                "store call timed out"
            );
            Err(AuthError::StoreTransient(format!("{operation}: timed out")))
        }
    }
}
