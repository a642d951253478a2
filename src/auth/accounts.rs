// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration and activation.

use chrono::{DateTime, Utc};
use tracing::info;

use super::opaque::{OpaqueToken, TokenScope};
use super::password::MAX_PASSWORD_BYTES;
use super::principal::Identity;
use super::service::AuthService;
use super::store::{bounded, StoreError};
use super::AuthError;

/// Shortest password accepted at registration, in bytes.
pub const MIN_PASSWORD_BYTES: usize = 8;

/// Errors from account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Invalid(String),

    #[error("an account with this email already exists")]
    Duplicate,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl AuthService {
    /// Create an inactive account and an activation token for it.
    pub async fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<(Identity, OpaqueToken), AccountError> {
        let email = email.trim();
        let display_name = display_name.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AccountError::Invalid("a valid email is required".into()));
        }
        if display_name.is_empty() {
            return Err(AccountError::Invalid("display_name must not be empty".into()));
        }
        if !(MIN_PASSWORD_BYTES..=MAX_PASSWORD_BYTES).contains(&password.len()) {
            return Err(AccountError::Invalid(format!(
                "password must be between {MIN_PASSWORD_BYTES} and {MAX_PASSWORD_BYTES} bytes"
            )));
        }

        let hash = self.hash_password(password).await?;
        let users = self.users().clone();
        let candidate = Identity::new(email, display_name, hash, now);
        let inserted = bounded(self.store_timeout(), "user_insert", async move {
            match users.insert(candidate).await {
                Err(StoreError::Conflict(_)) => Ok(None),
                other => other.map(Some),
            }
        })
        .await?;
        let identity = inserted.ok_or(AccountError::Duplicate)?;

        let token = self.issue_activation(&identity, now).await?;
        info!(user_id = %identity.id, "account registered");
        Ok((identity, token))
    }

    /// Issue a fresh activation token, dropping any earlier ones.
    async fn issue_activation(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<OpaqueToken, AuthError> {
        let owner = identity.token_owner();
        self.tokens().revoke(owner, TokenScope::Activation).await?;
        self.tokens()
            .issue(owner, TokenScope::Activation, self.activation_ttl(), now)
            .await
    }

    /// Activate the account an activation token belongs to.
    ///
    /// All activation tokens of the account are spent afterwards.
    pub async fn activate(&self, plaintext: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let record = self
            .tokens()
            .resolve(plaintext, TokenScope::Activation, now)
            .await?;

        let users = self.users().clone();
        let owner = record.owner.clone();
        let activated = bounded(self.store_timeout(), "user_activate", async move {
            match users.activate(&owner).await {
                Err(StoreError::NotFound(_)) => Ok(None),
                other => other.map(Some),
            }
        })
        .await?
        .ok_or(AuthError::TokenNotFound)?;

        self.tokens()
            .revoke(&record.owner, TokenScope::Activation)
            .await?;
        info!(user_id = %activated.id, "account activated");
        Ok(activated)
    }
}
