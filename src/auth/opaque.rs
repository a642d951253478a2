// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Opaque server-side tokens.
//!
//! A token is 16 random bytes rendered as unpadded base-32 (26 characters).
//! Only the SHA-256 of that string is ever stored; a presented token is looked
//! up by re-hashing it. Tokens belong to exactly one [`TokenScope`] and expire
//! lazily: the store may still hold an expired row, but it never resolves.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use utoipa::ToSchema;

use super::store::{bounded, TokenStore};
use super::AuthError;

/// Random bytes drawn per token.
const TOKEN_ENTROPY_BYTES: usize = 16;

/// Length of the base-32 plaintext for [`TOKEN_ENTROPY_BYTES`].
pub const TOKEN_PLAINTEXT_LEN: usize = 26;

const BASE32: base32::Alphabet = base32::Alphabet::Rfc4648 { padding: false };

/// Purpose of an opaque token. Tokens never cross scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenScope {
    Authentication,
    Activation,
    Session,
}

impl TokenScope {
    /// Scopes holding login credentials; revoked together on logout.
    pub const CREDENTIALS: [TokenScope; 2] = [TokenScope::Authentication, TokenScope::Session];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Authentication => "authentication",
            TokenScope::Activation => "activation",
            TokenScope::Session => "session",
        }
    }
}

impl std::fmt::Display for TokenScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SHA-256 of a token plaintext.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenHash([u8; 32]);

impl TokenHash {
    pub fn of(plaintext: &str) -> Self {
        Self(Sha256::digest(plaintext.as_bytes()).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for TokenHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenHash(")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}

/// What the store keeps for a token. Has no room for the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub hash: TokenHash,
    pub owner: String,
    pub scope: TokenScope,
    pub expiry: DateTime<Utc>,
}

impl TokenRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now
    }
}

/// A freshly generated token. The plaintext goes back to the requester once.
#[derive(Clone)]
pub struct OpaqueToken {
    pub plaintext: String,
    pub hash: TokenHash,
    pub owner: String,
    pub scope: TokenScope,
    pub expiry: DateTime<Utc>,
}

impl OpaqueToken {
    /// Generate a token for `owner` in `scope`, expiring `ttl` after `now`.
    pub fn generate(
        owner: &str,
        scope: TokenScope,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Self, AuthError> {
        let mut random = [0u8; TOKEN_ENTROPY_BYTES];
        SystemRandom::new()
            .fill(&mut random)
            .map_err(|_| AuthError::Internal("secure random source unavailable".to_string()))?;

        let plaintext = base32::encode(BASE32, &random);
        Ok(Self {
            hash: TokenHash::of(&plaintext),
            plaintext,
            owner: owner.to_string(),
            scope,
            expiry: now + ttl,
        })
    }

    /// The persistable part of this token.
    pub fn record(&self) -> TokenRecord {
        TokenRecord {
            hash: self.hash,
            owner: self.owner.clone(),
            scope: self.scope,
            expiry: self.expiry,
        }
    }
}

impl std::fmt::Debug for OpaqueToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpaqueToken")
            .field("plaintext", &"<redacted>")
            .field("hash", &self.hash)
            .field("owner", &self.owner)
            .field("scope", &self.scope)
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Token lifecycle against a [`TokenStore`].
#[derive(Clone)]
pub struct OpaqueTokens {
    store: Arc<dyn TokenStore>,
    timeout: Duration,
}

impl OpaqueTokens {
    pub fn new(store: Arc<dyn TokenStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Generate and persist a token. The caller hands the plaintext out.
    pub async fn issue(
        &self,
        owner: &str,
        scope: TokenScope,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<OpaqueToken, AuthError> {
        let token = OpaqueToken::generate(owner, scope, ttl, now)?;
        bounded(self.timeout, "token_insert", self.store.insert(token.record())).await?;
        debug!(%scope, hash = ?token.hash, "opaque token issued");
        Ok(token)
    }

    /// Resolve a presented plaintext to its record.
    ///
    /// Unknown, expired and wrong-scope tokens all fail with `TokenNotFound`.
    pub async fn resolve(
        &self,
        plaintext: &str,
        scope: TokenScope,
        now: DateTime<Utc>,
    ) -> Result<TokenRecord, AuthError> {
        if plaintext.len() != TOKEN_PLAINTEXT_LEN {
            return Err(AuthError::TokenNotFound);
        }

        let hash = TokenHash::of(plaintext);
        let record = bounded(
            self.timeout,
            "token_fetch",
            self.store.fetch_by_hash_and_scope(&hash, scope, now),
        )
        .await?
        .ok_or(AuthError::TokenNotFound)?;

        if record.scope != scope || record.hash != hash || record.is_expired_at(now) {
            return Err(AuthError::TokenNotFound);
        }
        Ok(record)
    }

    /// Delete every token of `owner` in `scope`.
    pub async fn revoke(&self, owner: &str, scope: TokenScope) -> Result<u64, AuthError> {
        let removed = bounded(
            self.timeout,
            "token_revoke",
            self.store.delete_all_for_owner_and_scope(owner, scope),
        )
        .await?;
        info!(%scope, removed, "opaque tokens revoked");
        Ok(removed)
    }

    /// Revoke all credential-bearing scopes of `owner`.
    pub async fn revoke_credentials(&self, owner: &str) -> Result<u64, AuthError> {
        let mut removed = 0;
        for scope in TokenScope::CREDENTIALS {
            removed += self.revoke(owner, scope).await?;
        }
        Ok(removed)
    }

    /// Delete every token expired at `now`.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        bounded(self.timeout, "token_sweep", self.store.delete_expired(now)).await
    }
}
