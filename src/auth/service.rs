// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authentication service shared by the gate and the handlers.
//!
//! One [`AuthService`] is built at startup from an [`AuthConfig`] and the two
//! stores. All of its configuration is read-only afterwards, so it is shared
//! across requests behind an `Arc`.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use super::codec::{CodecConfig, TokenCodec};
use super::cookie::CookieConfig;
use super::opaque::{OpaqueTokens, TokenScope};
use super::password::PasswordVerifier;
use super::principal::Identity;
use super::store::{bounded, TokenStore, UserStore};
use super::{AuthError, AuthenticatedUser};

/// Which credential mechanism this deployment issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStrategy {
    /// Stateless signed access/refresh pairs.
    #[default]
    Jwt,
    /// Server-side opaque tokens.
    Opaque,
}

impl AuthStrategy {
    /// Scheme used by the general API routes.
    pub fn api_scheme(&self) -> CredentialScheme {
        match self {
            AuthStrategy::Jwt => CredentialScheme::BearerJwt,
            AuthStrategy::Opaque => CredentialScheme::BearerOpaque,
        }
    }

    /// Scheme used by the session routes (`/v1/auth/session`, logout).
    pub fn session_scheme(&self) -> CredentialScheme {
        match self {
            AuthStrategy::Jwt => CredentialScheme::BearerJwt,
            AuthStrategy::Opaque => CredentialScheme::SessionCookie,
        }
    }
}

impl FromStr for AuthStrategy {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jwt" => Ok(AuthStrategy::Jwt),
            "opaque" => Ok(AuthStrategy::Opaque),
            other => Err(AuthError::Misconfiguration(format!(
                "unknown auth strategy: {other:?} (expected \"jwt\" or \"opaque\")"
            ))),
        }
    }
}

/// Where the gate looks for a credential and how it checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialScheme {
    /// `Authorization: Bearer <access JWT>`
    BearerJwt,
    /// `Authorization: Bearer <authentication-scope opaque token>`
    BearerOpaque,
    /// Session-scope opaque token in the refresh cookie.
    SessionCookie,
}

/// Everything the service needs besides its stores.
#[derive(Clone)]
pub struct AuthConfig {
    pub strategy: AuthStrategy,
    pub codec: CodecConfig,
    pub cookie: CookieConfig,
    pub activation_ttl: TimeDelta,
    pub bcrypt_cost: u32,
    pub store_timeout: Duration,
}

/// Authentication core: codec, opaque tokens, passwords and the user store.
pub struct AuthService {
    strategy: AuthStrategy,
    codec: TokenCodec,
    tokens: OpaqueTokens,
    passwords: PasswordVerifier,
    cookie: CookieConfig,
    users: Arc<dyn UserStore>,
    activation_ttl: TimeDelta,
    store_timeout: Duration,
}

impl AuthService {
    /// Build the service. Any invalid setting is a `Misconfiguration`.
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, AuthError> {
        if config.activation_ttl <= TimeDelta::zero() {
            return Err(AuthError::Misconfiguration(
                "activation token TTL must be positive".to_string(),
            ));
        }
        if config.store_timeout.is_zero() {
            return Err(AuthError::Misconfiguration(
                "store timeout must be positive".to_string(),
            ));
        }
        config.cookie.validate()?;

        Ok(Self {
            strategy: config.strategy,
            codec: TokenCodec::new(config.codec)?,
            tokens: OpaqueTokens::new(tokens, config.store_timeout),
            passwords: PasswordVerifier::new(config.bcrypt_cost)?,
            cookie: config.cookie,
            users,
            activation_ttl: config.activation_ttl,
            store_timeout: config.store_timeout,
        })
    }

    pub fn strategy(&self) -> AuthStrategy {
        self.strategy
    }

    pub fn cookie(&self) -> &CookieConfig {
        &self.cookie
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn tokens(&self) -> &OpaqueTokens {
        &self.tokens
    }

    pub fn activation_ttl(&self) -> TimeDelta {
        self.activation_ttl
    }

    /// Resolve a presented credential to the user it belongs to.
    pub async fn authenticate(
        &self,
        scheme: CredentialScheme,
        credential: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedUser, AuthError> {
        match scheme {
            CredentialScheme::BearerJwt => {
                let claims = self.codec.verify_access(credential, now)?;
                Ok(AuthenticatedUser::from_claims(claims))
            }
            CredentialScheme::BearerOpaque => {
                self.authenticate_opaque(credential, TokenScope::Authentication, now)
                    .await
            }
            CredentialScheme::SessionCookie => {
                self.authenticate_opaque(credential, TokenScope::Session, now)
                    .await
            }
        }
    }

    async fn authenticate_opaque(
        &self,
        plaintext: &str,
        scope: TokenScope,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedUser, AuthError> {
        let record = self.tokens.resolve(plaintext, scope, now).await?;
        let identity = self.find_identity(&record.owner).await?.ok_or_else(|| {
            debug!(%scope, "opaque token owner no longer exists");
            AuthError::TokenNotFound
        })?;
        Ok(AuthenticatedUser::from_identity(
            &identity,
            record.expiry.timestamp(),
        ))
    }

    /// Look an account up by id or email, bounded by the store timeout.
    pub async fn find_identity(&self, identifier: &str) -> Result<Option<Identity>, AuthError> {
        bounded(
            self.store_timeout,
            "user_lookup",
            self.users.find_by_identifier(identifier),
        )
        .await
    }

    pub(crate) fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    pub(crate) fn store_timeout(&self) -> Duration {
        self.store_timeout
    }

    /// Hash a password off the async runtime.
    pub async fn hash_password(&self, plaintext: &str) -> Result<String, AuthError> {
        let passwords = self.passwords.clone();
        let plaintext = plaintext.to_string();
        tokio::task::spawn_blocking(move || passwords.hash(&plaintext))
            .await
            .map_err(|e| AuthError::Internal(format!("password hashing task failed: {e}")))?
    }

    /// Check `candidate` against the account's hash, or burn equivalent work
    /// when there is no account.
    pub async fn check_password(
        &self,
        identity: Option<&Identity>,
        candidate: &str,
    ) -> Result<bool, AuthError> {
        let passwords = self.passwords.clone();
        let stored = identity.map(|i| i.password_hash().to_string());
        let candidate = candidate.to_string();
        tokio::task::spawn_blocking(move || match stored {
            Some(hash) => passwords.verify(&hash, &candidate),
            None => Ok(passwords.verify_absent(&candidate)),
        })
        .await
        .map_err(|e| AuthError::Internal(format!("password verification task failed: {e}")))?
    }
}
