// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed access/refresh token pairs.
//!
//! ## Security
//!
//! - One symmetric secret, HS256 only; any other `alg` header is rejected
//! - Signatures are verified before any claim is looked at
//! - Expiry is checked against the caller's `now` with zero leeway
//! - Verification is a pure function of (token, secret, now)

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::claims::{AccessClaims, RefreshClaims, ACCESS_TOKEN_TYPE};
use super::principal::Identity;
use super::AuthError;

/// The only accepted signing algorithm.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Codec settings, read once at startup.
#[derive(Clone)]
pub struct CodecConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: TimeDelta,
    pub refresh_ttl: TimeDelta,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone)]
pub struct SignedTokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Issues and verifies [`SignedTokenPair`]s.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl: TimeDelta,
    refresh_ttl: TimeDelta,
}

impl TokenCodec {
    /// Build a codec, rejecting configurations that could never issue valid pairs.
    pub fn new(config: CodecConfig) -> Result<Self, AuthError> {
        if config.secret.is_empty() {
            return Err(AuthError::Misconfiguration(
                "token signing secret is empty".to_string(),
            ));
        }
        if config.issuer.is_empty() || config.audience.is_empty() {
            return Err(AuthError::Misconfiguration(
                "token issuer and audience must be set".to_string(),
            ));
        }
        if config.access_ttl <= TimeDelta::zero() {
            return Err(AuthError::Misconfiguration(
                "access token TTL must be positive".to_string(),
            ));
        }
        if config.access_ttl >= config.refresh_ttl {
            return Err(AuthError::Misconfiguration(
                "access token TTL must be shorter than refresh token TTL".to_string(),
            ));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer,
            audience: config.audience,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        })
    }

    pub fn access_ttl(&self) -> TimeDelta {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> TimeDelta {
        self.refresh_ttl
    }

    /// Issue a new pair for `identity`, valid from `now`.
    pub fn issue_pair(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<SignedTokenPair, AuthError> {
        let access_expires_at = now + self.access_ttl;
        let refresh_expires_at = now + self.refresh_ttl;

        let access = AccessClaims::new(
            identity,
            &self.issuer,
            &self.audience,
            now.timestamp(),
            access_expires_at.timestamp(),
        );
        let refresh = RefreshClaims::new(identity, now.timestamp(), refresh_expires_at.timestamp());

        let header = Header::new(SIGNING_ALGORITHM);
        let access_token = encode(&header, &access, &self.encoding)
            .map_err(|e| AuthError::Misconfiguration(format!("failed to sign access token: {e}")))?;
        let refresh_token = encode(&header, &refresh, &self.encoding).map_err(|e| {
            AuthError::Misconfiguration(format!("failed to sign refresh token: {e}"))
        })?;

        Ok(SignedTokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }

    /// Verify an access token and return its claims.
    pub fn verify_access(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, AuthError> {
        let mut validation = base_validation();
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss", "aud"]);

        let claims: AccessClaims = self.decode_verified(token, &validation)?;
        if claims.typ != ACCESS_TOKEN_TYPE {
            return Err(AuthError::TokenMalformed);
        }
        check_expiry(claims.exp, now)?;
        Ok(claims)
    }

    /// Verify a refresh token and return its claims.
    pub fn verify_refresh(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshClaims, AuthError> {
        let mut validation = base_validation();
        validation.validate_aud = false;

        let claims: RefreshClaims = self.decode_verified(token, &validation)?;
        check_expiry(claims.exp, now)?;
        Ok(claims)
    }

    fn decode_verified<T: DeserializeOwned>(
        &self,
        token: &str,
        validation: &Validation,
    ) -> Result<T, AuthError> {
        decode::<T>(token, &self.decoding, validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "signed token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::TokenMalformed,
                }
            })
    }
}

fn base_validation() -> Validation {
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    // Expiry is compared against the injected clock in `check_expiry`.
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iat", "sub"]);
    validation
}

fn check_expiry(exp: i64, now: DateTime<Utc>) -> Result<(), AuthError> {
    if exp <= now.timestamp() {
        return Err(AuthError::TokenExpired);
    }
    Ok(())
}
