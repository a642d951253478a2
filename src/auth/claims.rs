// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::principal::Identity;

/// `typ` claim carried by access tokens.
pub const ACCESS_TOKEN_TYPE: &str = "JWT";

/// Claims of a short-lived access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (account id)
    pub sub: String,
    /// Display name of the account
    pub name: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    /// Token type discriminator
    pub typ: String,
}

impl AccessClaims {
    pub fn new(identity: &Identity, issuer: &str, audience: &str, iat: i64, exp: i64) -> Self {
        Self {
            sub: identity.id.to_string(),
            name: identity.display_name.clone(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            iat,
            exp,
            typ: ACCESS_TOKEN_TYPE.to_string(),
        }
    }
}

/// Claims of a refresh token: subject and timestamps only.
///
/// Unknown fields are rejected so an access token never decodes as one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl RefreshClaims {
    pub fn new(identity: &Identity, iat: i64, exp: i64) -> Self {
        Self {
            sub: identity.id.to_string(),
            iat,
            exp,
        }
    }
}

/// Authenticated user information bound to a request.
///
/// This is the primary type handlers see for the caller making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Account id
    pub user_id: String,

    /// Display name
    pub display_name: String,

    /// Credential expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified access-token claims.
    pub fn from_claims(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.sub,
            display_name: claims.name,
            expires_at: claims.exp,
        }
    }

    /// Create from an account resolved through an opaque token.
    pub fn from_identity(identity: &Identity, expires_at: i64) -> Self {
        Self {
            user_id: identity.id.to_string(),
            display_name: identity.display_name.clone(),
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn identity() -> Identity {
        Identity::new("user@example.com", "User", "hash", Utc::now())
    }

    #[test]
    fn access_claims_carry_identity_and_type() {
        let identity = identity();
        let claims = AccessClaims::new(&identity, "iss", "aud", 10, 20);
        assert_eq!(claims.sub, identity.id.to_string());
        assert_eq!(claims.name, "User");
        assert_eq!(claims.typ, ACCESS_TOKEN_TYPE);
    }

    #[test]
    fn refresh_claims_reject_access_claim_set() {
        let access = AccessClaims::new(&identity(), "iss", "aud", 10, 20);
        let json = serde_json::to_value(&access).unwrap();
        assert!(serde_json::from_value::<RefreshClaims>(json).is_err());
    }

    #[test]
    fn access_claims_reject_refresh_claim_set() {
        let refresh = RefreshClaims::new(&identity(), 10, 20);
        let json = serde_json::to_value(&refresh).unwrap();
        assert!(serde_json::from_value::<AccessClaims>(json).is_err());
    }

    #[test]
    fn from_claims_extracts_user_id() {
        let identity = identity();
        let user =
            AuthenticatedUser::from_claims(AccessClaims::new(&identity, "iss", "aud", 10, 20));
        assert_eq!(user.user_id, identity.id.to_string());
        assert_eq!(user.expires_at, 20);
    }
}
