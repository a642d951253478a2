// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login, refresh and logout.
//!
//! The credential kind depends on the service's [`AuthStrategy`]: signed
//! pairs for `Jwt`, an authentication/session token pair for `Opaque`. In both
//! cases the access credential goes in the response body and the refresh
//! credential goes in the cookie.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::codec::SignedTokenPair;
use super::opaque::TokenScope;
use super::service::{AuthService, AuthStrategy};
use super::{AuthError, AuthenticatedUser};

/// Refresh credential destined for the cookie.
#[derive(Debug, Clone)]
pub struct RefreshCredential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Credentials produced by a login or refresh.
#[derive(Debug, Clone)]
pub struct IssuedCredentials {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    /// `None` when the existing cookie stays valid.
    pub refresh: Option<RefreshCredential>,
}

impl From<SignedTokenPair> for IssuedCredentials {
    fn from(pair: SignedTokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            access_expires_at: pair.access_expires_at,
            refresh: Some(RefreshCredential {
                token: pair.refresh_token,
                expires_at: pair.refresh_expires_at,
            }),
        }
    }
}

impl AuthService {
    /// Exchange an identifier and password for credentials.
    ///
    /// Unknown identifiers and wrong passwords fail identically, after the
    /// same amount of password hashing work.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedCredentials, AuthError> {
        let identity = self.find_identity(identifier).await?;
        let matches = self.check_password(identity.as_ref(), password).await?;

        let identity = match identity {
            Some(identity) if matches => identity,
            _ => {
                warn!("login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let issued = match self.strategy() {
            AuthStrategy::Jwt => self.codec().issue_pair(&identity, now)?.into(),
            AuthStrategy::Opaque => {
                let owner = identity.token_owner();
                let access = self
                    .tokens()
                    .issue(owner, TokenScope::Authentication, self.codec().access_ttl(), now)
                    .await?;
                let session = self
                    .tokens()
                    .issue(owner, TokenScope::Session, self.codec().refresh_ttl(), now)
                    .await?;
                IssuedCredentials {
                    access_token: access.plaintext,
                    access_expires_at: access.expiry,
                    refresh: Some(RefreshCredential {
                        token: session.plaintext,
                        expires_at: session.expiry,
                    }),
                }
            }
        };

        info!(user_id = %identity.id, strategy = ?self.strategy(), "login succeeded");
        Ok(issued)
    }

    /// Exchange the refresh cookie for a new access credential.
    ///
    /// A signed refresh token is rotated along with the access token. An
    /// opaque session keeps its cookie and only gets a new access token.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedCredentials, AuthError> {
        match self.strategy() {
            AuthStrategy::Jwt => {
                let claims = self.codec().verify_refresh(refresh_token, now)?;
                let identity = self
                    .find_identity(&claims.sub)
                    .await?
                    .ok_or(AuthError::TokenNotFound)?;
                Ok(self.codec().issue_pair(&identity, now)?.into())
            }
            AuthStrategy::Opaque => {
                let record = self
                    .tokens()
                    .resolve(refresh_token, TokenScope::Session, now)
                    .await?;
                let access = self
                    .tokens()
                    .issue(
                        &record.owner,
                        TokenScope::Authentication,
                        self.codec().access_ttl(),
                        now,
                    )
                    .await?;
                Ok(IssuedCredentials {
                    access_token: access.plaintext,
                    access_expires_at: access.expiry,
                    refresh: None,
                })
            }
        }
    }

    /// Revoke every opaque credential held by `user`.
    ///
    /// Signed tokens cannot be revoked; under the `Jwt` strategy this only
    /// clears whatever opaque credentials the account may still have.
    pub async fn logout(&self, user: &AuthenticatedUser) -> Result<u64, AuthError> {
        let Some(identity) = self.find_identity(&user.user_id).await? else {
            return Ok(0);
        };
        let removed = self.tokens().revoke_credentials(identity.token_owner()).await?;
        info!(user_id = %identity.id, removed, "logged out");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::auth::service::testing::*;
    use crate::auth::CredentialScheme;

    #[tokio::test]
    async fn jwt_login_issues_verifiable_pair() {
        let service = test_service(AuthStrategy::Jwt);
        let identity = seed_user(&service, "a@example.com", "Ada").await;
        let now = Utc::now();

        let issued = service.login("a@example.com", TEST_PASSWORD, now).await.unwrap();
        let refresh = issued.refresh.as_ref().unwrap();
        assert!(issued.access_expires_at < refresh.expires_at);

        let claims = service
            .codec()
            .verify_access(&issued.access_token, now + TimeDelta::minutes(14))
            .unwrap();
        assert_eq!(claims.sub, identity.id.to_string());
    }

    #[tokio::test]
    async fn login_by_id_works_too() {
        let service = test_service(AuthStrategy::Jwt);
        let identity = seed_user(&service, "a@example.com", "Ada").await;
        assert!(service
            .login(&identity.id.to_string(), TEST_PASSWORD, Utc::now())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_fail_alike() {
        let service = test_service(AuthStrategy::Jwt);
        seed_user(&service, "a@example.com", "Ada").await;
        let now = Utc::now();

        let wrong = service.login("a@example.com", "nope nope", now).await.unwrap_err();
        let unknown = service
            .login("nobody@example.com", TEST_PASSWORD, now)
            .await
            .unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn opaque_login_issues_scoped_tokens() {
        let service = test_service(AuthStrategy::Opaque);
        let identity = seed_user(&service, "a@example.com", "Ada").await;
        let now = Utc::now();

        let issued = service.login("a@example.com", TEST_PASSWORD, now).await.unwrap();
        let session = issued.refresh.unwrap();
        assert_eq!(issued.access_expires_at, now + TimeDelta::minutes(15));
        assert_eq!(session.expires_at, now + TimeDelta::hours(24));

        let user = service
            .authenticate(CredentialScheme::BearerOpaque, &issued.access_token, now)
            .await
            .unwrap();
        assert_eq!(user.user_id, identity.id.to_string());
        assert!(service
            .authenticate(CredentialScheme::SessionCookie, &session.token, now)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn jwt_refresh_rotates_pair() {
        let service = test_service(AuthStrategy::Jwt);
        seed_user(&service, "a@example.com", "Ada").await;
        let now = Utc::now();
        let issued = service.login("a@example.com", TEST_PASSWORD, now).await.unwrap();
        let refresh = issued.refresh.unwrap();

        let later = now + TimeDelta::hours(1);
        let rotated = service.refresh(&refresh.token, later).await.unwrap();
        assert!(rotated.access_expires_at > issued.access_expires_at);
        assert!(rotated.refresh.is_some());
    }

    #[tokio::test]
    async fn access_token_cannot_refresh() {
        let service = test_service(AuthStrategy::Jwt);
        seed_user(&service, "a@example.com", "Ada").await;
        let now = Utc::now();
        let issued = service.login("a@example.com", TEST_PASSWORD, now).await.unwrap();

        assert!(service
            .refresh(&issued.access_token, now)
            .await
            .unwrap_err()
            .is_token_failure());
    }

    #[tokio::test]
    async fn opaque_refresh_keeps_session() {
        let service = test_service(AuthStrategy::Opaque);
        seed_user(&service, "a@example.com", "Ada").await;
        let now = Utc::now();
        let issued = service.login("a@example.com", TEST_PASSWORD, now).await.unwrap();
        let session = issued.refresh.unwrap();

        let refreshed = service
            .refresh(&session.token, now + TimeDelta::minutes(20))
            .await
            .unwrap();
        assert!(refreshed.refresh.is_none());
        assert_ne!(refreshed.access_token, issued.access_token);
    }

    #[tokio::test]
    async fn logout_revokes_opaque_credentials() {
        let service = test_service(AuthStrategy::Opaque);
        seed_user(&service, "a@example.com", "Ada").await;
        let now = Utc::now();
        let issued = service.login("a@example.com", TEST_PASSWORD, now).await.unwrap();
        let session = issued.refresh.clone().unwrap();

        let user = service
            .authenticate(CredentialScheme::SessionCookie, &session.token, now)
            .await
            .unwrap();
        assert_eq!(service.logout(&user).await.unwrap(), 2);

        assert!(service
            .authenticate(CredentialScheme::BearerOpaque, &issued.access_token, now)
            .await
            .is_err());
        assert!(service.refresh(&session.token, now).await.is_err());
        assert_eq!(service.logout(&user).await.unwrap(), 0);
    }
}
