// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Refresh-credential cookie.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};

use super::AuthError;

pub const DEFAULT_COOKIE_NAME: &str = "__Host-refresh_token";

/// Name, path and domain of the refresh cookie.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            domain: None,
        }
    }
}

impl CookieConfig {
    /// Reject settings browsers would silently refuse.
    pub fn validate(&self) -> Result<(), AuthError> {
        let valid_name = !self.name.is_empty()
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid_name {
            return Err(AuthError::Misconfiguration(format!(
                "invalid cookie name: {:?}",
                self.name
            )));
        }
        if !self.path.starts_with('/') {
            return Err(AuthError::Misconfiguration(
                "cookie path must start with '/'".to_string(),
            ));
        }
        if self.name.starts_with("__Host-") && (self.domain.is_some() || self.path != "/") {
            return Err(AuthError::Misconfiguration(
                "__Host- cookies require Path=/ and no Domain".to_string(),
            ));
        }
        Ok(())
    }

    /// `Set-Cookie` value carrying `value` until `expires_at`.
    pub fn build(
        &self,
        value: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<HeaderValue, AuthError> {
        let max_age = (expires_at - now).num_seconds().max(0);
        let expires = expires_at.format("%a, %d %b %Y %H:%M:%S GMT");
        self.render(value, max_age, &expires.to_string())
    }

    /// `Set-Cookie` value that removes the cookie.
    pub fn clear(&self) -> Result<HeaderValue, AuthError> {
        self.render("", 0, "Thu, 01 Jan 1970 00:00:00 GMT")
    }

    fn render(&self, value: &str, max_age: i64, expires: &str) -> Result<HeaderValue, AuthError> {
        let mut cookie = format!(
            "{}={value}; Path={}; HttpOnly; Secure; SameSite=Strict; Max-Age={max_age}; Expires={expires}",
            self.name, self.path
        );
        if let Some(domain) = &self.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        HeaderValue::from_str(&cookie)
            .map_err(|e| AuthError::Internal(format!("invalid Set-Cookie value: {e}")))
    }

    /// Value of this cookie in the request's `Cookie` headers.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|header| header.split(';'))
            .find_map(|pair| {
                let (key, value) = pair.trim().split_once('=')?;
                (key.trim() == self.name).then(|| value.trim().to_string())
            })
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn build_sets_security_attributes_and_expiry() {
        let config = CookieConfig::default();
        let value = config
            .build("abc", now() + TimeDelta::hours(24), now())
            .unwrap();
        let value = value.to_str().unwrap();

        assert!(value.starts_with("__Host-refresh_token=abc;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Max-Age=86400"));
        assert!(value.contains("Expires=Wed, 15 Nov 2023 22:13:20 GMT"));
        assert!(!value.contains("Domain"));
    }

    #[test]
    fn build_includes_configured_domain() {
        let config = CookieConfig {
            name: "refresh_token".into(),
            path: "/v1/auth".into(),
            domain: Some("example.com".into()),
        };
        let value = config.build("abc", now() + TimeDelta::hours(1), now()).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.contains("Path=/v1/auth"));
        assert!(value.ends_with("; Domain=example.com"));
    }

    #[test]
    fn clear_expires_immediately() {
        let value = CookieConfig::default().clear().unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("__Host-refresh_token=;"));
        assert!(value.contains("Max-Age=0"));
    }

    #[test]
    fn read_finds_named_cookie_among_others() {
        let config = CookieConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; __Host-refresh_token=TOKEN123 ; lang=en"),
        );
        assert_eq!(config.read(&headers).as_deref(), Some("TOKEN123"));
    }

    #[test]
    fn read_ignores_missing_and_empty() {
        let config = CookieConfig::default();
        let mut headers = HeaderMap::new();
        assert!(config.read(&headers).is_none());

        headers.insert(COOKIE, HeaderValue::from_static("__Host-refresh_token="));
        assert!(config.read(&headers).is_none());
    }

    #[test]
    fn host_prefix_rejects_domain() {
        let config = CookieConfig {
            domain: Some("example.com".into()),
            ..CookieConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AuthError::Misconfiguration(_))
        ));
        assert!(CookieConfig::default().validate().is_ok());
    }
}
