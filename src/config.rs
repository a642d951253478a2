// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the typed configuration built
//! from them once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HMAC signing secret | Required |
//! | `JWT_ISSUER` | `iss` claim of access tokens | `lyrics-server` |
//! | `JWT_AUDIENCE` | `aud` claim of access tokens | `lyrics-clients` |
//! | `ACCESS_TOKEN_TTL_SECS` | Access credential lifetime | `900` |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh credential lifetime | `86400` |
//! | `ACTIVATION_TOKEN_TTL_SECS` | Activation token lifetime | `259200` |
//! | `AUTH_STRATEGY` | `jwt` or `opaque` | `jwt` |
//! | `COOKIE_NAME` | Refresh cookie name | `__Host-refresh_token` |
//! | `COOKIE_PATH` | Refresh cookie path | `/` |
//! | `COOKIE_DOMAIN` | Refresh cookie domain | unset |
//! | `STORE_TIMEOUT_MS` | Bound on each store call | `3000` |
//! | `BCRYPT_COST` | Password hashing cost | `14` |
//! | `TOKEN_SWEEP_INTERVAL_SECS` | Expired token sweep period, `0` disables | `3600` |
//! | `CORS_TRUSTED_ORIGINS` | Comma-separated origins allowed with credentials | empty |
//! | `SEED_USER_EMAIL` | Bootstrap account email | unset |
//! | `SEED_USER_PASSWORD` | Bootstrap account password | unset |
//! | `SEED_USER_NAME` | Bootstrap account display name | `Administrator` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;

use crate::auth::codec::CodecConfig;
use crate::auth::cookie::{CookieConfig, DEFAULT_COOKIE_NAME};
use crate::auth::password::DEFAULT_COST;
use crate::auth::{AuthConfig, AuthStrategy};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";
pub const JWT_AUDIENCE_ENV: &str = "JWT_AUDIENCE";
pub const ACCESS_TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TOKEN_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";
pub const ACTIVATION_TOKEN_TTL_ENV: &str = "ACTIVATION_TOKEN_TTL_SECS";
pub const AUTH_STRATEGY_ENV: &str = "AUTH_STRATEGY";
pub const COOKIE_NAME_ENV: &str = "COOKIE_NAME";
pub const COOKIE_PATH_ENV: &str = "COOKIE_PATH";
pub const COOKIE_DOMAIN_ENV: &str = "COOKIE_DOMAIN";
pub const STORE_TIMEOUT_ENV: &str = "STORE_TIMEOUT_MS";
pub const BCRYPT_COST_ENV: &str = "BCRYPT_COST";
pub const TOKEN_SWEEP_INTERVAL_ENV: &str = "TOKEN_SWEEP_INTERVAL_SECS";
pub const CORS_TRUSTED_ORIGINS_ENV: &str = "CORS_TRUSTED_ORIGINS";
pub const SEED_USER_EMAIL_ENV: &str = "SEED_USER_EMAIL";
pub const SEED_USER_PASSWORD_ENV: &str = "SEED_USER_PASSWORD";
pub const SEED_USER_NAME_ENV: &str = "SEED_USER_NAME";

/// Logging format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ISSUER: &str = "lyrics-server";
const DEFAULT_AUDIENCE: &str = "lyrics-clients";
const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECS: i64 = 24 * 60 * 60;
const DEFAULT_ACTIVATION_TTL_SECS: i64 = 3 * 24 * 60 * 60;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 3000;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;
const DEFAULT_SEED_NAME: &str = "Administrator";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Optional account created at startup.
#[derive(Clone)]
pub struct SeedUser {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Whole-process configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
    /// `None` disables the sweeper.
    pub sweep_interval: Option<Duration>,
    pub trusted_origins: Vec<String>,
    pub seed_user: Option<SeedUser>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = parse_or(&get, PORT_ENV, DEFAULT_PORT)?;
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    value: host.clone(),
                    reason: e.to_string(),
                })?;

        let secret = get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        let access_ttl = positive_secs(&get, ACCESS_TOKEN_TTL_ENV, DEFAULT_ACCESS_TTL_SECS)?;
        let refresh_ttl = positive_secs(&get, REFRESH_TOKEN_TTL_ENV, DEFAULT_REFRESH_TTL_SECS)?;
        let activation_ttl =
            positive_secs(&get, ACTIVATION_TOKEN_TTL_ENV, DEFAULT_ACTIVATION_TTL_SECS)?;

        let strategy = match get(AUTH_STRATEGY_ENV) {
            Some(value) => {
                AuthStrategy::from_str(&value).map_err(|e| ConfigError::Invalid {
                    name: AUTH_STRATEGY_ENV,
                    value,
                    reason: e.to_string(),
                })?
            }
            None => AuthStrategy::default(),
        };

        let store_timeout_ms: u64 = parse_or(&get, STORE_TIMEOUT_ENV, DEFAULT_STORE_TIMEOUT_MS)?;
        let sweep_secs: u64 = parse_or(&get, TOKEN_SWEEP_INTERVAL_ENV, DEFAULT_SWEEP_INTERVAL_SECS)?;

        let auth = AuthConfig {
            strategy,
            codec: CodecConfig {
                secret,
                issuer: get(JWT_ISSUER_ENV).unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
                audience: get(JWT_AUDIENCE_ENV).unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
                access_ttl,
                refresh_ttl,
            },
            cookie: CookieConfig {
                name: get(COOKIE_NAME_ENV).unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
                path: get(COOKIE_PATH_ENV).unwrap_or_else(|| "/".to_string()),
                domain: get(COOKIE_DOMAIN_ENV),
            },
            activation_ttl,
            bcrypt_cost: parse_or(&get, BCRYPT_COST_ENV, DEFAULT_COST)?,
            store_timeout: Duration::from_millis(store_timeout_ms),
        };

        let trusted_origins = get(CORS_TRUSTED_ORIGINS_ENV)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let seed_user = match (get(SEED_USER_EMAIL_ENV), get(SEED_USER_PASSWORD_ENV)) {
            (Some(email), Some(password)) => Some(SeedUser {
                email,
                password,
                display_name: get(SEED_USER_NAME_ENV)
                    .unwrap_or_else(|| DEFAULT_SEED_NAME.to_string()),
            }),
            (Some(_), None) => return Err(ConfigError::Missing(SEED_USER_PASSWORD_ENV)),
            (None, _) => None,
        };

        Ok(Self {
            bind_addr,
            auth,
            sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            trusted_origins,
            seed_user,
        })
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn positive_secs<G>(get: &G, name: &'static str, default: i64) -> Result<TimeDelta, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let secs: i64 = parse_or(get, name, default)?;
    if secs <= 0 {
        return Err(ConfigError::Invalid {
            name,
            value: secs.to_string(),
            reason: "must be a positive number of seconds".to_string(),
        });
    }
    TimeDelta::try_seconds(secs).ok_or_else(|| ConfigError::Invalid {
        name,
        value: secs.to_string(),
        reason: "out of range".to_string(),
    })
}
