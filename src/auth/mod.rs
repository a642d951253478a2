// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Password login, signed and opaque tokens, and the request gate.
//!
//! ## Auth Flow
//!
//! 1. `POST /v1/auth/login` checks the password (bcrypt) and issues
//!    credentials according to the configured [`AuthStrategy`]:
//!    - `jwt`: an HS256 access token in the body, a refresh token in the cookie
//!    - `opaque`: an `authentication` token in the body, a `session` token in
//!      the cookie
//! 2. The client sends `Authorization: Bearer <access credential>`.
//! 3. The gate ([`middleware::authenticate`]) binds a [`Principal`] to every
//!    request on a gated route: the user, or `Anonymous` when no credential
//!    was sent. A credential that fails to verify ends the request with 401.
//! 4. Handlers read the principal with [`CurrentPrincipal`] or require a user
//!    with [`Auth`].
//!
//! ## Security
//!
//! - Only HS256 is accepted; expiry has zero leeway
//! - Opaque tokens are stored as SHA-256 hashes; plaintexts are never kept
//! - Unknown identifiers and wrong passwords fail identically
//! - Every store call is bounded by a timeout

pub mod accounts;
pub mod claims;
pub mod codec;
pub mod cookie;
pub mod error;
pub mod exchange;
pub mod extractor;
pub mod middleware;
pub mod opaque;
pub mod password;
pub mod principal;
pub mod service;
pub mod store;

pub use accounts::AccountError;
pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use exchange::IssuedCredentials;
pub use extractor::{Auth, CurrentPrincipal};
pub use middleware::Gate;
pub use principal::{Identity, Principal};
pub use service::{AuthConfig, AuthService, AuthStrategy, CredentialScheme};
