// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Accounts and the per-request principal.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::claims::AuthenticatedUser;

/// A stored account.
///
/// The password hash is private and has no serialized form; outward-facing
/// views are built from the public fields only.
#[derive(Clone)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub activated: bool,
    pub created_at: DateTime<Utc>,
    password_hash: String,
}

impl Identity {
    /// Create a new, not yet activated account from an already computed hash.
    pub fn new(
        email: impl Into<String>,
        display_name: impl Into<String>,
        password_hash: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            display_name: display_name.into(),
            activated: false,
            created_at,
            password_hash: password_hash.into(),
        }
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Whether `identifier` names this account (its id or its email).
    pub fn matches(&self, identifier: &str) -> bool {
        self.email.eq_ignore_ascii_case(identifier) || self.id.to_string() == identifier
    }

    /// Owner reference used for opaque tokens.
    pub fn token_owner(&self) -> &str {
        &self.email
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("activated", &self.activated)
            .field("created_at", &self.created_at)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// The caller bound to a request by the gate.
///
/// Exactly one is attached per request. `Anonymous` is what callers without a
/// credential get; it must never be treated as authorized for scoped work.
#[derive(Debug, Clone)]
pub enum Principal {
    Anonymous,
    User(AuthenticatedUser),
}

impl Principal {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Principal::Anonymous)
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Principal::Anonymous => None,
            Principal::User(user) => Some(user),
        }
    }
}
