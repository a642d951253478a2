// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive `ToSchema`
//! for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Songs**: song records keyed by the slug of their name
//! - **Auth**: login and token responses
//! - **Users**: registration, activation and the public account view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AuthenticatedUser, Identity};

// =============================================================================
// Songs
// =============================================================================

/// A song with its lyrics and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Song {
    /// Slug of the song name, e.g. `wish-you-were-here`
    pub id: String,
    pub artist: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lyrics: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chords: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub copyright: String,
    /// Links to notable covers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub covers: Vec<String>,
}

/// Song as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SongSummary {
    pub id: String,
    pub artist: String,
    pub name: String,
}

impl From<&Song> for SongSummary {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id.clone(),
            artist: song.artist.clone(),
            name: song.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSongRequest {
    pub artist: String,
    pub name: String,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub chords: String,
    #[serde(default)]
    pub copyright: String,
    #[serde(default)]
    pub covers: Vec<String>,
}

impl CreateSongRequest {
    /// Build the stored song, deriving its id from the name.
    pub fn into_song(self) -> Song {
        Song {
            id: slugify(&self.name),
            artist: self.artist.trim().to_string(),
            name: self.name.trim().to_string(),
            lyrics: self.lyrics,
            chords: self.chords,
            copyright: self.copyright,
            covers: self.covers,
        }
    }
}

/// Lowercase, with every run of non-alphanumerics turned into one hyphen.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email or account id
    pub identifier: String,
    pub password: String,
}

/// Access credential handed to the client. The refresh credential travels
/// in the cookie only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenResponse {
    pub fn bearer(access_token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_at,
        }
    }
}

/// The caller as seen by the session endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub user_id: String,
    pub display_name: String,
}

impl From<AuthenticatedUser> for SessionResponse {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            user_id: user.user_id,
            display_name: user.display_name,
        }
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub activated: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for UserResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            activated: identity.activated,
            created_at: identity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub user: UserResponse,
    /// One-time token for `PUT /v1/users/activate`
    pub activation_token: String,
    pub activation_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivateRequest {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Wish You Were Here"), "wish-you-were-here");
        assert_eq!(slugify("  Don't Stop Me Now!  "), "don-t-stop-me-now");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn song_omits_empty_optional_fields() {
        let song = CreateSongRequest {
            artist: "Pink Floyd".into(),
            name: "Time".into(),
            lyrics: String::new(),
            chords: String::new(),
            copyright: String::new(),
            covers: Vec::new(),
        }
        .into_song();

        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "time", "artist": "Pink Floyd", "name": "Time" })
        );
    }

    #[test]
    fn user_response_has_no_password_field() {
        let identity = Identity::new("a@example.com", "Ada", "$2b$04$secret", Utc::now());
        let json = serde_json::to_string(&UserResponse::from(&identity)).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("secret"));
    }
}
