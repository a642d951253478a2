// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lyrics Server - Song Catalogue Service
//!
//! An HTTP service for song records whose write endpoints are protected by
//! password login and either signed (JWT) or opaque server-side tokens.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password verification, token codecs and the request gate
//! - `config` - Environment configuration
//! - `storage` - In-memory account, token and song stores
//! - `sweeper` - Background removal of expired opaque tokens

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod sweeper;
