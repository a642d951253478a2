// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # In-Memory Storage
//!
//! Store implementations used by the server. Each store keeps its data behind
//! one `tokio::sync::RwLock`, so every trait operation is atomic on its own.
//!
//! - [`InMemoryUserStore`]: accounts, looked up by id or email
//! - [`InMemoryTokenStore`]: opaque token records keyed by token hash
//! - [`SongStore`]: song records keyed by slug

pub mod songs;
pub mod tokens;
pub mod users;

pub use songs::SongStore;
pub use tokens::InMemoryTokenStore;
pub use users::InMemoryUserStore;
