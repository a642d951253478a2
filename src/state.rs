// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AuthService;
use crate::storage::SongStore;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub songs: Arc<SongStore>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, songs: SongStore) -> Self {
        Self {
            auth,
            songs: Arc::new(songs),
        }
    }
}
