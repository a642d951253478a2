// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::auth::store::StoreError;
use crate::models::{Song, SongSummary};

/// Songs keyed by slug.
#[derive(Default)]
pub struct SongStore {
    songs: RwLock<HashMap<String, Song>>,
}

impl SongStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All songs, ordered by artist and then name.
    pub async fn list(&self) -> Vec<SongSummary> {
        let songs = self.songs.read().await;
        let mut summaries: Vec<SongSummary> = songs.values().map(SongSummary::from).collect();
        summaries.sort_by(|a, b| a.artist.cmp(&b.artist).then_with(|| a.name.cmp(&b.name)));
        summaries
    }

    pub async fn get(&self, id: &str) -> Option<Song> {
        self.songs.read().await.get(id).cloned()
    }

    /// Insert a new song. Fails with `Conflict` if the id is taken.
    pub async fn insert(&self, song: Song) -> Result<Song, StoreError> {
        let mut songs = self.songs.write().await;
        if songs.contains_key(&song.id) {
            return Err(StoreError::Conflict(song.id));
        }
        songs.insert(song.id.clone(), song.clone());
        Ok(song)
    }

    /// Remove a song. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> bool {
        self.songs.write().await.remove(id).is_some()
    }
}
