// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::auth::opaque::{TokenHash, TokenRecord, TokenScope};
use crate::auth::store::{StoreError, TokenStore};

/// Opaque token records keyed by hash.
#[derive(Default)]
pub struct InMemoryTokenStore {
    records: RwLock<HashMap<TokenHash, TokenRecord>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn insert(&self, record: TokenRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(record.hash, record);
        Ok(())
    }

    async fn fetch_by_hash_and_scope(
        &self,
        hash: &TokenHash,
        scope: TokenScope,
        now: DateTime<Utc>,
    ) -> Result<Option<TokenRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(hash)
            .filter(|r| r.scope == scope && !r.is_expired_at(now))
            .cloned())
    }

    async fn delete_all_for_owner_and_scope(
        &self,
        owner: &str,
        scope: TokenScope,
    ) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| !(r.owner == owner && r.scope == scope));
        Ok((before - records.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| !r.is_expired_at(now));
        Ok((before - records.len()) as u64)
    }
}
