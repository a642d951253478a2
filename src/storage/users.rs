// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::store::{StoreError, UserStore};
use crate::auth::Identity;

/// Accounts keyed by id. Emails are unique, compared case-insensitively.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, Identity>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Identity>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.matches(identifier)).cloned())
    }

    async fn insert(&self, identity: Identity) -> Result<Identity, StoreError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&identity.email))
        {
            return Err(StoreError::Conflict(identity.email));
        }
        users.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn activate(&self, identifier: &str) -> Result<Identity, StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .values_mut()
            .find(|u| u.matches(identifier))
            .ok_or_else(|| StoreError::NotFound(identifier.to_string()))?;
        user.activated = true;
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn identity(email: &str) -> Identity {
        Identity::new(email, "Someone", "hash", Utc::now())
    }

    #[tokio::test]
    async fn find_by_email_or_id() {
        let store = InMemoryUserStore::new();
        let stored = store.insert(identity("a@example.com")).await.unwrap();

        let by_email = store.find_by_identifier("a@example.com").await.unwrap();
        let by_id = store
            .find_by_identifier(&stored.id.to_string())
            .await
            .unwrap();
        assert_eq!(by_email.unwrap().id, stored.id);
        assert_eq!(by_id.unwrap().id, stored.id);
        assert!(store.find_by_identifier("b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = InMemoryUserStore::new();
        store.insert(identity("a@example.com")).await.unwrap();
        assert!(matches!(
            store.insert(identity("A@EXAMPLE.COM")).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn activate_marks_account() {
        let store = InMemoryUserStore::new();
        store.insert(identity("a@example.com")).await.unwrap();

        assert!(store.activate("a@example.com").await.unwrap().activated);
        assert!(store
            .find_by_identifier("a@example.com")
            .await
            .unwrap()
            .unwrap()
            .activated);
        assert!(matches!(
            store.activate("nobody@example.com").await,
            Err(StoreError::NotFound(_))
        ));
    }
}
