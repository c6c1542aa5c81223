//! In-memory token store
//!
//! Used for testing and for short-lived processes that don't need tokens to
//! survive a restart.

use anyhow::{Result, anyhow};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

use super::traits::{StoredUser, TokenStore};

/// In-memory implementation of [`TokenStore`]
#[derive(Default)]
pub struct InMemoryTokenStore {
    users: RwLock<HashMap<String, StoredUser>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn upsert(
        &self,
        email: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<StoredUser> {
        let mut users = self
            .users
            .write()
            .map_err(|_| anyhow!("token store lock poisoned"))?;

        let refresh_token = refresh_token
            .map(str::to_string)
            .or_else(|| users.get(email).and_then(|u| u.refresh_token.clone()));

        let user = StoredUser {
            email: email.to_string(),
            access_token: access_token.to_string(),
            refresh_token,
            updated_at: Utc::now(),
        };
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        let users = self
            .users
            .read()
            .map_err(|_| anyhow!("token store lock poisoned"))?;
        Ok(users.get(email).cloned())
    }

    fn delete(&self, email: &str) -> Result<bool> {
        let mut users = self
            .users
            .write()
            .map_err(|_| anyhow!("token store lock poisoned"))?;
        Ok(users.remove(email).is_some())
    }
}
