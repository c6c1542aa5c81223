//! Token store trait definitions

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth tokens kept for one user, keyed by email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub email: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// When the tokens were last written
    pub updated_at: DateTime<Utc>,
}

/// Trait for persisting user tokens
///
/// Sits beside the gateway in the request layer: the gateway itself only
/// ever sees the bearer token handed to it.
pub trait TokenStore: Send + Sync {
    /// Insert or replace the tokens for `email`
    ///
    /// A `None` refresh token keeps a previously stored one.
    fn upsert(
        &self,
        email: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<StoredUser>;

    /// Look up the tokens for `email`
    fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>>;

    /// Remove the tokens for `email`; returns whether anything was removed
    fn delete(&self, email: &str) -> Result<bool>;
}
