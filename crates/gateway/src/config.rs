//! Gateway configuration
//!
//! Loaded from (in order, later wins):
//! 1. Built-in defaults
//! 2. JSON file (~/.config/mail-gateway/gateway.json)
//! 3. Runtime environment variables (`MAIL_GATEWAY_*`)

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config filename in the gateway config directory
const CONFIG_FILE: &str = "gateway.json";

/// Default token database filename in the gateway config directory
const TOKEN_DB_FILE: &str = "tokens.sqlite";

/// Settings shared by the provider client and the facade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the Gmail REST API
    pub api_base_url: String,
    /// Page size used when the caller doesn't pick one
    pub default_page_size: u32,
    /// Largest page size a caller may request
    pub max_page_size: u32,
    /// Upper bound on concurrent message fetches while building a list page
    pub max_concurrent_fetches: usize,
    /// Timeout for a single provider request, in seconds
    pub timeout_secs: u64,
    /// Location of the SQLite token store; defaults to the config directory
    pub token_db: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base_url: crate::gmail::GmailClient::BASE_URL.to_string(),
            default_page_size: 10,
            max_page_size: crate::gmail::GmailClient::MAX_PAGE_SIZE,
            max_concurrent_fetches: 8,
            timeout_secs: 30,
            token_db: None,
        }
    }
}

impl GatewayConfig {
    /// Load configuration using file, then environment overrides
    pub fn load() -> Result<Self> {
        let mut cfg = if config::config_exists(CONFIG_FILE) {
            config::load_json(CONFIG_FILE)?
        } else {
            Self::default()
        };

        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from a specific JSON file (no environment overrides)
    pub fn from_file(path: &Path) -> Result<Self> {
        let cfg: Self = config::load_json_file(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse configuration from a JSON string; missing fields use defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json).context("Failed to parse gateway config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `MAIL_GATEWAY_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("MAIL_GATEWAY_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(v) = lookup("MAIL_GATEWAY_PAGE_SIZE") {
            self.default_page_size = parse_env("MAIL_GATEWAY_PAGE_SIZE", &v)?;
        }
        if let Some(v) = lookup("MAIL_GATEWAY_MAX_PAGE_SIZE") {
            self.max_page_size = parse_env("MAIL_GATEWAY_MAX_PAGE_SIZE", &v)?;
        }
        if let Some(v) = lookup("MAIL_GATEWAY_CONCURRENCY") {
            self.max_concurrent_fetches = parse_env("MAIL_GATEWAY_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("MAIL_GATEWAY_TIMEOUT_SECS") {
            self.timeout_secs = parse_env("MAIL_GATEWAY_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("MAIL_GATEWAY_TOKEN_DB") {
            self.token_db = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /// Reject settings the gateway can't run with
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            bail!("api_base_url must not be empty");
        }
        if self.max_page_size == 0 || self.max_page_size > crate::gmail::GmailClient::MAX_PAGE_SIZE {
            bail!(
                "max_page_size must be between 1 and {}",
                crate::gmail::GmailClient::MAX_PAGE_SIZE
            );
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            bail!("default_page_size must be between 1 and max_page_size");
        }
        if self.max_concurrent_fetches == 0 {
            bail!("max_concurrent_fetches must be at least 1");
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Per-request provider timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Path of the SQLite token store
    pub fn token_db_path(&self) -> Option<PathBuf> {
        self.token_db
            .clone()
            .or_else(|| config::config_path(TOKEN_DB_FILE))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .ok()
        .with_context(|| format!("{} has an invalid value: {:?}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = GatewayConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.default_page_size, 10);
        assert_eq!(cfg.api_base_url, "https://gmail.googleapis.com/gmail/v1");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = GatewayConfig::from_json(r#"{ "default_page_size": 25 }"#).unwrap();
        assert_eq!(cfg.default_page_size, 25);
        assert_eq!(cfg.max_page_size, 500);
        assert_eq!(cfg.max_concurrent_fetches, 8);
    }

    #[test]
    fn test_invalid_json_values_rejected() {
        assert!(GatewayConfig::from_json(r#"{ "max_concurrent_fetches": 0 }"#).is_err());
        assert!(GatewayConfig::from_json(r#"{ "default_page_size": 600 }"#).is_err());
        assert!(GatewayConfig::from_json(r#"{ "api_base_url": "" }"#).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("MAIL_GATEWAY_API_BASE_URL", "http://localhost:9000/gmail/v1"),
            ("MAIL_GATEWAY_PAGE_SIZE", "20"),
            ("MAIL_GATEWAY_CONCURRENCY", "2"),
            ("MAIL_GATEWAY_TOKEN_DB", "/tmp/tokens.sqlite"),
        ]);

        let mut cfg = GatewayConfig::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(cfg.api_base_url, "http://localhost:9000/gmail/v1");
        assert_eq!(cfg.default_page_size, 20);
        assert_eq!(cfg.max_concurrent_fetches, 2);
        assert_eq!(cfg.token_db_path(), Some(PathBuf::from("/tmp/tokens.sqlite")));
    }

    #[test]
    fn test_env_override_parse_error() {
        let mut cfg = GatewayConfig::default();
        let result = cfg.apply_env(|k| (k == "MAIL_GATEWAY_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.json");
        std::fs::write(&path, r#"{ "timeout_secs": 5 }"#).unwrap();

        let cfg = GatewayConfig::from_file(&path).unwrap();
        assert_eq!(cfg.timeout(), Duration::from_secs(5));
    }
}
