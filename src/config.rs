use std::{
    path::PathBuf,
    time::Duration,
};

use crate::core::LexiqError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 8000;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL every endpoint is appended to.
    pub base_url: String,
    /// Default per-request deadline.
    pub timeout: Duration,
    /// Overrides the platform location of the key-value store file.
    pub store_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            store_path: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// | Env Var                | Default                      |
    /// |------------------------|------------------------------|
    /// | `LEXIQ_API_BASE_URL`   | `http://localhost:4000/api`  |
    /// | `LEXIQ_API_TIMEOUT_MS` | `8000`                       |
    /// | `LEXIQ_STORE_PATH`     | platform local data dir      |
    pub fn from_env() -> Result<Self, LexiqError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Failed to read .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reading from an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LexiqError> {
        let base_url = lookup("LEXIQ_API_BASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(LexiqError::Config(format!(
                "LEXIQ_API_BASE_URL must be an http(s) URL, got {base_url:?}"
            )));
        }

        let timeout_ms = match lookup("LEXIQ_API_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                LexiqError::Config(format!("LEXIQ_API_TIMEOUT_MS must be a valid u64, got {raw:?}"))
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let store_path = lookup("LEXIQ_STORE_PATH").filter(|s| !s.is_empty()).map(PathBuf::from);

        Ok(Self { base_url, timeout: Duration::from_millis(timeout_ms), store_path })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout, Duration::from_millis(8000));
    }

    #[test]
    fn reads_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("LEXIQ_API_BASE_URL", "https://api.example.com/v1"),
            ("LEXIQ_API_TIMEOUT_MS", "2500"),
            ("LEXIQ_STORE_PATH", "/tmp/lexiq.json"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.com/v1");
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/lexiq.json")));
    }

    #[test]
    fn rejects_bad_timeout() {
        let result = ClientConfig::from_lookup(lookup(&[("LEXIQ_API_TIMEOUT_MS", "soon")]));
        assert!(matches!(result, Err(LexiqError::Config(_))));
    }

    #[test]
    fn rejects_non_http_base() {
        let result = ClientConfig::from_lookup(lookup(&[("LEXIQ_API_BASE_URL", "ftp://x")]));
        assert!(matches!(result, Err(LexiqError::Config(_))));
    }
}
