//! Client configuration.

use std::time::Duration;

/// Default service root, including the `/api` prefix the service mounts under
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
/// Path of the single-shot assistant endpoint
pub const DEFAULT_CHAT_PATH: &str = "/ai/chat";
/// Path of the streaming assistant endpoint
pub const DEFAULT_STREAM_PATH: &str = "/ai/stream";

pub const BASE_URL_ENV: &str = "NOVELFORGE_BASE_URL";
pub const TIMEOUT_ENV: &str = "NOVELFORGE_TIMEOUT_SECS";

/// Configuration for [`NovelForgeClient`](crate::client::NovelForgeClient).
///
/// # Example
///
/// ```ignore
/// use novelforge::config::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_base_url("https://forge.example.com/api")
///     .with_timeout(std::time::Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Service root; paths are appended to it
    pub base_url: String,
    /// Whole-request timeout for the HTTP collaborator (none by default, so
    /// long streams are not cut off)
    pub timeout: Option<Duration>,
    pub chat_path: String,
    pub stream_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `NOVELFORGE_BASE_URL` and `NOVELFORGE_TIMEOUT_SECS`.
    ///
    /// An unparseable timeout is ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Some(Duration::from_secs(secs)),
                Err(_) => tracing::warn!("ignoring invalid {}={:?}", TIMEOUT_ENV, raw),
            }
        }
        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_chat_path(mut self, path: impl Into<String>) -> Self {
        self.chat_path = path.into();
        self
    }

    pub fn with_stream_path(mut self, path: impl Into<String>) -> Self {
        self.stream_path = path.into();
        self
    }

    /// Join `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.timeout, None);
        assert_eq!(config.chat_path, "/ai/chat");
        assert_eq!(config.stream_path, "/ai/stream");
    }

    #[test]
    fn test_url_join() {
        let config = ClientConfig::default().with_base_url("http://host/api/");
        assert_eq!(config.url("/novels"), "http://host/api/novels");
        assert_eq!(config.url("novels/1"), "http://host/api/novels/1");
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = [
            (BASE_URL_ENV, "https://forge.example.com/api"),
            (TIMEOUT_ENV, "45"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.base_url, "https://forge.example.com/api");
        assert_eq!(config.timeout, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_from_lookup_bad_timeout_ignored() {
        let config = ClientConfig::from_lookup(|k| {
            (k == TIMEOUT_ENV).then(|| "soon".to_string())
        });
        assert_eq!(config.timeout, None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new()
            .with_timeout(Duration::from_secs(5))
            .with_stream_path("/ai/chat/stream");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.stream_path, "/ai/chat/stream");
    }
}
