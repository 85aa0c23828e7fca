use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Public NS1 API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.nsone.net/v1";

/// Header NS1 reads the API key from (`X-NSONE-Key`).
pub const API_KEY_HEADER: &str = "x-nsone-key";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String, // no trailing slash
    pub api_key: SecretString,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(30),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` that sends the API key on every request.
    pub fn build_http_client(&self) -> Result<reqwest::Client, Error> {
        let mut key = HeaderValue::from_str(self.api_key.expose_secret())
            .map_err(Error::InvalidApiKey)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .default_headers(headers)
            .build()
            .map_err(Error::Client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_nsone() {
        let config = ClientConfig::new("secret");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("nsone-zones/"));
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let config = ClientConfig::new("secret").with_base_url("http://127.0.0.1:8080/v1/");
        assert_eq!(config.base_url, "http://127.0.0.1:8080/v1");
    }

    #[test]
    fn api_key_is_not_debug_printed() {
        let config = ClientConfig::new("hunter2");
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn rejects_key_with_newline() {
        let config = ClientConfig::new("bad\nkey");
        let err = config.build_http_client().unwrap_err();

        assert!(matches!(err, Error::InvalidApiKey(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.to_string().contains("bad"));
    }
}
