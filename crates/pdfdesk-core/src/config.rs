//! Configuration module
//!
//! Client configuration is read from the environment (after loading a `.env`
//! file if present): backend location, HTTP timeout, identity-provider pool
//! client, session file and the default search threshold.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::{is_valid_threshold, DEFAULT_SEARCH_THRESHOLD};

// Common constants
const DEFAULT_API_URL: &str = "http://localhost:8000";
const HTTP_TIMEOUT_SECS: u64 = 60;
const COGNITO_REGION: &str = "us-east-1";
const SESSION_FILE_NAME: &str = "session.json";
const SESSION_DIR_NAME: &str = ".pdfdesk";

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL without trailing slash.
    pub api_url: String,
    pub http_timeout_secs: u64,
    pub cognito_region: String,
    /// Pool app client id. Only identity commands need it.
    pub cognito_client_id: Option<String>,
    /// Override for the identity-provider endpoint (tests, local emulators).
    pub cognito_endpoint: Option<String>,
    pub session_file: PathBuf,
    pub search_threshold: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            cognito_region: COGNITO_REGION.to_string(),
            cognito_client_id: None,
            cognito_endpoint: None,
            session_file: default_session_file(None),
            search_threshold: DEFAULT_SEARCH_THRESHOLD,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("PDFDESK_API_URL")
            .or_else(|| lookup("API_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        Self {
            api_url,
            http_timeout_secs: lookup("PDFDESK_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|| HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HTTP_TIMEOUT_SECS),
            cognito_region: lookup("PDFDESK_COGNITO_REGION")
                .unwrap_or_else(|| COGNITO_REGION.to_string()),
            cognito_client_id: lookup("PDFDESK_COGNITO_CLIENT_ID").filter(|s| !s.is_empty()),
            cognito_endpoint: lookup("PDFDESK_COGNITO_ENDPOINT").filter(|s| !s.is_empty()),
            session_file: lookup("PDFDESK_SESSION_FILE")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| default_session_file(lookup("HOME"))),
            search_threshold: lookup("PDFDESK_SEARCH_THRESHOLD")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SEARCH_THRESHOLD),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.api_url.is_empty() {
            anyhow::bail!("PDFDESK_API_URL must not be empty");
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!(
                "PDFDESK_API_URL must be an http(s) URL, got {}",
                self.api_url
            );
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("PDFDESK_HTTP_TIMEOUT_SECS must be greater than zero");
        }
        if !is_valid_threshold(self.search_threshold) {
            anyhow::bail!(
                "PDFDESK_SEARCH_THRESHOLD must be between 0 and 1, got {}",
                self.search_threshold
            );
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Identity-provider endpoint: the explicit override, or the regional
    /// Cognito user-pool endpoint.
    pub fn cognito_endpoint(&self) -> String {
        self.cognito_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", self.cognito_region))
    }
}

fn default_session_file(home: Option<String>) -> PathBuf {
    home.filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SESSION_DIR_NAME)
        .join(SESSION_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup_from(&[("HOME", "/home/ana")]));
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.http_timeout_secs, 60);
        assert_eq!(config.search_threshold, 0.75);
        assert_eq!(
            config.session_file,
            PathBuf::from("/home/ana/.pdfdesk/session.json")
        );
        assert_eq!(
            config.cognito_endpoint(),
            "https://cognito-idp.us-east-1.amazonaws.com/"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("PDFDESK_API_URL", "https://api.example.com/"),
            ("PDFDESK_HTTP_TIMEOUT_SECS", "5"),
            ("PDFDESK_COGNITO_REGION", "eu-west-1"),
            ("PDFDESK_COGNITO_CLIENT_ID", "abc123"),
            ("PDFDESK_SESSION_FILE", "/tmp/s.json"),
            ("PDFDESK_SEARCH_THRESHOLD", "0.9"),
        ]));
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
        assert_eq!(config.cognito_client_id.as_deref(), Some("abc123"));
        assert_eq!(
            config.cognito_endpoint(),
            "https://cognito-idp.eu-west-1.amazonaws.com/"
        );
        assert_eq!(config.session_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(config.search_threshold, 0.9);
    }

    #[test]
    fn legacy_base_url_variable() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("API_BASE_URL", "http://backend:8000")]));
        assert_eq!(config.api_url, "http://backend:8000");
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("PDFDESK_HTTP_TIMEOUT_SECS", "soon"),
            ("PDFDESK_SEARCH_THRESHOLD", "high"),
        ]));
        assert_eq!(config.http_timeout_secs, 60);
        assert_eq!(config.search_threshold, 0.75);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.http_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.search_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.api_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }
}
