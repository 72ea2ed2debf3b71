//! Tap configuration
//!
//! Loaded from a JSON file (`--config`) or inline JSON (`--config-json`).
//! Either an `access_token` or a `client_id`/`client_secret` pair is
//! required; everything else has a default.

use crate::auth::{AuthConfig, Location};
use crate::catalog::{Catalog, DEFAULT_PAGE_SIZE, DEFAULT_REPORT_YEAR};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::schema::SchemaLoader;
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Podbean API root
pub const DEFAULT_API_URL: &str = "https://api.podbean.com";

/// Tap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// OAuth2 client ID
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth2 client secret
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Pre-issued access token (skips the token request)
    #[serde(default)]
    pub access_token: Option<String>,

    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Token endpoint (default `{api_url}/v1/oauth/token`)
    #[serde(default)]
    pub token_url: Option<String>,

    /// Year requested from the report endpoints
    #[serde(default = "default_report_year")]
    pub report_year: i32,

    /// Records per page for list endpoints
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Directory holding `{stream}.json` schema files
    #[serde(default)]
    pub schemas_dir: Option<PathBuf>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Extra headers sent with every API request (not with report downloads)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Transport retries for 429/5xx/timeouts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Client-side rate limit (0 disables it)
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_report_year() -> i32 {
    DEFAULT_REPORT_YEAR
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    RateLimiterConfig::default().requests_per_second
}

impl TapConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json_str)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// Load from inline JSON or a file; inline JSON takes precedence
    pub fn load(file: Option<&Path>, inline: Option<&str>) -> Result<Self> {
        match (inline, file) {
            (Some(json_str), _) => Self::from_json_str(json_str),
            (None, Some(path)) => Self::from_file(path),
            (None, None) => Err(Error::config(
                "No configuration provided (use --config or --config-json)",
            )),
        }
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        let has_token = self.access_token.clone().none_if_empty().is_some();
        let has_id = self.client_id.clone().none_if_empty().is_some();
        let has_secret = self.client_secret.clone().none_if_empty().is_some();

        if !has_token {
            if !has_id {
                return Err(Error::missing_field("client_id"));
            }
            if !has_secret {
                return Err(Error::missing_field("client_secret"));
            }
        }

        url::Url::parse(&self.api_url)
            .map_err(|e| Error::invalid_value("api_url", e.to_string()))?;

        if let Some(token_url) = &self.token_url {
            url::Url::parse(token_url)
                .map_err(|e| Error::invalid_value("token_url", e.to_string()))?;
        }

        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than 0"));
        }

        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be greater than 0"));
        }

        Ok(())
    }

    /// Token endpoint URL
    pub fn token_url(&self) -> String {
        self.token_url.clone().unwrap_or_else(|| {
            format!("{}/v1/oauth/token", self.api_url.trim_end_matches('/'))
        })
    }

    /// Authentication settings; a configured access token wins
    pub fn auth_config(&self) -> AuthConfig {
        if let Some(token) = self.access_token.clone().none_if_empty() {
            return AuthConfig::AccessToken {
                token,
                location: Location::Query,
            };
        }

        AuthConfig::ClientCredentials {
            token_url: self.token_url(),
            client_id: self.client_id.clone().unwrap_or_default(),
            client_secret: self.client_secret.clone().unwrap_or_default(),
            location: Location::Query,
        }
    }

    /// HTTP transport settings
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.api_url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries);

        builder = if self.requests_per_second == 0 {
            builder.no_rate_limit()
        } else {
            builder.rate_limit(RateLimiterConfig::per_second(self.requests_per_second))
        };

        if let Some(agent) = self.user_agent.clone().none_if_empty() {
            builder = builder.user_agent(agent);
        }
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }

        builder.build()
    }

    /// Authenticated HTTP client
    pub fn http_client(&self) -> Result<HttpClient> {
        HttpClient::with_auth(self.http_config(), self.auth_config())
    }

    /// Stream catalog for this config
    pub fn catalog(&self) -> Catalog {
        Catalog::podbean(self.report_year, self.page_size)
    }

    /// Schema loader for this config
    pub fn schema_loader(&self) -> SchemaLoader {
        match &self.schemas_dir {
            Some(dir) => SchemaLoader::from_dir(dir),
            None => SchemaLoader::embedded(),
        }
    }

    /// Non-secret values exposed to templates as `config.*`
    pub fn template_values(&self) -> Value {
        json!({
            "api_url": self.api_url,
            "report_year": self.report_year,
            "page_size": self.page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let config = TapConfig::from_json_str(r#"{"client_id": "id", "client_secret": "s"}"#)
            .unwrap();

        assert_eq!(config.api_url, "https://api.podbean.com");
        assert_eq!(config.report_year, 2021);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.token_url(), "https://api.podbean.com/v1/oauth/token");
    }

    #[test]
    fn test_client_credentials_auth() {
        let config = TapConfig::from_json_str(
            r#"{"client_id": "id", "client_secret": "s", "api_url": "http://localhost:9000/"}"#,
        )
        .unwrap();

        match config.auth_config() {
            AuthConfig::ClientCredentials {
                token_url,
                client_id,
                client_secret,
                location,
            } => {
                assert_eq!(token_url, "http://localhost:9000/v1/oauth/token");
                assert_eq!(client_id, "id");
                assert_eq!(client_secret, "s");
                assert_eq!(location, Location::Query);
            }
            other => panic!("Expected client credentials, got {other:?}"),
        }
    }

    #[test]
    fn test_access_token_wins() {
        let config = TapConfig::from_json_str(
            r#"{"access_token": "tok", "client_id": "id", "client_secret": "s"}"#,
        )
        .unwrap();

        assert!(matches!(
            config.auth_config(),
            AuthConfig::AccessToken { ref token, location: Location::Query } if token == "tok"
        ));
    }

    #[test_case(r#"{}"#, "client_id" ; "nothing")]
    #[test_case(r#"{"client_id": "id"}"#, "client_secret" ; "no secret")]
    #[test_case(r#"{"client_id": " ", "client_secret": "s"}"#, "client_id" ; "blank id")]
    #[test_case(r#"{"access_token": ""}"#, "client_id" ; "empty token")]
    fn test_missing_credentials(json_str: &str, field: &str) {
        let err = TapConfig::from_json_str(json_str).unwrap_err();
        assert!(
            matches!(err, Error::MissingConfigField { field: ref f } if f == field),
            "unexpected error {err}"
        );
    }

    #[test_case(r#"{"access_token": "t", "api_url": "not a url"}"#, "api_url" ; "bad api url")]
    #[test_case(r#"{"access_token": "t", "token_url": "::"}"#, "token_url" ; "bad token url")]
    #[test_case(r#"{"access_token": "t", "page_size": 0}"#, "page_size" ; "zero page size")]
    #[test_case(r#"{"access_token": "t", "timeout_secs": 0}"#, "timeout_secs" ; "zero timeout")]
    fn test_invalid_values(json_str: &str, field: &str) {
        let err = TapConfig::from_json_str(json_str).unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfigValue { field: ref f, .. } if f == field),
            "unexpected error {err}"
        );
    }

    #[test]
    fn test_invalid_json() {
        let err = TapConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_load_precedence() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"access_token": "from-file", "report_year": 2020}}"#).unwrap();

        let config = TapConfig::load(Some(file.path()), None).unwrap();
        assert_eq!(config.report_year, 2020);

        let config = TapConfig::load(Some(file.path()), Some(r#"{"access_token": "inline"}"#))
            .unwrap();
        assert_eq!(config.access_token.as_deref(), Some("inline"));
        assert_eq!(config.report_year, 2021);

        assert!(TapConfig::load(None, None).is_err());
        assert!(TapConfig::load(Some(Path::new("/nonexistent/config.json")), None).is_err());
    }

    #[test]
    fn test_http_config() {
        let config = TapConfig::from_json_str(
            r#"{"access_token": "t", "max_retries": 1, "timeout_secs": 5, "requests_per_second": 0, "user_agent": "ua/1"}"#,
        )
        .unwrap();
        let http = config.http_config();

        assert_eq!(http.base_url.as_deref(), Some("https://api.podbean.com"));
        assert_eq!(http.max_retries, 1);
        assert_eq!(http.timeout, Duration::from_secs(5));
        assert!(http.rate_limit.is_none());
        assert_eq!(http.user_agent, "ua/1");
        assert!(http.default_headers.is_empty());

        let config = TapConfig::from_json_str(
            r#"{"access_token": "t", "headers": {"X-Client": "tap"}}"#,
        )
        .unwrap();
        let http = config.http_config();
        assert!(http.rate_limit.is_some());
        assert_eq!(http.default_headers.get("X-Client").map(String::as_str), Some("tap"));
    }

    #[test]
    fn test_catalog_and_templates() {
        let config =
            TapConfig::from_json_str(r#"{"access_token": "t", "report_year": 2024, "page_size": 10}"#)
                .unwrap();

        assert_eq!(config.catalog().streams().len(), 5);
        assert_eq!(config.template_values()["report_year"], 2024);
        assert!(config.template_values().get("access_token").is_none());
        assert!(config.schema_loader().dir().is_none());
    }
}
