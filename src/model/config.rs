use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TlsBackend {
    #[default]
    Rustls,
    NativeTls,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// API key protecting the HTTP API (optional, empty = disabled)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the identity gateway
    #[serde(default = "default_identity_url")]
    pub identity_url: String,

    /// Journey started when a start request names none
    #[serde(default = "default_journey")]
    pub default_journey: String,

    /// Redirect destination after logout
    #[serde(default = "default_home_path")]
    pub home_path: String,

    /// Delay before the post-logout redirect, in milliseconds
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,

    /// Extra step types rendered with the generic field form
    #[serde(default)]
    pub form_steps: Vec<String>,

    /// Identity service request timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub tls_backend: TlsBackend,

    /// HTTP proxy URL (optional)
    /// Supported formats: http://host:port, https://host:port, socks5://host:port
    #[serde(default)]
    pub proxy_url: Option<String>,

    /// Proxy authentication username (optional)
    #[serde(default)]
    pub proxy_username: Option<String>,

    /// Proxy authentication password (optional)
    #[serde(default)]
    pub proxy_password: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_identity_url() -> String {
    "http://127.0.0.1:9000".to_string()
}

fn default_journey() -> String {
    "Login".to_string()
}

fn default_home_path() -> String {
    "/home".to_string()
}

fn default_redirect_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            identity_url: default_identity_url(),
            default_journey: default_journey(),
            home_path: default_home_path(),
            redirect_delay_ms: default_redirect_delay_ms(),
            form_steps: Vec::new(),
            request_timeout_secs: default_request_timeout_secs(),
            tls_backend: TlsBackend::default(),
            proxy_url: None,
            proxy_username: None,
            proxy_password: None,
        }
    }
}

impl Config {
    /// Get default config file path
    pub fn default_config_path() -> &'static str {
        "config.json"
    }

    /// Load configuration from file
    ///
    /// A missing file yields the default configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    /// API key, if one is configured and non-empty
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.home_path, "/home");
        assert_eq!(config.redirect_delay(), Duration::from_millis(1000));
        assert_eq!(config.default_journey, "Login");
        assert_eq!(config.tls_backend, TlsBackend::Rustls);
        assert!(config.form_steps.is_empty());
    }

    #[test]
    fn test_camel_case_keys() {
        let config: Config = serde_json::from_str(
            r#"{
                "identityUrl": "https://id.example.com",
                "redirectDelayMs": 250,
                "formSteps": ["choice", "kba"],
                "tlsBackend": "native-tls"
            }"#,
        )
        .unwrap();
        assert_eq!(config.identity_url, "https://id.example.com");
        assert_eq!(config.redirect_delay(), Duration::from_millis(250));
        assert_eq!(config.form_steps, vec!["choice", "kba"]);
        assert_eq!(config.tls_backend, TlsBackend::NativeTls);
    }

    #[test]
    fn test_empty_api_key_is_disabled() {
        let mut config = Config::default();
        assert!(config.effective_api_key().is_none());

        config.api_key = Some("   ".to_string());
        assert!(config.effective_api_key().is_none());

        config.api_key = Some("secret".to_string());
        assert_eq!(config.effective_api_key(), Some("secret"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load("does-not-exist/config.json").unwrap();
        assert_eq!(config.host, "127.0.0.1");
    }
}
