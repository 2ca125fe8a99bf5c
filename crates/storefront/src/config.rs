//! Suite configuration
//!
//! Defaults target the public demo shop with its standard test account.
//! Values are layered: defaults, then an optional YAML file, then
//! `STOREFRONT_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::result::{ShopError, ShopResult};
use crate::wait::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

/// Default storefront URL
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com";

/// Environment variable naming a YAML config file
pub const CONFIG_PATH_ENV: &str = "STOREFRONT_CONFIG";

/// Login credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The storefront's standard test account
    #[must_use]
    pub fn standard_user() -> Self {
        Self::new("standard_user", "secret_sauce")
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::standard_user()
    }
}

/// Configuration for a test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Storefront base URL
    pub base_url: String,
    /// Account the session fixture logs in with
    pub credentials: Credentials,
    /// Timeout for waits and actions that do not specify one
    pub default_timeout_ms: u64,
    /// Timeout for the post-login marker in the session fixture
    pub login_timeout_ms: u64,
    /// Polling interval for waits
    pub poll_interval_ms: u64,
    /// Run the browser headless
    pub headless: bool,
    /// Chromium executable (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Chromium sandbox (disable for containers)
    pub sandbox: bool,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::default(),
            default_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            login_timeout_ms: 10_000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            headless: true,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl ShopConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, then the file named by `STOREFRONT_CONFIG` (if set), then
    /// environment overrides
    pub fn load() -> ShopResult<Self> {
        let base = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_yaml_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Read a YAML file; missing keys keep their defaults
    pub fn from_yaml_file(path: &Path) -> ShopResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Parse YAML text; missing keys keep their defaults
    pub fn from_yaml(text: &str) -> ShopResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STOREFRONT_*` overrides from `lookup`
    pub fn with_env_overrides<F>(mut self, lookup: F) -> ShopResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("STOREFRONT_BASE_URL") {
            self.base_url = url;
        }
        if let Some(username) = lookup("STOREFRONT_USERNAME") {
            self.credentials.username = username;
        }
        if let Some(password) = lookup("STOREFRONT_PASSWORD") {
            self.credentials.password = password;
        }
        if let Some(ms) = lookup("STOREFRONT_TIMEOUT_MS") {
            self.default_timeout_ms = parse_env("STOREFRONT_TIMEOUT_MS", &ms)?;
        }
        if let Some(ms) = lookup("STOREFRONT_LOGIN_TIMEOUT_MS") {
            self.login_timeout_ms = parse_env("STOREFRONT_LOGIN_TIMEOUT_MS", &ms)?;
        }
        if let Some(flag) = lookup("STOREFRONT_HEADLESS") {
            self.headless = parse_bool("STOREFRONT_HEADLESS", &flag)?;
        }
        if let Some(path) = lookup("STOREFRONT_CHROMIUM_PATH") {
            self.chromium_path = Some(PathBuf::from(path));
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values no run could use
    pub fn validate(&self) -> ShopResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ShopError::config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ShopError::config("poll_interval_ms must be positive"));
        }
        Ok(())
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the credentials
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the default timeout
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Set the login timeout
    #[must_use]
    pub const fn with_login_timeout(mut self, timeout_ms: u64) -> Self {
        self.login_timeout_ms = timeout_ms;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Default timeout as Duration
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Login timeout as Duration
    #[must_use]
    pub const fn login_timeout(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms)
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Absolute URL for a site path
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

/// Resolve `path` against `base`; absolute URLs pass through
pub(crate) fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.contains("://") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

fn parse_env(key: &str, value: &str) -> ShopResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ShopError::config(format!("{key} must be a number of milliseconds, got {value:?}")))
}

fn parse_bool(key: &str, value: &str) -> ShopResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ShopError::config(format!("{key} must be a boolean, got {value:?}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = ShopConfig::default();
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.credentials, Credentials::standard_user());
            assert_eq!(config.default_timeout(), Duration::from_secs(5));
            assert!(config.headless);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_builder() {
            let config = ShopConfig::new()
                .with_base_url("http://localhost:3000")
                .with_credentials(Credentials::new("problem_user", "secret_sauce"))
                .with_default_timeout(250)
                .with_login_timeout(500)
                .with_headless(false);
            assert_eq!(config.base_url, "http://localhost:3000");
            assert_eq!(config.credentials.username, "problem_user");
            assert_eq!(config.login_timeout(), Duration::from_millis(500));
            assert!(!config.headless);
        }

        #[test]
        fn test_url_for() {
            let config = ShopConfig::new().with_base_url("http://localhost:3000/");
            assert_eq!(config.url_for("/cart.html"), "http://localhost:3000/cart.html");
            assert_eq!(config.url_for("cart.html"), "http://localhost:3000/cart.html");
            assert_eq!(
                config.url_for("https://www.saucedemo.com/"),
                "https://www.saucedemo.com/"
            );
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = ShopConfig::from_yaml("base_url: http://127.0.0.1:8080\n").unwrap();
            assert_eq!(config.base_url, "http://127.0.0.1:8080");
            assert_eq!(config.credentials, Credentials::standard_user());
            assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_yaml_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(
                file,
                "credentials:\n  username: visual_user\n  password: secret_sauce\nheadless: false"
            )
            .unwrap();
            let config = ShopConfig::from_yaml_file(file.path()).unwrap();
            assert_eq!(config.credentials.username, "visual_user");
            assert!(!config.headless);
        }

        #[test]
        fn test_invalid_base_url_rejected() {
            let err = ShopConfig::from_yaml("base_url: saucedemo\n").unwrap_err();
            assert!(matches!(err, ShopError::Config { .. }));
        }

        #[test]
        fn test_missing_file_is_io_error() {
            let err = ShopConfig::from_yaml_file(Path::new("/nonexistent/storefront.yaml"))
                .unwrap_err();
            assert!(matches!(err, ShopError::Io(_)));
        }
    }

    mod env_tests {
        use super::*;

        #[test]
        fn test_overrides() {
            let config = ShopConfig::default()
                .with_env_overrides(env(&[
                    ("STOREFRONT_BASE_URL", "http://localhost:9000"),
                    ("STOREFRONT_USERNAME", "error_user"),
                    ("STOREFRONT_TIMEOUT_MS", "1200"),
                    ("STOREFRONT_HEADLESS", "off"),
                    ("STOREFRONT_CHROMIUM_PATH", "/usr/bin/chromium"),
                ]))
                .unwrap();
            assert_eq!(config.base_url, "http://localhost:9000");
            assert_eq!(config.credentials.username, "error_user");
            assert_eq!(config.credentials.password, "secret_sauce");
            assert_eq!(config.default_timeout_ms, 1200);
            assert!(!config.headless);
            assert_eq!(config.chromium_path, Some(PathBuf::from("/usr/bin/chromium")));
        }

        #[test]
        fn test_bad_number_is_config_error() {
            let err = ShopConfig::default()
                .with_env_overrides(env(&[("STOREFRONT_TIMEOUT_MS", "soon")]))
                .unwrap_err();
            assert!(err.to_string().contains("STOREFRONT_TIMEOUT_MS"));
        }

        #[test]
        fn test_bad_bool_is_config_error() {
            let err = ShopConfig::default()
                .with_env_overrides(env(&[("STOREFRONT_HEADLESS", "maybe")]))
                .unwrap_err();
            assert!(matches!(err, ShopError::Config { .. }));
        }
    }
}
