//! Configuration management for iocsync.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::IocsyncError;
use crate::store::StoreFormat;
use crate::validation::validate_window;

/// Secure string type that zeroizes memory on drop
/// Used for sensitive data like API keys
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecureString(String);

impl SecureString {
    pub fn new(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding indicator stores and the state file
    pub data_dir: PathBuf,

    /// Indicator feeds
    pub feeds: Vec<FeedConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("iocs"),
            feeds: default_feeds(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to built-in defaults when the file
    /// does not exist (mirrors running without a config at all).
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();

        for feed in &self.feeds {
            if feed.name.is_empty() {
                return Err(IocsyncError::Config("Feed name cannot be empty".to_string()).into());
            }
            if !seen.insert(feed.name.as_str()) {
                return Err(
                    IocsyncError::Config(format!("Duplicate feed name '{}'", feed.name)).into(),
                );
            }
            if !feed.url.starts_with("https://") {
                return Err(IocsyncError::Config(format!(
                    "Feed '{}' URL must use HTTPS: {}",
                    feed.name, feed.url
                ))
                .into());
            }
            if feed.api_key_env.is_empty() {
                return Err(IocsyncError::Config(format!(
                    "Feed '{}' has no api_key_env configured",
                    feed.name
                ))
                .into());
            }
            if feed.timeout_secs == 0 {
                return Err(IocsyncError::Config(format!(
                    "Feed '{}' timeout must be positive",
                    feed.name
                ))
                .into());
            }
            if let Some(ref window) = feed.window {
                validate_window(window).map_err(|e| {
                    IocsyncError::Config(format!("Feed '{}': {}", feed.name, e))
                })?;
            }
        }

        Ok(())
    }

    /// Select the feeds a sync run operates on.
    ///
    /// With a name, that single feed is returned even if disabled (explicit
    /// selection wins). Without one, all enabled feeds are returned.
    pub fn select_feeds(&self, name: Option<&str>) -> Result<Vec<&FeedConfig>> {
        match name {
            Some(name) => {
                let feed = self
                    .feeds
                    .iter()
                    .find(|f| f.name == name)
                    .ok_or_else(|| IocsyncError::Config(format!("Unknown feed '{}'", name)))?;
                Ok(vec![feed])
            }
            None => Ok(self.feeds.iter().filter(|f| f.enabled).collect()),
        }
    }

    /// Path of the sync state file
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }
}

/// How a feed serves its indicators
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// Newline-delimited indicator export
    #[default]
    Export,
    /// JSON blacklist: an object with a `results` list, or a top-level list
    Blacklist,
}

/// A single indicator feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    pub kind: FeedKind,
    pub enabled: bool,

    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Request header the API key is sent in
    pub api_key_header: String,

    /// Indicator type requested from the feed and kept from its records
    pub indicator_type: String,
    /// Trailing collection window (e.g. "30d"); omitted means full history
    pub window: Option<String>,
    /// Minimum confidence score, filtered server-side
    pub min_confidence: Option<u32>,
    /// Maximum number of results requested
    pub limit: Option<u32>,
    /// Response format hint forwarded to the feed
    pub format: Option<String>,
    pub timeout_secs: u64,

    /// Drop candidates that are not well-formed IPv4 addresses
    pub validate: bool,

    /// Store path; defaults to `<data_dir>/<name>.csv`
    pub store: Option<PathBuf>,
    pub store_format: StoreFormat,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            kind: FeedKind::Export,
            enabled: true,
            api_key_env: "OTX_API_KEY".to_string(),
            api_key_header: "X-OTX-API-KEY".to_string(),
            indicator_type: "IPv4".to_string(),
            window: None,
            min_confidence: None,
            limit: None,
            format: None,
            timeout_secs: 60,
            validate: true,
            store: None,
            store_format: StoreFormat::Values,
        }
    }
}

impl FeedConfig {
    /// Resolve the API key from the configured environment variable.
    ///
    /// A missing or empty variable is a fatal configuration error, surfaced
    /// before any network I/O. The key is returned as a [`SecureString`]
    /// that is zeroed when dropped.
    pub fn api_key(&self) -> Result<SecureString> {
        match env::var(&self.api_key_env) {
            Ok(value) if !value.is_empty() => Ok(SecureString::new(value)),
            _ => Err(IocsyncError::Config(format!(
                "{} environment variable not set",
                self.api_key_env
            ))
            .into()),
        }
    }

    /// Path of this feed's indicator store
    pub fn store_path(&self, data_dir: &Path) -> PathBuf {
        match self.store {
            Some(ref path) => path.clone(),
            None => data_dir.join(format!("{}.csv", self.name)),
        }
    }
}

/// Built-in feeds, mirroring the upstream collector scripts
fn default_feeds() -> Vec<FeedConfig> {
    vec![
        FeedConfig {
            name: "otx_ipv4".to_string(),
            url: "https://otx.alienvault.com/api/v1/indicators/export".to_string(),
            kind: FeedKind::Export,
            ..FeedConfig::default()
        },
        FeedConfig {
            name: "blacklist_ipv4".to_string(),
            url: "https://otx.alienvault.com/api/v1/indicators".to_string(),
            kind: FeedKind::Blacklist,
            enabled: false,
            store_format: StoreFormat::Full,
            ..FeedConfig::default()
        },
    ]
}
