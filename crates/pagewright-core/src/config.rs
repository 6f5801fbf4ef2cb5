//! Suite configuration.
//!
//! A [`SuiteConfig`] is loaded once per run and passed explicitly into the
//! session and façade; nothing here is global. The file is JSON, by default
//! at `~/.pagewright/config.json`.
//!
//! # Example
//!
//! ```no_run
//! use pagewright_core::config::SuiteConfig;
//!
//! // Load (returns defaults if the default file doesn't exist)
//! let config = SuiteConfig::load_or_default(None).expect("bad config");
//!
//! let env = config.environment(None);
//! println!("Base URL: {}", env.url);
//! println!("Medium wait: {:?}", config.wait_tiers().medium);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::wait::WaitTiers;

const CONFIG_FILENAME: &str = "config.json";

/// Environment used when none is named and `default_env` is unset, and the
/// fallback for unknown names.
pub const FALLBACK_ENV: &str = "uat";

const REDACTED: &str = "***";

/// Returns the pagewright home directory (`~/.pagewright/`).
pub fn pagewright_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pagewright")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One target deployment of the console under test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Base URL; relative paths passed to `Page::open` are joined to it.
    pub url: String,
    pub username: String,
    pub password: String,
}

/// Browser and WebDriver connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver, selenium grid).
    pub webdriver_url: String,
    pub headless: bool,
    /// Extra browser command-line arguments.
    pub args: Vec<String>,
    pub page_load_timeout_secs: u64,
    pub accept_insecure_certs: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: false,
            args: Vec::new(),
            page_load_timeout_secs: 30,
            accept_insecure_certs: true,
        }
    }
}

/// Timeout tiers in whole seconds, as they appear in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub short: u64,
    pub medium: u64,
    pub long: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            short: 5,
            medium: 10,
            long: 30,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Environment used when the caller doesn't name one.
    pub default_env: Option<String>,
    pub environments: BTreeMap<String, EnvironmentConfig>,
    pub browser: BrowserConfig,
    pub wait: WaitConfig,
    pub poll_interval_ms: u64,
    /// Bounded settle delay after scrolls and overlay animations that expose
    /// no observable signal.
    pub settle_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            default_env: None,
            environments: BTreeMap::new(),
            browser: BrowserConfig::default(),
            wait: WaitConfig::default(),
            poll_interval_ms: 100,
            settle_ms: 500,
            screenshot_dir: None,
            log_dir: None,
        }
    }
}

impl SuiteConfig {
    /// The default config path (`~/.pagewright/config.json`).
    pub fn default_path() -> PathBuf {
        pagewright_dir().join(CONFIG_FILENAME)
    }

    /// Load config from `path`. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SuiteConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load from an explicit path, or from the default path when `None`.
    ///
    /// Only the default path may be absent; it then yields [`Default`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let p = Self::default_path();
                if p.exists() {
                    Self::load(&p)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Resolve an environment by name.
    ///
    /// Falls back to `default_env`, then to [`FALLBACK_ENV`]; an unknown name
    /// logs a warning and uses [`FALLBACK_ENV`] (empty if that is missing too).
    pub fn environment(&self, name: Option<&str>) -> EnvironmentConfig {
        let name = name
            .or(self.default_env.as_deref())
            .unwrap_or(FALLBACK_ENV);
        if let Some(env) = self.environments.get(name) {
            return env.clone();
        }
        warn!(env = name, fallback = FALLBACK_ENV, "Unknown environment");
        self.environments
            .get(FALLBACK_ENV)
            .cloned()
            .unwrap_or_default()
    }

    pub fn wait_tiers(&self) -> WaitTiers {
        WaitTiers {
            short: Duration::from_secs(self.wait.short),
            medium: Duration::from_secs(self.wait.medium),
            long: Duration::from_secs(self.wait.long),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        self.screenshot_dir
            .clone()
            .unwrap_or_else(|| pagewright_dir().join("screenshots"))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| pagewright_dir().join("logs"))
    }

    /// A copy safe to print: every non-empty password becomes `***`.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for env in config.environments.values_mut() {
            if !env.password.is_empty() {
                env.password = REDACTED.to_string();
            }
        }
        config
    }

    /// Save config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
