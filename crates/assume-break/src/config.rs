//! Runtime settings.
//!
//! Resolution order: built-in defaults, then an optional TOML file
//! (`ASSUME_BREAK_CONFIG`, or `./assume-break.toml` when present), then
//! environment variables. Later sources win.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use coordination::RetryPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "assume-break.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },
}

/// Settings shared by every capability in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Empty means no credentials: every capability runs its fallback.
    pub anthropic_api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Default revision cap when the caller does not pass one.
    pub max_revisions: u32,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            anthropic_api_key: String::new(),
            model: "claude-sonnet-4-5-20250929".into(),
            max_tokens: 4096,
            temperature: 0.7,
            max_revisions: 3,
            api_base_url: "https://api.anthropic.com".into(),
            request_timeout_secs: 120,
            retry: RetryPolicy::default(),
        }
    }
}

impl Settings {
    /// Load from the default file location and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("ASSUME_BREAK_CONFIG").ok().map(PathBuf::from);
        let file = match explicit {
            Some(path) => Some(path),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            }
        };
        Self::from_sources(file.as_deref(), |var| std::env::var(var).ok())
    }

    /// Layer `file` (if any) and the variables visible through `env` over
    /// the defaults.
    pub fn from_sources(
        file: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut settings = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(env)?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(key) = env("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = key.trim().to_string();
        }
        if let Some(model) = env("CLAUDE_MODEL") {
            self.model = model;
        }
        if let Some(url) = env("ANTHROPIC_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(raw) = env("MAX_TOKENS") {
            self.max_tokens = parse_env("MAX_TOKENS", raw)?;
        }
        if let Some(raw) = env("TEMPERATURE") {
            self.temperature = parse_env("TEMPERATURE", raw)?;
        }
        if let Some(raw) = env("MAX_REVISIONS") {
            self.max_revisions = parse_env("MAX_REVISIONS", raw)?;
        }
        Ok(())
    }

    /// Whether an oracle can be reached at all.
    pub fn has_credentials(&self) -> bool {
        !self.anthropic_api_key.is_empty()
    }
}

fn parse_env<T: std::str::FromStr>(var: &str, raw: String) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: raw,
    })
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Process-wide settings, loaded on first use.
pub fn settings() -> Result<&'static Settings, ConfigError> {
    if let Some(settings) = SETTINGS.get() {
        return Ok(settings);
    }
    let loaded = Settings::load()?;
    Ok(SETTINGS.get_or_init(|| loaded))
}
