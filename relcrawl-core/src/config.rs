//! Runtime configuration resolved from defaults, an optional `.env` file and
//! the process environment (highest priority).

use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const API_KEY_VAR: &str = "RELCRAWL_API_KEY";
pub const LEGACY_API_KEY_VAR: &str = "API_KEY";
pub const BASE_URL_VAR: &str = "RELCRAWL_BASE_URL";
pub const API_URL_VAR: &str = "RELCRAWL_API_URL";
pub const TIMEOUT_VAR: &str = "RELCRAWL_TIMEOUT_SECS";

const KNOWN_VARS: [&str; 5] = [
    API_KEY_VAR,
    LEGACY_API_KEY_VAR,
    BASE_URL_VAR,
    API_URL_VAR,
    TIMEOUT_VAR,
];

/// Which fetcher implementation backs the crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetcherKind {
    /// Scrape watch pages over HTTP
    #[default]
    Scrape,
    /// Query the hosted metadata API (needs an API key)
    Api,
}

impl FetcherKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "scrape" | "html" => Some(FetcherKind::Scrape),
            "api" => Some(FetcherKind::Api),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub api_url: Url,
    pub timeout_secs: u64,
}

impl Config {
    /// Reads `env_file` when it exists (a missing file is not an error), then
    /// overlays the process environment.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        let env: HashMap<String, String> = KNOWN_VARS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();
        Self::load_with_env(env_file, &env)
    }

    /// Like [`Config::load`], with `env` standing in for the process
    /// environment. Entries in `env` win over the file.
    pub fn load_with_env(env_file: Option<&Path>, env: &HashMap<String, String>) -> Result<Self> {
        let mut vars = HashMap::new();

        if let Some(path) = env_file
            && path.exists()
        {
            let entries = dotenvy::from_path_iter(path)
                .with_context(|| format!("Failed to open env file {}", path.display()))?;
            for entry in entries {
                let (key, value) = entry
                    .with_context(|| format!("Failed to parse env file {}", path.display()))?;
                vars.insert(key, value);
            }
        }

        for key in KNOWN_VARS {
            if let Some(value) = env.get(key) {
                vars.insert(key.to_string(), value.clone());
            }
        }

        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let lookup = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let api_key = lookup(API_KEY_VAR)
            .or_else(|| lookup(LEGACY_API_KEY_VAR))
            .map(str::to_string);

        let base_url = parse_url(BASE_URL_VAR, lookup(BASE_URL_VAR).unwrap_or(DEFAULT_BASE_URL))?;
        let api_url = parse_url(API_URL_VAR, lookup(API_URL_VAR).unwrap_or(DEFAULT_API_URL))?;

        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("{} must be a whole number of seconds, got '{}'", TIMEOUT_VAR, raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            base_url,
            api_url,
            timeout_secs,
        })
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "The api fetcher needs a credential: set {} (or {})",
                API_KEY_VAR,
                LEGACY_API_KEY_VAR
            )
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).with_context(|| format!("{} is not a valid URL: '{}'", key, raw))
}
