//! Configuration for resolution runs.
//!
//! Configuration comes from three layers, later layers winning:
//!
//! 1. Built-in defaults ([`ResolverConfig::default`])
//! 2. A TOML file ([`ResolverConfig::from_file`])
//! 3. `SITEMAP_*` environment variables ([`ResolverConfig::apply_env`])
//!
//! ## Example Configuration File
//!
//! ```toml
//! concurrency = 4
//! fetch_concurrency = 32
//! max_depth = 2
//! error_policy = "best_effort"
//!
//! [fetch]
//! timeout_secs = 20
//! user_agent = "my-crawler/1.0"
//! max_redirects = 5
//! max_document_bytes = 52428800
//!
//! [fetch.headers]
//! Authorization = "Bearer token"
//! ```

use crate::decompress::DEFAULT_MAX_DOCUMENT_BYTES;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Default number of compressed documents decoded at once.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Default number of plain documents fetched at once.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 64;

/// Default number of levels resolved: parents and their direct children.
pub const DEFAULT_MAX_DEPTH: u8 = 2;

/// What a phase does when one of its references fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// The first failure (in submission order) fails the whole call and no
    /// partial result is returned.
    #[default]
    FailFast,
    /// Failures are recorded alongside whatever resolved successfully.
    BestEffort,
}

/// Settings for one resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum compressed documents fetched and decoded at once.
    pub concurrency: usize,
    /// Maximum plain documents fetched at once.
    pub fetch_concurrency: usize,
    /// Levels to resolve. `1` reads only the given references, `2` also
    /// reads the children of any index among them, and so on. Indices found
    /// at the last level are parsed but not expanded.
    pub max_depth: u8,
    /// Failure handling.
    pub error_policy: ErrorPolicy,
    /// HTTP settings.
    pub fetch: FetchConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            max_depth: DEFAULT_MAX_DEPTH,
            error_policy: ErrorPolicy::default(),
            fetch: FetchConfig::default(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Redirects followed before giving up.
    pub max_redirects: usize,
    /// Largest decompressed document accepted, in bytes.
    pub max_document_bytes: u64,
    /// Headers sent with every request, merged under per-call headers.
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("sitemap-urls/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 5,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            headers: BTreeMap::new(),
        }
    }
}

impl FetchConfig {
    /// Per-request timeout.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ResolverConfig {
    /// Defaults with the given decompression concurrency.
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Self::default()
        }
    }

    /// Load settings from a TOML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this structure.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `SITEMAP_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; split out so tests avoid
    /// mutating the process environment.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("SITEMAP_CONCURRENCY") {
            self.concurrency = parse_env("SITEMAP_CONCURRENCY", &value)?;
        }
        if let Some(value) = lookup("SITEMAP_FETCH_CONCURRENCY") {
            self.fetch_concurrency = parse_env("SITEMAP_FETCH_CONCURRENCY", &value)?;
        }
        if let Some(value) = lookup("SITEMAP_MAX_DEPTH") {
            self.max_depth = parse_env("SITEMAP_MAX_DEPTH", &value)?;
        }
        if let Some(value) = lookup("SITEMAP_TIMEOUT_SECS") {
            self.fetch.timeout_secs = parse_env("SITEMAP_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("SITEMAP_USER_AGENT") {
            self.fetch.user_agent = value;
        }
        Ok(())
    }

    /// Check that every limit is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for zero concurrency, zero depth or a zero
    /// timeout.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if self.fetch_concurrency == 0 {
            return Err(Error::Config(
                "fetch_concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".to_string()));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} has invalid value '{value}'")))
}
