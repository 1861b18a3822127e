//! Access layer configuration loading and validation

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::authorize::DEFAULT_PATTERN_CAPACITY;
use crate::hydrate::DEFAULT_MAX_DEPTH;

/// Overrides `hydration.max_depth`
pub const ENV_MAX_DEPTH: &str = "SPACEDOCK_MAX_HYDRATION_DEPTH";

/// Overrides `logging.level`
pub const ENV_LOG_LEVEL: &str = "SPACEDOCK_LOG_LEVEL";

/// Complete access layer configuration
///
/// Every section is optional; missing sections and keys take defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub hydration: HydrationSection,

    #[serde(default)]
    pub authorization: AuthorizationSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HydrationSection {
    /// Nested hydration levels per execution context
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuthorizationSection {
    /// Compiled parameter patterns kept in memory
    #[serde(default = "default_pattern_cache_capacity")]
    pub pattern_cache_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for HydrationSection {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl Default for AuthorizationSection {
    fn default() -> Self {
        Self {
            pattern_cache_capacity: default_pattern_cache_capacity(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_max_depth() -> usize { DEFAULT_MAX_DEPTH }
fn default_pattern_cache_capacity() -> usize { DEFAULT_PATTERN_CAPACITY }
fn default_log_level() -> String { "info".to_string() }

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl AccessConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read configuration file {}", path.as_ref().display()))?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AccessConfig = toml::from_str(contents)
            .context("Failed to parse configuration file")?;

        Ok(config)
    }

    /// Apply `SPACEDOCK_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_DEPTH) {
            self.hydration.max_depth = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_DEPTH} must be a non-negative integer, got {raw:?}"))?;
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level.trim().to_lowercase();
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Roles must arrive with their abilities when a user is hydrated
        if self.hydration.max_depth < 2 {
            anyhow::bail!("hydration.max_depth must be at least 2");
        }

        if self.authorization.pattern_cache_capacity == 0 {
            anyhow::bail!("authorization.pattern_cache_capacity must be at least 1");
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            );
        }

        Ok(())
    }
}
