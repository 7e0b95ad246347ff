//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming one explicit config file.
pub const CONFIG_PATH_ENV: &str = "SFDX_DECOMPOSER_CONFIG_PATH";
/// Environment variable overriding the output root.
pub const OUTPUT_DIR_ENV: &str = "SFDX_DECOMPOSER_OUTPUT_DIR";
/// Environment variable relocating the project tier directory.
pub const PROJECT_DIR_ENV: &str = "SFDX_DECOMPOSER_PROJECT_DIR";
/// Environment variable relocating the user tier directory.
pub const USER_DIR_ENV: &str = "SFDX_DECOMPOSER_USER_DIR";

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Embedded defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/sfdx-decomposer/)
    Project = 1,
    /// User-level config (~/.sfdx-decomposer/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Paths for each configuration tier.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
    /// Explicit config file; replaces the project and user tiers
    pub explicit_file: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        let user_dir = std::env::var(USER_DIR_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".sfdx-decomposer")));

        let project_dir = std::env::var(PROJECT_DIR_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("sfdx-decomposer")));

        let explicit_file = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);

        Self {
            project_dir,
            user_dir,
            explicit_file,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
            explicit_file: None,
        }
    }

    /// Use one explicit config file instead of the project and user tiers.
    pub fn with_explicit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each tier
    pub paths: ConfigPaths,
    /// Loaded configuration
    config: Config,
    /// Config files that contributed, lowest tier first
    sources: Vec<(ConfigTier, PathBuf)>,
}

impl ConfigLoader {
    /// Load configuration with explicit paths.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let mut configs: Vec<Value> = Vec::new();
        let mut sources = Vec::new();

        // Tier 1: Defaults (embedded)
        configs.push(serde_json::to_value(Config::default())?);

        if let Some(explicit) = &paths.explicit_file {
            // An explicit file must exist and parse; it is the only file tier.
            let content = std::fs::read_to_string(explicit)
                .with_context(|| format!("Failed to read config file {}", explicit.display()))?;
            let value: Value = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", explicit.display()))?;
            configs.push(value);
            sources.push((ConfigTier::Project, explicit.clone()));
        } else {
            // Tier 2: Project config
            if let Some(dir) = &paths.project_dir
                && let Some(value) = read_tier_file(&dir.join(CONFIG_FILE))
            {
                configs.push(value);
                sources.push((ConfigTier::Project, dir.join(CONFIG_FILE)));
            }

            // Tier 3: User config
            if let Some(dir) = &paths.user_dir
                && let Some(value) = read_tier_file(&dir.join(CONFIG_FILE))
            {
                configs.push(value);
                sources.push((ConfigTier::User, dir.join(CONFIG_FILE)));
            }
        }

        let merged = deep_merge_all(configs);
        let mut config: Config =
            serde_json::from_value(merged).context("Invalid merged configuration")?;

        // Tier 4: Environment variable overrides
        Self::apply_env_overrides(&mut config);

        for (tier, path) in &sources {
            debug!(tier = %tier, path = %path.display(), "Loaded config tier");
        }

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut Config) {
        if let Ok(output_dir) = std::env::var(OUTPUT_DIR_ENV) {
            config.output_dir = PathBuf::from(output_dir);
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[(ConfigTier, PathBuf)] {
        &self.sources
    }
}

/// Read an optional tier file. Missing files are silent, broken ones warn.
fn read_tier_file(path: &Path) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring invalid config file");
            None
        }
    }
}
