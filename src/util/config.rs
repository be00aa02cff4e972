//! Configuration file support for bridgecraft.
//!
//! Two configuration file locations are read:
//! - Global: `~/.bridgecraft/config.toml` - User-wide defaults
//! - Project: `.bridgecraft/config.toml` - Overrides for the current directory
//!
//! Project config takes precedence over global config. Command-line flags and
//! `BRIDGECRAFT_*` environment variables take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::translation_unit::DEFAULT_UMBRELLA_HEADER;

/// Default location of the build tool.
pub const DEFAULT_XCODEBUILD: &str = "/usr/bin/xcodebuild";

/// Default location of the preprocessor.
pub const DEFAULT_CLANG: &str = "/usr/bin/clang";

/// Default interface-synthesis front end, looked up on `PATH`.
pub const DEFAULT_SOURCEKITTEN: &str = "sourcekitten";

/// bridgecraft configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool locations
    pub tools: ToolsConfig,

    /// Dry-run build settings
    pub build: BuildConfig,

    /// Interface generation settings
    pub generate: GenerateConfig,
}

/// Paths (or bare names) of the external tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub xcodebuild: Option<PathBuf>,
    pub clang: Option<PathBuf>,
    pub sourcekitten: Option<PathBuf>,
}

impl ToolsConfig {
    pub fn xcodebuild(&self) -> PathBuf {
        self.xcodebuild
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_XCODEBUILD))
    }

    pub fn clang(&self) -> PathBuf {
        self.clang
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLANG))
    }

    pub fn sourcekitten(&self) -> PathBuf {
        self.sourcekitten
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCEKITTEN))
    }
}

/// Dry-run build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// SDK override (see `xcodebuild -sdk`)
    pub sdk: Option<String>,

    /// Destination override (see `xcodebuild -destination`)
    pub destination: Option<String>,

    /// Pass `-UseModernBuildSystem=0`; dry runs need the legacy build system
    pub legacy_build_system: Option<bool>,
}

impl BuildConfig {
    pub fn legacy_build_system(&self) -> bool {
        self.legacy_build_system.unwrap_or(true)
    }
}

/// Interface generation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Assume headers are audited for nullability
    pub assume_nonnull: Option<bool>,

    /// Header imported ahead of the nullability brackets
    pub umbrella_header: Option<String>,
}

impl GenerateConfig {
    pub fn assume_nonnull(&self) -> bool {
        self.assume_nonnull.unwrap_or(false)
    }

    pub fn umbrella_header(&self) -> String {
        self.umbrella_header
            .clone()
            .unwrap_or_else(|| DEFAULT_UMBRELLA_HEADER.to_string())
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.tools.xcodebuild.is_some() {
            self.tools.xcodebuild = other.tools.xcodebuild;
        }
        if other.tools.clang.is_some() {
            self.tools.clang = other.tools.clang;
        }
        if other.tools.sourcekitten.is_some() {
            self.tools.sourcekitten = other.tools.sourcekitten;
        }

        if other.build.sdk.is_some() {
            self.build.sdk = other.build.sdk;
        }
        if other.build.destination.is_some() {
            self.build.destination = other.build.destination;
        }
        if other.build.legacy_build_system.is_some() {
            self.build.legacy_build_system = other.build.legacy_build_system;
        }

        if other.generate.assume_nonnull.is_some() {
            self.generate.assume_nonnull = other.generate.assume_nonnull;
        }
        if other.generate.umbrella_header.is_some() {
            self.generate.umbrella_header = other.generate.umbrella_header;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.bridgecraft/config.toml)
/// 2. Global config (~/.bridgecraft/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path.filter(|p| p.exists()) {
        config.merge(Config::load_or_default(global));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Load configuration from the standard locations.
pub fn load_default_config() -> Config {
    let cwd = std::env::current_dir().unwrap_or_default();
    let global = global_config_path();
    load_config(global.as_deref(), &project_config_path(&cwd))
}

/// Get the global bridgecraft config directory (~/.bridgecraft).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".bridgecraft"))
}

/// Get the global config path (~/.bridgecraft/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.bridgecraft/config.toml).
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(".bridgecraft").join("config.toml")
}
