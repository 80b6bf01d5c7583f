//! Configuration management for enginevfs

use crate::error::{Error, Result};
use crate::fs::StoreOptions;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extra mount roots, separated like `PATH`
pub const ENV_MOUNTS: &str = "ENGINEVFS_MOUNTS";

/// Override for `follow_symlinks`
pub const ENV_FOLLOW_SYMLINKS: &str = "ENGINEVFS_FOLLOW_SYMLINKS";

/// Overlay configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VfsConfig {
    /// Mount roots in resolution order (first wins)
    pub mounts: Vec<PathBuf>,

    /// Stat through symlinks instead of reporting the link itself
    pub follow_symlinks: bool,
}

impl Default for VfsConfig {
    fn default() -> Self {
        VfsConfig {
            mounts: Vec::new(),
            follow_symlinks: true,
        }
    }
}

impl VfsConfig {
    /// Load configuration from a file, with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!("Failed to read config file: {}", e))
        })?;

        let mut config: VfsConfig = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config file: {}", e))
        })?;

        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Create a config from environment variables only
    pub fn from_env() -> Result<Self> {
        let mut config = VfsConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var_os(key));
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<OsString>,
    {
        // Env mounts go after the file's mounts; paths stay as raw OS strings
        if let Some(mounts) = lookup(ENV_MOUNTS) {
            self.mounts
                .extend(std::env::split_paths(&mounts).filter(|p| !p.as_os_str().is_empty()));
        }

        if let Some(follow) = lookup(ENV_FOLLOW_SYMLINKS) {
            match follow.to_string_lossy().trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.follow_symlinks = true,
                "0" | "false" | "no" => self.follow_symlinks = false,
                _ => {}
            }
        }
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path.as_ref(), content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(index) = self.mounts.iter().position(|m| m.as_os_str().is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "Mount root #{} is empty",
                index
            )));
        }

        Ok(())
    }

    /// Options for the stores this config mounts
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            follow_symlinks: self.follow_symlinks,
        }
    }
}
