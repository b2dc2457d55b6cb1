// ABOUTME: Application settings controlling where ssh config files are looked up
// ABOUTME: Loaded from an optional TOML file; a missing file means built-in defaults

use crate::env::expand_tilde;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub ssh: SshSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SshSettings {
    /// Extra ssh config files, tried after the platform defaults.
    #[serde(default)]
    pub extra_config_paths: Vec<String>,
    /// Ignore the platform default ssh config locations.
    #[serde(default)]
    pub skip_default_paths: bool,
}

impl Config {
    pub fn default_config_content() -> &'static str {
        r#"# sshtarget configuration

[ssh]
# Additional ssh config files to read after the platform defaults
# (~/.ssh/config, plus the Git for Windows ssh_config on Windows).
# Earlier files win: the first value found for a setting is kept.
extra_config_paths = []

# Set to true to only read extra_config_paths.
skip_default_paths = false
"#
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::load_from_str(&content)
    }

    /// Like [`Config::load_from_file`], but a file that does not exist yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(config_dir.join("sshtarget").join("config.toml"))
    }

    pub fn expand_paths(&mut self, home: &Path) {
        for path in &mut self.ssh.extra_config_paths {
            *path = expand_tilde(path, home);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self
            .ssh
            .extra_config_paths
            .iter()
            .any(|p| p.trim().is_empty())
        {
            anyhow::bail!("extra_config_paths cannot contain empty entries");
        }

        if self.ssh.skip_default_paths && self.ssh.extra_config_paths.is_empty() {
            tracing::warn!(
                "skip_default_paths is set without extra_config_paths; no ssh config will be read"
            );
        }

        Ok(())
    }

    /// Writes [`Config::default_config_content`] to `path`, creating parent directories.
    pub fn save_default_config(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Configuration file already exists: {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config to: {}", path.display()))?;

        Ok(())
    }
}
