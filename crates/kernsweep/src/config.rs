//! Configuration loading and types

use std::path::{Path, PathBuf};
use std::time::Duration;

use kernsweep_exec::CommandLine;
use kernsweep_pkg::DpkgHostConfig;
use serde::{Deserialize, Serialize};

/// Contents of `kernsweep.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Log level when neither `--verbose` nor `RUST_LOG` is given
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Prefix apt-get and the bootloader command with sudo
    #[serde(default)]
    pub use_sudo: bool,
    /// Argv of the bootloader regeneration command
    #[serde(default = "default_bootloader_command")]
    pub bootloader_command: Vec<String>,
    /// Timeout for `uname` and `dpkg` queries, in seconds
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            use_sudo: false,
            bootloader_command: default_bootloader_command(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_bootloader_command() -> Vec<String> {
    vec!["update-grub".to_string()]
}

fn default_query_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("cannot read {}: {e}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Load from the explicit path, the environment, or the default paths
    ///
    /// Returns the path that was used, `None` when falling back to defaults.
    ///
    /// # Errors
    /// Returns error if a selected file cannot be read or parsed
    pub fn load_default(explicit: Option<&Path>) -> eyre::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        // Check environment variable
        if let Ok(path) = std::env::var("KERNSWEEP_CONFIG") {
            let path = PathBuf::from(path);
            return Ok((Self::load(&path)?, Some(path)));
        }

        // Try common paths
        let mut paths = vec![
            PathBuf::from("kernsweep.toml"),
            PathBuf::from("/etc/kernsweep/kernsweep.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("kernsweep/kernsweep.toml"));
        }

        for path in paths {
            if path.exists() {
                return Ok((Self::load(&path)?, Some(path)));
            }
        }

        Ok((Config::default(), None))
    }

    /// Settings for the dpkg package host
    ///
    /// # Errors
    /// Returns error if `bootloader_command` is empty
    pub fn host_config(&self) -> eyre::Result<DpkgHostConfig> {
        let bootloader_command = CommandLine::from_argv(&self.bootloader_command)
            .ok_or_else(|| eyre::eyre!("bootloader_command must not be empty"))?;

        Ok(DpkgHostConfig {
            use_sudo: self.use_sudo,
            bootloader_command,
            query_timeout: Duration::from_secs(self.query_timeout_secs),
        })
    }
}
