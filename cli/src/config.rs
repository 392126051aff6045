//! Process-scoped console configuration.
//!
//! Each [`AutoCli`](crate::AutoCli) owns one [`CliConfig`], so several CLI
//! instances can live in one process (tests do this) without sharing
//! banner or color state.
//!
//! # Example YAML
//!
//! ```yaml
//! quiet: true
//! color: false
//! ```

use std::io::{BufReader, IsTerminal};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable that enables quiet mode when set to a truthy value.
pub const QUIET_ENV: &str = "AUTOCLI_QUIET";

/// Errors loading a [`CliConfig`] from disk.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Console behavior of a CLI instance.
///
/// # Examples
///
/// ```
/// use autocli::CliConfig;
///
/// let config = CliConfig::default();
/// assert!(!config.quiet);
/// assert!(!config.color);
///
/// let config = CliConfig::quiet();
/// assert!(config.quiet);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Suppress the starting/done/failed banners.
    pub quiet: bool,
    /// Colorize banners and help output.
    pub color: bool,
}

impl CliConfig {
    /// Quiet, uncolored configuration.
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            color: false,
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// Quiet mode follows [`QUIET_ENV`]; color is enabled when stdout is a
    /// terminal and `NO_COLOR` is unset.
    pub fn from_env() -> Self {
        let quiet = std::env::var(QUIET_ENV).is_ok_and(|v| is_truthy(&v));
        let color = std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
        Self { quiet, color }
    }

    /// Loads configuration from a YAML file.
    ///
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Io`] if the file cannot be read, or
    /// [`ConfigFileError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let file = std::fs::File::open(path)?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
