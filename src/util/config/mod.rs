//! Console configuration
//!
//! User-level settings loaded from `<config dir>/config.toml`.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. User-level (~/.config/pnr-repl/config.toml)
//! 3. Default values
//! ```
//!
//! # Example
//!
//! ```toml
//! [repl]
//! history_size = 2000
//! console = "rich"
//! edit_mode = "vi"
//! startup = ["print(ctx)"]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// REPL settings
    #[serde(default)]
    pub repl: ReplConfig,
}

/// Which console front end to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleKind {
    /// Plain streams
    #[default]
    Plain,
    /// Coloured output
    Rich,
}

/// Line editing key bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    Emacs,
    Vi,
}

/// REPL configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplConfig {
    /// Maximum retained history entries
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    /// History file path (`<state dir>/history` when unset)
    #[serde(default)]
    pub history_file: Option<PathBuf>,
    /// Primary prompt
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Prompt while a statement is incomplete
    #[serde(default = "default_continuation_prompt")]
    pub continuation_prompt: String,
    #[serde(default)]
    pub console: ConsoleKind,
    #[serde(default)]
    pub edit_mode: EditMode,
    /// Enable coloured output (rich console only)
    #[serde(default = "default_colors")]
    pub colors: bool,
    /// Statements run before the banner
    #[serde(default)]
    pub startup: Vec<String>,
}

fn default_history_size() -> usize {
    4096
}

fn default_prompt() -> String {
    ">>> ".to_string()
}

fn default_continuation_prompt() -> String {
    "... ".to_string()
}

fn default_colors() -> bool {
    true
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            history_file: None,
            prompt: default_prompt(),
            continuation_prompt: default_continuation_prompt(),
            console: ConsoleKind::default(),
            edit_mode: EditMode::default(),
            colors: default_colors(),
            startup: Vec::new(),
        }
    }
}

/// Parse configuration text
pub fn parse_user_config(content: &str) -> Result<UserConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::ParseError)
}

/// Load user-level configuration
/// Returns default config if file doesn't exist
pub fn load_user_config(path: &Path) -> Result<UserConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("no config file at {}", path.display());
        return Ok(UserConfig::default());
    }

    let content = fs::read_to_string(path).map_err(ConfigError::IoError)?;
    parse_user_config(&content)
}

/// Save user-level configuration
pub fn save_user_config(
    path: &Path,
    config: &UserConfig,
) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).map_err(ConfigError::IoError)?;
        }
    }

    let content = toml::to_string_pretty(config).map_err(ConfigError::SerializeError)?;
    fs::write(path, content).map_err(ConfigError::IoError)?;

    Ok(())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Config parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Config serialize error: {0}")]
    SerializeError(toml::ser::Error),
}
