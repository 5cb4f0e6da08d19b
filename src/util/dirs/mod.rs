//! Per-application directories
//!
//! Cache, config, state and data directories for an application name. The
//! environment is injected as a lookup function so resolution is testable
//! without touching the real process environment.

use std::fs;
use std::io;
use std::path::PathBuf;

/// Directory layout convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// XDG base directories
    Posix,
    /// `~/Library/...`
    MacOs,
    /// `%APPDATA%`
    Windows,
}

impl Platform {
    /// Convention of the running system
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

/// Resolved application directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    pub cache: PathBuf,
    pub config: PathBuf,
    pub state: PathBuf,
    pub data: PathBuf,
}

impl AppDirs {
    /// Resolve from the real environment
    pub fn resolve(app: &str) -> Self {
        Self::resolve_with(app, Platform::current(), |key| std::env::var(key).ok())
    }

    /// Resolve using `env` for variable lookup
    ///
    /// Empty variables count as unset. Without a home directory the current
    /// directory is used as the base.
    pub fn resolve_with<F>(
        app: &str,
        platform: Platform,
        env: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        let home = var("HOME")
            .or_else(|| var("USERPROFILE"))
            .unwrap_or_else(|| PathBuf::from("."));

        let (cache, config, state, data) = match platform {
            Platform::Posix => (
                var("XDG_CACHE_HOME").unwrap_or_else(|| home.join(".cache")),
                var("XDG_CONFIG_HOME").unwrap_or_else(|| home.join(".config")),
                var("XDG_STATE_HOME").unwrap_or_else(|| home.join(".local").join("state")),
                var("XDG_DATA_HOME").unwrap_or_else(|| home.join(".local").join("share")),
            ),
            Platform::MacOs => {
                let support = home.join("Library").join("Application Support");
                (
                    home.join("Library").join("Caches"),
                    support.clone(),
                    support.clone(),
                    support,
                )
            }
            Platform::Windows => {
                let appdata = var("APPDATA").unwrap_or_else(|| home.clone());
                (appdata.clone(), appdata.clone(), appdata.clone(), appdata)
            }
        };

        Self {
            cache: cache.join(app),
            config: config.join(app),
            state: state.join(app),
            data: data.join(app),
        }
    }

    /// Create every directory that does not exist yet
    pub fn ensure_exists(&self) -> io::Result<()> {
        for dir in [&self.cache, &self.config, &self.state, &self.data] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// `<state>/history`
    pub fn history_file(&self) -> PathBuf {
        self.state.join("history")
    }

    /// `<config>/config.toml`
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_posix_fallbacks() {
        let dirs = AppDirs::resolve_with("pnr-repl", Platform::Posix, env(&[("HOME", "/home/op")]));
        assert_eq!(dirs.cache, PathBuf::from("/home/op/.cache/pnr-repl"));
        assert_eq!(dirs.config, PathBuf::from("/home/op/.config/pnr-repl"));
        assert_eq!(dirs.state, PathBuf::from("/home/op/.local/state/pnr-repl"));
        assert_eq!(dirs.data, PathBuf::from("/home/op/.local/share/pnr-repl"));
        assert_eq!(
            dirs.history_file(),
            PathBuf::from("/home/op/.local/state/pnr-repl/history")
        );
    }

    #[test]
    fn test_posix_xdg_overrides() {
        let dirs = AppDirs::resolve_with(
            "pnr-repl",
            Platform::Posix,
            env(&[
                ("HOME", "/home/op"),
                ("XDG_STATE_HOME", "/var/state"),
                ("XDG_CONFIG_HOME", ""),
            ]),
        );
        assert_eq!(dirs.state, PathBuf::from("/var/state/pnr-repl"));
        // empty means unset
        assert_eq!(dirs.config, PathBuf::from("/home/op/.config/pnr-repl"));
    }

    #[test]
    fn test_macos_layout() {
        let dirs = AppDirs::resolve_with("pnr-repl", Platform::MacOs, env(&[("HOME", "/Users/op")]));
        assert_eq!(dirs.cache, PathBuf::from("/Users/op/Library/Caches/pnr-repl"));
        assert_eq!(
            dirs.config_file(),
            PathBuf::from("/Users/op/Library/Application Support/pnr-repl/config.toml")
        );
    }

    #[test]
    fn test_windows_uses_appdata() {
        let dirs = AppDirs::resolve_with(
            "pnr-repl",
            Platform::Windows,
            env(&[("USERPROFILE", "C:/Users/op"), ("APPDATA", "C:/AppData")]),
        );
        assert_eq!(dirs.state, PathBuf::from("C:/AppData").join("pnr-repl"));
    }

    #[test]
    fn test_ensure_exists_creates_directories() {
        let root = tempfile::tempdir().unwrap();
        let home = root.path().to_string_lossy().to_string();
        let dirs = AppDirs::resolve_with("pnr-repl", Platform::Posix, env(&[("HOME", home.as_str())]));
        dirs.ensure_exists().unwrap();
        assert!(dirs.state.is_dir());
        assert!(dirs.cache.is_dir());
    }
}
