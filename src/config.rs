use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

/// User options, read from `packtab.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixed display precision for values (None = shortest form).
    pub precision: Option<usize>,
    /// Upper bound on total values a loaded or pasted dataset may hold.
    pub max_cells: usize,
    /// How many dataset snapshots undo keeps.
    pub undo_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: None,
            max_cells: 10_000_000,
            undo_depth: 100,
        }
    }
}

impl Config {
    /// Read a config file; a missing file means defaults.
    pub fn load(path: &Path) -> io::Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// The standard location: `$XDG_CONFIG_HOME/packtab.toml`, falling back
    /// to `~/.config/packtab.toml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
            if !dir.is_empty() {
                return Some(PathBuf::from(dir).join("packtab.toml"));
            }
        }
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config").join("packtab.toml"))
    }

    /// Load from the standard location, falling back to defaults on any
    /// problem (a broken config should not keep the editor from starting).
    pub fn load_default() -> Config {
        let Some(path) = Self::default_path() else {
            return Config::default();
        };
        match Config::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "ignoring unreadable config");
                Config::default()
            }
        }
    }
}
