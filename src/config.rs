//! wattsaver configuration persistence (rc-style key=value format)
//!
//! Saves/loads settings to `$XDG_CONFIG_HOME/wattsaver/wattsaverrc`
//! (falling back to `~/.config`).

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Sensor polling interval bounds (ms).
const MIN_INTERVAL_MS: u64 = 500;
const MAX_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_INTERVAL_MS: u64 = 2500;

/// Get the config file path: $XDG_CONFIG_HOME/wattsaver/wattsaverrc
fn config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("wattsaver").join("wattsaverrc"))
}

/// Persistable settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WattSaverConfig {
    /// Sensor refresh interval in milliseconds
    pub update_interval_ms: u64,
    /// Override for the privileged helper script location
    pub helper_path: Option<PathBuf>,
}

impl Default for WattSaverConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: DEFAULT_INTERVAL_MS,
            helper_path: None,
        }
    }
}

impl WattSaverConfig {
    /// Load config from file, returning defaults if file doesn't exist
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        Self::parse(&content)
    }

    fn parse(content: &str) -> Self {
        let mut cfg = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();
                match key {
                    "update_interval_ms" => {
                        if let Ok(v) = value.parse::<u64>() {
                            cfg.update_interval_ms = v.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS);
                        }
                    }
                    "helper_path" => {
                        if !value.is_empty() {
                            cfg.helper_path = Some(PathBuf::from(value));
                        }
                    }
                    _ => {} // Ignore unknown keys
                }
            }
        }

        cfg
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = config_path().context("Could not determine config path")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config dir")?;
        }

        let mut lines = Vec::new();
        lines.push("# wattsaver configuration file".to_string());
        lines.push("# Auto-generated — do not edit while wattsaver is running".to_string());
        lines.push(String::new());
        lines.push(format!("update_interval_ms={}", self.update_interval_ms));
        if let Some(helper) = &self.helper_path {
            lines.push(format!("helper_path={}", helper.display()));
        }

        let content = lines.join("\n") + "\n";
        let mut file = fs::File::create(path).context("Failed to create config file")?;
        file.write_all(content.as_bytes())
            .context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let cfg = WattSaverConfig::load_from(&dir.path().join("nope"));
        assert_eq!(cfg, WattSaverConfig::default());
    }

    #[test]
    fn round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wattsaver").join("wattsaverrc");
        let cfg = WattSaverConfig {
            update_interval_ms: 5000,
            helper_path: Some(PathBuf::from("/usr/local/lib/wattsaver-helper.sh")),
        };
        cfg.save_to(&path).unwrap();
        assert_eq!(WattSaverConfig::load_from(&path), cfg);
    }

    #[test]
    fn interval_is_clamped() {
        let cfg = WattSaverConfig::parse("update_interval_ms=50\n");
        assert_eq!(cfg.update_interval_ms, 500);
        let cfg = WattSaverConfig::parse("update_interval_ms=999999\n");
        assert_eq!(cfg.update_interval_ms, 10_000);
    }

    #[test]
    fn unknown_keys_and_comments_ignored() {
        let cfg = WattSaverConfig::parse(
            "# comment\n\ncolor_scheme=3\nupdate_interval_ms=3000\nwhatever\n",
        );
        assert_eq!(cfg.update_interval_ms, 3000);
        assert_eq!(cfg.helper_path, None);
    }
}
