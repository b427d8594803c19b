//! Configuration loading for Heddle.
//!
//! Two optional sources feed the process environment:
//!
//! 1. the project `.env` (current directory, or an explicit directory);
//! 2. the `[env]` table of `$XDG_CONFIG_HOME/<app>/config.toml`.
//!
//! A key is only set when the process environment does not already have it, so
//! the precedence is **env > .env > XDG**. Run settings are then read from the
//! environment (`heddle::RunSettings::from_env`).

mod sources;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use sources::{config_home, read_dotenv, read_xdg_env};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no config directory could be determined")]
    NoConfigHome,
    #[error("read config file {path}: {source}")]
    XdgRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse config toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    Dotenv(#[from] dotenv::Error),
}

/// Loads both sources and sets every key missing from the process environment.
///
/// * `app_name`: directory under the config home, e.g. `"heddle"`.
/// * `dotenv_dir`: where to look for `.env`; defaults to the current directory.
///
/// Returns the keys that were set.
pub fn load_and_apply(app_name: &str, dotenv_dir: Option<&Path>) -> Result<Vec<String>, LoadError> {
    let xdg = match config_home() {
        Some(home) => read_xdg_env(&home, app_name)?,
        None => HashMap::new(),
    };
    let dir = match dotenv_dir {
        Some(d) => Some(d.to_path_buf()),
        None => std::env::current_dir().ok(),
    };
    let dotenv = match dir {
        Some(d) => read_dotenv(&d)?,
        None => HashMap::new(),
    };

    let pending = merge_missing(&dotenv, &xdg, |key| std::env::var_os(key).is_some());
    let mut applied: Vec<String> = pending.keys().cloned().collect();
    applied.sort();
    for (key, value) in pending {
        std::env::set_var(key, value);
    }
    Ok(applied)
}

/// Values to set: `.env` over XDG, skipping keys for which `is_set` holds.
fn merge_missing(
    dotenv: &HashMap<String, String>,
    xdg: &HashMap<String, String>,
    is_set: impl Fn(&str) -> bool,
) -> HashMap<String, String> {
    xdg.iter()
        .chain(dotenv.iter())
        .filter(|(key, _)| !is_set(key))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// **Scenario**: `.env` beats XDG; keys already in the environment are untouched.
    #[test]
    fn precedence_env_then_dotenv_then_xdg() {
        let dotenv = map(&[("MODEL", "from_dotenv"), ("SHARED", "dotenv")]);
        let xdg = map(&[("SHARED", "xdg"), ("URL", "from_xdg"), ("SET", "xdg")]);
        let merged = merge_missing(&dotenv, &xdg, |k| k == "SET");
        assert_eq!(merged.get("SHARED").map(String::as_str), Some("dotenv"));
        assert_eq!(merged.get("MODEL").map(String::as_str), Some("from_dotenv"));
        assert_eq!(merged.get("URL").map(String::as_str), Some("from_xdg"));
        assert!(!merged.contains_key("SET"));
    }

    #[test]
    fn existing_env_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "HEDDLE_CONFIG_TEST_EXISTING=from_dotenv\n").unwrap();
        std::env::set_var("HEDDLE_CONFIG_TEST_EXISTING", "from_env");
        let applied = load_and_apply("heddle-config-test-none", Some(dir.path())).unwrap();
        let val = std::env::var("HEDDLE_CONFIG_TEST_EXISTING").unwrap();
        std::env::remove_var("HEDDLE_CONFIG_TEST_EXISTING");
        assert_eq!(val, "from_env");
        assert!(!applied.contains(&"HEDDLE_CONFIG_TEST_EXISTING".to_string()));
    }

    #[test]
    fn dotenv_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "HEDDLE_CONFIG_TEST_DOTENV=\"quoted value\"\n").unwrap();
        std::env::remove_var("HEDDLE_CONFIG_TEST_DOTENV");
        let applied = load_and_apply("heddle-config-test-none", Some(dir.path())).unwrap();
        let val = std::env::var("HEDDLE_CONFIG_TEST_DOTENV").unwrap();
        std::env::remove_var("HEDDLE_CONFIG_TEST_DOTENV");
        assert_eq!(val, "quoted value");
        assert!(applied.contains(&"HEDDLE_CONFIG_TEST_DOTENV".to_string()));
    }

    #[test]
    fn no_sources_is_ok() {
        let empty = tempfile::tempdir().unwrap();
        assert!(load_and_apply("heddle-config-test-none", Some(empty.path())).is_ok());
    }
}
