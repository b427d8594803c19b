//! The two file sources: project `.env` and XDG `config.toml`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

/// `$XDG_CONFIG_HOME` when set and non-empty, else the platform config dir.
pub fn config_home() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
}

/// `[env]` table of `<config_home>/<app_name>/config.toml`; empty when the file is absent.
pub fn read_xdg_env(config_home: &Path, app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = config_home.join(app_name).join("config.toml");
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(|source| LoadError::XdgRead {
        path: path.clone(),
        source,
    })?;
    let config: ConfigFile = toml::from_str(&content)?;
    Ok(config.env)
}

/// Key-value pairs of `<dir>/.env` without touching the environment; empty when absent.
pub fn read_dotenv(dir: &Path) -> Result<HashMap<String, String>, LoadError> {
    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let mut out = HashMap::new();
    for item in dotenv::from_path_iter(&path)? {
        let (key, value) = item?;
        out.insert(key, value);
    }
    Ok(out)
}
