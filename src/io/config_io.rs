use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Error type for reading config.toml
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Get the config file path, respecting XDG_CONFIG_HOME
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"));
    config_dir.join("glassdo").join("config.toml")
}

/// Default data directory, respecting XDG_DATA_HOME
pub fn default_data_dir() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local").join("share"));
    data_dir.join("glassdo")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Parse the config file at `path`. A missing file is not an error.
pub fn read_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load config from the default location, falling back to defaults
/// (with a warning) if the file cannot be used.
pub fn load_config() -> AppConfig {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> AppConfig {
    match read_config_from(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "using default configuration");
            AppConfig::default()
        }
    }
}

/// Pick the data directory: explicit override, then `GLASSDO_DATA_DIR`,
/// then the config file, then the XDG default.
pub fn resolve_data_dir(override_dir: Option<&Path>, config: &AppConfig) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    if let Ok(dir) = std::env::var("GLASSDO_DATA_DIR")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }
    if let Some(ref dir) = config.storage.data_dir {
        return PathBuf::from(dir);
    }
    default_data_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = read_config_from(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn reads_sections() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"[storage]
data_dir = "/tmp/glassdo-data"

[suggest]
endpoint = "http://localhost:8080"
subtask_prefix = "- "
"#,
        )
        .unwrap();
        let config = read_config_from(&path).unwrap();
        assert_eq!(config.storage.data_dir.as_deref(), Some("/tmp/glassdo-data"));
        assert_eq!(config.suggest.endpoint, "http://localhost:8080");
        assert_eq!(config.suggest.subtask_prefix, "- ");
        assert_eq!(config.suggest.model, "gemini-3-flash-preview");
    }

    #[test]
    fn malformed_file_is_error_but_load_degrades() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[storage\ndata_dir = ").unwrap();
        assert!(matches!(
            read_config_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
        assert_eq!(load_config_from(&path), AppConfig::default());
    }

    #[test]
    fn override_wins_over_config() {
        let mut config = AppConfig::default();
        config.storage.data_dir = Some("/from/config".into());
        let dir = resolve_data_dir(Some(Path::new("/explicit")), &config);
        assert_eq!(dir, PathBuf::from("/explicit"));
    }
}
