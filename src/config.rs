use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fixed acquisition and export settings. Not overridable per run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub region: String,
    pub language: String,
    pub timezone_offset: i32,
    pub timeframe: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub retries: u32,
    pub backoff_factor: f64,
    pub cache_ttl_secs: u64,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: "US".into(),
            language: "en-US".into(),
            timezone_offset: 360,
            timeframe: "today 5-y".into(),
            connect_timeout_secs: 10,
            read_timeout_secs: 25,
            retries: 2,
            backoff_factor: 0.1,
            cache_ttl_secs: 3600,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Like `load_config`, but a missing file yields the defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "retries": 4, "output_dir": "out" }}"#).unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.retries, 4);
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.region, "US");
        assert_eq!(cfg.timeframe, "today 5-y");
        assert_eq!(cfg.read_timeout(), Duration::from_secs(25));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_or_default(dir.path().join("nope.json")).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn broken_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Json(_))));
    }
}
