use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_FILENAME: &str = "filter-builder.json";
const CONFIG_ENV: &str = "FILTER_BUILDER_CONFIG";

/// Start-up configuration, read from `filter-builder.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Only offer Add for thresholds that parse as numbers.
    pub strict_thresholds: bool,
    /// Render the filter widget.
    pub visible: bool,
    /// Catalog file opened at start-up.
    pub catalog: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict_thresholds: false,
            visible: true,
            catalog: None,
        }
    }
}

impl Config {
    /// Where the config is looked up: `$FILTER_BUILDER_CONFIG`, else
    /// `filter-builder.json` in the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME))
    }

    /// Load config from `path`, or return defaults if the file is missing.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.visible);
        assert!(!config.strict_thresholds);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, r#"{"strict_thresholds": true}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.strict_thresholds);
        assert!(config.visible);
        assert_eq!(config.catalog, None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "{ strict").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
