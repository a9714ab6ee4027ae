// src/config.rs

use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::view::MapBounds;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in `{path}`: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("delimiter must be a single ASCII character, got {0:?}")]
    Delimiter(String),
}

/// Runtime settings. Every field has a default, so an empty YAML document is
/// a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Consolidated IRVE export to load.
    pub source: PathBuf,
    /// Field delimiter of the source file.
    pub delimiter: char,
    /// Area kept for the point map.
    pub map_bounds: MapBounds,
    pub top_operators: usize,
    pub histogram_bins: usize,
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("consolidation-etalab-schema-irve-statique-v-2.3.1-20251110.csv"),
            delimiter: ',',
            map_bounds: MapBounds::default(),
            top_operators: 5,
            histogram_bins: 20,
            preview_rows: 10,
        }
    }
}

impl AppConfig {
    pub fn from_yaml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        // an empty file deserializes as unit; treat it as "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content, path)
    }

    /// Delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        delimiter_byte(self.delimiter)
    }
}

pub fn delimiter_byte(c: char) -> Result<u8, ConfigError> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(ConfigError::Delimiter(c.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = AppConfig::from_yaml_str("", Path::new("mem.yaml")).unwrap();
        assert_eq!(cfg.top_operators, 5);
        assert_eq!(cfg.histogram_bins, 20);
        assert_eq!(cfg.delimiter_byte().unwrap(), b',');
        assert_eq!(cfg.map_bounds, MapBounds::default());
    }

    #[test]
    fn partial_document_overrides_some_fields() {
        let yaml = "
source: data/irve.csv
delimiter: ';'
top_operators: 10
map_bounds:
  min_lat: 41.0
  max_lat: 51.5
";
        let cfg = AppConfig::from_yaml_str(yaml, Path::new("mem.yaml")).unwrap();
        assert_eq!(cfg.source, PathBuf::from("data/irve.csv"));
        assert_eq!(cfg.delimiter_byte().unwrap(), b';');
        assert_eq!(cfg.top_operators, 10);
        assert_eq!(cfg.preview_rows, 10);
        assert_eq!(cfg.map_bounds.min_lat, 41.0);
        assert_eq!(cfg.map_bounds.min_lon, MapBounds::default().min_lon);
    }

    #[test]
    fn rejects_bad_yaml_and_delimiters() {
        assert!(matches!(
            AppConfig::from_yaml_str("top_operators: [", Path::new("bad.yaml")),
            Err(ConfigError::Yaml { .. })
        ));
        assert!(matches!(delimiter_byte('§'), Err(ConfigError::Delimiter(_))));
        assert!(matches!(
            AppConfig::load(Path::new("/definitely/not/here.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
