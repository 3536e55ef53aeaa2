use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

const DATA_DIR_ENV: &str = "CATALOG_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogConfig {
    pub data_dir: PathBuf,
    pub database_file: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            database_file: "catalog.db".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Reads a JSON config file. A missing file yields the defaults; `CATALOG_DATA_DIR`
    /// overrides `data_dir` either way.
    pub fn load(path: &Path) -> Result<Self> {
        let config = match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("config file {} not found, using defaults", path.display());
                CatalogConfig::default()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(config.with_data_dir_override(std::env::var(DATA_DIR_ENV).ok()))
    }

    fn with_data_dir_override(mut self, value: Option<String>) -> Self {
        if let Some(dir) = value.map(|raw| raw.trim().to_string()) {
            if !dir.is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        self
    }

    /// Creates the data directory if needed and returns the database file path.
    pub fn db_path(&self) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(self.data_dir.join(&self.database_file))
    }
}

#[cfg(test)]
mod tests {
    use super::CatalogConfig;
    use std::path::PathBuf;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("catalog-config-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn partial_json_fills_defaults() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.json");
        std::fs::write(&path, r#"{ "databaseFile": "library.db" }"#).unwrap();

        let config = CatalogConfig::load(&path).unwrap();
        assert_eq!(config.database_file, "library.db");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(CatalogConfig::load(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn override_replaces_data_dir_unless_blank() {
        let config = CatalogConfig::default().with_data_dir_override(Some("/srv/catalog".into()));
        assert_eq!(config.data_dir, PathBuf::from("/srv/catalog"));

        let config = CatalogConfig::default().with_data_dir_override(Some("  ".into()));
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn db_path_creates_data_dir() {
        let dir = scratch_dir();
        let config = CatalogConfig {
            data_dir: dir.clone(),
            database_file: "catalog.db".to_string(),
        };
        let path = config.db_path().unwrap();
        assert!(dir.is_dir());
        assert_eq!(path, dir.join("catalog.db"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
