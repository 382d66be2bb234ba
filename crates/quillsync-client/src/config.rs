//! Backend configuration.

use std::future::Future;
use std::path::{Path, PathBuf};

use miette::{Result, miette};
use serde::{Deserialize, Serialize};

/// Base URL a locally run backend listens on.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5087";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the document backend.
    pub base_url: String,
}

impl Config {
    /// Load configuration through the given loader.
    pub async fn load(loader: &impl Loader) -> Result<Self> {
        loader
            .load()
            .await
            .map_err(|_| miette!("Failed to load configuration"))
    }

    /// Persist configuration through the given saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<()> {
        saver
            .save(self)
            .await
            .map_err(|_| miette!("Failed to save configuration"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

/// Source of configuration data.
pub trait Loader {
    fn load(
        &self,
    ) -> impl Future<
        Output = core::result::Result<Config, Box<dyn std::error::Error + Send + Sync + 'static>>,
    > + Send;
}

/// Sink for configuration data.
pub trait Saver {
    fn save(
        &self,
        config: &Config,
    ) -> impl Future<
        Output = core::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>,
    > + Send;
}

/// File-backed [`Loader`]/[`Saver`]. The file extension picks the format;
/// `.json` and `.toml` are supported.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Loader for FileStore {
    async fn load(
        &self,
    ) -> core::result::Result<Config, Box<dyn std::error::Error + Send + Sync + 'static>> {
        let text = std::fs::read_to_string(&self.path)?;
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&text)?),
            Some("toml") => Ok(toml::from_str(&text)?),
            _ => Err(miette!("Unsupported file format").into()),
        }
    }
}

impl Saver for FileStore {
    async fn save(
        &self,
        config: &Config,
    ) -> core::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        let text = match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(config)?,
            Some("toml") => toml::to_string_pretty(config)?,
            _ => return Err(miette!("Unsupported file format").into()),
        };
        Ok(std::fs::write(&self.path, text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_config_roundtrips_through_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("quillsync.json"));

        let config = Config {
            base_url: "http://example.test:9000".to_owned(),
        };
        config.save(&store).await.unwrap();

        let loaded = Config::load(&store).await.unwrap();
        assert_eq!(loaded.base_url, "http://example.test:9000");
    }

    #[tokio::test]
    async fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("quillsync.yaml"));
        assert!(Config::default().save(&store).await.is_err());
    }
}
