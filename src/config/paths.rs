//! Path management for dithertone
//!
//! All filesystem locations used by the server hang off a single config
//! directory that is resolved once at startup.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static PATHS: OnceCell<Arc<Paths>> = OnceCell::new();

/// Manages all filesystem paths for the application
#[derive(Debug, Clone)]
pub struct Paths {
    /// Config directory path
    config_dir: PathBuf,
    /// Path to web client files
    client_path: PathBuf,
}

impl Paths {
    /// Initialize the paths singleton
    pub fn init(config: Option<PathBuf>, client: Option<PathBuf>) -> Result<Arc<Paths>> {
        let paths = PATHS.get_or_try_init(|| {
            let paths = Self::new(config, client)?;
            Ok::<_, anyhow::Error>(Arc::new(paths))
        })?;
        Ok(Arc::clone(paths))
    }

    /// Get the global paths instance
    pub fn get() -> Result<Arc<Paths>> {
        PATHS.get().map(Arc::clone).context("Paths not initialized")
    }

    fn new(config_override: Option<PathBuf>, client_override: Option<PathBuf>) -> Result<Self> {
        let config_dir = match config_override {
            Some(path) => path,
            None => directories::ProjectDirs::from("", "", "dithertone")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".dithertone")),
        };

        let client_path = client_override.unwrap_or_else(|| config_dir.join("client"));

        let paths = Self {
            config_dir,
            client_path,
        };

        paths.create_directories()?;

        Ok(paths)
    }

    fn create_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)
            .with_context(|| format!("Failed to create {:?}", self.config_dir))?;

        for dir in [self.client_path.clone(), self.media_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {:?}", dir))?;
        }

        Ok(())
    }

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the client path
    pub fn client_path(&self) -> &Path {
        &self.client_path
    }

    /// Get the main database path
    pub fn app_db_path(&self) -> PathBuf {
        self.config_dir.join("dithertone.db")
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Directory uploaded audio files are served from
    pub fn media_dir(&self) -> PathBuf {
        self.config_dir.join("media")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_creation() {
        let temp_dir = TempDir::new().unwrap();
        let config = Some(temp_dir.path().join("cfg"));

        // Note: Can't use init() in tests due to OnceCell
        let paths = Paths::new(config, None).unwrap();

        assert!(paths.config_dir().exists());
        assert!(paths.client_path().exists());
        assert!(paths.media_dir().exists());
        assert_eq!(
            paths.app_db_path(),
            temp_dir.path().join("cfg").join("dithertone.db")
        );
    }

    #[test]
    fn test_client_override() {
        let temp_dir = TempDir::new().unwrap();
        let client = temp_dir.path().join("web");

        let paths = Paths::new(Some(temp_dir.path().to_path_buf()), Some(client.clone())).unwrap();

        assert_eq!(paths.client_path(), client.as_path());
        assert!(client.exists());
    }
}
