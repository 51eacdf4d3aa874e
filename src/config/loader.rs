use super::KitchenConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "cafeteria.toml";

/// Builds a [`KitchenConfig`] from defaults, an optional TOML file and the environment
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    search_dir: Option<PathBuf>,
    use_env: bool,
    burners: Option<usize>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            path: None,
            search_dir: None,
            use_env: true,
            burners: None,
        }
    }

    /// Read this file; it must exist
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Look for `cafeteria.toml` in `dir` when no explicit file is set
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, enabled: bool) -> Self {
        self.use_env = enabled;
        self
    }

    /// Burner count that wins over the file and the environment
    pub fn with_burners(mut self, burners: Option<usize>) -> Self {
        self.burners = burners;
        self
    }

    pub async fn load(&self) -> Result<KitchenConfig> {
        let mut config = match self.config_file() {
            Some(path) => Self::load_file(&path).await?,
            None => KitchenConfig::default(),
        };

        if self.use_env {
            config.merge_env_vars()?;
        }

        if let Some(burners) = self.burners {
            config.burners = burners;
        }

        config.validate()?;
        Ok(config)
    }

    fn config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.path {
            return Some(path.clone());
        }

        let candidate = self.search_dir.as_ref()?.join(DEFAULT_CONFIG_FILE);
        candidate.exists().then_some(candidate)
    }

    async fn load_file(path: &Path) -> Result<KitchenConfig> {
        let content = fs::read_to_string(path).await?;
        let config: KitchenConfig = toml::from_str(&content)?;
        debug!("Loaded kitchen configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KitchenError;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kitchen.toml");
        std::fs::write(&path, "burners = 4\nbread_bake_time = \"500ms\"\n").unwrap();

        let config = ConfigLoader::new()
            .with_file(&path)
            .with_env(false)
            .load()
            .await
            .unwrap();

        assert_eq!(config.burners, 4);
        assert_eq!(config.bread_bake_time, Duration::from_millis(500));
        assert_eq!(config.sausage_fry_time, Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_search_dir_without_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let config = ConfigLoader::new()
            .with_search_dir(temp_dir.path())
            .with_env(false)
            .load()
            .await
            .unwrap();

        assert_eq!(config, KitchenConfig::default());
    }

    #[tokio::test]
    async fn test_search_dir_picks_up_default_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(DEFAULT_CONFIG_FILE), "burners = 1\n").unwrap();

        let config = ConfigLoader::new()
            .with_search_dir(temp_dir.path())
            .with_env(false)
            .load()
            .await
            .unwrap();

        assert_eq!(config.burners, 1);
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();

        let err = ConfigLoader::new()
            .with_file(temp_dir.path().join("nope.toml"))
            .with_env(false)
            .load()
            .await
            .unwrap_err();

        assert!(matches!(err, KitchenError::Io(_)));
    }

    #[tokio::test]
    async fn test_burner_override_applies_before_validation() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kitchen.toml");
        std::fs::write(&path, "burners = 0\n").unwrap();

        let config = ConfigLoader::new()
            .with_file(&path)
            .with_env(false)
            .with_burners(Some(4))
            .load()
            .await
            .unwrap();

        assert_eq!(config.burners, 4);
    }

    #[tokio::test]
    async fn test_zero_burner_override_is_rejected() {
        let temp_dir = TempDir::new().unwrap();

        let err = ConfigLoader::new()
            .with_search_dir(temp_dir.path())
            .with_env(false)
            .with_burners(Some(0))
            .load()
            .await
            .unwrap_err();

        assert!(matches!(err, KitchenError::Config(_)));
    }

    #[tokio::test]
    async fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kitchen.toml");
        std::fs::write(&path, "burners = 0\n").unwrap();

        let err = ConfigLoader::new()
            .with_file(&path)
            .with_env(false)
            .load()
            .await
            .unwrap_err();

        assert!(matches!(err, KitchenError::Config(_)));
    }
}
