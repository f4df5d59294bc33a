use super::{get_global_config_dir, Config, ConfigFile};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tokio::fs;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Builds a [`Config`] from its layers, lowest precedence first:
/// defaults, the global file, an explicit file, then the environment.
pub struct ConfigLoader {
    config: Config,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    /// Load every layer; `explicit` is the file named on the command line
    pub async fn load(explicit: Option<&Path>) -> Result<Config> {
        let mut loader = Self::new();
        loader.load_global().await?;
        if let Some(path) = explicit {
            loader.load_file(path).await?;
        }
        loader.load_env();
        Ok(loader.into_config())
    }

    pub async fn load_global(&mut self) -> Result<()> {
        match get_global_config_dir() {
            Ok(dir) => self.load_global_from(&dir).await,
            Err(e) => {
                tracing::debug!("Skipping global configuration: {}", e);
                Ok(())
            }
        }
    }

    /// Merge `<dir>/config.toml` when it exists
    pub async fn load_global_from(&mut self, dir: &Path) -> Result<()> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            tracing::debug!("Loading global configuration from {}", config_path.display());
            let file = read_config_file(&config_path).await?;
            self.config.merge_file(file);
        }
        Ok(())
    }

    /// Merge a file that must exist
    pub async fn load_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(anyhow!("Configuration file not found: {}", path.display()));
        }
        tracing::debug!("Loading configuration from {}", path.display());
        let file = read_config_file(path).await?;
        self.config.merge_file(file);
        Ok(())
    }

    pub fn load_env(&mut self) {
        self.config.merge_env_vars();
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
}
