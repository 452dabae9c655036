use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use workflow::{pipeline_from_names, Stage, AUTHORING_STAGES};

pub const DEFAULT_CONFIG_FILE: &str = "traincraft.toml";

pub const ENV_CATALOG: &str = "TRAINCRAFT_CATALOG";
pub const ENV_LOG_LEVEL: &str = "TRAINCRAFT_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Project catalog file; the built-in sample catalog when unset
    pub catalog: Option<PathBuf>,
    pub pipeline: PipelineConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Stage display names, numbered from 1 in this order
    pub stages: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stages: AUTHORING_STAGES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Loads `path` if it exists, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&content)
                .with_context(|| format!("Invalid config file: {}", path.display()))?
        } else {
            Self::default()
        };

        let config = config.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        debug!(path = %path.display(), stages = config.pipeline.stages.len(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(catalog) = lookup(ENV_CATALOG).filter(|v| !v.is_empty()) {
            self.catalog = Some(PathBuf::from(catalog));
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
            self.log.level = level;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.stages.is_empty() {
            bail!("pipeline.stages must name at least one stage");
        }
        if let Some(pos) = self.pipeline.stages.iter().position(|s| s.trim().is_empty()) {
            bail!("pipeline.stages[{}] has an empty name", pos);
        }
        Ok(())
    }

    pub fn pipeline(&self) -> Vec<Stage> {
        pipeline_from_names(self.pipeline.stages.iter().cloned())
    }
}
