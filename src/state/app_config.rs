use log::error;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Location of the run configuration, relative to the working directory.
pub const CONFIG_PATH: &str = "config/app.json";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Community access token for `appWidgets.update`.
    #[serde(rename = "vkAPIkey")]
    pub vk_api_key: String,
    /// League ids eligible for the widget, in configured order.
    pub whitelist: Vec<i64>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error, PathBuf),
    Parse(serde_json::Error, PathBuf),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(e, path) => write!(f, "could not read {}: {e}", path.display()),
            ConfigError::Parse(e, path) => write!(f, "invalid config json at {}: {e}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read(e, _) => Some(e),
            ConfigError::Parse(e, _) => Some(e),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e, path.to_owned()))?;
        let mut config: AppConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e, path.to_owned()))?;
        config.dedup_whitelist();
        Ok(config)
    }

    /// Scheduled runs must not crash on a bad config: log and fall back to an
    /// empty one, which publishes the "no live matches" widget.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            error!("{e}");
            Self::default()
        })
    }

    /// Drop repeated league ids, keeping the first occurrence of each.
    fn dedup_whitelist(&mut self) {
        let mut seen = HashSet::new();
        self.whitelist.retain(|id| seen.insert(*id));
    }
}
