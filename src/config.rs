use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::concurrent_enricher::EnricherConfig;
use crate::enrichment_cache::CacheConfig;
use crate::enrichment_client::LookupConfig;
use crate::errors::{RecommendError, RecommendResult};
use crate::recommender::DEFAULT_TOP_K;

pub const IMAGE_API_KEY_ENV: &str = "CINESPHERE_IMAGE_API_KEY";
pub const DETAIL_API_KEY_ENV: &str = "CINESPHERE_DETAIL_API_KEY";
pub const LOOKUP_ENDPOINT_ENV: &str = "CINESPHERE_LOOKUP_ENDPOINT";

/// Locations of the precomputed artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub catalog_path: PathBuf,
    pub similarity_path: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("movie_dict.json"),
            similarity_path: PathBuf::from("similarity.json"),
        }
    }
}

/// Combined application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub lookup: LookupConfig,
    pub cache: CacheConfig,
    pub enricher: EnricherConfig,
    pub artifacts: ArtifactPaths,
    pub default_top_k: Option<usize>,
}

impl AppConfig {
    pub fn top_k(&self) -> usize {
        self.default_top_k.unwrap_or(DEFAULT_TOP_K)
    }

    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing file yields defaults; environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> RecommendResult<Self> {
        let config_file = match path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let mut config = match config_file {
            Some(file) if file.exists() => Self::from_file(&file)?,
            Some(file) if path.is_some() => {
                return Err(RecommendError::InvalidConfig {
                    message: format!("config file {} does not exist", file.display()),
                });
            }
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> RecommendResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| RecommendError::IOError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: AppConfig = serde_json::from_str(&content).map_err(|e| RecommendError::InvalidConfig {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> RecommendResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| RecommendError::IOError {
                    message: format!("Failed to create config directory: {}", e),
                })?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(|e| RecommendError::IOError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| RecommendError::IOError {
            message: format!("Failed to write config file: {}", e),
        })
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = env::var(IMAGE_API_KEY_ENV) {
            self.lookup.image_api_key = key;
        }
        if let Ok(key) = env::var(DETAIL_API_KEY_ENV) {
            self.lookup.detail_api_key = key;
        }
        if let Ok(endpoint) = env::var(LOOKUP_ENDPOINT_ENV) {
            self.lookup.endpoint = endpoint;
        }
    }

    pub fn validate(&self) -> RecommendResult<()> {
        if self.enricher.worker_count == 0 {
            return Err(RecommendError::InvalidConfig {
                message: "enricher.worker_count must be greater than 0".to_string(),
            });
        }
        if self.lookup.endpoint.trim().is_empty() {
            return Err(RecommendError::InvalidConfig {
                message: "lookup.endpoint must not be empty".to_string(),
            });
        }
        if self.default_top_k == Some(0) {
            return Err(RecommendError::InvalidConfig {
                message: "default_top_k must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// `~/.cinesphere/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".cinesphere").join("config.json"))
}
