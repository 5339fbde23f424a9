use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::AssetSettings;
use crate::fetch::FetchSettings;
use crate::filter::FilterSettings;
use crate::postfilter::{PostFilter, RedirectRule};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Every tunable of the pipeline. Missing fields in a config file fall back
/// to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub output_root: PathBuf,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub noise_tags: Vec<String>,
    pub keep_empty_tags: Vec<String>,
    pub stripped_attributes: Vec<String>,
    /// Drop page-level header/footer when falling back to `<body>`.
    pub strip_body_landmarks: bool,
    pub asset_extensions: Vec<String>,
    pub overwrite_assets: bool,
    pub overwrite_documents: bool,
    pub redirectors: Vec<RedirectRule>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        let filter = FilterSettings::default();
        let assets = AssetSettings::default();
        Self {
            output_root: PathBuf::from("output"),
            user_agent: fetch.user_agent,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            redirect_limit: fetch.redirect_limit,
            max_bytes: fetch.max_bytes,
            noise_tags: filter.noise_tags,
            keep_empty_tags: filter.keep_empty_tags,
            stripped_attributes: filter.stripped_attributes,
            strip_body_landmarks: true,
            asset_extensions: assets.extensions,
            overwrite_assets: assets.overwrite,
            overwrite_documents: true,
            redirectors: vec![RedirectRule::google()],
        }
    }
}

impl ScraperConfig {
    /// Reads a RON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_ron(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn filter_settings(&self) -> FilterSettings {
        FilterSettings {
            noise_tags: self.noise_tags.clone(),
            keep_empty_tags: self.keep_empty_tags.clone(),
            stripped_attributes: self.stripped_attributes.clone(),
        }
    }

    pub fn asset_settings(&self) -> AssetSettings {
        AssetSettings {
            extensions: self.asset_extensions.clone(),
            overwrite: self.overwrite_assets,
        }
    }

    pub fn post_filter(&self) -> PostFilter {
        PostFilter::new(self.redirectors.clone())
    }
}
