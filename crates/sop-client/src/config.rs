//! Client configuration loaded from environment variables.

use thiserror::Error;

/// Connection settings for the backend and (optionally) the upload CDN.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend, e.g. `https://tracker.example.com/api`.
    pub api_base_url: String,
    /// Upload service settings; `None` means uploads are unavailable but
    /// everything else works.
    pub cdn: Option<CdnConfig>,
}

/// Cloudinary-style upload service settings.
#[derive(Debug, Clone)]
pub struct CdnConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `SOP_API_BASE_URL`: backend base URL
    ///
    /// Optional (both must be set for uploads to work):
    /// - `SOP_CDN_CLOUD_NAME`
    /// - `SOP_CDN_UPLOAD_PRESET`
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url =
            std::env::var("SOP_API_BASE_URL").map_err(|_| ConfigError::MissingApiBaseUrl)?;

        let cloud_name = std::env::var("SOP_CDN_CLOUD_NAME").ok();
        let upload_preset = std::env::var("SOP_CDN_UPLOAD_PRESET").ok();
        let cdn = match (cloud_name, upload_preset) {
            (Some(cloud_name), Some(upload_preset)) => Some(CdnConfig {
                cloud_name,
                upload_preset,
            }),
            (None, None) => None,
            _ => {
                tracing::warn!(
                    "only one of SOP_CDN_CLOUD_NAME / SOP_CDN_UPLOAD_PRESET is set; uploads disabled"
                );
                None
            }
        };

        Ok(Self { api_base_url, cdn })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SOP_API_BASE_URL environment variable not set")]
    MissingApiBaseUrl,
}
