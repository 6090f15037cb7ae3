//! Configuration for link resolution
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported config file extension: {0}")]
    UnsupportedExtension(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RetryOptions {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    2
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// Connection settings for the remote link resolution service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolverEndpointOptions {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub retry: RetryOptions,
}

fn default_base_url() -> String {
    "http://localhost:8082".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ResolverEndpointOptions {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            retry: RetryOptions::default(),
        }
    }
}

impl ResolverEndpointOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkResolverConfig {
    /// Master switch for rich-text link processing
    #[serde(default = "default_true")]
    pub rich_text_resolve: bool,

    /// Drop namespace declarations instead of generating plain `href` attributes
    #[serde(default)]
    pub rich_text_xmlns_remove: bool,

    #[serde(default = "default_true")]
    pub remove_extension: bool,

    #[serde(default = "default_true")]
    pub strip_index_path: bool,

    #[serde(default)]
    pub keep_trailing_slash: bool,

    /// Retry failed dynamic-component and binary links as plain component links
    #[serde(default = "default_true")]
    pub link_type_fallback: bool,

    #[serde(default)]
    pub resolver: ResolverEndpointOptions,
}

impl Default for LinkResolverConfig {
    fn default() -> Self {
        Self {
            rich_text_resolve: true,
            rich_text_xmlns_remove: false,
            remove_extension: true,
            strip_index_path: true,
            keep_trailing_slash: false,
            link_type_fallback: true,
            resolver: ResolverEndpointOptions::default(),
        }
    }
}

/// Flags the rich-text processor reads on every call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RichTextOptions {
    pub resolve: bool,
    pub xmlns_remove: bool,
}

impl Default for RichTextOptions {
    fn default() -> Self {
        Self {
            resolve: true,
            xmlns_remove: false,
        }
    }
}

/// Post-processing rules for resolved URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlOptions {
    pub remove_extension: bool,
    pub strip_index_path: bool,
    pub keep_trailing_slash: bool,
}

impl Default for UrlOptions {
    fn default() -> Self {
        Self {
            remove_extension: true,
            strip_index_path: true,
            keep_trailing_slash: false,
        }
    }
}

impl LinkResolverConfig {
    pub fn rich_text_options(&self) -> RichTextOptions {
        RichTextOptions {
            resolve: self.rich_text_resolve,
            xmlns_remove: self.rich_text_xmlns_remove,
        }
    }

    pub fn url_options(&self) -> UrlOptions {
        UrlOptions {
            remove_extension: self.remove_extension,
            strip_index_path: self.strip_index_path,
            keep_trailing_slash: self.keep_trailing_slash,
        }
    }

    /// Load configuration from a `.json`, `.yaml` or `.yml` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match extension_of(path).as_str() {
            "json" => Self::from_json(&content),
            "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
            other => Err(ConfigError::UnsupportedExtension(other.to_string())),
        }
    }

    /// Save configuration; the format follows the file extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = match extension_of(path).as_str() {
            "json" => self.to_json()?,
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            other => return Err(ConfigError::UnsupportedExtension(other.to_string())),
        };

        fs::write(path, content)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}
