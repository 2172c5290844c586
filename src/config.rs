//! Server configuration
//!
//! All settings are read from environment variables with a `PDFSMITH_`
//! prefix (a `.env` file is honored via dotenvy in `main`). Every key has
//! a default so `Config::default()` is a runnable local setup.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub render: RenderConfig,
    pub storage: StorageConfig,
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Rendering policy applied to every new document
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Treat engine warnings as fatal (aggregated into one error)
    pub strict_warnings: bool,
    /// Replace literal currency glyphs with named HTML entities
    pub substitute_entities: bool,
    /// Explicit Chromium binary path; autodetected when unset
    pub chromium_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Disk used when a sink call does not name one
    pub default_disk: String,
    /// Root directory of the local disk
    pub local_root: PathBuf,
    /// S3 disk, registered only when a bucket is configured
    pub s3: Option<S3Config>,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TemplateConfig {
    pub dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig { port: 3000 },
            render: RenderConfig {
                strict_warnings: false,
                substitute_entities: true,
                chromium_path: None,
            },
            storage: StorageConfig {
                default_disk: "local".to_string(),
                local_root: PathBuf::from("./storage"),
                s3: None,
            },
            templates: TemplateConfig {
                dir: PathBuf::from("./templates"),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let s3 = match std::env::var("PDFSMITH_S3_BUCKET") {
            Ok(bucket) if !bucket.is_empty() => Some(S3Config {
                bucket,
                region: env_or("PDFSMITH_S3_REGION", "us-east-1"),
                endpoint: env_opt("PDFSMITH_S3_ENDPOINT"),
                access_key: env_opt("PDFSMITH_S3_ACCESS_KEY"),
                secret_key: env_opt("PDFSMITH_S3_SECRET_KEY"),
            }),
            _ => None,
        };

        Ok(Self {
            server: ServerConfig {
                port: env_parse("PDFSMITH_PORT", defaults.server.port)?,
            },
            render: RenderConfig {
                strict_warnings: env_bool("PDFSMITH_STRICT_WARNINGS", false)?,
                substitute_entities: env_bool("PDFSMITH_SUBSTITUTE_ENTITIES", true)?,
                chromium_path: env_opt("PDFSMITH_CHROMIUM_PATH").map(PathBuf::from),
            },
            storage: StorageConfig {
                default_disk: env_or("PDFSMITH_DEFAULT_DISK", &defaults.storage.default_disk),
                local_root: env_opt("PDFSMITH_STORAGE_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.local_root),
                s3,
            },
            templates: TemplateConfig {
                dir: env_opt("PDFSMITH_TEMPLATE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.templates.dir),
            },
        })
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse(key: &'static str, default: u16) -> Result<u16, ConfigError> {
    match env_opt(key) {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { key, value: v }),
        None => Ok(default),
    }
}

fn env_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env_opt(key) {
        Some(v) => match v.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value: v }),
        },
        None => Ok(default),
    }
}
