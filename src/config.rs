//! Configuration management for the file manager
//!
//! Settings are layered: built-in defaults, then an optional `config.toml`,
//! then `FILE_MANAGER_*` environment variables, then `PORT`. Everything is
//! read once at startup; the sandbox root never changes while running.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::FileManagerError;

const CONFIG_PATHS: [&str; 2] = [
    "file-manager/config", // Container image: /app/file-manager/config.toml
    "config",              // Local development: ./config.toml
];

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the HTTP listener
    pub bind_address: String,

    /// HTTP port. Environment: FILE_MANAGER_PORT or PORT
    pub port: u16,

    /// Sandbox root. Environment: FILE_MANAGER_ROOT
    #[serde(default)]
    pub root: Option<String>,

    /// Root used when `root` is unset. Environment: FILE_MANAGER_DEFAULT_ROOT
    pub default_root: String,

    /// Directory holding the static web UI
    pub static_dir: String,

    /// Largest accepted request body, in MB
    pub max_upload_mb: u64,
}

impl ServerConfig {
    /// Load configuration from config files and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        for path in CONFIG_PATHS {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        let builder = builder
            .add_source(Environment::with_prefix("FILE_MANAGER"))
            .set_override_option("port", std::env::var("PORT").ok())?;

        Self::from_builder(builder)
    }

    /// Apply defaults beneath `builder`'s sources, deserialize and validate.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings = builder
            .set_default("bind_address", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("default_root", "./data")?
            .set_default("static_dir", "static")?
            .set_default("max_upload_mb", 100)?
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.root_path().as_os_str().is_empty() {
            return Err(ConfigError::Message("root directory cannot be empty".into()));
        }

        if self.max_upload_mb == 0 {
            return Err(ConfigError::Message(
                "max_upload_mb must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Effective sandbox root: `root` if set, otherwise `default_root`
    pub fn root_path(&self) -> PathBuf {
        match self.root.as_deref() {
            Some(root) if !root.is_empty() => PathBuf::from(root),
            _ => PathBuf::from(&self.default_root),
        }
    }

    pub fn static_path(&self) -> PathBuf {
        PathBuf::from(&self.static_dir)
    }

    /// Maximum request body size in bytes
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb as usize).saturating_mul(1024 * 1024)
    }
}

/// Create the sandbox root if needed and return its canonical form.
///
/// Fails if the directory cannot be created or the path is not a directory.
pub fn prepare_root(root: &Path) -> Result<PathBuf, FileManagerError> {
    std::fs::create_dir_all(root)
        .map_err(|e| FileManagerError::RootUnavailable(root.to_path_buf(), e.to_string()))?;

    let canonical = root
        .canonicalize()
        .map_err(|e| FileManagerError::RootUnavailable(root.to_path_buf(), e.to_string()))?;

    if !canonical.is_dir() {
        return Err(FileManagerError::RootUnavailable(
            root.to_path_buf(),
            "not a directory".into(),
        ));
    }

    Ok(canonical)
}
