//! Runtime configuration, resolved from CLI flags, environment variables,
//! and an optional TOML file, in that order of precedence.
//!
//! The admin key is deliberately not defaulted: the service refuses to start
//! without an externally supplied credential.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::record::TimestampFormat;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CONFIG_FILE: &str = "formdrop.toml";

pub const PORT_ENV: &str = "PORT";
pub const ADMIN_KEY_ENV: &str = "FORMDROP_ADMIN_KEY";

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub admin_key: String,
    pub log_file: PathBuf,
    pub public_dir: PathBuf,
    pub timestamp_format: TimestampFormat,
}

/// Raw CLI-provided options, all optional.
#[derive(Debug, Default, Clone)]
pub struct CliOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub admin_key: Option<String>,
    pub log_file: Option<PathBuf>,
    pub public_dir: Option<PathBuf>,
    pub timestamp_format: Option<TimestampFormat>,
}

/// Options read from the `[server]` table of the TOML config file.
#[derive(Debug, Default, Clone)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub admin_key: Option<String>,
    pub log_file: Option<PathBuf>,
    pub public_dir: Option<PathBuf>,
    pub timestamp_format: Option<TimestampFormat>,
}

#[derive(Deserialize)]
struct RootConfig {
    #[serde(default)]
    server: Option<RawFileConfig>,
}

#[derive(Deserialize, Default)]
struct RawFileConfig {
    host: Option<String>,
    port: Option<u16>,
    admin_key: Option<String>,
    log_file: Option<String>,
    public_dir: Option<String>,
    timestamp_format: Option<TimestampFormat>,
}

impl RawFileConfig {
    fn into_runtime_config(self) -> FileConfig {
        FileConfig {
            host: self.host,
            port: self.port,
            admin_key: self.admin_key,
            log_file: self.log_file.map(PathBuf::from),
            public_dir: self.public_dir.map(PathBuf::from),
            timestamp_format: self.timestamp_format,
        }
    }
}

/// Load the TOML config. An explicit path must exist and parse; with no
/// explicit path, `formdrop.toml` in the working directory is used when
/// present.
pub fn load_file_config(path: Option<&Path>) -> Result<Option<FileConfig>> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !candidate.exists() {
                return Ok(None);
            }
            candidate
        }
    };

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let parsed: RootConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse TOML config {}", path.display()))?;

    Ok(parsed.server.map(RawFileConfig::into_runtime_config))
}

/// Merge CLI, environment, and file values into a runnable configuration.
pub fn resolve(cli: &CliOptions, file_cfg: Option<&FileConfig>) -> Result<ServerConfig> {
    let env_port = env::var(PORT_ENV).ok();
    let env_admin_key = env::var(ADMIN_KEY_ENV).ok();
    resolve_with_env(cli, file_cfg, env_port.as_deref(), env_admin_key.as_deref())
}

fn resolve_with_env(
    cli: &CliOptions,
    file_cfg: Option<&FileConfig>,
    env_port: Option<&str>,
    env_admin_key: Option<&str>,
) -> Result<ServerConfig> {
    let host = cli
        .host
        .clone()
        .or_else(|| file_cfg.and_then(|cfg| cfg.host.clone()))
        .unwrap_or_else(|| "0.0.0.0".to_string());

    let env_port = match env_port {
        Some(raw) => Some(
            raw.parse::<u16>()
                .with_context(|| format!("Invalid {PORT_ENV} value '{raw}'"))?,
        ),
        None => None,
    };
    let port = cli
        .port
        .or(env_port)
        .or_else(|| file_cfg.and_then(|cfg| cfg.port))
        .unwrap_or(DEFAULT_PORT);

    let admin_key = cli
        .admin_key
        .clone()
        .or_else(|| env_admin_key.map(str::to_string))
        .or_else(|| file_cfg.and_then(|cfg| cfg.admin_key.clone()))
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            anyhow!(
                "No admin key configured. Set --admin-key, {ADMIN_KEY_ENV}, \
                 or admin_key in {DEFAULT_CONFIG_FILE}."
            )
        })?;

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| file_cfg.and_then(|cfg| cfg.log_file.clone()))
        .unwrap_or_else(|| PathBuf::from("submissions.txt"));

    let public_dir = cli
        .public_dir
        .clone()
        .or_else(|| file_cfg.and_then(|cfg| cfg.public_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("public"));

    let timestamp_format = cli
        .timestamp_format
        .or_else(|| file_cfg.and_then(|cfg| cfg.timestamp_format))
        .unwrap_or_default();

    Ok(ServerConfig {
        host,
        port,
        admin_key,
        log_file,
        public_dir,
        timestamp_format,
    })
}
