use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use formdrop_server::{
    config::{self, CliOptions},
    http_server,
    record::TimestampFormat,
};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "formdropd", version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Host binding for the HTTP listener
    #[arg(long = "host", value_name = "HOST")]
    host: Option<String>,

    /// Port binding (falls back to PORT, then 3000)
    #[arg(long = "port", value_name = "PORT")]
    port: Option<u16>,

    /// Shared admin key gating /admin and /download
    #[arg(long = "admin-key", value_name = "KEY")]
    admin_key: Option<String>,

    /// Path of the append-only submission log
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Directory of static landing pages
    #[arg(long = "public-dir", value_name = "DIR")]
    public_dir: Option<PathBuf>,

    /// Timestamp convention for log lines (iso8601 | locale)
    #[arg(long = "timestamp-format", value_enum, value_name = "FORMAT")]
    timestamp_format: Option<TimestampFormat>,

    /// Explicit path to the TOML configuration (formdrop.toml)
    #[arg(long = "config", value_name = "FILE")]
    config_path: Option<PathBuf>,

    /// Optional log filter (e.g. info, debug)
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args);
    tracing::info!(
        "{}",
        formdrop_build_info::formatted_banner("formdropd", SERVER_VERSION)
    );

    let file_config = config::load_file_config(args.config_path.as_deref())?;
    let cli = CliOptions {
        host: args.host.clone(),
        port: args.port,
        admin_key: args.admin_key.clone(),
        log_file: args.log_file.clone(),
        public_dir: args.public_dir.clone(),
        timestamp_format: args.timestamp_format,
    };

    let server_config = config::resolve(&cli, file_config.as_ref())?;
    http_server::run(server_config).await
}

fn init_tracing(args: &Args) {
    if let Some(level) = &args.log_level {
        std::env::set_var("RUST_LOG", level);
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    let _ = builder.try_init();
}
