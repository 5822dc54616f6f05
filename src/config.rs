//! Runtime configuration shared by the CLI and the TUI

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::db::ProfileStore;

pub const DEFAULT_API_URL: &str = "http://localhost:8001";
pub const DEFAULT_CACHE_PATH: &str = "ppl.db";

#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Backend root URL (requests go to <url>/api)
    #[arg(long, env = "PPL_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Profile cache file
    #[arg(long, env = "PPL_CACHE_PATH", default_value = DEFAULT_CACHE_PATH, global = true)]
    pub cache: String,

    /// Request timeout in seconds
    #[arg(long, env = "PPL_TIMEOUT_SECS", default_value = "10", global = true)]
    pub timeout_secs: u64,

    /// Ask for a (simulated) phone verification during onboarding
    #[arg(long, env = "PPL_VERIFY_PHONE", global = true)]
    pub verify_phone: bool,

    /// Log file used while the TUI owns the terminal (default: cache path with .log)
    #[arg(long, env = "PPL_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn api_client(&self) -> Result<ApiClient> {
        Ok(ApiClient::new(
            &self.api_url,
            Duration::from_secs(self.timeout_secs),
        )?)
    }

    pub fn open_store(&self) -> Result<ProfileStore> {
        ProfileStore::open(&self.cache)
    }

    /// Where logs go: a file while the TUI draws, stderr for plain commands
    pub fn log_target(&self, tui: bool) -> LogTarget {
        if !tui {
            return LogTarget::Stderr;
        }
        let path = self
            .log_file
            .clone()
            .unwrap_or_else(|| Path::new(&self.cache).with_extension("log"));
        LogTarget::File(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Install the fmt subscriber. `RUST_LOG` overrides the `warn` default.
pub fn init_logging(target: &LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).init(),
        LogTarget::File(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(open_log(path)?))
            .init(),
    }
    Ok(())
}

fn open_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}
