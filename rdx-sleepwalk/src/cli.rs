//! Command-line flags for the `sleepwalk` binary.
//!
//! Every flag is optional; anything left unset falls through to the config
//! file, then `SLEEPWALK_*` environment variables, then built-in defaults.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Parser)]
#[command(name = "sleepwalk", version, about = "Applies time-windowed cluster settings")]
pub struct Cli {
    /// Cluster address, e.g. http://localhost:9200
    #[arg(long)]
    pub address: Option<String>,

    /// Seconds between reconciliation passes
    #[arg(long)]
    pub interval: Option<u64>,

    /// Directory holding *.conf templates
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Per-request timeout in seconds for calls to the cluster
    #[arg(long)]
    pub timeout: Option<u64>,

    /// IANA timezone used to evaluate windows (defaults to the local zone)
    #[arg(long)]
    pub timezone: Option<String>,

    /// TOML file with any of the settings above
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `sleepwalk=debug`
    #[arg(long, env = "SLEEPWALK_LOG", default_value = "info")]
    pub log_level: String,

    /// Run a single pass and exit; fails if any template was skipped
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    /// Parses `--log-level` into a subscriber filter. A malformed directive is
    /// an error rather than a silent fallback.
    pub fn log_filter(&self) -> Result<EnvFilter, ParseError> {
        EnvFilter::try_new(&self.log_level)
    }
}
