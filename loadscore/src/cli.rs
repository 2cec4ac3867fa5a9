use std::path::PathBuf;

use clap::{Parser, ValueEnum};

pub const ENV_FORMAT: &str = "LOADSCORE_FORMAT";
pub const ENV_LOG: &str = "LOADSCORE_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "loadscore")]
#[command(version, about = "Score a k6 JSON metrics feed", long_about = None)]
pub struct Cli {
    /// Metrics files written by `k6 run --out json=<file>`, read in order.
    /// Use `-` for stdin.
    #[arg(default_value = "output.json")]
    pub inputs: Vec<PathBuf>,

    /// Report format
    #[arg(long, short, value_enum, default_value_t = Format::Text, env = ENV_FORMAT)]
    pub format: Format,

    /// Log filter, e.g. `info` or `loadscore=debug`. Falls back to RUST_LOG.
    #[arg(long, env = ENV_LOG)]
    pub log_level: Option<String>,

    /// Name of the run, shown in the JSON report
    #[arg(long, default_value = "load test")]
    pub name: String,
}

/// Picks the log filter: `--log-level` (which clap already fills from
/// `LOADSCORE_LOG`), then `RUST_LOG`, then `warn`.
pub fn log_filter(flag: Option<&str>, rust_log: Option<&str>) -> String {
    flag.or(rust_log).unwrap_or(DEFAULT_LOG_FILTER).to_owned()
}

/// Logs go to stderr so stdout carries only the report.
pub fn init_logging(flag: Option<&str>) {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(flag, std::env::var("RUST_LOG").ok().as_deref()))
        .init();
}
