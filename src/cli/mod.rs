pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ConfigOverrides;

#[derive(Parser)]
#[command(name = "list-notifications")]
#[command(about = "Change notification feed for curated content lists", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, env = "LIST_NOTIFICATIONS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags that override the configuration file.
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Port to listen on
    #[arg(long, env = "APP_PORT", global = true)]
    pub port: Option<u16>,

    /// Host used in the public links of the feed
    #[arg(long, env = "API_HOST", global = true)]
    pub api_host: Option<String>,

    /// SQLite database file
    #[arg(long = "db", env = "DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Seconds a notification stays hidden after it was written
    #[arg(long = "cache-max-age", env = "CACHE_TTL", global = true)]
    pub cache_delay_secs: Option<i64>,

    /// Maximum notifications per page
    #[arg(long, env = "NOTIFICATIONS_LIMIT", global = true)]
    pub limit: Option<usize>,

    /// How far back (in days) a 'since' parameter may reach
    #[arg(long = "max-since-interval", env = "MAX_SINCE_INTERVAL", global = true)]
    pub max_since_interval_days: Option<i64>,

    /// Log the raw body of every write
    #[arg(long, env = "DUMP_REQUESTS", global = true)]
    pub dump_requests: Option<bool>,

    /// Initial log level
    #[arg(long, env = "LOG_LEVEL", global = true)]
    pub log_level: Option<String>,
}

impl From<OverrideArgs> for ConfigOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            port: args.port,
            api_host: args.api_host,
            db_path: args.db_path,
            cache_delay_secs: args.cache_delay_secs,
            limit: args.limit,
            max_since_interval_days: args.max_since_interval_days,
            dump_requests: args.dump_requests,
            log_level: args.log_level,
        }
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP service (default)
    Serve,
    /// Print the effective configuration as TOML
    ShowConfig,
}
