//! # Meeting Cache CLI (`mcache`)
//!
//! Thin command-line front end over [`MeetingCache`]. Query commands print
//! the `QueryResult` as JSON on stdout and exit non-zero on failure, so the
//! output can be consumed by scripts the same way the UI consumes the API.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mcache documents [--limit N]` | Recent documents, newest first |
//! | `mcache transcript <id>` | Plain-text transcript of one document |
//! | `mcache status` | Install marker, cache file, and snapshot info |
//!
//! ## Examples
//!
//! ```bash
//! mcache --data-dir "$HOME/Library/Application Support" documents --limit 5
//! mcache --config ./config/mcache.toml transcript 3f2c9a
//! RUST_LOG=meeting_cache=debug mcache status
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use meeting_cache::config::{self, Config};
use meeting_cache::models::QueryResult;
use meeting_cache::normalize;
use meeting_cache::query::MeetingCache;
use meeting_cache::status;

/// Meeting Cache CLI — query a desktop meeting app's local cache.
#[derive(Parser)]
#[command(
    name = "mcache",
    about = "Meeting Cache — read meeting documents and transcripts from the local app cache",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional; built-in defaults are used when the file does not exist.
    #[arg(long, global = true, default_value = "./config/mcache.toml")]
    config: PathBuf,

    /// Host application-data directory. Overrides `cache.app_data_dir`.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recent documents, newest first.
    Documents {
        /// Maximum number of documents. Anything other than a positive
        /// integer uses the default.
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<String>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Print the plain-text transcript of one document.
    Transcript {
        /// Document id.
        id: String,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Show install and cache status.
    Status {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Ignore a second init (only possible when embedded).
    let _ = fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        Config::minimal()
    };
    if let Some(dir) = &cli.data_dir {
        cfg.cache.app_data_dir = Some(dir.clone());
    }
    Ok(cfg)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn exit_for<T>(result: &QueryResult<T>) {
    if let Some(kind) = result.error_kind() {
        eprintln!("Error: {}", kind.message());
        std::process::exit(1);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = resolve_config(&cli)?;
    let cache = MeetingCache::from_config(&cfg)?;

    match cli.command {
        Commands::Documents { limit, pretty } => {
            let limit = limit.as_deref().and_then(normalize::parse_limit);
            let result = cache.list_recent_documents(limit).await;
            print_json(&result, pretty)?;
            exit_for(&result);
        }
        Commands::Transcript { id, pretty } => {
            let result = cache.get_transcript(&id).await;
            print_json(&result, pretty)?;
            exit_for(&result);
        }
        Commands::Status { json } => {
            let report = status::cache_status(cache.loader()).await;
            if json {
                print_json(&report, true)?;
            } else {
                status::print_status(&report);
            }
        }
    }

    Ok(())
}
