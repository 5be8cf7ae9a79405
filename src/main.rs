//! Illustcoach - AI illustration coach
//!
//! Command-line entry point: one-shot evaluations, history and trend
//! listings, and the HTTP API server.

mod cli;

use clap::{Parser, Subcommand};
use cli::helpers::GlobalOptions;
use illustcoach_core::{error::Result, EvaluationMode};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "illustcoach")]
#[command(about = "AI illustration coach with score history", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path (overrides ILLUSTCOACH_DB_PATH and the config file)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Google AI API key (overrides GOOGLE_API_KEY and the config file)
    #[arg(long, global = true)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Listen address (default from configuration)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Evaluate an illustration
    Evaluate {
        /// Evaluation mode: standard, copy or derivative
        #[arg(short, long, default_value = "standard")]
        mode: EvaluationMode,

        /// The illustration to judge
        #[arg(short, long)]
        image: PathBuf,

        /// Reference illustration (copy and derivative modes)
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List past evaluations, newest first
    History {
        /// Show at most this many records
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show score trend statistics
    Trend {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract the score from saved critique text
    Extract {
        /// Text file to scan (`-` for stdin)
        file: PathBuf,

        /// Restrict to one mode's labels
        #[arg(short, long)]
        mode: Option<EvaluationMode>,
    },

    /// Initialize the history database
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Our crates at the requested level, HTTP plumbing kept quiet
    let filter = EnvFilter::new(format!(
        "illustcoach={lvl},illustcoach_core={lvl},tower_http={lvl},hyper=warn,reqwest=warn",
        lvl = level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Illustcoach v{} starting...", env!("CARGO_PKG_VERSION"));

    let opts = GlobalOptions {
        config_file: cli.config,
        db_path: cli.db_path,
        api_key: cli.api_key,
    };

    match cli.command {
        Commands::Serve { addr } => cli::serve::handle(&opts, addr).await,
        Commands::Evaluate {
            mode,
            image,
            reference,
            json,
        } => cli::evaluate::handle(&opts, mode, image, reference, json).await,
        Commands::History { limit, json } => cli::history::handle(&opts, limit, json).await,
        Commands::Trend { json } => cli::history::handle_trend(&opts, json).await,
        Commands::Extract { file, mode } => cli::extract::handle(file, mode),
        Commands::Init => cli::init::handle(&opts).await,
    }
}
