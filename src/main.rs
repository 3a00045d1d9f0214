mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use forage::{Config, FoodApi};

/// Conventional exit status for a process stopped by SIGINT
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, thiserror::Error)]
#[error("interrupted")]
struct Interrupted;

#[derive(Parser)]
#[command(name = "forage")]
#[command(author, version, about = "Resolve nutrition facts by barcode or food name", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API key for the generic-foods database (search skips it when unset)
    #[arg(long, global = true, env = "FORAGE_USDA_API_KEY", hide_env_values = true)]
    usda_api_key: Option<String>,

    /// Base URL of the branded-goods database
    #[arg(long, global = true, env = "FORAGE_BRANDED_URL")]
    branded_url: Option<String>,

    /// Base URL of the generic-foods database
    #[arg(long, global = true, env = "FORAGE_GENERIC_URL")]
    generic_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a product by barcode
    Lookup {
        /// Barcode (EAN/UPC)
        barcode: String,

        /// Print the product as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search both food databases by name
    Search {
        /// Query string
        query: String,

        /// Result page (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Show at most this many results
        #[arg(long)]
        limit: Option<usize>,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for results
    let default_filter = if cli.verbose { "forage=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    let mut config = Config::from_env();
    if let Some(url) = cli.branded_url {
        config.branded_base_url = url;
    }
    if let Some(url) = cli.generic_url {
        config.generic_base_url = url;
    }
    if cli.usda_api_key.is_some() {
        config = config.with_api_key(cli.usda_api_key);
    }

    let api = FoodApi::with_config(config)?;

    match until_interrupted(run(&api, cli.command), tokio::signal::ctrl_c()).await {
        Err(e) if e.is::<Interrupted>() => {
            eprintln!("Interrupted");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        result => result,
    }
}

/// Drive `work` until it finishes or `signal` fires.
///
/// Dropping the command future abandons any in-flight request.
async fn until_interrupted<T>(
    work: impl Future<Output = anyhow::Result<T>>,
    signal: impl Future<Output = std::io::Result<()>>,
) -> anyhow::Result<T> {
    tokio::select! {
        result = work => result,
        _ = signal => Err(Interrupted.into()),
    }
}

async fn run(api: &FoodApi, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Lookup { barcode, json } => commands::lookup(api, &barcode, json).await,
        Commands::Search {
            query,
            page,
            limit,
            json,
        } => commands::search(api, &query, page, limit, json).await,
        Commands::Completions { shell } => {
            commands::completions::<Cli>(shell);
            Ok(())
        }
    }
}
