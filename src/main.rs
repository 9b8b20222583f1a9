//! # NutriScan CLI (`nutriscan`)
//!
//! ## Usage
//!
//! ```bash
//! nutriscan --config ./config/nutriscan.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `nutriscan search "<query>"` | Search products by name or barcode |
//! | `nutriscan compare <code>...` | Compare Nutri-Scores of several barcodes |
//! | `nutriscan chat [message]` | Ask the nutrition assistant |
//! | `nutriscan inspect <file>` | Normalize a product record from a JSON file |
//! | `nutriscan provider` | Show the resolved AI provider |
//!
//! ## Examples
//!
//! ```bash
//! # Name search with an AI analysis of the first hit
//! nutriscan search "nutella" --analyze
//!
//! # Barcode lookup plus better-graded alternatives
//! nutriscan search 3017620422003 --alternatives
//!
//! # Question about the first hit
//! nutriscan search "nutella" --ask "Is it fine for breakfast?"
//!
//! # Compare three products using a local model
//! nutriscan --provider ollama compare 3017620422003 8000500310427 3560070614202 --analyze
//!
//! # Interactive chat
//! nutriscan chat
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use nutriscan::providers::ProviderFlags;
use nutriscan::search::SearchOptions;
use nutriscan::{chat, compare, config, inspect, logging, providers, search};

const DEFAULT_CONFIG: &str = "./config/nutriscan.toml";

/// NutriScan: Nutri-Score lookup, comparison and an AI nutrition assistant.
///
/// The config file is optional. Provider settings resolve from CLI flags,
/// then the config file, then `NUTRISCAN_PROVIDER` and friends.
#[derive(Parser)]
#[command(
    name = "nutriscan",
    about = "Look up packaged food, read its Nutri-Score, compare products, and ask an AI nutrition assistant",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/nutriscan.toml`; a missing default file is fine,
    /// a missing explicit one is an error.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// AI provider: `openai`, `gemini` or `ollama`.
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Model name, overriding the provider default.
    #[arg(long, global = true)]
    model: Option<String>,

    /// Log debug diagnostics to stderr (`RUST_LOG` takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Search products by name, or look one up by barcode.
    ///
    /// A query made of at least eight digits is treated as a barcode.
    Search {
        /// Product name or barcode.
        query: String,

        /// Maximum number of results (defaults to `[lookup].page_size`).
        #[arg(long)]
        limit: Option<usize>,

        /// Ask the assistant to analyze the first result.
        #[arg(long)]
        analyze: bool,

        /// Suggest up to three better-graded alternatives to the first result.
        #[arg(long)]
        alternatives: bool,

        /// Ask the assistant a question about the first result.
        #[arg(long, value_name = "QUESTION")]
        ask: Option<String>,
    },

    /// Compare the Nutri-Scores of several products.
    ///
    /// Duplicate barcodes are reported and skipped.
    Compare {
        /// Product barcodes.
        #[arg(required = true)]
        codes: Vec<String>,

        /// Ask the assistant which product is the best choice.
        #[arg(long)]
        analyze: bool,
    },

    /// Chat with the nutrition assistant.
    ///
    /// With a message, answers once and exits. Without one, starts an
    /// interactive session on stdin.
    Chat {
        /// Message to send.
        message: Option<String>,

        /// Context prepended to every message (e.g. a product description).
        #[arg(long)]
        context: Option<String>,
    },

    /// Normalize a raw product record read from a JSON file.
    Inspect {
        /// Path to the JSON file.
        file: PathBuf,
    },

    /// Show the resolved AI provider, model and endpoint.
    Provider,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Offline command that needs no config
    if let Commands::Inspect { file } = &cli.command {
        return inspect::run_inspect(file);
    }

    let (config_path, explicit) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG), false),
    };
    let cfg = config::load_config_or_default(&config_path, explicit)?;

    let flags = ProviderFlags {
        provider: cli.provider.as_deref(),
        model: cli.model.as_deref(),
    };

    match &cli.command {
        Commands::Search {
            query,
            limit,
            analyze,
            alternatives,
            ask,
        } => {
            let options = SearchOptions {
                limit: *limit,
                analyze: *analyze,
                alternatives: *alternatives,
                ask: ask.clone(),
            };
            search::run_search(&cfg, flags, query, &options)?;
        }
        Commands::Compare { codes, analyze } => {
            compare::run_compare(&cfg, flags, codes, *analyze)?;
        }
        Commands::Chat { message, context } => {
            chat::run_chat(&cfg, flags, message.as_deref(), context.as_deref())?;
        }
        Commands::Provider => {
            providers::run_provider(&cfg, flags)?;
        }
        Commands::Inspect { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
