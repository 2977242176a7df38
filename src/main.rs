//! Wallet Checker - inspect cryptocurrency wallets and track price alerts
//!
//! Balances and transaction counts come from public explorer APIs; the
//! wallet analysis is a heuristic, not an identification.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::filter::{Directive, EnvFilter};

// Use the library crate
use wallet_checker::cli::commands;
use wallet_checker::config::Config;
use wallet_checker::export::ExportFormat;

/// Wallet Checker - balances, usage heuristics and price alerts
#[derive(Parser)]
#[command(name = "wallet-checker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a wallet address
    Check {
        /// Wallet address
        address: String,

        /// Asset symbol (btc, eth, ltc, ...)
        #[arg(long, default_value = "btc")]
        crypto: String,

        /// Export the report to a file
        #[arg(long, value_enum)]
        export: Option<ExportFormat>,
    },

    /// Manage favorite wallets
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },

    /// Show or clear the search history
    History(HistoryArgs),

    /// Manage price alerts
    Alert {
        #[command(subcommand)]
        action: AlertAction,
    },

    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum FavoriteAction {
    /// Save a wallet under a name
    Add {
        /// Display name
        name: String,

        /// Wallet address
        address: String,

        /// Asset symbol
        #[arg(long, default_value = "btc")]
        crypto: String,

        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Remove a saved wallet by address
    Remove {
        /// Wallet address
        address: String,
    },

    /// List saved wallets
    List,
}

#[derive(Args)]
struct HistoryArgs {
    /// Number of searches to show
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// Delete all history
    #[arg(long)]
    clear: bool,

    /// Skip confirmation prompt
    #[arg(long, requires = "clear")]
    force: bool,
}

#[derive(Subcommand)]
enum AlertAction {
    /// Create a price alert
    Add {
        /// Asset symbol
        crypto: String,

        /// Target price in the configured fiat currency
        price: f64,

        /// Trigger when the price is `above` or `below` the target
        #[arg(long, default_value = "above")]
        condition: String,

        /// Free-form note shown when the alert fires
        #[arg(long, default_value = "")]
        note: String,
    },

    /// List alerts
    List {
        /// Include alerts that already fired
        #[arg(long)]
        all: bool,
    },

    /// Delete an alert
    Remove {
        /// Alert id
        id: u64,
    },

    /// Evaluate pending alerts against current prices
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let filter = match "wallet_checker=info".parse::<Directive>() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };

    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Check {
            address,
            crypto,
            export,
        } => commands::check(&config, &address, &crypto, export).await,
        Commands::Favorite { action } => match action {
            FavoriteAction::Add {
                name,
                address,
                crypto,
                notes,
            } => commands::favorite_add(&config, &name, &address, &crypto, &notes),
            FavoriteAction::Remove { address } => commands::favorite_remove(&config, &address),
            FavoriteAction::List => commands::favorite_list(&config),
        },
        Commands::History(args) => commands::history(&config, args.limit, args.clear, args.force),
        Commands::Alert { action } => match action {
            AlertAction::Add {
                crypto,
                price,
                condition,
                note,
            } => commands::alert_add(&config, &crypto, price, &condition, &note),
            AlertAction::List { all } => commands::alert_list(&config, all),
            AlertAction::Remove { id } => commands::alert_remove(&config, id),
            AlertAction::Check => commands::alert_check(&config).await,
        },
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
