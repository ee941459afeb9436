mod check;
mod state;
mod watch;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use restock_store::StateFile;

#[derive(Debug, Parser)]
#[command(name = "restock")]
#[command(about = "Watch product pages and get a Telegram alert when an item is back in stock")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one check cycle over the configured products (default)
    Check {
        /// Check only this product URL; repeat to check several
        #[arg(long = "product", value_name = "URL")]
        products: Vec<String>,
        /// Check without sending notifications or updating the state file
        #[arg(long)]
        dry_run: bool,
    },
    /// Keep running and check on a cron schedule
    Watch {
        /// Six-field cron expression (seconds first)
        #[arg(long, default_value = watch::DEFAULT_SCHEDULE)]
        cron: String,
    },
    /// Inspect or reset the dedup state file
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
}

#[derive(Debug, Subcommand)]
enum StateCommands {
    /// List products currently recorded as unavailable
    Show,
    /// Delete the state file; the next check counts as a first run
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Arc::new(restock_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    let command = cli.command.unwrap_or(Commands::Check {
        products: Vec::new(),
        dry_run: false,
    });

    match command {
        Commands::Check { products, dry_run } => {
            check::run_check(&config, &products, dry_run).await?;
        }
        Commands::Watch { cron } => watch::run_watch(Arc::clone(&config), &cron).await?,
        Commands::State { command } => {
            let store = StateFile::new(&config.state_path);
            match command {
                StateCommands::Show => state::show(&store)?,
                StateCommands::Clear => state::clear(&store)?,
            }
        }
    }

    Ok(())
}
