mod catalog;
mod report;
mod scan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricewatch")]
#[command(about = "Average the prices a catalog of web pages shows")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a catalog file (Excel, CSV or YAML) into the database
    Import {
        /// Path to a `.xlsx`, `.xls`, `.csv`, `.yaml` or `.yml` catalog with title, url and xpath fields
        file: PathBuf,

        /// Replace the stored catalog instead of appending to it
        #[arg(long)]
        replace: bool,
    },
    /// Print the stored catalog
    List,
    /// Read every stored target and print its average price
    Scan {
        /// Targets read at once (1 to 5)
        #[arg(long, value_parser = scan::parse_concurrency)]
        concurrency: Option<usize>,

        /// Per-target budget for page load plus element wait, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Emit the result map as JSON
        #[arg(long)]
        json: bool,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("pricewatch: no command given; see `pricewatch --help`");
        return Ok(());
    };

    let mut config = pricewatch_core::load_app_config()?;
    init_tracing(&config.log_level);
    tracing::debug!(?config, "loaded configuration");

    let pool = pricewatch_db::connect_pool(
        &config.database_url,
        pricewatch_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match command {
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = pricewatch_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            pricewatch_db::health_check(&pool).await?;
            println!("database ok");
        }
        Commands::Import { file, replace } => {
            pricewatch_db::run_migrations(&pool).await?;
            catalog::run_import(&pool, &file, replace).await?;
        }
        Commands::List => {
            pricewatch_db::run_migrations(&pool).await?;
            catalog::run_list(&pool).await?;
        }
        Commands::Scan {
            concurrency,
            timeout_secs,
            json,
        } => {
            pricewatch_db::run_migrations(&pool).await?;
            scan::apply_overrides(&mut config, concurrency, timeout_secs);
            scan::run_scan(&pool, &config, json).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so `scan --json` output stays machine-readable.
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
