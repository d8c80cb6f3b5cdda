//! # tally
//!
//! ```bash
//! tally migrate
//! tally price --order order.json --promotions promotions.json
//! tally price --order order.json --at 2024-12-24T18:00:00Z
//! tally config
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tally_core::{Channel, Promotion};
use tally_db::{Database, DbConfig};
use tally_pricing::{CatalogOracle, PricingPipeline, RequestContext};
use tracing::info;

use tally_cli::adapters::DbCatalog;
use tally_cli::config::TallyConfig;
use tally_cli::request::{OrderRequest, PricedOrder};

#[derive(Debug, Parser)]
#[command(name = "tally", version, about = "Order pricing engine")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the configured path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending catalog migrations
    Migrate,

    /// Price an order and print it as JSON
    Price {
        /// Order request JSON file
        #[arg(long)]
        order: PathBuf,

        /// Promotions JSON file (array)
        #[arg(long)]
        promotions: Option<PathBuf>,

        /// Pricing instant for promotion windows (RFC 3339, defaults to now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tally_cli::init_tracing();

    let cli = Cli::parse();
    let mut config = TallyConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    match cli.command {
        Command::Migrate => migrate(&config).await,
        Command::Price {
            order,
            promotions,
            at,
        } => price(&config, &order, promotions.as_deref(), at).await,
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn open_database(config: &TallyConfig) -> Result<Database> {
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let db_config = DbConfig::new(&config.database.path)
        .max_connections(config.database.max_connections)
        .run_migrations(false);
    Ok(Database::new(db_config).await?)
}

async fn migrate(config: &TallyConfig) -> Result<()> {
    let db = open_database(config).await?;
    db.run_migrations().await?;

    let (total, applied) = db.migration_status().await?;
    println!("{applied}/{total} migrations applied");
    Ok(())
}

async fn price(
    config: &TallyConfig,
    order_path: &Path,
    promotions_path: Option<&Path>,
    at: Option<DateTime<Utc>>,
) -> Result<()> {
    let request: OrderRequest = read_json(order_path)?;
    let promotions: Vec<Promotion> = match promotions_path {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let mut order = request.into_order()?;

    let db = open_database(config).await?;
    db.run_migrations().await?;

    let default_zone = db
        .zones()
        .get_by_id(&config.channel.default_zone)
        .await?
        .ok_or_else(|| anyhow!("default zone '{}' is not in the catalog", config.channel.default_zone))?;

    let channel = Channel {
        code: config.channel.code.clone(),
        default_tax_zone: default_zone,
        prices_include_tax: config.channel.prices_include_tax,
    };

    let strategy = config.pricing.zone_strategy.build();
    let catalog = Arc::new(DbCatalog::new(db, strategy.clone()));
    let pipeline = PricingPipeline::new(
        catalog.clone(),
        catalog.clone(),
        catalog.clone(),
        Arc::new(CatalogOracle::new(catalog)),
    )
    .with_zone_strategy(strategy);

    let ctx = RequestContext::at(channel, at.unwrap_or_else(Utc::now));
    info!(order = %order.code, promotions = promotions.len(), "Pricing order");

    pipeline
        .apply_price_adjustments(&ctx, &mut order, &promotions)
        .await?;

    println!("{}", serde_json::to_string_pretty(&PricedOrder::from(&order))?);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}
