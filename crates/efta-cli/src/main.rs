mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "efta-cli")]
#[command(about = "EFTA storefront command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Upsert the product catalog into the database
    Seed {
        /// Catalog YAML file; defaults to `EFTA_CATALOG_PATH`
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Print recommendations for a product as JSON
    Similar {
        /// Source product id
        product_id: uuid::Uuid,
        /// Number of products to return
        #[arg(long)]
        limit: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("efta-cli: no command given, see --help");
        return Ok(());
    };

    let config = efta_core::load_app_config()?;
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = efta_db::connect_pool(
        &config.database_url,
        efta_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match command {
        Commands::Migrate => {
            let applied = efta_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Seed { catalog } => {
            let path = catalog.unwrap_or_else(|| config.catalog_path.clone());
            commands::run_seed(&pool, &path).await?;
        }
        Commands::Similar { product_id, limit } => {
            commands::run_similar(&pool, &config, product_id, limit).await?;
        }
    }

    Ok(())
}
