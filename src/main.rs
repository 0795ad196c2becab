use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tracing::error;

use ccrt_backend::catalog;
use ccrt_backend::config::Config;
use ccrt_backend::logging;
use ccrt_backend::server;
use ccrt_backend::storage::Storage;

#[derive(Parser)]
#[command(name = "ccrt_backend")]
#[command(about = "Cloud Compliance Readiness Toolkit backend")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the catalog if needed and start the HTTP API server
    Serve {
        /// Port to listen on (overrides config.toml)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Initialize storage and seed it from the control catalog
    Seed {
        /// Path to the catalog YAML file (overrides config.toml)
        #[arg(long)]
        catalog: Option<String>,
    },
    /// Validate a catalog file without writing anything
    CheckCatalog {
        /// Path to the catalog YAML file (overrides config.toml)
        #[arg(long)]
        catalog: Option<String>,
    },
}

async fn build_storage(config: &Config) -> ccrt_backend::Result<Arc<dyn Storage>> {
    #[cfg(feature = "db")]
    {
        let storage = ccrt_backend::storage::DatabaseStorage::new(&config.database).await?;
        Ok(Arc::new(storage))
    }
    #[cfg(not(feature = "db"))]
    {
        let _ = config;
        tracing::info!("Using in-memory storage (built without the `db` feature)");
        Ok(Arc::new(ccrt_backend::storage::InMemoryStorage::new()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load_or_default();

    match cli.command {
        Commands::Serve { port } => {
            let storage = build_storage(&config).await?;

            let summary =
                catalog::seed_if_empty(storage.as_ref(), Path::new(&config.catalog.path)).await?;
            if summary.seeded {
                println!(
                    "📚 Seeded catalog: {} frameworks, {} controls, {} labs",
                    summary.frameworks, summary.controls, summary.labs
                );
            }

            let port = port.unwrap_or(config.server.port);
            server::start_server(storage, &config.server.host, port).await?;
        }
        Commands::Seed { catalog: catalog_path } => {
            let storage = build_storage(&config).await?;
            let path = catalog_path.unwrap_or_else(|| config.catalog.path.clone());

            let summary = catalog::seed_if_empty(storage.as_ref(), Path::new(&path)).await?;
            if summary.seeded {
                println!(
                    "✅ Seeded {} frameworks, {} controls, {} labs from {}",
                    summary.frameworks, summary.controls, summary.labs, path
                );
            } else {
                println!("ℹ️  Nothing to seed (storage already populated or catalog missing)");
            }
        }
        Commands::CheckCatalog { catalog: catalog_path } => {
            let path = catalog_path.unwrap_or_else(|| config.catalog.path.clone());

            match catalog::load_catalog(Path::new(&path)) {
                Ok(file) => {
                    let controls: usize = file.frameworks.iter().map(|f| f.controls.len()).sum();
                    println!(
                        "✅ Catalog OK: {} frameworks, {} controls, {} labs",
                        file.frameworks.len(),
                        controls,
                        file.labs.len()
                    );
                }
                Err(e) => {
                    error!("Catalog validation failed: {e}");
                    println!("❌ Catalog validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}
