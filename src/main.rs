use anyhow::Result;
use burn_dashboard::config::WarehouseConfig;
use burn_dashboard::db::warehouse::Warehouse;
use burn_dashboard::db::DatabaseConnection;
use burn_dashboard::etl::pipeline::Pipeline;
use burn_dashboard::{init_logging, serve, DataSource};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "burn-dashboard")]
#[command(about = "Burn unit dashboard ETL processor and API server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long, default_value = "8000")]
        port: u16,

        #[arg(short = 'b', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Execute one clean, aggregate and load run
    Run {
        #[arg(short, long, value_enum, default_value = "sample")]
        source: DataSource,
    },
    /// Create the destination tables and exit
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    // Parse command line arguments
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = WarehouseConfig::from_env()?;
    let warehouse = Arc::new(Warehouse::new(config)?);
    warehouse.connect().await?;

    match cli.command {
        Commands::Serve { host, port } => {
            info!("Starting API server");
            serve(host, port, warehouse).await?;
        }
        Commands::Run { source } => {
            let pipeline = Pipeline::new(Arc::clone(&warehouse));
            match pipeline.run(source).await {
                Ok(report) => info!(
                    "Run finished: {} in {}s",
                    report.message, report.execution_time_seconds
                ),
                Err(e) => {
                    error!("Run failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::InitDb => {
            warehouse.create_tables().await?;
            info!("Destination tables are in place");
        }
    }

    Ok(())
}
