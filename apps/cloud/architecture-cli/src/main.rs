//! Architecture CLI
//!
//! Prices, exports and manages cloud architectures built on the designer
//! canvas. Local snapshot files use the same JSON shape the gateway accepts.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_architecture::ExportFormat;
use eyre::Result;
use tracing::debug;
use uuid::Uuid;

mod commands;
mod config;
mod telemetry;

use config::Config;

#[derive(Parser)]
#[command(name = "architecture-cli")]
#[command(about = "Price, export and manage cloud architecture designs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List placeable services grouped by category
    Catalog,

    /// List deployment regions
    Regions,

    /// Print the cost breakdown of a snapshot file
    Estimate {
        /// Snapshot file (JSON)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Write an infrastructure-as-code document
    Export {
        /// Snapshot file (JSON)
        #[arg(short, long, conflicts_with = "id", required_unless_present = "id")]
        file: Option<PathBuf>,

        /// Saved architecture to export
        #[arg(long)]
        id: Option<Uuid>,

        /// cloudformation (cfn) or terraform (tf)
        #[arg(short = 'F', long, default_value = "cloudformation")]
        format: ExportFormat,

        /// Output directory. Defaults to EXPORT_DIR.
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// List saved architectures
    List {
        #[arg(long, default_value_t = 0)]
        skip: usize,

        #[arg(long, default_value_t = 100)]
        limit: usize,
    },

    /// Show a saved architecture with its costs
    Show {
        #[arg(long)]
        id: Uuid,
    },

    /// Save a snapshot file, updating an existing architecture when --id is given
    Save {
        /// Snapshot file (JSON)
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long)]
        id: Option<Uuid>,

        /// Overrides the name in the file
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a saved architecture
    Delete {
        #[arg(long)]
        id: Uuid,
    },

    /// Copy a saved architecture
    Duplicate {
        #[arg(long)]
        id: Uuid,
    },

    /// Share a saved architecture publicly
    Publish {
        #[arg(long)]
        id: Uuid,

        /// Make it private again
        #[arg(long)]
        private: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let metrics = telemetry::init_metrics();

    let cli = Cli::parse();
    debug!(api_url = %config.gateway.api_url, region = %config.default_region, "Configuration loaded");

    let result = run(&config, cli.command).await;

    if let (Some(handle), Some(path)) = (metrics, &config.metrics_file) {
        telemetry::write_metrics(handle, path)?;
    }

    result
}

async fn run(config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Catalog => commands::catalog(config)?,
        Commands::Regions => commands::regions(config)?,
        Commands::Estimate { file } => commands::estimate(config, &file)?,
        Commands::Export {
            file,
            id,
            format,
            out_dir,
        } => {
            commands::export(config, file.as_deref(), id, format, out_dir.as_deref()).await?;
        }
        Commands::List { skip, limit } => commands::list(config, skip, limit).await?,
        Commands::Show { id } => commands::show(config, id).await?,
        Commands::Save {
            file,
            id,
            name,
            description,
        } => {
            commands::save(config, &file, id, name.as_deref(), description.as_deref()).await?;
        }
        Commands::Delete { id } => commands::delete(config, id).await?,
        Commands::Duplicate { id } => commands::duplicate(config, id).await?,
        Commands::Publish { id, private } => commands::publish(config, id, private).await?,
    }

    Ok(())
}
