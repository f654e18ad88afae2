//! Bronze CLI tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "bronze")]
#[command(about = "Bronze ingestion source configuration CLI", long_about = None)]
struct Cli {
    /// API server URL
    #[arg(long, env = "BRONZE_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a defaulted source document
    Init {
        /// Source type (jdbc, file, api, stream)
        source_type: String,
        /// Source name
        #[arg(long)]
        name: Option<String>,
        /// Target table, defaults to the source name
        #[arg(long)]
        table: Option<String>,
    },
    /// Validate a source document
    Validate {
        /// Path to the source document
        path: PathBuf,
    },
    /// Resolve `${key}` placeholders in a source document
    Render {
        path: PathBuf,
        /// Environment file with `name` and `variables`
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
    /// Set one field of a source document by dot path
    Set {
        path: PathBuf,
        /// Field path, e.g. `extract.watermark.column`
        field: String,
        /// JSON value; bare words are taken as strings
        value: String,
        /// Rewrite the file instead of printing the result
        #[arg(long)]
        in_place: bool,
    },
    /// List registry options
    Options {
        /// Option set, e.g. `source_types` or `cdc_modes`
        kind: Option<String>,
    },
    /// Manage sources on the API server
    Sources {
        #[command(subcommand)]
        command: SourceCommands,
    },
}

#[derive(Subcommand)]
enum SourceCommands {
    /// List sources
    List {
        /// Filter by source type
        #[arg(long)]
        source_type: Option<String>,
        /// Filter by domain tag
        #[arg(long)]
        domain: Option<String>,
    },
    /// Print a source document
    Get { name: String },
    /// Create or update a source from a document
    Push { path: PathBuf },
    /// Delete a source
    Delete { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            source_type,
            name,
            table,
        } => {
            commands::init(&source_type, name, table)?;
        }
        Commands::Validate { path } => {
            commands::validate(&path)?;
        }
        Commands::Render { path, env_file } => {
            commands::render(&path, env_file.as_deref())?;
        }
        Commands::Set {
            path,
            field,
            value,
            in_place,
        } => {
            commands::set(&path, &field, &value, in_place)?;
        }
        Commands::Options { kind } => {
            commands::options(kind.as_deref())?;
        }
        Commands::Sources { command } => match command {
            SourceCommands::List {
                source_type,
                domain,
            } => {
                commands::sources::list(&cli.api_url, source_type, domain).await?;
            }
            SourceCommands::Get { name } => {
                commands::sources::get(&cli.api_url, &name).await?;
            }
            SourceCommands::Push { path } => {
                commands::sources::push(&cli.api_url, &path).await?;
            }
            SourceCommands::Delete { name } => {
                commands::sources::delete(&cli.api_url, &name).await?;
            }
        },
    }

    Ok(())
}
