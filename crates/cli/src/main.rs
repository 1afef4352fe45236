use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use schemalog_core::MigrationId;
use schemalog_core::env_config::db_path_from_env;
use schemalog_storage::Storage;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "schemalog")]
#[command(about = "Reversible schema migrations over an append-only diff log", long_about = None)]
struct Cli {
    /// Database file (default: $SCHEMALOG_DB, then the user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the modelled tables at the ledger base in an empty database
    Init,
    /// List migrations and whether each is applied
    Status,
    /// Apply pending migrations
    Migrate {
        /// Stop after this migration id
        #[arg(long)]
        to: Option<MigrationId>,
    },
    /// Revert applied migrations (one step by default)
    Rollback {
        /// Revert every migration above this id
        #[arg(long, conflicts_with = "steps")]
        to: Option<MigrationId>,
        /// Number of migrations to revert
        #[arg(long)]
        steps: Option<usize>,
    },
    /// Print the schema snapshot at a migration id (default: head)
    Schema {
        #[arg(long)]
        at: Option<MigrationId>,
        #[arg(short, long)]
        table: Option<String>,
    },
    /// Compare the live database with the snapshot at its applied migration
    Check,
}

pub(crate) fn get_db_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(db_path_from_env).unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("schemalog")
            .join("schema.db")
    })
}

pub(crate) fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Opens the database the command line points at, creating its directory.
pub(crate) fn open_storage(flag: Option<PathBuf>) -> Result<Storage> {
    let db_path = get_db_path(flag);
    ensure_db_dir(&db_path)?;
    tracing::debug!(path = %db_path.display(), "using database");
    Ok(Storage::new(&db_path)?)
}

fn run(cli: Cli) -> Result<()> {
    let db = cli.db;
    match cli.command {
        Commands::Init => commands::init::run_init(db),
        Commands::Status => commands::migrate::run_status(db),
        Commands::Migrate { to } => commands::migrate::run_migrate(db, to),
        Commands::Rollback { to, steps } => commands::migrate::run_rollback(db, to, steps),
        Commands::Schema { at, table } => commands::schema::run_schema(at, table.as_deref()),
        Commands::Check => commands::schema::run_check(db),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    tokio::task::spawn_blocking(move || run(cli)).await?
}
