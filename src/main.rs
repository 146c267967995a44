//! Builds a fresh SQLite database from the configured entity files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sqlseed::config::{Settings, DEFAULT_CONFIG_FILE};
use sqlseed::error::Result;
use sqlseed::loader::{Entity, Loader};
use sqlseed::store::SqliteStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Load header-described delimited files into a fresh SQLite database")]
struct Args {
    /// Database file to (re)create, or `:memory:`.
    #[arg(short, long)]
    database: Option<String>,

    /// Settings file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory holding one `<entity>.<extension>` file per entity.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log parsed headers and generated statements.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let default_filter = if args.verbose { "sqlseed=debug" } else { "sqlseed=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut settings = Settings::load(&args.config)?;
    if let Some(database) = args.database {
        settings.database = database;
    }
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }
    let format = settings.line_format()?;
    let entities = settings
        .require_entities()?
        .iter()
        .map(|name| Entity::read(&settings.data_dir, name, &settings.extension))
        .collect::<Result<Vec<_>>>()?;

    let store = SqliteStore::recreate(settings.location())?;
    let mut loader = Loader::with_format(store, format);
    let reports = loader.load_all(&entities)?;
    loader.finish()?;

    let rows: usize = reports.iter().map(|r| r.rows).sum();
    info!(database = %settings.database, tables = reports.len(), rows, "database built");
    Ok(())
}
