//! soma-bi CLI - Run analytical views against an estimation database
//!
//! Usage:
//!   soma-bi query --view <view.json> [--limit N] [--offset N] [--raw]
//!   soma-bi query --view-id <id>
//!   soma-bi explain --view <view.json> [--dialect <dialect>]
//!   soma-bi stream --dataset-result-id <id> --unit <unit> [--batch-size N]
//!   soma-bi dates --dataset-result-id <id> --unit <unit>
//!   soma-bi areas --dataset-result-id <id> --unit <unit>
//!   soma-bi init
//!
//! Examples:
//!   soma-bi --db ./soma.db query --view bar.json --limit 20
//!   soma-bi explain --view pie.json --dialect postgres
//!   soma-bi stream --dataset-result-id 3 --unit building --area 北区

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use soma_bi::config::Settings;
use soma_bi::cursor::BatchRequest;
use soma_bi::engine::format;
use soma_bi::error::{EngineError, ErrorKind};
use soma_bi::model::{Unit, View};
use soma_bi::planner::Pagination;
use soma_bi::sql::Dialect;
use soma_bi::store::SqliteStore;
use soma_bi::QueryEngine;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "soma-bi")]
#[command(about = "soma-bi - Compile and run analytical views over estimation results")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to SOMA_BI_CONFIG, ./soma-bi.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database (overrides database.path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a view and print its payload as JSON
    Query {
        #[command(flatten)]
        source: ViewSource,

        #[command(flatten)]
        page: PageArgs,

        /// Skip display formatting
        #[arg(long)]
        raw: bool,
    },

    /// Print the SQL a view compiles to
    Explain {
        /// Path to a view JSON file
        #[arg(long)]
        view: PathBuf,

        /// SQL dialect to generate (defaults to query.dialect)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Stream detail rows in id-ordered batches, one JSON array per line
    Stream {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Only rows with this reference date
        #[arg(long)]
        reference_date: Option<String>,

        /// Only rows in these areas (repeatable)
        #[arg(long = "area")]
        areas: Vec<String>,

        /// Rows per batch (defaults to query.batch_size)
        #[arg(long)]
        batch_size: Option<u64>,
    },

    /// List reference dates, newest first
    Dates {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// List area names
    Areas {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Create the schema in the database file
    Init,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ViewSource {
    /// Path to a view JSON file
    #[arg(long)]
    view: Option<PathBuf>,

    /// Id of a saved view
    #[arg(long)]
    view_id: Option<i64>,
}

#[derive(Args)]
struct PageArgs {
    /// Page size (defaults to query.default_limit)
    #[arg(long)]
    limit: Option<u64>,

    #[arg(long, default_value_t = 0)]
    offset: u64,
}

#[derive(Args)]
struct ScopeArgs {
    #[arg(long)]
    dataset_result_id: i64,

    #[arg(long)]
    unit: UnitArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Sqlite,
    Postgres,
    Duckdb,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Duckdb => Dialect::DuckDb,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Building,
    Area,
}

impl From<UnitArg> for Unit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Building => Unit::Building,
            UnitArg::Area => Unit::Area,
        }
    }
}

/// Command failure, mapped to an exit code.
enum Failure {
    /// Bad input: view file, settings or arguments.
    Invalid(String),
    /// The store failed.
    Execution(String),
}

impl From<EngineError> for Failure {
    fn from(e: EngineError) -> Self {
        match e.kind() {
            ErrorKind::Validation => Failure::Invalid(e.to_string()),
            ErrorKind::Execution => Failure::Execution(e.to_string()),
        }
    }
}

type CmdResult = Result<(), Failure>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::from(1);
        }
    };

    init_tracing(&settings.logging.filter);

    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Invalid(msg)) => {
            eprintln!("Error: {}", msg);
            ExitCode::from(1)
        }
        Err(Failure::Execution(msg)) => {
            eprintln!("Execution error: {}", msg);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli, settings: &Settings) -> CmdResult {
    let db_path = match cli.db {
        Some(path) => path,
        None => settings
            .database
            .resolved_path()
            .map_err(|e| Failure::Invalid(e.to_string()))?,
    };
    let store = SqliteStore::open(&db_path).map_err(|e| {
        Failure::Execution(format!("cannot open '{}': {}", db_path.display(), e))
    })?;
    let engine = QueryEngine::new(&store);

    match cli.command {
        Commands::Query { source, page, raw } => {
            let view = load_view(&store, &source)?;
            let payload = engine.execute(&view, pagination(&page, settings))?;
            let payload = if raw { payload } else { format::present(payload) };
            print_json(&payload)
        }
        Commands::Explain {
            view,
            dialect,
            page,
        } => {
            let view = read_view(&view)?;
            let dialect = dialect.map(Dialect::from).unwrap_or(settings.query.dialect);
            println!("{}", engine.explain(&view, pagination(&page, settings), dialect)?);
            Ok(())
        }
        Commands::Stream {
            scope,
            reference_date,
            areas,
            batch_size,
        } => {
            let mut request = BatchRequest::new(
                scope.dataset_result_id,
                scope.unit.into(),
                batch_size.unwrap_or(settings.query.batch_size),
            )
            .with_areas(areas.iter().map(String::as_str));
            request.reference_date = reference_date;

            let mut cursor = engine.stream(request);
            for batch in cursor.by_ref() {
                let batch = batch?;
                let line = serde_json::to_string(&batch)
                    .map_err(|e| Failure::Execution(e.to_string()))?;
                println!("{}", line);
            }
            tracing::info!(
                batches = cursor.batches_fetched(),
                position = ?cursor.position(),
                "stream finished"
            );
            Ok(())
        }
        Commands::Dates { scope } => {
            print_json(&engine.reference_dates(scope.dataset_result_id, scope.unit.into())?)
        }
        Commands::Areas { scope } => {
            print_json(&engine.area_groups(scope.dataset_result_id, scope.unit.into())?)
        }
        Commands::Init => {
            // Opening the store already created the schema.
            println!("Initialized {}", db_path.display());
            Ok(())
        }
    }
}

fn pagination(page: &PageArgs, settings: &Settings) -> Pagination {
    Pagination::new(
        page.limit.unwrap_or(settings.query.default_limit),
        page.offset,
    )
}

fn load_view(store: &SqliteStore, source: &ViewSource) -> Result<View, Failure> {
    match (&source.view, source.view_id) {
        (Some(path), _) => read_view(path),
        (None, Some(id)) => store
            .views()
            .get(id)
            .map_err(|e| Failure::Execution(e.to_string()))?
            .ok_or_else(|| Failure::Invalid(format!("view {} not found", id))),
        (None, None) => Err(Failure::Invalid("either --view or --view-id is required".into())),
    }
}

fn read_view(path: &PathBuf) -> Result<View, Failure> {
    let source = fs::read_to_string(path)
        .map_err(|e| Failure::Invalid(format!("Error reading file '{}': {}", path.display(), e)))?;
    serde_json::from_str(&source)
        .map_err(|e| Failure::Invalid(format!("Invalid view '{}': {}", path.display(), e)))
}

fn print_json<T: Serialize>(value: &T) -> CmdResult {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| Failure::Execution(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
