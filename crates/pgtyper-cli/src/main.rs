mod config;
mod logging;
mod redact;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use pgtyper_core::{Error as CoreError, generate};
use pgtyper_introspect::PostgresCatalog;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio::io::AsyncWrite;
use uuid::Uuid;

use config::{FlagOverrides, OutputTarget, load_config, resolve_options};
use logging::init_logging;
use redact::redact_connection_string;

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config decode error: {0}")]
    ConfigDecode(#[from] toml::de::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(name = "pgtyper", version, about = "Generate TypeScript types from a Postgres schema")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Database connection string (flag form).
    #[arg(long, value_name = "CONNECTION_STRING", conflicts_with = "conn_pos")]
    conn: Option<String>,
    /// Database connection string (positional form). Falls back to DATABASE_URL.
    #[arg(value_name = "CONNECTION_STRING")]
    conn_pos: Option<String>,
    /// Config file (defaults to ./pgtyper.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file; `-` writes to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Schemas to include; prefix with `!` to exclude. Comma-separated or repeated.
    #[arg(long, value_name = "SCHEMA")]
    schema: Vec<String>,
    /// Tables to leave out. Comma-separated or repeated.
    #[arg(long, value_name = "TABLE")]
    exclude: Vec<String>,
    /// File whose contents are written before the declarations.
    #[arg(long)]
    prefix_file: Option<PathBuf>,
    /// File whose contents are written after the declarations.
    #[arg(long)]
    suffix_file: Option<PathBuf>,
    /// Name of the table registry enum.
    #[arg(long)]
    tables_enum_name: Option<String>,
    /// Name of the table-name-to-type map.
    #[arg(long)]
    tables_type_name: Option<String>,
    /// Skip the table-name-to-type map.
    #[arg(long, default_value_t = false)]
    no_table_map: bool,
    /// Ignore `table.column` type overrides.
    #[arg(long, default_value_t = false)]
    no_table_column_type_overrides: bool,
    /// Ignore `column` type overrides.
    #[arg(long, default_value_t = false)]
    no_column_type_overrides: bool,
    /// Ignore storage type tag overrides.
    #[arg(long, default_value_t = false)]
    no_default_type_overrides: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;

    match cli.command {
        Command::Generate(args) => run_generate(args).await,
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        conn,
        conn_pos,
        config,
        output,
        schema,
        exclude,
        prefix_file,
        suffix_file,
        tables_enum_name,
        tables_type_name,
        no_table_map,
        no_table_column_type_overrides,
        no_column_type_overrides,
        no_default_type_overrides,
    } = args;

    let conn = match (conn, conn_pos) {
        (Some(value), None) | (None, Some(value)) => value,
        (Some(_), Some(_)) => {
            return Err(CliError::InvalidConfig(
                "use either --conn or positional connection string".to_string(),
            ));
        }
        (None, None) => std::env::var("DATABASE_URL").map_err(|_| {
            CliError::InvalidConfig(
                "connection string is required (argument, --conn, or DATABASE_URL)".to_string(),
            )
        })?,
    };
    let engine = detect_engine(&conn)?;

    let file = load_config(config.as_deref())?.unwrap_or_default();
    let flags = FlagOverrides {
        output,
        schema,
        exclude,
        prefix: read_optional(prefix_file.as_deref())?,
        suffix: read_optional(suffix_file.as_deref())?,
        tables_enum_name,
        tables_type_name,
        no_table_map,
        no_table_column_type_overrides,
        no_column_type_overrides,
        no_default_type_overrides,
    };
    let (options, target) = resolve_options(file, flags);
    options.validate()?;

    let run_id = Uuid::new_v4().to_string();
    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        engine = %engine,
        connection = %redact_connection_string(&conn)
    );
    let timer = Instant::now();

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&conn)
        .await?;
    let catalog = PostgresCatalog::new(pool);

    let sink = match open_output(&target).await {
        Ok(sink) => sink,
        Err(err) => {
            catalog.pool().close().await;
            return Err(err);
        }
    };

    let report = generate(catalog, sink, &options).await?;

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(
        event = "run_finished",
        run_id = %run_id,
        status = "success",
        output = %describe_target(&target),
        enums = report.enums,
        tables = report.tables,
        columns = report.columns,
        duration_ms = duration_ms
    );

    Ok(())
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(redact_connection_string(conn)))
    }
}

fn read_optional(path: Option<&Path>) -> Result<Option<String>, CliError> {
    path.map(std::fs::read_to_string)
        .transpose()
        .map_err(CliError::from)
}

async fn open_output(
    target: &OutputTarget,
) -> Result<Box<dyn AsyncWrite + Unpin + Send>, CliError> {
    match target {
        OutputTarget::Stdout => Ok(Box::new(tokio::io::stdout())),
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            let file = tokio::fs::File::create(path).await?;
            Ok(Box::new(file))
        }
    }
}

fn describe_target(target: &OutputTarget) -> String {
    match target {
        OutputTarget::Stdout => "stdout".to_string(),
        OutputTarget::File(path) => path.display().to_string(),
    }
}
