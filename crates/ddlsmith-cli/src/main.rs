mod commands;
mod config;
mod documents;
mod logging;
mod output;
#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{ArgAction, Args, Parser, Subcommand};
use config::{Config, DEFAULT_DICTIONARY, DEFAULT_DOMAINS, DEFAULT_TABLE, DocumentPath};
use ddlsmith_core::{Error as CoreError, Table, validate_table};
use documents::Catalog;
use logging::LogOptions;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("lint failed with {0} error(s)")]
    LintFailed(usize),
}

#[derive(Parser, Debug)]
#[command(
    name = "ddlsmith",
    version,
    about = "Generate SQL DDL from YAML schema descriptions"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Dictionary document (default: dict.yaml next to the executable).
    #[arg(long, global = true, value_name = "PATH")]
    dic: Option<PathBuf>,
    /// Domain document (default: domains.yaml next to the executable).
    #[arg(long, global = true, value_name = "PATH")]
    dom: Option<PathBuf>,
    /// Settings file (default: ddlsmith.toml in the working directory).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Write the output to this file instead of stdout.
    #[arg(long, global = true, value_name = "PATH")]
    out: Option<PathBuf>,
    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    /// Append logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Refuse to generate DDL for tables with lint errors.
    #[arg(long, global = true, default_value_t = false)]
    strict: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create-table and comment DDL for one table.
    Table(TableArgs),
    /// Index statements for one table.
    Index(TableArgs),
    /// Foreign key statements for one table.
    ForeignKeys(TableArgs),
    /// Check table documents and report issues.
    Lint(LintArgs),
    /// DDL for several tables, referenced tables first.
    Build(BuildArgs),
}

#[derive(Args, Debug)]
struct TableArgs {
    /// Table document (default: table.yaml).
    #[arg(long, value_name = "PATH")]
    tab: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LintArgs {
    /// Table document(s) to check (default: table.yaml).
    #[arg(long = "tab", value_name = "PATH")]
    tabs: Vec<PathBuf>,
    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Table documents to generate, in any order.
    #[arg(long = "tab", value_name = "PATH", required = true)]
    tabs: Vec<PathBuf>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let global = &cli.global;

    logging::init_logging(LogOptions {
        verbosity: global.verbose,
        json: global.log_json,
        file: global.log_file.as_deref(),
    })?;

    let cwd = std::env::current_dir()?;
    let config = Config::discover(global.config.as_deref(), &cwd)?;
    let strict = global.strict || config.strict;

    let exe_dir = config::executable_dir();
    let catalog = Catalog::load(
        &DocumentPath::resolve(
            global.dic.as_deref(),
            config.dictionary.as_deref(),
            exe_dir.join(DEFAULT_DICTIONARY),
        ),
        &DocumentPath::resolve(
            global.dom.as_deref(),
            config.domains.as_deref(),
            exe_dir.join(DEFAULT_DOMAINS),
        ),
    )?;
    let default_table = config
        .table
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TABLE));

    let timer = Instant::now();
    let (mode, ddl) = match cli.command {
        Command::Table(args) => {
            let table = load_table(&catalog, args.tab.as_deref(), &default_table, strict)?;
            ("table", commands::table_ddl(&table))
        }
        Command::Index(args) => {
            let table = load_table(&catalog, args.tab.as_deref(), &default_table, strict)?;
            ("index", commands::index_ddl(&table))
        }
        Command::ForeignKeys(args) => {
            let table = load_table(&catalog, args.tab.as_deref(), &default_table, strict)?;
            ("foreign_keys", commands::foreign_key_ddl(&table))
        }
        Command::Build(args) => {
            let tables = load_tables(&catalog, &args.tabs, strict)?;
            ("build", commands::build_ddl(&tables))
        }
        Command::Lint(args) => return run_lint(&catalog, args, default_table, global),
    };

    output::emit(global.out.as_deref(), &ddl)?;
    tracing::info!(
        event = "ddl_emitted",
        mode = mode,
        bytes = ddl.len(),
        duration_ms = timer.elapsed().as_millis()
    );

    Ok(())
}

fn run_lint(
    catalog: &Catalog,
    args: LintArgs,
    default_table: PathBuf,
    global: &GlobalArgs,
) -> Result<(), CliError> {
    let paths = if args.tabs.is_empty() {
        vec![default_table]
    } else {
        args.tabs
    };
    let tables = load_tables(catalog, &paths, false)?;
    let report = commands::lint_report(&tables);

    let text = if args.json {
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        json
    } else {
        commands::render_lint(&report, tables.len())
    };
    output::emit(global.out.as_deref(), &text)?;

    tracing::info!(
        event = "lint_finished",
        tables = tables.len(),
        errors = report.errors.len(),
        warnings = report.warnings.len()
    );

    if report.is_ok() {
        Ok(())
    } else {
        Err(CliError::LintFailed(report.errors.len()))
    }
}

fn load_table(
    catalog: &Catalog,
    tab: Option<&Path>,
    default_table: &Path,
    strict: bool,
) -> Result<Table, CliError> {
    let path = tab.unwrap_or(default_table);
    let mut tables = load_tables(catalog, &[path.to_path_buf()], strict)?;
    tables
        .pop()
        .ok_or_else(|| CliError::InvalidConfig(format!("no table loaded from {}", path.display())))
}

fn load_tables(catalog: &Catalog, paths: &[PathBuf], strict: bool) -> Result<Vec<Table>, CliError> {
    let tables = paths
        .iter()
        .map(|path| catalog.table(path))
        .collect::<Result<Vec<_>, _>>()?;

    if strict {
        for table in &tables {
            validate_table(table).into_result()?;
        }
    }

    Ok(tables)
}
