//! Command-line front end: run the pipeline, export the analytic table, browse raw datasets.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing_subscriber::EnvFilter;

use nhanes_etl::catalog;
use nhanes_etl::config::PipelineConfig;
use nhanes_etl::pipeline::columns::{ACR, EGFR};
use nhanes_etl::pipeline::{run_pipeline, AnalyticTable};
use nhanes_etl::processing::{reduce, ReduceOp};
use nhanes_etl::sink::{save_to_file, ExportFormat};
use nhanes_etl::types::Value;
use nhanes_etl::EtlResult;

#[derive(Parser)]
#[command(
    name = "nhanes-etl",
    version,
    about = "Link five survey extracts into one analytic table and export it"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Adjust log verbosity (-v debug, -vv trace, -q warnings, -qq errors only).
    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,

    /// Directory holding the raw extracts (overrides `DATA_DIR`).
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline and write the analytic table.
    Run(RunArgs),
    /// List raw datasets in the data directory.
    Datasets,
    /// Show inferred columns and row count of a raw dataset.
    Describe {
        name: String,
    },
    /// Print a page of a raw dataset as JSON records.
    Preview {
        name: String,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Comma-separated column subset.
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
}

#[derive(Parser)]
struct RunArgs {
    /// Output file name inside the output directory.
    #[arg(long, default_value = "analytic_table")]
    name: String,

    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    format: FormatArg,

    /// Directory receiving the export (overrides `OUTPUT_DIR`).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Also load the table into SQLite.
    #[arg(long)]
    sqlite: bool,

    /// SQLite table name (defaults to `SQLITE_TABLE`).
    #[arg(long, requires = "sqlite")]
    table: Option<String>,

    #[arg(long, value_enum, default_value_t = IfExistsArg::Replace, requires = "sqlite")]
    if_exists: IfExistsArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Xlsx,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Xlsx => ExportFormat::Xlsx,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum IfExistsArg {
    Replace,
    Append,
    Fail,
}

/// Explicit `-v`/`-q` flags win over `RUST_LOG`.
fn init_logging(verbosity: &Verbosity<InfoLevel>) {
    let level = verbosity.tracing_level_filter();
    let filter = if verbosity.is_present() {
        EnvFilter::default().add_directive(level.into())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.verbosity);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "failed");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> EtlResult<()> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Command::Run(args) => run_export(config, args),
        Command::Datasets => {
            let entries = catalog::list_datasets(&config.data_dir)?;
            print_json(&serde_json::to_value(entries)?)
        }
        Command::Describe { name } => {
            let desc = catalog::describe_dataset(&config.data_dir, &name)?;
            print_json(&serde_json::to_value(desc)?)
        }
        Command::Preview {
            name,
            offset,
            limit,
            columns,
        } => {
            let mut ds = catalog::read_dataset(&config.data_dir, &name)?;
            if !columns.is_empty() {
                let cols: Vec<&str> = columns.iter().map(String::as_str).collect();
                ds = catalog::select_columns(&ds, &cols)?;
            }
            let page = catalog::window(&ds, offset, limit, config.max_json_rows);
            print_json(&catalog::to_json_records(&page))
        }
    }
}

fn run_export(mut config: PipelineConfig, args: RunArgs) -> EtlResult<()> {
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    let table = run_pipeline(&config)?;
    log_summary(&table);

    let path = save_to_file(&table, &config, &args.name, args.format.into())?;
    println!("{}", path.display());

    if args.sqlite {
        load_sqlite(&table, &config, args.table.as_deref(), args.if_exists)?;
    }
    Ok(())
}

#[cfg(feature = "sqlite")]
fn load_sqlite(
    table: &AnalyticTable,
    config: &PipelineConfig,
    name: Option<&str>,
    if_exists: IfExistsArg,
) -> EtlResult<()> {
    use nhanes_etl::sink::{save_to_sqlite, IfExists};

    let if_exists = match if_exists {
        IfExistsArg::Replace => IfExists::Replace,
        IfExistsArg::Append => IfExists::Append,
        IfExistsArg::Fail => IfExists::Fail,
    };
    let rows = save_to_sqlite(table, config, name, if_exists)?;
    println!("{} rows -> {}", rows, config.sqlite_path.display());
    Ok(())
}

#[cfg(not(feature = "sqlite"))]
fn load_sqlite(
    _table: &AnalyticTable,
    _config: &PipelineConfig,
    _name: Option<&str>,
    _if_exists: IfExistsArg,
) -> EtlResult<()> {
    Err(nhanes_etl::EtlError::UnsupportedFormat {
        format: "sqlite (enable cargo feature 'sqlite')".to_string(),
    })
}

fn log_summary(table: &AnalyticTable) {
    let stat = |column: &str, op: ReduceOp| match reduce(table, column, op) {
        Some(Value::Float64(v)) => format!("{v:.1}"),
        _ => "-".to_string(),
    };
    for column in [ACR, EGFR] {
        tracing::info!(
            column,
            min = %stat(column, ReduceOp::Min),
            median = %stat(column, ReduceOp::Median),
            max = %stat(column, ReduceOp::Max),
            "summary"
        );
    }
    tracing::info!(rows = table.row_count(), columns = table.column_count(), "analytic table ready");
}

fn print_json(value: &serde_json::Value) -> EtlResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    fn level(args: &[&str]) -> LevelFilter {
        let cli = Cli::try_parse_from(args).unwrap();
        cli.verbosity.tracing_level_filter()
    }

    #[test]
    fn verbosity_flags_map_to_levels() {
        assert_eq!(level(&["nhanes-etl", "datasets"]), LevelFilter::INFO);
        assert_eq!(level(&["nhanes-etl", "-v", "datasets"]), LevelFilter::DEBUG);
        assert_eq!(level(&["nhanes-etl", "run", "-vv"]), LevelFilter::TRACE);
        assert_eq!(level(&["nhanes-etl", "-qq", "datasets"]), LevelFilter::ERROR);
        assert!(Cli::try_parse_from(["nhanes-etl", "-v", "-q", "datasets"]).is_err());
    }
}
