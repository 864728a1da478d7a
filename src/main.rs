use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use royalbit_portfolio::cli::{self, parse_status, OutputFormat};
use royalbit_portfolio::excel::ImportOptions;
use royalbit_portfolio::filter::ProjectFilter;
use royalbit_portfolio::types::Status;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(about = "Project portfolio extraction and analytics from spreadsheet workbooks")]
#[command(long_about = "Portfolio - project tracking workbooks to a normalized portfolio

Each sheet of a workbook describes one project: free-form labels (squad,
factory, saving...) within its first 15 rows and a task table (TAREFA,
INICIO, FIM, DIAS, PROGRESSO). Sheets that are not projects are skipped
silently.

COMMANDS:
  import  - Extract projects from workbooks into a YAML/JSON portfolio
  report  - KPIs, average stage durations and the monthly burnup forecast
  list    - One line per project

EXAMPLES:
  portfolio import q1.xlsx q2.xlsx -o carteira.yaml
  portfolio import q3.xlsx --into carteira.yaml -o carteira.yaml
  portfolio report carteira.yaml --squad pagamentos
  portfolio list q1.xlsx --status Atrasado --format json

ENVIRONMENT:
  PORTFOLIO_AS_OF        Reference date (YYYY-MM-DD) for deadlines and burnup
  PORTFOLIO_SKIP_SHEETS  Extra sheet-name fragments to skip, comma-separated
  RUST_LOG               Log filter (overrides --verbose)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long, global = true, env = "PORTFOLIO_AS_OF")]
    as_of: Option<NaiveDate>,

    /// Extra sheet-name fragments to skip (comma-separated)
    #[arg(long, global = true, env = "PORTFOLIO_SKIP_SHEETS", value_delimiter = ',')]
    skip_sheets: Vec<String>,

    /// Show debug logging (skipped sheets, per-file results)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Case-insensitive substring of the project name
    #[arg(long)]
    search: Option<String>,

    /// Exact status label, e.g. "Em Andamento"
    #[arg(long, value_parser = parse_status)]
    status: Option<Status>,

    /// Exact project name
    #[arg(long)]
    project: Option<String>,

    #[arg(long)]
    squad: Option<String>,

    #[arg(long)]
    factory: Option<String>,
}

impl From<FilterArgs> for ProjectFilter {
    fn from(args: FilterArgs) -> Self {
        ProjectFilter {
            search: args.search,
            status: args.status,
            project: args.project,
            squad: args.squad,
            factory: args.factory,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Extract projects from workbooks and save them as a portfolio.

Files are read concurrently. A file that cannot be read is reported and
skipped; the command fails only when no file could be read.

Projects are unique by id. The id is derived from the file name, the sheet
name and the file content, so importing the same file again adds nothing.
Use --into to append to an existing portfolio (first-seen project wins).

The output format follows the extension: .yaml/.yml or .json")]
    /// Import workbooks into a portfolio file
    Import {
        /// Workbook files (xlsx, xlsm, xlsb, xls, ods)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Portfolio file to write (.yaml, .yml or .json)
        #[arg(short, long)]
        output: PathBuf,

        /// Existing portfolio to append to
        #[arg(long)]
        into: Option<PathBuf>,
    },

    /// Show KPIs, stage averages and the burnup forecast
    Report {
        /// Workbooks and/or saved portfolio files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List projects
    List {
        /// Workbooks and/or saved portfolio files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "royalbit_portfolio=debug"
    } else {
        "royalbit_portfolio=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut options = ImportOptions::default().with_extra_skips(&cli.skip_sheets);
    if let Some(as_of) = cli.as_of {
        options = options.with_today(as_of);
    }

    match cli.command {
        Commands::Import {
            files,
            output,
            into,
        } => cli::import(files, output, into, options).await?,

        Commands::Report {
            inputs,
            filter,
            format,
        } => cli::report(inputs, filter.into(), format, options).await?,

        Commands::List {
            inputs,
            filter,
            format,
        } => cli::list(inputs, filter.into(), format, options).await?,
    }

    Ok(())
}
