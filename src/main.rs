use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use discogsdata::batch::{run_batch, BatchOptions};
use discogsdata::logging::{init_logging, LogConfig, LogFormat};
use discogsdata::models::Series;
use discogsdata::output::{sink_for, OutputFormat};
use discogsdata::query::{Database, Report};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "discogsdata", version)]
#[command(about = "CLI for exploring/exploiting a DB populated from Discogs Data")]
struct Cli {
    /// SQLite database path or file: URI
    #[arg(long, env = "DISCOGSDATA_DB", default_value = "discogs.sqlite3")]
    database: String,

    /// Log level or filter directives
    #[arg(long, env = "DISCOGSDATA_LOG_LEVEL", default_value = "error")]
    log_level: String,

    #[arg(long, value_enum, env = "DISCOGSDATA_LOG_FORMAT", default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    /// Log output file (defaults to stderr)
    #[arg(long, env = "DISCOGSDATA_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Output format: tuple, csv, json, or a table style (simple, grid, github, ...)
    #[arg(long = "fmt", default_value = "simple")]
    fmt: OutputFormat,

    /// Do not prepend the fabric_series column
    #[arg(long)]
    no_series_column: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            format: self.log_format,
            file: self.log_file.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query the fabric and FabricLive catalog series
    Fabric(FabricArgs),
}

#[derive(Args, Debug)]
struct FabricArgs {
    /// Query FabricLive releases
    #[arg(long, overrides_with = "no_live")]
    live: bool,

    /// Query fabric releases (default)
    #[arg(long, overrides_with = "live")]
    no_live: bool,

    #[command(subcommand)]
    report: ReportCommand,
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Retrieve information regarding releases NUMBER...
    Release {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        numbers: Vec<u32>,
    },
    /// Retrieve information regarding tracks for releases NUMBER...
    Tracks {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        numbers: Vec<u32>,
    },
}

impl ReportCommand {
    fn into_parts(self) -> (Report, Vec<u32>) {
        match self {
            ReportCommand::Release { numbers } => (Report::Release, numbers),
            ReportCommand::Tracks { numbers } => (Report::Tracks, numbers),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_config())?;

    let Command::Fabric(fabric) = cli.command;
    let series = Series::from_live(fabric.live);
    let (report, numbers) = fabric.report.into_parts();
    let options = BatchOptions {
        report,
        series,
        annotate_series: !cli.no_series_column,
    };

    info!("Output format: {}", cli.fmt);
    let db = Database::new(cli.database);

    let mut sink = sink_for(cli.fmt, BufWriter::new(io::stdout().lock()));
    let summary = run_batch(&db, options, &numbers, sink.as_mut())?;
    sink.finish()?;

    debug!(
        "Processed {} releases, {} rows, {} without matches",
        summary.identifiers,
        summary.rows,
        summary.empty.len()
    );
    Ok(())
}
