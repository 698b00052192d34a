//! bs2ad - Convert Bikram Sambat date columns in spreadsheets to Gregorian dates

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bs2ad::{
    ColumnSelection, ConversionOutcome, ConverterBuilder, FileConfig, OutputFormat, SheetSelector,
    UploadWorkspace,
};

const DEFAULT_WORKDIR: &str = "uploads";

/// Exit status when no date column could be detected.
const EXIT_NEEDS_COLUMN: u8 = 2;

fn print_usage() {
    eprintln!("Usage: bs2ad [OPTIONS] <FILE>");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <FILE>                    Spreadsheet to convert (.xlsx or .xls)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --column <NAME>       Column holding BS dates (skips detection)");
    eprintln!("  --sheet-index <N>         Select sheet by index (0-based, default 0)");
    eprintln!("  --sheet-name <NAME>       Select sheet by name");
    eprintln!("  --workdir <DIR>           Upload directory (default: uploads)");
    eprintln!("  --config <FILE>           Load settings from a TOML file");
    eprintln!("  --format <xlsx|csv>       Output format (default: xlsx)");
    eprintln!("  --json                    Print the conversion report as JSON");
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, Default)]
struct Args {
    input: Option<PathBuf>,
    column: Option<String>,
    sheet: Option<SheetSelector>,
    workdir: Option<PathBuf>,
    config: Option<PathBuf>,
    format: Option<OutputFormat>,
    json: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        let mut value = |name: &str| -> Result<String> {
            i += 1;
            args.get(i)
                .cloned()
                .with_context(|| format!("{} requires a value", name))
        };

        match arg {
            "-h" | "--help" => parsed.help = true,
            "-c" | "--column" => parsed.column = Some(value("--column")?),
            "--sheet-index" => {
                let raw = value("--sheet-index")?;
                let index = raw
                    .parse::<usize>()
                    .with_context(|| format!("Invalid sheet index: {}", raw))?;
                parsed.sheet = Some(SheetSelector::Index(index));
            }
            "--sheet-name" => parsed.sheet = Some(SheetSelector::Name(value("--sheet-name")?)),
            "--workdir" => parsed.workdir = Some(PathBuf::from(value("--workdir")?)),
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--format" => {
                parsed.format = Some(match value("--format")?.to_ascii_lowercase().as_str() {
                    "xlsx" => OutputFormat::Xlsx,
                    "csv" => OutputFormat::Csv,
                    other => bail!("Unknown format: {} (expected xlsx or csv)", other),
                });
            }
            "--json" => parsed.json = true,
            other if other.starts_with('-') => bail!("Unknown option: {}", other),
            other => {
                if parsed.input.is_some() {
                    bail!("Unexpected argument: {}", other);
                }
                parsed.input = Some(PathBuf::from(other));
            }
        }
        i += 1;
    }

    Ok(parsed)
}

fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(args: Args) -> Result<ExitCode> {
    let input = args.input.context("missing input file")?;

    let file_config = match &args.config {
        Some(path) => FileConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FileConfig::default(),
    };

    let mut builder = file_config.apply(ConverterBuilder::new());
    if let Some(sheet) = args.sheet {
        builder = builder.with_sheet_selector(sheet);
    }
    if let Some(format) = args.format {
        builder = builder.with_output_format(format);
    }
    let converter = builder.build()?;

    let workdir = args
        .workdir
        .or(file_config.workdir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKDIR));
    let workspace = UploadWorkspace::open(&workdir)
        .with_context(|| format!("failed to open workspace {}", workdir.display()))?
        .with_security(converter.security().clone());

    let filename = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", input.display()))?;
    let bytes =
        std::fs::read(&input).with_context(|| format!("failed to read {}", input.display()))?;
    debug!(file = %filename, bytes = bytes.len(), "read input");

    let stored = workspace.save_upload(&filename, &bytes)?;
    let outcome = workspace.convert(&converter, &stored, ColumnSelection::from(args.column))?;

    match outcome {
        ConversionOutcome::Converted(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let output = report
                    .output_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!(
                    "Converted '{}' -> '{}' ({} of {} rows)",
                    report.column.source_column,
                    report.column.output_column,
                    report.column.converted,
                    report.column.rows
                );
                println!("{}", output);
            }
            Ok(ExitCode::SUCCESS)
        }
        ConversionOutcome::NeedsColumnSelection { columns } => {
            if args.json {
                println!("{}", serde_json::json!({ "columns": columns }));
            }
            eprintln!("No Bikram Sambat date column was detected in {}.", filename);
            eprintln!("Available columns:");
            for column in &columns {
                eprintln!("  {}", column);
            }
            eprintln!("Re-run with --column <NAME> to choose one.");
            Ok(ExitCode::from(EXIT_NEEDS_COLUMN))
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let parsed = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    if parsed.help || parsed.input.is_none() {
        print_usage();
        return if parsed.help {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    init_logging();

    match run(parsed) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
