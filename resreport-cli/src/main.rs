mod edits;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use resreport::data_loader::SpreadsheetFormat;
use resreport::errors::{ConfigError, ImportError, SessionError};
use resreport::import::inspect_header;
use resreport::session::Interaction;
use resreport::{ReportConfig, Session};
use serde_json::json;
use std::path::Path;
use tracing::{error, info};
use tracing::Level;
use tracing_subscriber::EnvFilter;

const GENERIC_HINT: &str = "Please check that the file is a valid, non-empty spreadsheet.";

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate the header row and check the required columns
    Inspect {
        #[clap(short, long)]
        input: String,
        #[clap(short, long)]
        config: Option<String>,
    },
    /// Load an export, apply edits, print the KPIs and write the report
    Report {
        #[clap(short, long)]
        input: String,
        #[clap(short, long)]
        config: Option<String>,
        /// CSV file with `view,row,field,value` edits
        #[clap(short, long)]
        edits: Option<String>,
        /// Report path; defaults to the configured file name
        #[clap(short, long)]
        output: Option<String>,
        /// Print the full interaction outcome as JSON
        #[clap(long)]
        json: bool,
    },
    /// Print the main and missing-price views as JSON
    Views {
        #[clap(short, long)]
        input: String,
        #[clap(short, long)]
        config: Option<String>,
    },
    /// Write the default configuration
    Init {
        #[clap(short, long)]
        config: String,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    if let Err(err) = run(args.command) {
        error!("{:#}", err);
        eprintln!("Error: {:#}", err);
        eprintln!("{}", hint_for(&err));
        std::process::exit(1);
    }
    Ok(())
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Inspect { input, config } => {
            let config = load_config(config.as_deref())?;
            let (format, bytes) = read_input(&input)?;
            let header = inspect_header(&bytes, format, &config.import_settings())?;
            println!("Header found on row {}", header.display_row());
            println!("All {} required columns are present", config.import.required_columns.len());
        }
        Commands::Report {
            input,
            config,
            edits,
            output,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            let batch = match edits {
                Some(path) => edits::read_edits_file(Path::new(&path))?,
                None => edits::EditBatch::default(),
            };
            let file_name = config.report.file_name.clone();

            let mut session = upload(config, &input, !json)?;
            let filter = session.configured_filter()?;
            if !json && !session.date_filter_available()? {
                println!("No reservation has a begin date; the date filter is unavailable.");
            }
            info!("Applying {} edits", batch.len());
            let outcome = session.interact(&Interaction {
                filter,
                main_edits: batch.main,
                missing_price_edits: batch.missing_price,
                export: true,
            })?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                output::print_outcome(&outcome);
            }

            if let Some(report) = &outcome.report {
                let path = output.unwrap_or(file_name);
                std::fs::write(&path, &report.bytes)
                    .with_context(|| format!("Failed to write report to {}", path))?;
                info!("Wrote {} ({} bytes)", path, report.bytes.len());
                if !json {
                    println!("Report written to {}", path);
                }
            }
        }
        Commands::Views { input, config } => {
            let config = load_config(config.as_deref())?;
            let session = upload(config, &input, false)?;
            let main = session.main_view()?;
            let missing_price = session.missing_price_view()?;
            let views = json!({
                "main": main,
                "missing_price": missing_price,
            });
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        Commands::Init { config } => {
            info!("Initializing configuration: {}", config);
            ReportConfig::default().save(Path::new(&config))?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<ReportConfig> {
    match path {
        Some(path) => Ok(ReportConfig::load(Path::new(path))?),
        None => Ok(ReportConfig::default()),
    }
}

fn read_input(input: &str) -> Result<(SpreadsheetFormat, Vec<u8>)> {
    let path = Path::new(input);
    let format = SpreadsheetFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(ImportError::from)?;
    Ok((format, bytes))
}

fn upload(config: ReportConfig, input: &str, print_summary: bool) -> Result<Session> {
    let (format, bytes) = read_input(input)?;
    let name = Path::new(input)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string());

    let mut session = Session::new(config);
    let summary = session.upload(&name, &bytes, format)?;
    if print_summary {
        output::print_upload_summary(&summary);
    }
    Ok(session)
}

fn hint_for(err: &anyhow::Error) -> &'static str {
    if let Some(err) = err.downcast_ref::<SessionError>() {
        return err.hint();
    }
    if let Some(err) = err.downcast_ref::<ImportError>() {
        return err.hint();
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return "Check the configuration file, or write a fresh one with `resreport init`.";
    }
    GENERIC_HINT
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("{}", log_level)))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
