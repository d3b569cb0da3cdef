//! CLI binary for fileconvert.
//!
//! A thin shim over the library crate that maps CLI flags onto the
//! conversion controller and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use fileconvert::{
    CompatibilityTable, ConversionController, ConversionObserver, ConvertApiClient,
    ConverterConfig, Format, HttpDownloader, NoopObserver, Observer, SelectedFile, SubmitError,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error as _;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Spinner shown while the service call is in flight.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        Arc::new(Self { bar })
    }
}

impl ConversionObserver for CliObserver {
    fn on_submit(&self, from: Format, to: Format, file_name: &str) {
        self.bar.set_prefix("Converting");
        self.bar.set_message(format!("{file_name}  {from} → {to}"));
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_converted(&self, _url: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", green("✔"), bold("File converted successfully!"));
    }

    fn on_error(&self, _message: &str) {
        self.bar.finish_and_clear();
    }

    fn on_download_complete(&self, path: &Path) {
        eprintln!("{} saved {}", green("✔"), bold(&path.display().to_string()));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Word document to PDF, saved in the current directory
  fileconvert report.docx --from docx --to pdf

  # Save into a specific directory
  fileconvert scan.png --from png --to jpg -o converted/

  # Only print the hosted result URL
  fileconvert sheet.xlsx --from xlsx --to csv --no-download

  # Machine-readable outcome
  fileconvert report.pdf --to txt --json

  # Show every permitted conversion
  fileconvert --list-formats

PERMITTED CONVERSIONS:
  DOCX → PDF, TXT
  PDF  → DOCX, JPG, TXT
  PNG  → JPG, PDF        (PNG → JPG requests scaling)
  JPG  → PNG, PDF
  XLSX → PDF, CSV
  TXT  → PDF

EXIT STATUS:
  0  converted (and saved, unless --no-download)
  1  the service call or the download failed
  2  the file or format pair was rejected before any request was sent

ENVIRONMENT VARIABLES:
  CONVERT_API_SECRET      ConvertAPI secret (required for conversions)
  CONVERT_API_BASE_URL    Override the service endpoint
  RUST_LOG                Log filter, e.g. fileconvert=debug
"#;

/// Convert files between formats using the ConvertAPI cloud service.
#[derive(Parser, Debug)]
#[command(
    name = "fileconvert",
    version,
    about = "Convert files between formats using the ConvertAPI cloud service",
    long_about = "Validate a file and a source/target format pair locally, then send the file \
to ConvertAPI for conversion and download the result. Only the conversions listed by \
--list-formats are submitted.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file to convert.
    #[arg(required_unless_present = "list_formats")]
    input: Option<PathBuf>,

    /// Source format code (e.g. PDF). Must match the file's extension.
    #[arg(long, env = "FILECONVERT_FROM", value_parser = Format::from_str)]
    from: Option<Format>,

    /// Target format code (e.g. DOCX).
    #[arg(long, env = "FILECONVERT_TO", value_parser = Format::from_str)]
    to: Option<Format>,

    /// Directory to save the converted file into.
    #[arg(short, long, env = "FILECONVERT_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// ConvertAPI secret.
    #[arg(long, env = "CONVERT_API_SECRET", hide_env_values = true)]
    api_secret: Option<String>,

    /// ConvertAPI base URL.
    #[arg(long, env = "CONVERT_API_BASE_URL", default_value = fileconvert::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds (default: none).
    #[arg(long, env = "FILECONVERT_TIMEOUT")]
    timeout: Option<u64>,

    /// Print the result URL instead of downloading it.
    #[arg(long)]
    no_download: bool,

    /// Output the final controller state as JSON.
    #[arg(long)]
    json: bool,

    /// List supported formats and permitted conversions, then exit.
    #[arg(long)]
    list_formats: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "FILECONVERT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FILECONVERT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FILECONVERT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters; keep library INFO
    // logs out of its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── List-only mode ───────────────────────────────────────────────────
    if cli.list_formats {
        print_formats(cli.json)?;
        return Ok(ExitCode::SUCCESS);
    }

    let input = cli
        .input
        .clone()
        .context("An input file is required")?;

    // ── Build stack ──────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let service = ConvertApiClient::new(&config).context("Conversion service is not configured")?;
    let downloader = HttpDownloader::new(&config).context("Cannot prepare downloader")?;

    let observer: Observer = if show_progress {
        CliObserver::new() as Observer
    } else {
        Arc::new(NoopObserver)
    };

    let controller = ConversionController::new(&config, Arc::new(service), Arc::new(downloader))
        .with_observer(observer);

    let file = SelectedFile::from_path(&input)
        .await
        .with_context(|| format!("Failed to load {}", input.display()))?;
    controller.select_file(file);
    if let Some(from) = cli.from {
        controller.set_source_format(Some(from));
    }
    controller.set_target_format(cli.to);

    // ── Run conversion ───────────────────────────────────────────────────
    let outcome = controller.submit_conversion().await;
    let snapshot = controller.snapshot();

    let url = match outcome {
        Ok(url) => url,
        Err(err) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&snapshot).context("Failed to serialise state")?
                );
            }
            report_failure(&err, cli.verbose);
            return Ok(failure_code(&err));
        }
    };

    if cli.no_download {
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&snapshot).context("Failed to serialise state")?
            );
        } else {
            println!("{url}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let saved = controller
        .download_result()
        .await
        .context("Download failed")?;

    if cli.json {
        let report = serde_json::json!({
            "result_url": url,
            "saved_to": saved,
            "state": controller.snapshot(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise output")?
        );
    } else if let Some(path) = saved {
        if !cli.quiet && !show_progress {
            eprintln!("Saved {}", path.display());
        }
        println!("{}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

/// Print the user-facing message to stderr, with the cause when verbose.
fn report_failure(err: &SubmitError, verbose: bool) {
    eprintln!("{} {}", red("✘"), red(&err.to_string()));
    if verbose {
        if let Some(cause) = err.source() {
            eprintln!("  {}", dim(&format!("caused by: {cause}")));
        }
    }
}

fn failure_code(err: &SubmitError) -> ExitCode {
    if err.is_validation() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

/// Map CLI args to `ConverterConfig`.
fn build_config(cli: &Cli) -> Result<ConverterConfig> {
    let mut builder = ConverterConfig::builder()
        .base_url(cli.base_url.clone())
        .request_timeout_secs(cli.timeout)
        .download_dir(cli.output_dir.clone());

    if let Some(ref secret) = cli.api_secret {
        builder = builder.api_secret(secret.clone());
    }

    builder.build().context("Invalid configuration")
}

fn print_formats(json: bool) -> Result<()> {
    let table = CompatibilityTable::standard();

    if json {
        let conversions: Vec<_> = table
            .sources()
            .map(|from| {
                serde_json::json!({
                    "from": from,
                    "to": table.targets_for(from).collect::<Vec<_>>(),
                })
            })
            .collect();
        let report = serde_json::json!({
            "formats": Format::ALL,
            "conversions": conversions,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise formats")?
        );
        return Ok(());
    }

    let codes: Vec<&str> = Format::ALL.iter().map(|f| f.code()).collect();
    println!("{}", bold("Supported formats:"));
    println!("  {}", codes.join(", "));
    println!();
    println!("{}", bold("Permitted conversions:"));
    for from in table.sources() {
        let targets: Vec<&str> = table.targets_for(from).map(Format::code).collect();
        println!("  {:<5} → {}", from.code(), targets.join(", "));
    }
    println!();
    println!("{}", dim("Other pairs are rejected before any request is sent."));
    Ok(())
}
