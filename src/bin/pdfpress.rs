//! CLI binary for pdfpress.
//!
//! A thin shim over the library crate that maps CLI flags to the extract
//! and compress configs, renders progress with indicatif, and treats
//! Ctrl-C as the cooperative cancel control.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdfpress::{
    compress_with, extract_with, CancelToken, CompressConfig, DeviceProfile, ExtractConfig,
    JobOutcome, PageArtifact, Progress, ProgressCallback, QualityPreset,
};
use std::io;
use std::path::PathBuf;
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per page.
/// The bar length is set by `on_job_start` once the counting pass has
/// established the page total.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_job_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Counting");
        bar.set_message("Opening documents…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Processing");
    }
}

impl ProgressCallback for CliProgress {
    fn on_job_start(&self, total_pages: usize, total_files: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Processing {total_pages} page(s) from {total_files} file(s)…"
            ))
        ));
    }

    fn on_page_start(&self, file_name: &str, page_num: usize, file_pages: usize) {
        self.bar
            .set_message(format!("{file_name} p.{page_num}/{file_pages}"));
    }

    fn on_page_complete(&self, artifact: &PageArtifact, _processed: usize, _total: usize, percent: u8) {
        self.bar.println(format!(
            "  {} {}  {}  {}",
            green("✓"),
            artifact.caption(),
            dim(&format!("{} bytes", artifact.data.len())),
            dim(&format!("{percent:>3}%")),
        ));
        self.bar.inc(1);
    }

    fn on_file_complete(&self, file_name: &str) {
        self.bar
            .println(format!("  {} {}", green("✔"), dim(file_name)));
    }

    fn on_job_complete(&self, processed: usize, _total: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} page(s) processed",
            green("✔"),
            bold(&processed.to_string())
        );
    }

    fn on_job_canceled(&self, processed: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} Cancelled after {} page(s); no output written",
            red("✘"),
            bold(&processed.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract every page of one PDF as JPEGs (single page → direct .jpg,
  # otherwise converted.zip in the current directory)
  pdfpress extract document.pdf

  # Extract a whole folder, write the bundle elsewhere
  pdfpress extract ./scans/ -o ./out

  # Compress one PDF for screens (144 dpi) — writes document_compressed.pdf
  pdfpress compress document.pdf

  # Compress several PDFs for print — writes compressed_pdfs.zip
  pdfpress compress a.pdf b.pdf --preset print

  # Constrained device: high-DPI presets are capped at 144 dpi and
  # multi-file compression is refused
  pdfpress compress document.pdf --preset pc-hi --constrained

  # Machine-readable stats
  pdfpress compress document.pdf --json

QUALITY PRESETS (compress):
  Preset   DPI   JPEG quality
  ──────   ───   ────────────
  min       72   0.4
  mobile    96   0.5
  pc       144   0.6   (default)
  print    200   0.8
  pc-hi    300   0.8

ENVIRONMENT VARIABLES:
  PDFPRESS_PRESET        Default compression preset
  PDFPRESS_CONSTRAINED   Treat the client as constrained (DPI cap, one file)
  PDFIUM_LIB_PATH        Path to an existing libpdfium

Cancel a run with Ctrl-C: the current page finishes, partial output is
discarded, and nothing is written.
"#;

/// Extract PDF pages as JPEGs, or compress PDFs by rasterising their pages.
#[derive(Parser, Debug)]
#[command(
    name = "pdfpress",
    version,
    about = "Extract PDF pages as JPEGs, or shrink PDFs by re-rendering pages at lower DPI",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDFPRESS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDFPRESS_QUIET")]
    quiet: bool,

    /// Disable the progress bar.
    #[arg(long, global = true, env = "PDFPRESS_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract every page of the input PDFs as JPEG images.
    Extract {
        /// PDF files and/or directories (searched recursively).
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory to write the result into.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// JPEG quality 1–100 (default: encoder default).
        #[arg(long)]
        jpeg_quality: Option<u8>,

        /// PDF user password for encrypted documents.
        #[arg(long, env = "PDFPRESS_PASSWORD")]
        password: Option<String>,

        /// Print job stats as JSON to stdout.
        #[arg(long)]
        json: bool,
    },
    /// Shrink the input PDFs by re-rendering each page at a preset DPI.
    Compress {
        /// PDF files and/or directories (searched recursively).
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory to write the result into.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Quality preset: min, mobile, pc, print, pc-hi.
        #[arg(short, long, value_enum, default_value = "pc", env = "PDFPRESS_PRESET")]
        preset: PresetArg,

        /// Constrained device profile: caps DPI at 144 and refuses
        /// multi-file input.
        #[arg(long, env = "PDFPRESS_CONSTRAINED")]
        constrained: bool,

        /// PDF user password for encrypted documents.
        #[arg(long, env = "PDFPRESS_PASSWORD")]
        password: Option<String>,

        /// Pause between files in milliseconds (multi-file runs).
        #[arg(long, default_value_t = 200)]
        delay_ms: u64,

        /// Print job stats as JSON to stdout.
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PresetArg {
    Min,
    Mobile,
    Pc,
    Print,
    PcHi,
}

impl From<PresetArg> for QualityPreset {
    fn from(v: PresetArg) -> Self {
        match v {
            PresetArg::Min => QualityPreset::Min,
            PresetArg::Mobile => QualityPreset::Mobile,
            PresetArg::Pc => QualityPreset::Pc,
            PresetArg::Print => QualityPreset::Print,
            PresetArg::PcHi => QualityPreset::PcHi,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress;
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

    // ── Cancel control: Ctrl-C sets the cooperative flag ─────────────────
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nCancelling at the next page boundary…");
                cancel.cancel();
            }
        });
    }

    let progress: Progress = if show_progress {
        CliProgress::new_dynamic()
    } else {
        Arc::new(pdfpress::NoopProgress)
    };

    // ── Run the selected pipeline ────────────────────────────────────────
    let (outcome, output_dir, json) = match cli.command {
        Command::Extract {
            inputs,
            output,
            jpeg_quality,
            password,
            json,
        } => {
            let mut builder = ExtractConfig::builder();
            if let Some(q) = jpeg_quality {
                builder = builder.jpeg_quality(q);
            }
            if let Some(pwd) = password {
                builder = builder.password(pwd);
            }
            let config = builder.build().context("Invalid configuration")?;
            let outcome = extract_with(&inputs, &config, cancel, progress)
                .await
                .context("Extraction failed")?;
            (outcome, output, json)
        }
        Command::Compress {
            inputs,
            output,
            preset,
            constrained,
            password,
            delay_ms,
            json,
        } => {
            let device = if constrained {
                DeviceProfile::Constrained
            } else {
                DeviceProfile::Standard
            };
            let mut builder = CompressConfig::builder()
                .preset(preset.into())
                .device(device)
                .inter_file_delay_ms(delay_ms);
            if let Some(pwd) = password {
                builder = builder.password(pwd);
            }
            let config = builder.build().context("Invalid configuration")?;
            let outcome = compress_with(&inputs, &config, cancel, progress)
                .await
                .context("Compression failed")?;
            (outcome, output, json)
        }
    };

    // ── Report ───────────────────────────────────────────────────────────
    match outcome {
        JobOutcome::Completed { bundle, stats } => {
            let path = bundle
                .write_to_dir(&output_dir)
                .await
                .context("Failed to write output")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            if !cli.quiet {
                eprintln!(
                    "{}  {}/{} pages  {}ms  →  {}",
                    green("✔"),
                    stats.processed_pages,
                    stats.total_pages,
                    stats.total_duration_ms,
                    bold(&path.display().to_string()),
                );
                eprintln!(
                    "   {}",
                    dim(&format!("{} bytes written", stats.output_bytes))
                );
            }
        }
        JobOutcome::Canceled { processed_pages } => {
            // With the progress bar active the callback already printed the
            // acknowledgment.
            if !show_progress {
                eprintln!("Cancelled after {processed_pages} page(s); no output written");
            }
            std::process::exit(130);
        }
    }

    Ok(())
}
