//! CLI binary for ignition-coder.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `TranscodeConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ignition_coder::{
    decode, encode, Diagnostic, DiagnosticsSink, Direction, OutputStyle, TranscodeConfig,
    TranscodeError, TranscodeReport, TransformStats,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI diagnostics sink using indicatif ─────────────────────────────────────

/// Terminal sink: a progress bar over the planned sources, one log line per
/// file and a yellow line per warning.
struct CliDiagnostics {
    bar: ProgressBar,
}

impl CliDiagnostics {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    /// Clear the bar; safe to call after an aborted run.
    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl DiagnosticsSink for CliDiagnostics {
    fn on_transform_start(&self, direction: Direction, total_sources: usize) {
        self.bar.set_length(total_sources as u64);
        self.bar.set_prefix(match direction {
            Direction::Decode => "Decoding",
            Direction::Encode => "Encoding",
        });
    }

    fn on_source_complete(&self, entry_path: &str, target: &Path, bytes: usize) {
        self.bar.println(format!(
            "  {} {:<40} {}",
            green("✓"),
            entry_path,
            dim(&format!("{} ({bytes} bytes)", target.display())),
        ));
        self.bar.set_message(entry_path.to_string());
        self.bar.inc(1);
    }

    fn on_diagnostic(&self, diagnostic: &Diagnostic) {
        self.bar
            .println(format!("  {} {}", yellow("⚠"), yellow(&diagnostic.to_string())));
    }

    fn on_transform_complete(&self, _stats: &TransformStats) {
        self.finish();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract every embedded file of an Ignition config
  ignition-coder decode config.ign unpacked/

  # Edit unpacked/etc/motd, then pack everything back
  ignition-coder encode config.new.ign unpacked/

  # Compact output without default-valued fields
  ignition-coder encode --compact --strip-defaults config.new.ign unpacked/

  # Machine-readable run report
  ignition-coder --json decode config.ign unpacked/ > report.json

LAYOUT:
  unpacked/decoded.ign        rewritten document (placeholders)
  unpacked/<path>             storage.files[*].contents payload
  unpacked/<path>/<index>     storage.files[*].append[index] payload

ENVIRONMENT VARIABLES:
  RUST_LOG                    Override the log filter (e.g. debug)
"#;

/// Decode and encode Fedora CoreOS Ignition configuration files.
#[derive(Parser, Debug)]
#[command(
    name = "ignition-coder",
    version,
    about = "Decode and encode Fedora CoreOS Ignition configuration files",
    long_about = "Extract the data-URI encoded files embedded in an Ignition config into a \
directory tree, and pack an edited tree back into a config.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Number of payload files read or written concurrently.
    #[arg(short, long, global = true, env = "IGNITION_CODER_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Print the run report as JSON on stdout.
    #[arg(long, global = true, env = "IGNITION_CODER_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "IGNITION_CODER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "IGNITION_CODER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "IGNITION_CODER_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode an Ignition file, extracting embedded files
    #[command(visible_aliases = ["disassemble", "d", "div"])]
    Decode {
        /// The ignition file to decode
        ignition_file: PathBuf,

        /// The directory to place the decoded files in
        target_dir: PathBuf,

        /// File name of the rewritten document inside the target directory.
        /// Must end in .ign so that `encode` can find it again.
        #[arg(long, env = "IGNITION_CODER_DECODED_NAME", default_value = "decoded.ign")]
        decoded_name: String,
    },
    /// Encode extracted files back into an Ignition file
    #[command(visible_aliases = ["assemble", "a", "prod"])]
    Encode {
        /// The file to write the encoded ignition to
        target_file: PathBuf,

        /// The directory containing the ignition file and file contents
        ignition_dir: PathBuf,

        /// Serialize the output in a compact format
        #[arg(long, env = "IGNITION_CODER_COMPACT")]
        compact: bool,

        /// Suppress fields that have default values
        #[arg(long, visible_alias = "default", env = "IGNITION_CODER_STRIP_DEFAULTS")]
        strip_defaults: bool,

        /// Extension of the ignition file to look for in the directory.
        #[arg(long, env = "IGNITION_CODER_EXTENSION", default_value = "ign")]
        extension: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let g = &cli.global;

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar prints per-file lines and warnings itself, so library
    // logs drop to ERROR while it is active.
    let show_progress = !g.quiet && !g.no_progress && !g.json;
    let filter = if g.verbose {
        "debug"
    } else if g.quiet || show_progress {
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

    let progress = if show_progress {
        Some(CliDiagnostics::new())
    } else {
        None
    };

    let config = build_config(&cli, progress.clone())?;

    let result = match &cli.command {
        Command::Decode {
            ignition_file,
            target_dir,
            ..
        } => decode(ignition_file, target_dir, &config).await,
        Command::Encode {
            target_file,
            ignition_dir,
            ..
        } => encode(target_file, ignition_dir, &config).await,
    };

    if let Some(ref p) = progress {
        p.finish();
    }

    let report = match result {
        Ok(report) => report,
        Err(TranscodeError::NoTransformationNeeded { path }) => {
            if !g.quiet {
                eprintln!(
                    "{} {} has no storage.files entries; nothing to decode",
                    yellow("⚠"),
                    bold(&path.display().to_string())
                );
            }
            return Ok(());
        }
        Err(e) => {
            let what = match cli.command {
                Command::Decode { .. } => "Decoding failed",
                Command::Encode { .. } => "Encoding failed",
            };
            return Err(e).context(what);
        }
    };

    if g.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !g.quiet {
        print_summary(&report);
    }

    Ok(())
}

/// Map CLI args to `TranscodeConfig`.
fn build_config(cli: &Cli, progress: Option<Arc<CliDiagnostics>>) -> Result<TranscodeConfig> {
    let mut builder = TranscodeConfig::builder().concurrency(cli.global.concurrency);

    match &cli.command {
        Command::Decode { decoded_name, .. } => {
            builder = builder.decoded_file_name(decoded_name.clone());
        }
        Command::Encode {
            compact,
            strip_defaults,
            extension,
            ..
        } => {
            let style = if *compact {
                OutputStyle::Compact
            } else {
                OutputStyle::Pretty
            };
            builder = builder
                .output_style(style)
                .strip_defaults(*strip_defaults)
                .document_extension(extension.clone());
        }
    }

    if let Some(p) = progress {
        builder = builder.diagnostics(p as Arc<dyn DiagnosticsSink>);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(report: &TranscodeReport) {
    let stats = &report.stats;
    let (verb, dir_word) = match report.direction {
        Direction::Decode => ("Extracted", "to"),
        Direction::Encode => ("Embedded", "from"),
    };

    eprintln!(
        "{} {} {} file(s) {} {}  {}",
        if report.diagnostics.is_empty() {
            green("✔")
        } else {
            yellow("⚠")
        },
        verb,
        bold(&stats.transcoded_sources.to_string()),
        dir_word,
        bold(&report.files_dir.display().to_string()),
        dim(&format!("{}ms", report.duration_ms)),
    );
    eprintln!(
        "   {} entries, {} eligible, {} left as-is  →  {}",
        dim(&stats.total_entries.to_string()),
        dim(&stats.eligible_entries.to_string()),
        dim(&stats.untouched_sources.to_string()),
        bold(&report.output_document.display().to_string()),
    );
    if !report.diagnostics.is_empty() {
        eprintln!("   {} warning(s)", yellow(&report.diagnostics.len().to_string()));
    }
}
