//! Command-line front end: converts Markdown files (or stdin) line by line.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use linemark_core::{
    ConvertOptions, ConvertReport, Diagnostic, LinkPolicy, WriteSink, convert_stream,
};
use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const STDIN_LABEL: &str = "<stdin>";
const MARKDOWN_EXTENSION: &str = "md";
const HTML_EXTENSION: &str = "html";

#[derive(Parser, Debug)]
#[command(name = "linemark", version, about = "Convert line-oriented Markdown to HTML")]
struct Cli {
    /// Markdown files to convert. Reads stdin when none are given.
    inputs: Vec<PathBuf>,

    /// Write to this file instead of `<name>.html` (single input only; `-` is stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for derived `<name>.html` files.
    #[arg(long, conflicts_with = "output")]
    out_dir: Option<PathBuf>,

    /// Write every conversion to stdout.
    #[arg(long, conflicts_with_all = ["output", "out_dir"])]
    stdout: bool,

    /// How out-of-order link markers are handled: validate | lenient.
    #[arg(long, env = "LINEMARK_LINK_POLICY", default_value_t = LinkPolicy::Validate)]
    link_policy: LinkPolicy,

    /// Shorthand for `--link-policy lenient`.
    #[arg(long)]
    lenient: bool,

    /// Print per-line diagnostics to stderr.
    #[arg(long, value_enum)]
    diagnostics: Option<DiagnosticsMode>,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DiagnosticsMode {
    Json,
    Pretty,
}

enum Destination {
    Stdout,
    File(PathBuf),
}

struct FileReport {
    label: String,
    report: ConvertReport,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
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

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(2)
        }
    }
}

/// Returns `Ok(false)` when some input failed or some line was malformed.
fn run(cli: &Cli) -> Result<bool> {
    if cli.output.is_some() && cli.inputs.len() > 1 {
        bail!("--output accepts a single input, got {}", cli.inputs.len());
    }

    let options = ConvertOptions {
        link_policy: if cli.lenient {
            LinkPolicy::Lenient
        } else {
            cli.link_policy
        },
    };

    let mut reports = Vec::new();
    let mut ok = true;

    if cli.inputs.is_empty() {
        let destination = match &cli.output {
            Some(path) if path != Path::new("-") => Destination::File(path.clone()),
            _ => Destination::Stdout,
        };
        let stdin = io::stdin();
        let report = convert_into(stdin.lock(), &destination, &options)
            .context("failed to convert stdin")?;
        reports.push(FileReport {
            label: STDIN_LABEL.to_string(),
            report,
        });
    }

    for input in &cli.inputs {
        match convert_file(cli, input, &options) {
            Ok(report) => reports.push(FileReport {
                label: input.display().to_string(),
                report,
            }),
            Err(err) => {
                error!("{:#}", err);
                ok = false;
            }
        }
    }

    if let Some(mode) = cli.diagnostics {
        emit_diagnostics(&reports, mode)?;
    }

    Ok(ok && !reports.iter().any(|file| file.report.has_errors()))
}

fn convert_file(cli: &Cli, input: &Path, options: &ConvertOptions) -> Result<ConvertReport> {
    if input.extension().and_then(|ext| ext.to_str()) != Some(MARKDOWN_EXTENSION) {
        warn!(
            "{} does not have a .{} extension; converting anyway",
            input.display(),
            MARKDOWN_EXTENSION
        );
    }

    let destination = destination_for(cli, input)?;
    if let Destination::File(path) = &destination {
        ensure_not_input(input, path)?;
    }
    let file =
        File::open(input).with_context(|| format!("cannot open {}", input.display()))?;
    let report = convert_into(BufReader::new(file), &destination, options)
        .with_context(|| format!("failed to convert {}", input.display()))?;

    if let Destination::File(path) = &destination {
        info!("Wrote {} ({} lines)", path.display(), report.lines_written);
    }
    Ok(report)
}

fn destination_for(cli: &Cli, input: &Path) -> Result<Destination> {
    if cli.stdout {
        return Ok(Destination::Stdout);
    }
    if let Some(path) = &cli.output {
        if path == Path::new("-") {
            return Ok(Destination::Stdout);
        }
        return Ok(Destination::File(path.clone()));
    }
    Ok(Destination::File(derived_output_path(
        input,
        cli.out_dir.as_deref(),
    )?))
}

/// Creating the destination truncates it, so it must not be the input under
/// another spelling.
fn ensure_not_input(input: &Path, output: &Path) -> Result<()> {
    if !output.exists() {
        return Ok(());
    }
    let input_real =
        fs::canonicalize(input).with_context(|| format!("cannot open {}", input.display()))?;
    let output_real = fs::canonicalize(output)
        .with_context(|| format!("cannot resolve {}", output.display()))?;
    if input_real == output_real {
        bail!(
            "refusing to overwrite {} with its own output",
            input.display()
        );
    }
    Ok(())
}

/// `dir/notes.md` becomes `dir/notes.html`, or `<out_dir>/notes.html`.
fn derived_output_path(input: &Path, out_dir: Option<&Path>) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .with_context(|| format!("{} has no file name", input.display()))?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(HTML_EXTENSION);
    Ok(match out_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    })
}

fn convert_into<R: io::BufRead>(
    reader: R,
    destination: &Destination,
    options: &ConvertOptions,
) -> Result<ConvertReport> {
    let report = match destination {
        Destination::Stdout => {
            let stdout = io::stdout();
            let mut sink = WriteSink::new(BufWriter::new(stdout.lock()));
            convert_stream(reader, &mut sink, options)?
        }
        Destination::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            let mut sink = WriteSink::new(BufWriter::new(file));
            convert_stream(reader, &mut sink, options)?
        }
    };
    Ok(report)
}

fn emit_diagnostics(reports: &[FileReport], mode: DiagnosticsMode) -> Result<()> {
    match mode {
        DiagnosticsMode::Json => {
            let entries: Vec<_> = reports
                .iter()
                .flat_map(|file| {
                    file.report
                        .diagnostics
                        .iter()
                        .map(move |diag| diagnostic_to_json(&file.label, diag))
                })
                .collect();
            eprintln!("{}", serde_json::to_string_pretty(&entries)?);
        }
        DiagnosticsMode::Pretty => {
            for file in reports {
                for diag in &file.report.diagnostics {
                    eprintln!("{}", diagnostic_to_pretty(&file.label, diag));
                }
            }
        }
    }
    Ok(())
}

fn diagnostic_to_json(file: &str, diag: &Diagnostic) -> serde_json::Value {
    json!({
        "file": file,
        "line": diag.line,
        "column": diag.column,
        "severity": diag.severity,
        "code": diag.code,
        "message": diag.message,
    })
}

fn diagnostic_to_pretty(file: &str, diag: &Diagnostic) -> String {
    format!(
        "{}:{}:{} {} {} {}",
        file,
        diag.line,
        diag.column,
        diag.severity.label(),
        diag.code,
        diag.message
    )
}
