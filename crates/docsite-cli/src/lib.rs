use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use docsite_config::{Config, LoadOptions};
use docsite_ops::{
    AnchorsOptions, AnchorsOutcome, CheckOptions, CheckOutcome, OperationError, Operations,
    OutputFormat, RoutesOptions, RoutesOutcome,
};
use docsite_slug::{slugify_with, WordChars};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Slug(args) => handle_slug(cli.load, args),
        Command::Anchors(args) => with_operations(cli.load, |ops| handle_anchors(ops, args)),
        Command::Routes(args) => with_operations(cli.load, |ops| handle_routes(ops, args)),
        Command::Check(args) => with_operations(cli.load, |ops| handle_check(ops, args)),
    }
}

/// Load configuration and hand the operation layer to `handler`.
fn with_operations<F>(load: LoadArgs, handler: F) -> Result<i32>
where
    F: FnOnce(&Operations) -> Result<i32>,
{
    let config = match Config::load(load_options(load)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("docsite error: {err}");
            return Ok(2);
        }
    };
    debug!(root = %config.project.root.display(), "configuration loaded");

    handler(&Operations::new(config))
}

fn load_options(load: LoadArgs) -> LoadOptions {
    let mut options = LoadOptions::default();
    if let Some(dir) = load.cwd {
        options = options.with_working_dir(dir);
    }
    if let Some(path) = load.config {
        options = options.with_override_path(path);
    }
    options
}

/// Word policy for `slug`: `--unicode` wins, then the configured policy.
/// A missing or broken config falls back to ASCII.
fn slug_policy(load: LoadArgs, unicode: bool) -> WordChars {
    if unicode {
        return WordChars::Unicode;
    }
    match Config::load(load_options(load)) {
        Ok(config) => config.markdown.anchor.word_chars,
        Err(err) => {
            debug!(error = %err, "no usable configuration; slugging with ASCII words");
            WordChars::Ascii
        }
    }
}

fn operation_failure(err: OperationError) -> Result<i32> {
    match err {
        OperationError::InvalidInput(message) => {
            eprintln!("{message}");
            Ok(1)
        }
        OperationError::Io { path, source } => {
            eprintln!("I/O error on {}: {}", path.display(), source);
            Ok(4)
        }
        err @ OperationError::Walk { .. } => {
            eprintln!("{err}");
            Ok(4)
        }
        err => Err(err.into()),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn handle_slug(load: LoadArgs, args: SlugArgs) -> Result<i32> {
    let SlugArgs {
        text,
        unicode,
        format,
    } = args;
    let policy = slug_policy(load, unicode);

    let inputs = if text.is_empty() {
        io::stdin().lock().lines().collect::<io::Result<Vec<_>>>()?
    } else {
        text
    };

    let mut stdout = io::stdout().lock();
    match format.unwrap_or(FormatValue::Plain) {
        FormatValue::Plain => {
            for input in &inputs {
                writeln!(stdout, "{}", slugify_with(input, policy))?;
            }
        }
        FormatValue::Json => {
            let payload: Vec<_> = inputs
                .iter()
                .map(|input| json!({ "text": input, "slug": slugify_with(input, policy) }))
                .collect();
            writeln!(stdout, "{}", serde_json::to_string_pretty(&payload)?)?;
        }
    }
    Ok(0)
}

fn handle_anchors(ops: &Operations, args: AnchorsArgs) -> Result<i32> {
    let AnchorsArgs { path, format } = args;
    let options = AnchorsOptions {
        paths: path,
        format: output_format(format),
    };

    match ops.anchors(options) {
        Ok(AnchorsOutcome { rendered, .. }) => {
            emit(&rendered)?;
            Ok(0)
        }
        Err(err) => operation_failure(err),
    }
}

fn handle_routes(ops: &Operations, args: RoutesArgs) -> Result<i32> {
    let options = RoutesOptions {
        format: output_format(args.format),
    };

    match ops.routes(options) {
        Ok(RoutesOutcome { rendered, .. }) => {
            emit(&rendered)?;
            Ok(0)
        }
        Err(err) => operation_failure(err),
    }
}

fn handle_check(ops: &Operations, args: CheckArgs) -> Result<i32> {
    let CheckArgs { path, format } = args;
    let options = CheckOptions {
        paths: path,
        format: output_format(format),
    };

    match ops.check(options) {
        Ok(CheckOutcome {
            rendered,
            exit_code,
            ..
        }) => {
            emit(&rendered)?;
            Ok(exit_code)
        }
        Err(err) => operation_failure(err),
    }
}

fn output_format(value: Option<FormatValue>) -> OutputFormat {
    match value.unwrap_or(FormatValue::Plain) {
        FormatValue::Plain => OutputFormat::Plain,
        FormatValue::Json => OutputFormat::Json,
    }
}

fn emit(content: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    if !content.is_empty() && !content.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

#[derive(Parser)]
#[command(author, version, about = "docsite toolkit", propagate_version = true)]
struct Cli {
    #[command(flatten)]
    load: LoadArgs,
    /// Log debug output to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct LoadArgs {
    /// Use this config file on top of discovered ones
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Run as if started in DIR
    #[arg(long, global = true, value_name = "DIR")]
    cwd: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the anchor slug for each argument (or each stdin line)
    Slug(SlugArgs),
    /// List heading anchors per page
    Anchors(AnchorsArgs),
    /// Show the route table and sidebar resolution
    Routes(RoutesArgs),
    /// Check links, anchors and the sidebar
    Check(CheckArgs),
}

#[derive(Args)]
struct SlugArgs {
    /// Heading text to slugify
    #[arg(value_name = "TEXT")]
    text: Vec<String>,
    /// Keep non-ASCII letters and digits (overrides markdown.anchor.word_chars)
    #[arg(long)]
    unicode: bool,
    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatValue>,
}

#[derive(Args)]
struct AnchorsArgs {
    /// Restrict output to specific paths
    #[arg(long = "path", value_name = "PATH", action = ArgAction::Append)]
    path: Vec<PathBuf>,
    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatValue>,
}

#[derive(Args)]
struct RoutesArgs {
    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatValue>,
}

#[derive(Args)]
struct CheckArgs {
    /// Restrict checking to specific paths
    #[arg(long = "path", value_name = "PATH", action = ArgAction::Append)]
    path: Vec<PathBuf>,
    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatValue>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatValue {
    Plain,
    Json,
}
