use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sidediff::config::Config;
use sidediff::output::{files_json, side_by_side_text, TextLayout};
use sidediff::worker::DiffWorker;

#[derive(Parser, Debug)]
#[command(name = "sdv")]
#[command(about = "Side-by-side viewer for git and unified diffs")]
#[command(version)]
struct Args {
    /// Patch file to read ("-" or omitted reads stdin)
    patch: Option<PathBuf>,

    /// Print the parsed files as JSON instead of columns
    #[arg(long)]
    json: bool,

    /// Output width in columns (default: terminal width)
    #[arg(short, long)]
    width: Option<u16>,

    /// Hide line numbers
    #[arg(long)]
    no_line_numbers: bool,

    /// Log parser and worker decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sidediff=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut patch = String::new();
            io::stdin()
                .read_to_string(&mut patch)
                .context("Failed to read stdin")?;
            Ok(patch)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = Config::load()?;
    let theme = config.theme.theme()?;
    let patch = read_input(args.patch.as_deref())?;

    let worker = DiffWorker::new().context("Failed to start diff worker")?;
    let files = worker.parse(patch).wait().await?;

    let text = if args.json {
        files_json(&files).context("Failed to serialize files")? + "\n"
    } else if files.is_empty() {
        "No difference\n".to_owned()
    } else {
        let output = worker.render(files, theme).wait().await?;
        let layout = TextLayout {
            width: usize::from(args.width.unwrap_or_else(|| config.diff.resolved_width())),
            tab_width: config.diff.tab_width,
            line_numbers: config.diff.line_numbers && !args.no_line_numbers,
        };
        side_by_side_text(&output, &layout)
    };

    io::stdout()
        .lock()
        .write_all(text.as_bytes())
        .context("Failed to write output")?;
    Ok(())
}
