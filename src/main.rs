use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pandoc_preprocess::{preprocess, HttpFetcher, PreprocessError};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Cleans up a word-processor HTML export for the conversion pipeline.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input HTML file; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Output file; writes stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Directory where fetched images are cached.
    #[arg(long, default_value = ".")]
    image_dir: PathBuf,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let mut raw = Vec::new();
    match &args.input {
        Some(path) => {
            File::open(path)
                .with_context(|| format!("open {}", path.display()))?
                .read_to_end(&mut raw)
                .with_context(|| format!("read {}", path.display()))?;
        }
        None => {
            io::stdin().read_to_end(&mut raw).context("read stdin")?;
        }
    }
    let source = String::from_utf8(raw).map_err(|e| PreprocessError::Parse(e.to_string()))?;

    let output = preprocess(&source, &HttpFetcher, &args.image_dir)?;

    match &args.out {
        Some(path) => {
            let mut f =
                File::create(path).with_context(|| format!("create {}", path.display()))?;
            f.write_all(output.as_bytes())?;
            f.write_all(b"\n")?;
        }
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(output.as_bytes())?;
            stdout.write_all(b"\n")?;
            stdout.flush()?;
        }
    }

    Ok(())
}
