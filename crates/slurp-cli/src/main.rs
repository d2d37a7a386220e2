//! slurp: apply filter lists to image files without running the server.
//!
//! Useful for trying out a filter list before sending it to `slurpd`,
//! and for checking that a list renders deterministically.
//!
//! # Usage
//!
//! ```text
//! slurp apply photo.jpg -o out.png --filters '[{"filter":"grayscale"}]'
//! slurp apply photo.jpg -o out.png --filters @filters.json --check-determinism
//! slurp filters
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use slurp_filters::{FilterSpec, Pipeline, codec, registry};

/// Apply slurp filter lists to image files.
#[derive(Parser)]
#[command(name = "slurp", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a filter list over an image.
    Apply {
        /// Input image (PNG, JPEG, BMP, WebP).
        input: PathBuf,

        /// Output path. `.png`, `.jpg` or `.jpeg` selects the encoding.
        #[arg(short, long)]
        output: PathBuf,

        /// Filter list as inline JSON, or `@path` to read it from a file.
        #[arg(long)]
        filters: String,

        /// Render twice and fail if the outputs differ.
        #[arg(long)]
        check_determinism: bool,
    },
    /// List the registered filter names.
    Filters,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Apply {
            input,
            output,
            filters,
            check_determinism,
        } => apply(&input, &output, &filters, check_determinism),
        Command::Filters => {
            for name in registry::filter_names() {
                println!("{name}");
            }
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn apply(
    input: &Path,
    output: &Path,
    filters: &str,
    check_determinism: bool,
) -> anyhow::Result<()> {
    let specs = load_specs(filters)?;
    let pipeline = Pipeline::from_specs(&specs)?;

    let out_name = output
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let format = codec::format_from_filename(out_name)?;

    let bytes =
        std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let source = codec::decode(&bytes)?;
    eprintln!(
        "Image: {} ({}x{}), {} filter(s)",
        input.display(),
        source.width(),
        source.height(),
        pipeline.len(),
    );

    let start = Instant::now();
    let rendered = pipeline.apply(&source)?;
    eprintln!("Rendered in {:.1?}", start.elapsed());

    if check_determinism {
        let again = pipeline.apply(&source)?;
        if again.as_raw() != rendered.as_raw() {
            bail!("filter list is not deterministic: two renders differ");
        }
        eprintln!("Determinism check passed");
    }

    let encoded = codec::encode(&rendered, format)?;
    std::fs::write(output, &encoded)
        .with_context(|| format!("writing {}", output.display()))?;
    eprintln!(
        "{format} written to {} ({} bytes)",
        output.display(),
        encoded.len(),
    );
    Ok(())
}

/// Parse `--filters`: inline JSON, or `@path` to a JSON file.
fn load_specs(arg: &str) -> anyhow::Result<Vec<FilterSpec>> {
    let json = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading filter list {path}"))?,
        None => arg.to_owned(),
    };
    serde_json::from_str(&json).context("parsing filter list")
}
