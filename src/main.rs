use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use policy_extract::parser::sections;
use policy_extract::{extract_policy_fields_with, Extraction, Heuristics};

#[derive(Parser)]
#[command(name = "policy_extract", about = "Pasted policy text to structured policy records")]
struct Cli {
    /// Heuristics config file (year range, road-type tokens)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one document and print it as JSON
    Parse {
        /// Input file, or "-" for stdin
        input: PathBuf,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Show how a document is grouped under section headers
    Sections {
        /// Input file, or "-" for stdin
        input: PathBuf,
    },
    /// Extract many documents in parallel, one JSON line each
    Batch {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let heuristics = Heuristics::load(cli.config.as_deref()).context("loading heuristics")?;

    let result = match cli.command {
        Commands::Parse { input, pretty } => {
            let text = read_input(&input)?;
            let extraction = extract_policy_fields_with(&text, &heuristics);
            let json = if pretty {
                serde_json::to_string_pretty(&extraction)?
            } else {
                serde_json::to_string(&extraction)?
            };
            println!("{}", json);
            if extraction.diagnostics.needs_review() {
                tracing::warn!(diagnostics = ?extraction.diagnostics, "extraction needs review");
            }
            Ok(())
        }
        Commands::Sections { input } => {
            let text = read_input(&input)?;
            let groups = sections::segment(&text);
            if groups.is_empty() {
                println!("No lines.");
                return Ok(());
            }
            for group in &groups {
                println!("[{}] ({} lines)", group.label.as_str(), group.lines.len());
                for line in &group.lines {
                    println!("    {}", line);
                }
            }
            Ok(())
        }
        Commands::Batch { inputs } => {
            let counts = extract_batch(&inputs, &heuristics)?;
            counts.print();
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

#[derive(Serialize)]
struct BatchLine<'a> {
    path: &'a Path,
    extraction: &'a Extraction,
}

#[derive(Default)]
struct BatchCounts {
    documents: usize,
    failed: usize,
    vehicles: usize,
    drivers: usize,
    coverages: usize,
    needs_review: usize,
}

impl BatchCounts {
    fn print(&self) {
        eprintln!(
            "Extracted {} documents ({} unreadable): {} vehicles, {} drivers, {} coverages, {} need review.",
            self.documents, self.failed, self.vehicles, self.drivers, self.coverages, self.needs_review,
        );
    }
}

fn extract_batch(inputs: &[PathBuf], heuristics: &Heuristics) -> anyhow::Result<BatchCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = BatchCounts::default();

    for chunk in inputs.chunks(500) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|path| {
                let extraction = std::fs::read_to_string(path)
                    .map(|text| extract_policy_fields_with(&text, heuristics));
                (path, extraction)
            })
            .collect();

        for (path, extraction) in results {
            match extraction {
                Ok(extraction) => {
                    counts.documents += 1;
                    counts.vehicles += extraction.record.vehicles.len();
                    counts.drivers += extraction.record.drivers.len();
                    counts.coverages += extraction.record.coverages.len();
                    if extraction.diagnostics.needs_review() {
                        counts.needs_review += 1;
                    }
                    let line = BatchLine {
                        path,
                        extraction: &extraction,
                    };
                    pb.suspend(|| serde_json::to_string(&line).map(|json| println!("{}", json)))?;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable input");
                    counts.failed += 1;
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
