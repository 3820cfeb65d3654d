use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;

use trailmap::{
    config::Settings,
    pipeline,
    report::{format_table, format_total_distance},
};

#[derive(Parser)]
#[command(name = "trailmap")]
#[command(about = "Travelled distance and movement map from a Google Takeout location history")]
struct Args {
    /// Configuration file (defaults to ./trailmap.yaml when present)
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,

    /// Takeout folder containing "Semantic Location History"
    #[arg(short, long, value_name = "PATH")]
    base: Option<Utf8PathBuf>,

    /// Map document to write
    #[arg(short, long, value_name = "FILE")]
    output: Option<Utf8PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(base) = args.base {
        settings.base_path = base;
    }
    if let Some(output) = args.output {
        settings.output = output;
    }

    let summary = pipeline::run(&settings)?;

    println!("{}", format_table(&summary.sequence, settings.preview_rows));
    println!("{}", format_total_distance(summary.total_distance_km));
    if !summary.skipped.is_empty() {
        println!("⚠️  Skipped {} malformed item(s)", summary.skipped.len());
    }
    println!("🗺️  Map saved as '{}'", settings.output);

    Ok(())
}
