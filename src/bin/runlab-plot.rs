//! runlab-plot: re-render a saved experiment run record as a chart image.
//!
//! Run records are the JSON files the harness's JSON sink writes after each
//! run (default location: `target/runlab/<experiment>.json`).
//!
//! Example:
//!     runlab-plot target/runlab/sorting.json -o sorting.svg
//!     runlab-plot results.json -o chart.png --yscale linear --open

use anyhow::{Context, Result};
use clap::Parser;
use runlab::{show_figure, write_figure, Figure, FigureOptions, RunRecord, Scale};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "runlab-plot",
    about = "Render a runlab run record as a chart image"
)]
struct Cli {
    /// Path to a run record JSON file
    record: PathBuf,

    /// Output image path (.svg or .png); omit to open a temporary SVG in
    /// the platform viewer
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Chart title (defaults to the experiment name)
    #[arg(long)]
    title: Option<String>,

    /// Chart width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// X axis scale (log or linear)
    #[arg(long, default_value = "log")]
    xscale: Scale,

    /// Y axis scale (log or linear)
    #[arg(long, default_value = "log")]
    yscale: Scale,

    /// Open the written image in the platform viewer
    #[arg(long)]
    open: bool,

    /// List the record's algorithms and sizes instead of rendering
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let record = RunRecord::load(&cli.record)
        .with_context(|| format!("failed to load run record {}", cli.record.display()))?;

    if cli.list {
        println!("experiment: {}", record.experiment);
        println!("iterations: {}", record.iterations);
        println!("algorithms:");
        for name in &record.algorithms {
            println!("  {}", name);
        }
        println!("sizes: {:?}", record.sizes);
        return Ok(());
    }

    let title = cli.title.unwrap_or_else(|| record.experiment.clone());
    let options = FigureOptions::new()
        .width(cli.width)
        .height(cli.height)
        .xscale(cli.xscale)
        .yscale(cli.yscale);
    let fig = Figure::from_record(&record, &title, &options);

    match (&cli.output, cli.open) {
        (Some(path), false) => write_figure(&fig, path)
            .with_context(|| format!("failed to write {}", path.display()))?,
        (Some(path), true) => {
            show_figure(&fig, Some(path.as_path())).context("failed to display figure")?
        }
        (None, _) => show_figure(&fig, None).context("failed to display figure")?,
    }

    Ok(())
}
