//! dcplot - plot per-data-center time-series readings.
//!
//! Draws one line per selected data center on a date axis, prints each
//! series' max and mean, writes the chart as SVG and shows it in the terminal.

mod axis;
mod dataset;
mod dataset_display;
mod display;
mod error;
mod figure;
mod series;

use anyhow::Result;
use clap::Parser;
use dataset::Dataset;
use dataset_display::DatasetDisplay;
use std::path::PathBuf;

/// Plot data center readings over time
#[derive(Parser, Debug)]
#[command(name = "dcplot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON Lines file, one {"data_center", "timestamp", "value"} record per line
    input: PathBuf,

    /// Data center to plot; repeat or comma-separate (default: all, in order of appearance)
    #[arg(short = 'd', long = "data-center", value_delimiter = ',')]
    data_centers: Vec<String>,

    /// Output path for the SVG chart
    #[arg(short, long, default_value = "datacenters.svg")]
    output: PathBuf,

    /// Chart width in pixels
    #[arg(long, default_value_t = figure::DEFAULT_SIZE.0)]
    width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = figure::DEFAULT_SIZE.1)]
    height: u32,

    /// Write the chart and summaries without opening the terminal viewer
    #[arg(long)]
    no_tui: bool,
}

impl Args {
    /// Data centers to draw, falling back to every one in the dataset
    fn selection(&self, dataset: &Dataset) -> Vec<String> {
        if self.data_centers.is_empty() {
            dataset.data_centers()
        } else {
            self.data_centers.clone()
        }
    }
}

fn run(args: &Args) -> Result<()> {
    log::info!("Loading records from {}", args.input.display());
    let dataset = dataset::load_records(&args.input)?;
    let selection = args.selection(&dataset);

    let mut dataset_display = DatasetDisplay::new(dataset, selection);
    let figure = dataset_display.show()?;
    if !dataset_display.remaining().is_empty() {
        log::debug!("{} records left unplotted", dataset_display.remaining().len());
    }

    figure.render_svg(&args.output, (args.width, args.height))?;

    if !args.no_tui {
        display::run_viewer(&figure)?;
    }

    eprintln!("Chart written to: {}", args.output.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        return Err(e);
    }
    Ok(())
}
