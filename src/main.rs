//! Travel Survey - Faculty Travel Survey Report
//!
//! Loads the survey CSV, prints the headline metrics and writes
//! `report.json` plus one PNG per chart to the output directory.

use anyhow::Context;
use clap::Parser;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{error, info};
use travel_survey::charts::{render_all, BitmapRenderer};
use travel_survey::{load, logging, Report, ReportSettings};

#[derive(Parser, Debug)]
#[command(name = "travel_survey", version, about = "Faculty travel survey report")]
struct Args {
    /// Survey CSV file
    csv: PathBuf,

    /// Directory for report.json and chart images
    #[arg(short, long, default_value = "report")]
    out: PathBuf,

    /// JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose)?;

    let settings = match &args.config {
        Some(path) => ReportSettings::from_file(path)?,
        None => ReportSettings::default(),
    };

    // Load failure aborts before anything is written
    let table = load(&args.csv).inspect_err(|e| error!(error = %e, "survey load failed"))?;
    let report = Report::generate(&table, &settings);

    println!("Faculty Travel Survey Dashboard");
    for metric in report.headline_metrics() {
        println!("  {}: {}", metric.label, metric.value);
    }

    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create output directory {}", args.out.display()))?;

    let json_path = args.out.join("report.json");
    let file = File::create(&json_path)
        .with_context(|| format!("failed to create {}", json_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    let renderer = BitmapRenderer::new(&args.out, settings.chart_width, settings.chart_height);
    let requests = report.chart_requests(&settings);
    let summary = render_all(&renderer, &requests, settings.render_threads);

    for failure in &summary.failed {
        eprintln!("Chart '{}' could not be rendered: {}", failure.name, failure.message);
    }
    info!(
        out = %args.out.display(),
        charts = summary.rendered.len(),
        "report written"
    );
    println!(
        "Wrote {} chart(s) and report.json to {}",
        summary.rendered.len(),
        args.out.display()
    );

    Ok(())
}
