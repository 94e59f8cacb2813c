//! Powiaty - 2025 presidential election results by county vs. population density
//!
//! Loads the candidate list, county demographics and county vote counts,
//! computes vote shares of two candidates per county and charts them against
//! population density (log axis), plus the nationwide results.

mod analysis;
mod charts;
mod config;
mod data;
mod gui;
mod logging;
mod stats;

use analysis::ElectionAnalysis;
use anyhow::Context;
use charts::StaticChartRenderer;
use clap::Parser;
use config::AppConfig;
use eframe::egui;
use gui::ElectionApp;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "powiaty", version, about)]
struct Cli {
    /// JSON config file; compiled defaults are used for missing keys
    #[arg(long, env = "POWIATY_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the three input tables
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory for exported PNG charts
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Compute and export the charts without opening a window
    #[arg(long)]
    headless: bool,

    /// Open the output directory after a headless export
    #[arg(long, requires = "headless")]
    open: bool,

    /// Debug logging unless POWIATY_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

fn run_headless(config: &AppConfig, open_output: bool) -> anyhow::Result<()> {
    let analysis = ElectionAnalysis::run(config).context("analysis failed")?;
    if analysis.counties.is_empty() {
        warn!("no county has a usable total, scatter plots will be empty");
    }

    for result in &analysis.national {
        info!(surname = %result.surname, pct = result.pct, "nationwide");
    }
    info!(total = analysis.national_total(), "nationwide percentages summed");
    for s in &analysis.stats {
        info!(
            candidate = %s.label,
            counties = s.count,
            mean = s.mean,
            median = s.median,
            correlation = s.correlation,
            p_value = s.p_value,
            "county shares vs log10(density)"
        );
    }

    let paths = StaticChartRenderer::export_all(&analysis, &config.render)
        .context("chart export failed")?;
    for path in &paths {
        println!("{}", path.display());
    }

    if open_output {
        open::that(&config.render.output_dir).with_context(|| {
            format!("cannot open {}", config.render.output_dir.display())
        })?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref()).context("invalid configuration")?;
    config.apply_overrides(cli.data_dir, cli.out_dir);

    if cli.headless {
        return run_headless(&config, cli.open);
    }

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("Powiaty 2025"),
        ..Default::default()
    };

    eframe::run_native(
        "Powiaty 2025",
        options,
        Box::new(|cc| Ok(Box::new(ElectionApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}
