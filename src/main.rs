use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eframe::egui;

use rmsd_plotter::app::RmsdPlotterApp;
use rmsd_plotter::config::PlotterConfig;
use rmsd_plotter::data::model::read_all;
use rmsd_plotter::export::{self, ExportOptions};
use rmsd_plotter::pipeline::{self, RunOutcome};
use rmsd_plotter::units::UnitChoice;

#[derive(Parser)]
#[command(author, version, about = "Overlay RMSD trajectories and export PNG plots")]
struct Args {
    /// JSON settings file (falls back to $RMSD_PLOTTER_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Plot files without opening a window
    Render {
        /// RMSD data files (.xvg / .txt)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// angstrom | nanometer (default from config)
        #[arg(long)]
        unit: Option<UnitChoice>,
        /// Output path (default: RMSD_plot_<unit>.png)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Override the export resolution
        #[arg(long)]
        dpi: Option<u32>,
    },
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();
    let config = PlotterConfig::resolve(args.config.as_deref()).context("loading settings")?;

    match args.command {
        Some(Command::Render {
            files,
            unit,
            output,
            dpi,
        }) => render(&config, &files, unit, output, dpi),
        None => run_gui(config).map(|()| ExitCode::SUCCESS),
    }
}

fn render(
    config: &PlotterConfig,
    paths: &[PathBuf],
    unit: Option<UnitChoice>,
    output: Option<PathBuf>,
    dpi: Option<u32>,
) -> Result<ExitCode> {
    let unit = unit.unwrap_or(config.default_unit);
    let (files, unreadable) = read_all(paths);
    for error in &unreadable {
        eprintln!("warning: skipped {error:#}");
    }

    let outcome = pipeline::run(&files, unit);
    for warning in outcome.warnings() {
        eprintln!("warning: {warning}");
    }

    let figure = match &outcome {
        RunOutcome::Processed { figure, .. } if !figure.is_empty() => figure,
        _ => {
            eprintln!("error: none of the {} file(s) could be plotted", paths.len());
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut options = ExportOptions::from(config);
    if let Some(dpi) = dpi {
        anyhow::ensure!(dpi > 0, "--dpi must be positive");
        options = options.with_dpi(dpi);
    }
    let output = output.unwrap_or_else(|| PathBuf::from(figure.export_file_name()));
    export::save_png(figure, &options, &output)
        .with_context(|| format!("exporting {}", output.display()))?;

    println!(
        "Plotted {} of {} file(s) -> {}",
        figure.series.len(),
        paths.len(),
        output.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn run_gui(config: PlotterConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "RMSD Plotter",
        options,
        Box::new(|_cc| Ok(Box::new(RmsdPlotterApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("running UI: {e}"))
}
