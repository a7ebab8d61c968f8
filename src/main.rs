mod audio;
mod cli;
mod config;
mod encode;
mod render;

use anyhow::{Context, Result};
use clap::Parser;

use audio::analysis::{analyze, Analysis, AnalysisConfig};
use audio::brightness::SmoothingWindow;
use audio::features::SampleBuffer;
use audio::window::WindowSpec;
use cli::Cli;
use render::plot::PlotOptions;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    if let Some(path) = config::find_config(cli.config.as_deref()) {
        match config::load_config(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                config::merge_into(&mut cli, cfg);
            }
            Err(err) => log::warn!("{:#}", err),
        }
    }

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    let analysis_config = AnalysisConfig {
        window: WindowSpec::new(cli.window_ms),
        smoothing: SmoothingWindow::new(cli.smoothing_window)?,
    };

    log::info!("brightline - audio to LED brightness");
    log::info!("Input: {}", cli.input.display());

    // 1. Decode
    log::info!("Loading {}...", cli.input.display());
    let buffer = audio::decode::decode_audio(&cli.input)?;

    // 2. Analyze
    log::info!("Analyzing audio volume...");
    let analysis = analyze(&buffer, &analysis_config)
        .with_context(|| format!("Failed to analyze {}", cli.input.display()))?;
    log_analysis(&analysis);

    // 3. Export and visualize
    write_outputs(&cli, &buffer, &analysis)?;

    log_export_summary(&analysis);
    log::info!("Done! Include '{}' in your Arduino project", cli.output.display());
    Ok(())
}

/// Header first: it is the file the firmware needs, and a failure there
/// leaves nothing else behind.
fn write_outputs(cli: &Cli, buffer: &SampleBuffer, analysis: &Analysis) -> Result<()> {
    log::info!("Exporting Arduino data...");
    encode::header::export_header(&cli.output, &analysis.brightness, analysis.window)?;
    if let Some(ref report_path) = cli.report {
        encode::report::write_report(report_path, analysis)?;
    }
    if let Some(plot_path) = cli.plot_path() {
        log::info!("Creating visualization...");
        render::plot::save_analysis_plot(&plot_path, buffer, analysis, &PlotOptions::default())?;
    }
    Ok(())
}

fn log_analysis(analysis: &Analysis) {
    let range = &analysis.range;
    log::info!("  Noise floor: {:.1} dB", range.noise_floor);
    log::info!("  Max energy: {:.1} dB", range.ceiling);
    log::info!("  Dynamic range: {:.1} dB", range.dynamic_range_db());
    if range.is_degenerate() {
        log::warn!("Zero dynamic range: only frames above {:.1} dB will light up", range.ceiling);
    }
    log_average_brightness(analysis);
    log::info!("  Active time: {:.1}%", analysis.stats.active_fraction * 100.0);
}

fn log_average_brightness(analysis: &Analysis) {
    match analysis.stats.average_nonzero_brightness {
        Some(avg) => log::info!("  Average brightness: {:.1}/255", avg),
        None => log::info!("  Average brightness: no active signal"),
    }
}

fn log_export_summary(analysis: &Analysis) {
    log::info!("Export summary:");
    log::info!("  Array size: {} values", analysis.brightness.len());
    log::info!("  Duration: {:.1} seconds", analysis.duration_seconds());
    log::info!("  Time resolution: {}ms", analysis.window.window_ms);
    log_average_brightness(analysis);
}
