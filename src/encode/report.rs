use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::audio::analysis::Analysis;
use crate::audio::brightness::SummaryStats;
use crate::audio::calibrate::RangeEstimate;
use crate::audio::features::{BrightnessProfile, EnergyProfile};

/// JSON view of an [`Analysis`] for tooling that wants more than the header.
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub window_ms: u32,
    pub frame_len: usize,
    pub sample_rate: u32,
    pub frame_count: usize,
    pub duration_seconds: f64,
    pub range: &'a RangeEstimate,
    pub dynamic_range_db: f64,
    pub zero_dynamic_range: bool,
    pub stats: &'a SummaryStats,
    pub energy_db: &'a EnergyProfile,
    pub brightness: &'a BrightnessProfile,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            window_ms: analysis.window.window_ms,
            frame_len: analysis.frame_len,
            sample_rate: analysis.sample_rate,
            frame_count: analysis.brightness.len(),
            duration_seconds: analysis.duration_seconds(),
            range: &analysis.range,
            dynamic_range_db: analysis.range.dynamic_range_db(),
            zero_dynamic_range: analysis.range.is_degenerate(),
            stats: &analysis.stats,
            energy_db: &analysis.energy,
            brightness: &analysis.brightness,
        }
    }
}

pub fn write_report(path: &Path, analysis: &Analysis) -> Result<()> {
    let json = serde_json::to_string_pretty(&AnalysisReport::new(analysis))
        .context("Failed to serialize analysis report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    log::info!("Analysis report written: {}", path.display());
    Ok(())
}
