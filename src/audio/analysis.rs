use super::brightness::{map_brightness, SmoothingWindow, SummaryStats};
use super::calibrate::{calibrate, RangeEstimate};
use super::energy::extract_energy;
use super::error::AnalysisResult;
use super::features::{BrightnessProfile, EnergyProfile, SampleBuffer};
use super::window::{WindowSpec, Windower};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub window: WindowSpec,
    pub smoothing: SmoothingWindow,
}

/// Everything one run of the transform produces.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub window: WindowSpec,
    pub frame_len: usize,
    pub sample_rate: u32,
    pub energy: EnergyProfile,
    pub range: RangeEstimate,
    pub brightness: BrightnessProfile,
    pub stats: SummaryStats,
}

impl Analysis {
    pub fn duration_seconds(&self) -> f64 {
        self.window.frame_start_seconds(self.brightness.len())
    }
}

/// Windowing, energy, calibration, then brightness mapping. Pure function of
/// its inputs; either every stage succeeds or nothing is returned.
pub fn analyze(buffer: &SampleBuffer, config: &AnalysisConfig) -> AnalysisResult<Analysis> {
    let windower = Windower::new(buffer, config.window)?;
    log::debug!(
        "Windowing {} samples into {} frames of {} samples",
        buffer.samples.len(),
        windower.frame_count(),
        windower.frame_len()
    );

    let energy = extract_energy(&windower)?;

    let range = calibrate(&energy)?;
    log::debug!(
        "Calibrated range: floor={:.1} dB, ceiling={:.1} dB, degenerate={}",
        range.noise_floor,
        range.ceiling,
        range.is_degenerate()
    );

    let brightness = map_brightness(&energy, &range, config.smoothing);
    let stats = SummaryStats::from_profile(&brightness);

    Ok(Analysis {
        window: config.window,
        frame_len: windower.frame_len(),
        sample_rate: buffer.sample_rate,
        energy,
        range,
        brightness,
        stats,
    })
}
