use rayon::prelude::*;
use serde::Serialize;

use super::calibrate::RangeEstimate;
use super::error::{AnalysisError, AnalysisResult};
use super::features::{BrightnessProfile, EnergyProfile};

pub const MAX_BRIGHTNESS: u8 = 255;
pub const DEFAULT_SMOOTHING_WINDOW: usize = 3;

/// Width of the moving average used for flicker suppression. Always odd.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SmoothingWindow(usize);

impl SmoothingWindow {
    pub fn new(size: usize) -> AnalysisResult<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(AnalysisError::InvalidSmoothingWindow(size));
        }
        Ok(Self(size))
    }

    pub fn size(&self) -> usize {
        self.0
    }
}

impl Default for SmoothingWindow {
    fn default() -> Self {
        Self(DEFAULT_SMOOTHING_WINDOW)
    }
}

/// Maps one energy value onto 0-255.
///
/// The floor check runs first, so a value equal to the noise floor is dark and
/// a degenerate range never reaches the division. Under a degenerate range only
/// frames strictly above the collapsed ceiling light up, at full brightness.
/// In-range values are scaled and truncated toward zero.
pub fn normalize_energy(energy: f64, range: &RangeEstimate) -> u8 {
    if energy <= range.noise_floor {
        return 0;
    }
    if energy >= range.ceiling {
        return MAX_BRIGHTNESS;
    }
    let Some(span) = range.span() else {
        return 0;
    };
    let scaled = (energy - range.noise_floor) / span * MAX_BRIGHTNESS as f64;
    scaled.clamp(0.0, MAX_BRIGHTNESS as f64) as u8
}

pub fn normalize(energy: &EnergyProfile, range: &RangeEstimate) -> Vec<u8> {
    let values: &[f64] = energy;
    values
        .par_iter()
        .map(|&db| normalize_energy(db, range))
        .collect()
}

/// Truncated moving average over `[i - k/2, i + k/2]`. Near the ends the
/// window is cut short rather than padded, so edge frames average fewer
/// neighbours.
pub fn smooth(levels: &[u8], window: SmoothingWindow) -> Vec<u8> {
    let half = window.size() / 2;
    let n = levels.len();

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(n);
            mean_level(&levels[start..end])
        })
        .collect()
}

/// Integer mean, truncated. Zero for an empty slice.
fn mean_level(levels: &[u8]) -> u8 {
    if levels.is_empty() {
        return 0;
    }
    let sum: u64 = levels.iter().map(|&b| b as u64).sum();
    (sum / levels.len() as u64) as u8
}

pub fn map_brightness(
    energy: &EnergyProfile,
    range: &RangeEstimate,
    window: SmoothingWindow,
) -> BrightnessProfile {
    let raw = normalize(energy, range);
    BrightnessProfile::new(smooth(&raw, window))
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Mean of the lit frames; `None` when every frame is dark.
    pub average_nonzero_brightness: Option<f64>,
    /// Share of frames with brightness above zero, 0.0-1.0.
    pub active_fraction: f64,
}

impl SummaryStats {
    pub fn from_profile(levels: &[u8]) -> Self {
        let (count, sum) = levels
            .iter()
            .filter(|&&b| b > 0)
            .fold((0usize, 0u64), |(count, sum), &b| (count + 1, sum + b as u64));

        let average_nonzero_brightness = if count > 0 {
            Some(sum as f64 / count as f64)
        } else {
            None
        };
        let active_fraction = if levels.is_empty() {
            0.0
        } else {
            count as f64 / levels.len() as f64
        };

        Self {
            average_nonzero_brightness,
            active_fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_wins_ties() {
        let range = RangeEstimate::new(-40.0, -10.0);
        assert_eq!(normalize_energy(-40.0, &range), 0);
        assert_eq!(normalize_energy(-55.0, &range), 0);
        assert_eq!(normalize_energy(-10.0, &range), 255);
        assert_eq!(normalize_energy(3.0, &range), 255);
    }

    #[test]
    fn degenerate_range_lights_only_outliers() {
        let flat = RangeEstimate::new(-20.0, -20.0);
        assert_eq!(normalize_energy(-20.0, &flat), 0);
        assert_eq!(normalize_energy(-19.0, &flat), 255);
        assert_eq!(normalize_energy(-21.0, &flat), 0);

        let energy = EnergyProfile::new(vec![-20.0; 8]);
        assert_eq!(normalize(&energy, &flat), vec![0; 8]);
    }

    #[test]
    fn midpoint_truncates() {
        let range = RangeEstimate::new(-60.0, -20.0);
        let energy = EnergyProfile::new(vec![-60.0, -40.0, -20.0]);
        assert_eq!(normalize(&energy, &range), vec![0, 127, 255]);
    }

    #[test]
    fn mapping_is_monotonic() {
        let range = RangeEstimate::new(-48.0, -6.0);
        let mut previous = 0;
        for step in 0..=700 {
            let db = -60.0 + step as f64 * 0.1;
            let level = normalize_energy(db, &range);
            assert!(level >= previous, "{db} dB went from {previous} to {level}");
            previous = level;
        }
        assert_eq!(previous, 255);
    }

    #[test]
    fn smoothing_truncates_edges() {
        let smoothed = smooth(&[0, 100, 200, 50, 10], SmoothingWindow::default());
        assert_eq!(smoothed, vec![50, 100, 116, 86, 30]);
    }

    #[test]
    fn mean_of_long_bright_run() {
        // 255 * 17M exceeds u32::MAX
        let levels = vec![255u8; 17_000_000];
        assert_eq!(mean_level(&levels), 255);
        assert_eq!(mean_level(&[100, 200, 50]), 116);
        assert_eq!(mean_level(&[]), 0);
    }

    #[test]
    fn smoothing_window_of_one_is_identity() {
        let levels = vec![3, 250, 0, 17];
        assert_eq!(smooth(&levels, SmoothingWindow::new(1).unwrap()), levels);
    }

    #[test]
    fn wide_smoothing_window() {
        let smoothed = smooth(&[255, 0, 0, 0, 255], SmoothingWindow::new(5).unwrap());
        // [0..3) [0..4) [0..5) [1..5) [2..5)
        assert_eq!(smoothed, vec![85, 63, 102, 63, 85]);
    }

    #[test]
    fn smoothing_empty_and_single() {
        assert!(smooth(&[], SmoothingWindow::default()).is_empty());
        assert_eq!(smooth(&[42], SmoothingWindow::default()), vec![42]);
    }

    #[test]
    fn smoothing_window_must_be_odd() {
        assert_eq!(SmoothingWindow::new(0), Err(AnalysisError::InvalidSmoothingWindow(0)));
        assert_eq!(SmoothingWindow::new(4), Err(AnalysisError::InvalidSmoothingWindow(4)));
        assert_eq!(SmoothingWindow::new(7).map(|w| w.size()), Ok(7));
    }

    #[test]
    fn summary_of_mixed_profile() {
        let stats = SummaryStats::from_profile(&[0, 100, 200, 0]);
        assert_eq!(stats.average_nonzero_brightness, Some(150.0));
        assert_eq!(stats.active_fraction, 0.5);
    }

    #[test]
    fn summary_of_dark_profile() {
        let stats = SummaryStats::from_profile(&[0; 10]);
        assert_eq!(stats.average_nonzero_brightness, None);
        assert_eq!(stats.active_fraction, 0.0);
    }
}
