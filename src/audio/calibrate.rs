use serde::Serialize;

use super::error::{AnalysisError, AnalysisResult};
use super::features::EnergyProfile;

pub const NOISE_FLOOR_PERCENTILE: f64 = 15.0;
pub const CEILING_PERCENTILE: f64 = 85.0;

/// Usable dynamic range of a recording, in dB.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RangeEstimate {
    pub noise_floor: f64,
    pub ceiling: f64,
}

impl RangeEstimate {
    pub fn new(noise_floor: f64, ceiling: f64) -> Self {
        Self { noise_floor, ceiling }
    }

    /// Zero dynamic range: there is nothing to normalize against.
    pub fn is_degenerate(&self) -> bool {
        self.ceiling <= self.noise_floor
    }

    /// `ceiling - noise_floor`, or `None` when the range is degenerate.
    pub fn span(&self) -> Option<f64> {
        if self.is_degenerate() {
            None
        } else {
            Some(self.ceiling - self.noise_floor)
        }
    }

    pub fn dynamic_range_db(&self) -> f64 {
        self.ceiling - self.noise_floor
    }
}

/// Percentile `p` (0-100) with linear interpolation between order statistics,
/// at rank `p / 100 * (n - 1)`.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

pub fn calibrate(energy: &EnergyProfile) -> AnalysisResult<RangeEstimate> {
    let noise_floor = percentile(energy, NOISE_FLOOR_PERCENTILE).ok_or(AnalysisError::EmptyProfile)?;
    let ceiling = percentile(energy, CEILING_PERCENTILE).ok_or(AnalysisError::EmptyProfile)?;
    Ok(RangeEstimate::new(noise_floor, ceiling))
}
