use rayon::prelude::*;

use super::error::{AnalysisError, AnalysisResult};
use super::features::EnergyProfile;
use super::window::Windower;

/// Level reported for a frame of exact digital silence.
pub const SILENCE_DB: f64 = -100.0;

pub fn frame_rms(frame: &[f32]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / frame.len() as f64).sqrt()
}

pub fn rms_to_db(rms: f64) -> f64 {
    if rms > 0.0 {
        20.0 * rms.log10()
    } else {
        SILENCE_DB
    }
}

/// RMS energy of every frame, in dB.
pub fn extract_energy(windower: &Windower<'_>) -> AnalysisResult<EnergyProfile> {
    let energy: Vec<f64> = windower
        .par_frames()
        .map(|frame| rms_to_db(frame_rms(frame)))
        .collect();

    if energy.is_empty() {
        return Err(AnalysisError::EmptyProfile);
    }
    Ok(EnergyProfile::new(energy))
}
