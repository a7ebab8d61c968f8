use serde::Serialize;
use std::ops::Deref;

/// Mono samples nominally in [-1, 1] plus their sample rate.
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Per-window energy in dB, in chronological order.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnergyProfile(Vec<f64>);

impl EnergyProfile {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl Deref for EnergyProfile {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

/// Per-window LED brightness (0-255), index-aligned with the [`EnergyProfile`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BrightnessProfile(Vec<u8>);

impl BrightnessProfile {
    pub fn new(values: Vec<u8>) -> Self {
        Self(values)
    }
}

impl Deref for BrightnessProfile {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}
