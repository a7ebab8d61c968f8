use rayon::prelude::*;
use rayon::slice::Chunks as ParChunks;
use serde::Serialize;
use std::slice::Chunks;

use super::error::{AnalysisError, AnalysisResult};
use super::features::SampleBuffer;

pub const DEFAULT_WINDOW_MS: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WindowSpec {
    pub window_ms: u32,
}

impl WindowSpec {
    pub fn new(window_ms: u32) -> Self {
        Self { window_ms }
    }

    /// Frame size in samples, `round(sample_rate * window_ms / 1000)`.
    pub fn frame_len(&self, sample_rate: u32) -> AnalysisResult<usize> {
        let len = (sample_rate as f64 * self.window_ms as f64 / 1000.0).round() as usize;
        if len < 1 {
            return Err(AnalysisError::InvalidWindowConfig {
                sample_rate,
                window_ms: self.window_ms,
            });
        }
        Ok(len)
    }

    /// Start time of frame `index`, in seconds.
    pub fn frame_start_seconds(&self, index: usize) -> f64 {
        index as f64 * self.window_ms as f64 / 1000.0
    }
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS)
    }
}

/// Splits a sample buffer into consecutive, non-overlapping frames of
/// `frame_len` samples. The last frame may be shorter; an empty frame is
/// never produced.
#[derive(Clone, Copy, Debug)]
pub struct Windower<'a> {
    samples: &'a [f32],
    frame_len: usize,
}

impl<'a> Windower<'a> {
    pub fn new(buffer: &'a SampleBuffer, spec: WindowSpec) -> AnalysisResult<Self> {
        let frame_len = spec.frame_len(buffer.sample_rate)?;
        Ok(Self {
            samples: &buffer.samples,
            frame_len,
        })
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    pub fn frame_count(&self) -> usize {
        self.samples.len().div_ceil(self.frame_len)
    }

    /// Lazy frame sequence. Each call starts over from the first frame.
    pub fn frames(&self) -> Chunks<'a, f32> {
        self.samples.chunks(self.frame_len)
    }

    /// Same frames as [`Windower::frames`], for per-frame work on the rayon pool.
    pub fn par_frames(&self) -> ParChunks<'a, f32> {
        self.samples.par_chunks(self.frame_len)
    }
}

impl<'a> IntoIterator for Windower<'a> {
    type Item = &'a [f32];
    type IntoIter = Chunks<'a, f32>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(len: usize, sample_rate: u32) -> SampleBuffer {
        SampleBuffer::new(vec![0.5; len], sample_rate)
    }

    #[test]
    fn frame_len_rounds_to_nearest() {
        assert_eq!(WindowSpec::new(100).frame_len(1000), Ok(100));
        assert_eq!(WindowSpec::new(100).frame_len(44100), Ok(4410));
        // 22050 * 0.023 = 507.15
        assert_eq!(WindowSpec::new(23).frame_len(22050), Ok(507));
        // 15 * 0.1 = 1.5 rounds up
        assert_eq!(WindowSpec::new(100).frame_len(15), Ok(2));
    }

    #[test]
    fn zero_length_frame_is_rejected() {
        assert_eq!(
            WindowSpec::new(0).frame_len(44100),
            Err(AnalysisError::InvalidWindowConfig {
                sample_rate: 44100,
                window_ms: 0
            })
        );
        // 4 * 0.1 = 0.4 rounds to zero
        assert!(WindowSpec::new(100).frame_len(4).is_err());
        assert!(WindowSpec::new(100).frame_len(0).is_err());
    }

    #[test]
    fn keeps_partial_last_frame() {
        let buf = buffer(250, 1000);
        let windower = Windower::new(&buf, WindowSpec::new(100)).unwrap();
        let lens: Vec<usize> = windower.frames().map(|f| f.len()).collect();
        assert_eq!(lens, vec![100, 100, 50]);
        assert_eq!(windower.frame_count(), 3);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let buf = buffer(300, 1000);
        let windower = Windower::new(&buf, WindowSpec::new(100)).unwrap();
        assert_eq!(windower.frames().count(), 3);
        assert!(windower.frames().all(|f| !f.is_empty()));
        assert_eq!(windower.frame_count(), 3);
    }

    #[test]
    fn short_buffer_yields_single_frame() {
        let buf = buffer(7, 1000);
        let windower = Windower::new(&buf, WindowSpec::new(100)).unwrap();
        assert_eq!(windower.frames().map(|f| f.len()).collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn empty_buffer_yields_no_frames() {
        let buf = buffer(0, 1000);
        let windower = Windower::new(&buf, WindowSpec::new(100)).unwrap();
        assert_eq!(windower.frames().count(), 0);
        assert_eq!(windower.frame_count(), 0);
    }

    #[test]
    fn frames_are_restartable_and_match_parallel() {
        let samples: Vec<f32> = (0..1234).map(|i| i as f32).collect();
        let buf = SampleBuffer::new(samples, 1000);
        let windower = Windower::new(&buf, WindowSpec::new(100)).unwrap();

        let first: Vec<&[f32]> = windower.frames().collect();
        let second: Vec<&[f32]> = windower.into_iter().collect();
        let parallel: Vec<&[f32]> = windower.par_frames().collect();
        assert_eq!(first, second);
        assert_eq!(first, parallel);
        assert_eq!(first.concat(), buf.samples);
    }

    #[test]
    fn frame_start_times() {
        let spec = WindowSpec::new(100);
        assert_eq!(spec.frame_start_seconds(0), 0.0);
        assert!((spec.frame_start_seconds(16) - 1.6).abs() < 1e-12);
    }
}
