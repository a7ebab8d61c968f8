use anyhow::{Context, Result};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use symphonia::core::audio::SampleBuffer as DecodeBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::features::SampleBuffer;

/// One decodable track of an opened container.
struct TrackReader {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    expected_frames: Option<u64>,
}

impl TrackReader {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
        let source = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let format = symphonia::default::get_probe()
            .format(&hint, source, &FormatOptions::default(), &MetadataOptions::default())
            .with_context(|| format!("Unrecognized audio format: {}", path.display()))?
            .format;

        let is_audio = |t: &&Track| t.codec_params.codec != CODEC_TYPE_NULL;
        let track = format
            .default_track()
            .filter(is_audio)
            .or_else(|| format.tracks().iter().find(is_audio))
            .context("No audio tracks found")?;

        let track_id = track.id;
        let params = track.codec_params.clone();
        let sample_rate = params.sample_rate.context("Unknown sample rate")?;
        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .context("Failed to create audio decoder")?;

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            expected_frames: params.n_frames,
        })
    }

    /// Append the next packet of this track to `out` as mono samples.
    /// Returns `false` once the stream is exhausted.
    fn read_into(&mut self, out: &mut Vec<f32>) -> Result<bool> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Ok(false);
                }
                Err(e) => return Err(e).context("Failed to read audio packet"),
            };
            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let mut interleaved = DecodeBuffer::<f32>::new(decoded.frames() as u64, spec);
                    interleaved.copy_interleaved_ref(decoded);
                    downmix_into(interleaved.samples(), spec.channels.count().max(1), out);
                    return Ok(true);
                }
                Err(SymphoniaError::DecodeError(err)) => {
                    log::warn!("Skipping undecodable packet: {}", err);
                }
                Err(e) => return Err(e).context("Failed to decode audio packet"),
            }
        }
    }
}

/// Decode an audio file into a mono [`SampleBuffer`] at its native rate.
pub fn decode_audio(path: &Path) -> Result<SampleBuffer> {
    let mut reader = TrackReader::open(path)?;

    let mut mono = Vec::with_capacity(reader.expected_frames.unwrap_or(0) as usize);
    while reader.read_into(&mut mono)? {}

    let buffer = SampleBuffer::new(mono, reader.sample_rate);
    log::info!(
        "Decoded audio: {} samples, {}Hz, {:.2}s",
        buffer.samples.len(),
        buffer.sample_rate,
        buffer.duration_seconds()
    );
    Ok(buffer)
}

/// Average interleaved frames down to one channel.
fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels == 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn downmix_averages_channels() {
        let mut out = Vec::new();
        downmix_into(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, &mut out);
        assert_eq!(out, vec![0.5, 0.5, 0.0]);

        let mut mono = Vec::new();
        downmix_into(&[0.1, 0.2], 1, &mut mono);
        assert_eq!(mono, vec![0.1, 0.2]);
    }

    #[test]
    fn decodes_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples: Vec<i16> = (0..8000).map(|i| if i % 2 == 0 { 16384 } else { -16384 }).collect();
        write_wav(&path, 1, 8000, &samples);

        let buffer = decode_audio(&path).unwrap();
        assert_eq!(buffer.sample_rate, 8000);
        assert_eq!(buffer.samples.len(), 8000);
        assert!((buffer.duration_seconds() - 1.0).abs() < 1e-9);
        assert!((buffer.samples[0] - 0.5).abs() < 1e-3);
        assert!((buffer.samples[1] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn decodes_stereo_wav_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // left at half scale, right silent
        let samples: Vec<i16> = (0..2000).flat_map(|_| [16384i16, 0]).collect();
        write_wav(&path, 2, 4000, &samples);

        let buffer = decode_audio(&path).unwrap();
        assert_eq!(buffer.sample_rate, 4000);
        assert_eq!(buffer.samples.len(), 2000);
        assert!(buffer.samples.iter().all(|s| (s - 0.25).abs() < 1e-3));
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();
        assert!(decode_audio(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_audio(&dir.path().join("nope.wav")).unwrap_err();
        assert!(err.to_string().contains("Failed to open audio file"));
    }
}
