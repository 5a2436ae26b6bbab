//! Deterministic synthetic signals.

use std::f32::consts::PI;
use std::path::Path;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// `len` samples of digital silence
pub fn silence(len: usize) -> Vec<f32> {
    vec![0.0; len]
}

/// Sine wave starting at phase 0
pub fn sine(sample_rate: u32, frequency_hz: f32, amplitude: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * PI * frequency_hz * t).sin()
        })
        .collect()
}

/// Uniform white noise in `[-amplitude, amplitude)` from a seeded generator
pub fn white_noise(len: usize, amplitude: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| rng.gen_range(-amplitude..amplitude))
        .collect()
}

/// Write mono 16-bit PCM to `path`
pub fn write_wav_i16(path: &Path, sample_rate: u32, samples: &[f32]) -> Result<(), hound::Error> {
    write_wav_channels_i16(path, sample_rate, 1, samples)
}

/// Write interleaved 16-bit PCM with `channels` channels to `path`
pub fn write_wav_channels_i16(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    interleaved: &[f32],
) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in interleaved {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer.write_sample(value)?;
    }
    writer.finalize()
}
