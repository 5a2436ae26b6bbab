// WAV decoding via hound
//
// Integer PCM is scaled by 2^(bits-1) so full-scale negative samples map to
// exactly -1.0. Multi-channel input is down-mixed by averaging each frame.

use std::path::Path;

use crate::error::AnalysisError;

/// One decoded clip, already down-mixed to mono
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the source file before down-mixing
    pub channels: u16,
}

impl DecodedClip {
    /// Clip length in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode a WAV file into mono `f32` samples
///
/// # Errors
/// `Decode` if the file cannot be opened or parsed, or uses a sample format
/// other than 8-32 bit integer or 32-bit float PCM.
pub fn decode_wav(path: &Path) -> Result<DecodedClip, AnalysisError> {
    let mut reader = hound::WavReader::open(path).inspect_err(|err| {
        log::warn!("[Decoder] Failed to open {}: {}", path.display(), err);
    })?;
    let spec = reader.spec();

    if spec.channels == 0 {
        return Err(AnalysisError::Decode {
            details: format!("{} declares zero channels", path.display()),
        });
    }

    let interleaved = match spec.sample_format {
        hound::SampleFormat::Float => {
            if spec.bits_per_sample != 32 {
                return Err(unsupported(path, spec));
            }
            reader.samples::<f32>().collect::<Result<Vec<f32>, _>>()?
        }
        hound::SampleFormat::Int => {
            if !(8..=32).contains(&spec.bits_per_sample) {
                return Err(unsupported(path, spec));
            }
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<Vec<f32>, _>>()?
        }
    };

    let samples = downmix(&interleaved, spec.channels);

    log::debug!(
        "[Decoder] {}: {} Hz, {} ch, {} bit, {} mono samples",
        path.display(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        samples.len()
    );

    Ok(DecodedClip {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Average interleaved frames into one channel; a partial trailing frame is dropped
pub fn downmix(interleaved: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let channels = channels as usize;
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn unsupported(path: &Path, spec: hound::WavSpec) -> AnalysisError {
    AnalysisError::Decode {
        details: format!(
            "{}: unsupported sample format {:?} with {} bits",
            path.display(),
            spec.sample_format,
            spec.bits_per_sample
        ),
    }
}
