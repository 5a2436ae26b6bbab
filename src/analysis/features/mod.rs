// FeatureExtractor - statistical fingerprint extraction
//
// This module turns a mono clip into a fixed-length fingerprint. The clip is
// framed, every frame is reduced to its short-term energy and zero-crossing
// rate, and each per-frame series is summarized by mean, population standard
// deviation, maximum and minimum.
//
// Module organization:
// - types: Fingerprint, SeriesSummary, FeatureSeries
// - temporal: per-frame STE and ZCR
// - mod.rs: Coordinator (FeatureExtractor)

mod temporal;
mod types;

pub use temporal::{short_term_energy, ste_series, zcr_series, zero_crossing_rate};
pub use types::{FeatureSeries, Fingerprint, SeriesSummary, FINGERPRINT_DIM};

use crate::analysis::framer::{Framer, DEFAULT_FRAME_DURATION_MS, DEFAULT_OVERLAP_RATIO};
use crate::error::AnalysisError;

/// FeatureExtractor coordinates framing and per-frame feature reduction
///
/// Holds only the frame parameters; the sample rate is supplied per clip so
/// one extractor can serve clips decoded at different rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureExtractor {
    frame_duration_ms: f64,
    overlap_ratio: f64,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_DURATION_MS, DEFAULT_OVERLAP_RATIO)
    }
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor
    ///
    /// # Arguments
    /// * `frame_duration_ms` - Frame length in milliseconds (default 25)
    /// * `overlap_ratio` - Fraction of each frame shared with the next (default 0.5)
    pub fn new(frame_duration_ms: f64, overlap_ratio: f64) -> Self {
        Self {
            frame_duration_ms,
            overlap_ratio,
        }
    }

    pub fn frame_duration_ms(&self) -> f64 {
        self.frame_duration_ms
    }

    pub fn overlap_ratio(&self) -> f64 {
        self.overlap_ratio
    }

    /// Extract the fingerprint of one clip
    ///
    /// # Errors
    /// `InvalidInput` for an empty buffer, a zero sample rate, a non-positive
    /// frame duration, or a frame shorter than two samples.
    pub fn extract(&self, samples: &[f32], sample_rate: u32) -> Result<Fingerprint, AnalysisError> {
        self.extract_with_series(samples, sample_rate)
            .map(|(fingerprint, _)| fingerprint)
    }

    /// Extract the fingerprint together with the per-frame STE/ZCR series
    pub fn extract_with_series(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<(Fingerprint, FeatureSeries), AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::invalid_input("sample buffer is empty"));
        }
        let framer = Framer::new(sample_rate, self.frame_duration_ms, self.overlap_ratio)?;
        let frames = framer.frame(samples);

        let series = FeatureSeries {
            ste: ste_series(&frames),
            zcr: zcr_series(&frames),
        };

        let fingerprint = Fingerprint {
            ste: SeriesSummary::of(&series.ste),
            zcr: SeriesSummary::of(&series.zcr),
            num_frames: frames.num_frames(),
            duration: samples.len() as f64 / sample_rate as f64,
        };

        tracing::debug!(
            "[FeatureExtractor] {} frames of {} samples (hop {}), ste_mean={:.6}, zcr_mean={:.4}",
            fingerprint.num_frames,
            framer.frame_size(),
            framer.hop_size(),
            fingerprint.ste.mean,
            fingerprint.zcr.mean
        );

        Ok((fingerprint, series))
    }
}

/// Extract a fingerprint with explicit frame parameters
pub fn extract(
    samples: &[f32],
    sample_rate: u32,
    frame_duration_ms: f64,
    overlap_ratio: f64,
) -> Result<Fingerprint, AnalysisError> {
    FeatureExtractor::new(frame_duration_ms, overlap_ratio).extract(samples, sample_rate)
}
