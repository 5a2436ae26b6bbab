// Types module - fingerprint data structures
//
// The fingerprint is the unit persisted to the catalog and compared by the
// search engine. Its vector order is fixed and must never change, since
// stored vectors are compared positionally.

use serde::{Deserialize, Serialize};

/// Number of values in a fingerprint vector
pub const FINGERPRINT_DIM: usize = 8;

/// Mean, population standard deviation, maximum and minimum of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub mean: f64,
    pub std: f64,
    pub max: f64,
    pub min: f64,
}

impl SeriesSummary {
    /// Summarize a series
    ///
    /// Standard deviation divides by the series length (not length - 1).
    /// An empty series yields NaN for every field; callers guarantee at least
    /// one value.
    pub fn of(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let (min, max) = if values.is_empty() {
            (f64::NAN, f64::NAN)
        } else {
            values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        };

        Self {
            mean,
            std: variance.sqrt(),
            max,
            min,
        }
    }
}

/// Statistical fingerprint of one clip
///
/// Vector order: `[ste_mean, ste_std, ste_max, ste_min, zcr_mean, zcr_std,
/// zcr_max, zcr_min]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Normalized short-term energy statistics (all >= 0)
    pub ste: SeriesSummary,

    /// Zero-crossing rate statistics (all within 0.0 to 1.0)
    pub zcr: SeriesSummary,

    /// Number of analysed frames (>= 1)
    pub num_frames: usize,

    /// Clip duration in seconds (sample count / sample rate)
    pub duration: f64,
}

impl Fingerprint {
    /// The ordered 8-value vector compared by the search engine
    pub fn vector(&self) -> [f64; FINGERPRINT_DIM] {
        [
            self.ste.mean,
            self.ste.std,
            self.ste.max,
            self.ste.min,
            self.zcr.mean,
            self.zcr.std,
            self.zcr.max,
            self.zcr.min,
        ]
    }

    /// Rebuild a fingerprint from its ordered vector
    pub fn from_vector(vector: [f64; FINGERPRINT_DIM], num_frames: usize, duration: f64) -> Self {
        let [ste_mean, ste_std, ste_max, ste_min, zcr_mean, zcr_std, zcr_max, zcr_min] = vector;
        Self {
            ste: SeriesSummary {
                mean: ste_mean,
                std: ste_std,
                max: ste_max,
                min: ste_min,
            },
            zcr: SeriesSummary {
                mean: zcr_mean,
                std: zcr_std,
                max: zcr_max,
                min: zcr_min,
            },
            num_frames,
            duration,
        }
    }

    pub fn ste_mean(&self) -> f64 {
        self.ste.mean
    }

    pub fn zcr_mean(&self) -> f64 {
        self.zcr.mean
    }

    /// Check the value invariants: every entry finite, energy non-negative,
    /// zero-crossing rate inside the unit interval
    pub fn is_well_formed(&self) -> bool {
        let vector = self.vector();
        vector.iter().all(|v| v.is_finite())
            && vector[..4].iter().all(|&v| v >= 0.0)
            && vector[4..].iter().all(|&v| (0.0..=1.0).contains(&v))
            && self.num_frames >= 1
    }
}

/// Raw per-frame series behind a fingerprint, kept for display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSeries {
    pub ste: Vec<f64>,
    pub zcr: Vec<f64>,
}
