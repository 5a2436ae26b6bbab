// Temporal module - per-frame time-domain features
//
// Short-term energy (STE) and zero-crossing rate (ZCR), computed frame by
// frame over a FrameMatrix. Both are accumulated in f64.
//
// References:
// - Rabiner, L. & Schafer, R. (1978). Digital Processing of Speech Signals
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

use crate::analysis::framer::FrameMatrix;

/// Normalized short-term energy of one frame
///
/// Formula: STE = (1 / N) × Σ x[n]²
///
/// Dividing by the frame length makes the value an energy density, so clips
/// framed at different sample rates stay comparable.
pub fn short_term_energy(frame: &[f32]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let energy: f64 = frame.iter().map(|&x| (x as f64) * (x as f64)).sum();
    energy / frame.len() as f64
}

/// Zero-crossing rate of one frame
///
/// Counts adjacent pairs whose samples sit on opposite sides of zero, with
/// zero itself on the non-negative side, then divides by the number of pairs
/// examined (N - 1).
///
/// # Returns
/// Zero-crossing rate (0.0 to 1.0)
pub fn zero_crossing_rate(frame: &[f32]) -> f64 {
    if frame.len() < 2 {
        return 0.0;
    }

    let crossings = frame
        .windows(2)
        .filter(|pair| (pair[1] >= 0.0) != (pair[0] >= 0.0))
        .count();

    crossings as f64 / (frame.len() - 1) as f64
}

/// STE of every frame, in frame order
pub fn ste_series(frames: &FrameMatrix) -> Vec<f64> {
    frames.iter().map(short_term_energy).collect()
}

/// ZCR of every frame, in frame order
pub fn zcr_series(frames: &FrameMatrix) -> Vec<f64> {
    frames.iter().map(zero_crossing_rate).collect()
}
