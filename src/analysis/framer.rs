// Framer - splits a mono sample buffer into fixed-size overlapping frames
//
// Frame geometry:
//   frame_size = round(sample_rate * frame_duration_ms / 1000)
//   hop_size   = max(1, round(frame_size * (1 - overlap_ratio)))
//   num_frames = 1 + (len - frame_size) / hop_size   (integer division)
//
// Frames are copied verbatim from the buffer. Samples after the end of the
// last full frame are dropped. A clip shorter than one frame yields exactly
// one frame holding the clip at its start and zeros after it.

use crate::error::AnalysisError;

/// Default frame duration in milliseconds
pub const DEFAULT_FRAME_DURATION_MS: f64 = 25.0;

/// Default fraction of a frame shared with its successor
pub const DEFAULT_OVERLAP_RATIO: f64 = 0.5;

/// Ordered frames of one clip, stored as a single flat buffer
///
/// Frame `i` occupies `data[i * frame_size..(i + 1) * frame_size]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMatrix {
    data: Vec<f32>,
    frame_size: usize,
}

impl FrameMatrix {
    /// Number of samples in every frame
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Number of frames (always at least 1)
    pub fn num_frames(&self) -> usize {
        self.data.len() / self.frame_size
    }

    /// Borrow frame `index`, or `None` when out of range
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.frame_size)?;
        self.data.get(start..start + self.frame_size)
    }

    /// Iterate frames in order
    pub fn iter(&self) -> std::slice::Chunks<'_, f32> {
        self.data.chunks(self.frame_size)
    }
}

/// Splits sample buffers into frames with a fixed geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framer {
    frame_size: usize,
    hop_size: usize,
}

impl Framer {
    /// Build a framer for the given sample rate and frame parameters
    ///
    /// # Errors
    /// `InvalidInput` when `sample_rate` is 0, `frame_duration_ms` is not a
    /// positive finite number, or the resulting frame holds fewer than two
    /// samples (zero-crossing rate needs at least one adjacent pair).
    ///
    /// An `overlap_ratio` at or above 1.0 is not an error: the hop is clamped
    /// to one sample.
    pub fn new(
        sample_rate: u32,
        frame_duration_ms: f64,
        overlap_ratio: f64,
    ) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::invalid_input("sample rate must be positive"));
        }
        if !frame_duration_ms.is_finite() || frame_duration_ms <= 0.0 {
            return Err(AnalysisError::invalid_input(format!(
                "frame duration must be positive (got {} ms)",
                frame_duration_ms
            )));
        }

        let frame_size = (sample_rate as f64 * frame_duration_ms / 1000.0).round() as usize;
        if frame_size < 2 {
            return Err(AnalysisError::invalid_input(format!(
                "frame of {} ms at {} Hz holds {} sample(s); at least 2 are required",
                frame_duration_ms, sample_rate, frame_size
            )));
        }

        Ok(Self {
            frame_size,
            hop_size: hop_size_for(frame_size, overlap_ratio),
        })
    }

    /// Build a framer from an explicit frame size in samples
    pub fn with_frame_size(frame_size: usize, overlap_ratio: f64) -> Result<Self, AnalysisError> {
        if frame_size < 2 {
            return Err(AnalysisError::invalid_input(format!(
                "frame size must be at least 2 samples (got {})",
                frame_size
            )));
        }
        Ok(Self {
            frame_size,
            hop_size: hop_size_for(frame_size, overlap_ratio),
        })
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of frames `frame` will emit for a buffer of `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        if len < self.frame_size {
            1
        } else {
            1 + (len - self.frame_size) / self.hop_size
        }
    }

    /// Split `samples` into frames
    ///
    /// Never fails and always emits at least one frame. An empty buffer
    /// produces a single all-zero frame; rejecting empty clips is the
    /// extractor's job.
    pub fn frame(&self, samples: &[f32]) -> FrameMatrix {
        let num_frames = self.frame_count(samples.len());
        let mut data = vec![0.0f32; num_frames * self.frame_size];

        if samples.len() < self.frame_size {
            // Sole padding case: clip at the start, zeros after it
            data[..samples.len()].copy_from_slice(samples);
        } else {
            for (i, frame) in data.chunks_mut(self.frame_size).enumerate() {
                let start = i * self.hop_size;
                frame.copy_from_slice(&samples[start..start + self.frame_size]);
            }
        }

        FrameMatrix {
            data,
            frame_size: self.frame_size,
        }
    }
}

fn hop_size_for(frame_size: usize, overlap_ratio: f64) -> usize {
    let hop = (frame_size as f64 * (1.0 - overlap_ratio)).round();
    // NaN and negative hops saturate to 0 in the cast and are clamped here
    (hop as usize).max(1)
}
