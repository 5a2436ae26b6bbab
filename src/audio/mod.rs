// Audio module - file decoding into normalized mono PCM
//
// The analysis core consumes `(sample_rate, mono samples in [-1, 1])`. This
// module is the only place that knows about containers and sample formats.

pub mod wav;

pub use wav::{decode_wav, DecodedClip};
