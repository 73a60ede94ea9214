//! Audio decoding and resampling.

mod decode;
mod resample;

pub use decode::{DecodedAudio, decode_audio_file, ensure_supported_extension};
pub use resample::resample;
