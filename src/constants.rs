//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "chirpd";

/// Default bind address for the HTTP server.
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 7860;

/// Default directory for stored uploads, relative to the working directory.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default directory holding one illustrative image per species label.
pub const DEFAULT_IMAGE_DIR: &str = "inference_images";

/// Default model file path.
pub const DEFAULT_MODEL_PATH: &str = "model.onnx";

/// Default label map file path.
pub const DEFAULT_LABELS_PATH: &str = "prediction.json";

/// Default minimum confidence in percent. Zero disables the uncertainty flag.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.0;

/// Maximum accepted upload body size in bytes.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Multipart form field carrying the audio clip.
pub const AUDIO_FIELD: &str = "audio";

/// File extensions accepted for upload.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "aac", "m4a"];

/// Feature extraction parameters.
///
/// These mirror the settings the model was trained with and must not drift
/// from them: a 22.05 kHz mono signal reduced to 40 time-averaged MFCCs.
pub mod features {
    /// Sample rate audio is resampled to before feature extraction.
    pub const SAMPLE_RATE: u32 = 22_050;

    /// FFT frame length in samples.
    pub const N_FFT: usize = 2048;

    /// Hop between consecutive frames in samples.
    pub const HOP_LENGTH: usize = 512;

    /// Number of mel filterbank bands.
    pub const N_MELS: usize = 128;

    /// Number of cepstral coefficients kept per frame.
    pub const N_MFCC: usize = 40;

    /// Dynamic range clamp applied after the dB conversion.
    pub const TOP_DB: f32 = 80.0;
}

/// Confidence value bounds.
pub mod confidence {
    /// Minimum valid confidence percentage.
    pub const MIN: f32 = 0.0;
    /// Maximum valid confidence percentage.
    pub const MAX: f32 = 100.0;
    /// Decimal places for confidence formatting.
    pub const DECIMAL_PLACES: usize = 2;
}

/// Result image display size.
pub mod display_image {
    /// Width in pixels.
    pub const WIDTH: u32 = 350;
    /// Height in pixels.
    pub const HEIGHT: u32 = 300;
    /// JPEG re-encode quality.
    pub const JPEG_QUALITY: u8 = 85;
}
