//! End-to-end test for the audio-to-features pipeline.
//!
//! Generates a real WAV file, decodes it with symphonia, resamples to the
//! feature-extraction rate, and extracts the MFCC vector the model consumes.

use chirpd::audio::{decode_audio_file, resample};
use chirpd::constants::features::{N_MFCC, SAMPLE_RATE};
use chirpd::features::mfcc_mean;
use std::path::Path;

/// Write a minimal PCM16 mono WAV file with a sine tone.
fn write_test_wav(path: &Path, sample_rate: u32, freq: f32, secs: f32) {
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let num_samples = (secs * sample_rate as f32) as u32;
    let data_len = num_samples * 2;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    for i in 0..num_samples {
        let t = i as f32 / sample_rate as f32;
        let sample = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.8;
        bytes.extend_from_slice(&((sample * 32000.0) as i16).to_le_bytes());
    }
    std::fs::write(path, bytes).expect("write test wav");
}

#[test]
fn wav_decodes_to_fixed_length_feature_vector() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tone.wav");
    write_test_wav(&path, 44_100, 880.0, 0.75);

    let decoded = decode_audio_file(&path).expect("decode");
    assert_eq!(decoded.sample_rate, 44_100);

    let samples =
        resample(decoded.samples, decoded.sample_rate, SAMPLE_RATE).expect("resample");
    let features = mfcc_mean(&samples).expect("mfcc");

    assert_eq!(features.len(), N_MFCC);
    assert!(features.iter().all(|f| f.is_finite()));
}

#[test]
fn native_rate_wav_skips_resampling() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("native.wav");
    write_test_wav(&path, SAMPLE_RATE, 440.0, 0.5);

    let decoded = decode_audio_file(&path).expect("decode");
    let len_before = decoded.samples.len();
    let samples =
        resample(decoded.samples, decoded.sample_rate, SAMPLE_RATE).expect("resample");

    assert_eq!(samples.len(), len_before);
    assert_eq!(mfcc_mean(&samples).expect("mfcc").len(), N_MFCC);
}

#[test]
fn different_tones_yield_different_features() {
    let dir = tempfile::tempdir().expect("tempdir");
    let low_path = dir.path().join("low.wav");
    let high_path = dir.path().join("high.wav");
    write_test_wav(&low_path, SAMPLE_RATE, 220.0, 0.5);
    write_test_wav(&high_path, SAMPLE_RATE, 4400.0, 0.5);

    let features_of = |path: &Path| {
        let decoded = decode_audio_file(path).expect("decode");
        mfcc_mean(&decoded.samples).expect("mfcc")
    };

    let low = features_of(&low_path);
    let high = features_of(&high_path);
    let distance: f32 = low
        .iter()
        .zip(&high)
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f32>()
        .sqrt();
    assert!(distance > 1.0, "feature distance {distance} too small");
}
