//! MFCC extraction.
//!
//! Windowed power spectrogram over centered frames, mel filterbank, dB
//! conversion, then an orthonormal DCT-II. The final feature vector is the
//! per-coefficient mean over all frames.

use crate::constants::features::{HOP_LENGTH, N_FFT, N_MELS, N_MFCC, SAMPLE_RATE, TOP_DB};
use crate::error::{Error, Result};
use crate::features::mel;
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

/// Floor applied before taking logarithms.
const AMIN: f32 = 1e-10;

/// Extract the time-averaged MFCC feature vector for a mono clip.
///
/// `samples` must already be at [`SAMPLE_RATE`]. Returns exactly [`N_MFCC`]
/// coefficients.
pub fn mfcc_mean(samples: &[f32]) -> Result<Vec<f32>> {
    let frames = mfcc_frames(samples)?;
    let n_frames = frames.len();

    #[allow(clippy::cast_precision_loss)]
    let scale = 1.0 / n_frames as f32;
    let mut mean = vec![0.0f32; N_MFCC];
    for frame in &frames {
        for (acc, &c) in mean.iter_mut().zip(frame) {
            *acc += c * scale;
        }
    }

    Ok(mean)
}

/// Compute per-frame MFCC vectors for a mono clip.
pub fn mfcc_frames(samples: &[f32]) -> Result<Vec<Vec<f32>>> {
    if samples.is_empty() {
        return Err(Error::EmptyAudio);
    }

    let power = power_spectrogram(samples);
    let filters = mel::filterbank(SAMPLE_RATE, N_FFT, N_MELS);
    let dct = dct_matrix(N_MFCC, N_MELS);

    // Mel energies per frame, then dB with the dynamic range referenced to
    // the loudest value across the whole clip.
    let mut mel_db: Vec<Vec<f32>> = power
        .iter()
        .map(|spectrum| {
            filters
                .iter()
                .map(|row| {
                    let energy: f32 = row.iter().zip(spectrum).map(|(w, p)| w * p).sum();
                    10.0 * energy.max(AMIN).log10()
                })
                .collect()
        })
        .collect();

    let peak = mel_db
        .iter()
        .flatten()
        .fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let floor = peak - TOP_DB;
    for row in &mut mel_db {
        for v in row.iter_mut() {
            *v = v.max(floor);
        }
    }

    Ok(mel_db
        .iter()
        .map(|mel_frame| {
            dct.iter()
                .map(|basis| basis.iter().zip(mel_frame).map(|(b, m)| b * m).sum())
                .collect()
        })
        .collect())
}

/// Compute the power spectrogram of centered, Hann-windowed frames.
///
/// Each output row holds `N_FFT / 2 + 1` values of `|X[k]|^2`.
fn power_spectrogram(samples: &[f32]) -> Vec<Vec<f32>> {
    let pad = N_FFT / 2;
    let n_bins = pad + 1;
    let padded_len = samples.len() + 2 * pad;
    let n_frames = 1 + (padded_len - N_FFT) / HOP_LENGTH;

    let window = hann_window(N_FFT);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(N_FFT);

    let mut frames = Vec::with_capacity(n_frames);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); N_FFT];

    for frame in 0..n_frames {
        let start = frame * HOP_LENGTH;
        for (n, slot) in buffer.iter_mut().enumerate() {
            let sample = padded_sample(samples, start + n, pad);
            *slot = Complex::new(sample * window[n], 0.0);
        }
        fft.process(&mut buffer);
        frames.push(buffer[..n_bins].iter().map(Complex::norm_sqr).collect());
    }

    frames
}

/// Read a sample from the virtually reflect-padded signal.
///
/// Index `i` addresses the padded signal of length `len + 2 * pad`; out of
/// range positions mirror around the signal edges.
#[allow(clippy::cast_possible_wrap)]
fn padded_sample(samples: &[f32], i: usize, pad: usize) -> f32 {
    let len = samples.len();
    if len == 1 {
        return samples[0];
    }

    let mut idx = i as isize - pad as isize;
    let last = (len - 1) as isize;
    // Fold until inside [0, last]; each fold mirrors around an edge
    loop {
        if idx < 0 {
            idx = -idx;
        } else if idx > last {
            idx = 2 * last - idx;
        } else {
            #[allow(clippy::cast_sign_loss)]
            return samples[idx as usize];
        }
    }
}

/// Periodic Hann window of length `n`.
#[allow(clippy::cast_precision_loss)]
fn hann_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos())
        .collect()
}

/// Orthonormal DCT-II basis, `n_out` rows over `n_in` inputs.
#[allow(clippy::cast_precision_loss)]
fn dct_matrix(n_out: usize, n_in: usize) -> Vec<Vec<f32>> {
    let n = n_in as f32;
    (0..n_out)
        .map(|k| {
            let norm = if k == 0 {
                (1.0 / n).sqrt()
            } else {
                (2.0 / n).sqrt()
            };
            (0..n_in)
                .map(|i| {
                    let angle = std::f32::consts::PI * k as f32 * (2.0 * i as f32 + 1.0) / (2.0 * n);
                    norm * angle.cos()
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[allow(
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss
    )]
    fn tone(freq: f32, secs: f32) -> Vec<f32> {
        let n = (secs * SAMPLE_RATE as f32) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / SAMPLE_RATE as f32).sin())
            .collect()
    }

    #[test]
    fn test_mfcc_mean_length() {
        let features = mfcc_mean(&tone(440.0, 0.5)).unwrap();
        assert_eq!(features.len(), N_MFCC);
        assert!(features.iter().all(|f| f.is_finite()));
    }

    #[test]
    fn test_mfcc_empty_input_rejected() {
        assert!(matches!(mfcc_mean(&[]), Err(Error::EmptyAudio)));
    }

    #[test]
    fn test_mfcc_single_sample() {
        // Degenerate but must not panic
        let features = mfcc_mean(&[0.25]).unwrap();
        assert_eq!(features.len(), N_MFCC);
    }

    #[test]
    fn test_frame_count_matches_hop() {
        let samples = tone(440.0, 1.0);
        let frames = mfcc_frames(&samples).unwrap();
        // Centered framing yields 1 + len / hop frames
        let expected = 1 + samples.len() / HOP_LENGTH;
        assert_eq!(frames.len(), expected);
    }

    #[test]
    fn test_distinct_tones_produce_distinct_features() {
        let low = mfcc_mean(&tone(220.0, 0.5)).unwrap();
        let high = mfcc_mean(&tone(3520.0, 0.5)).unwrap();
        let distance: f32 = low
            .iter()
            .zip(&high)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt();
        assert!(distance > 1.0, "distance {distance} too small");
    }

    #[test]
    fn test_dct_rows_orthonormal() {
        let dct = dct_matrix(N_MFCC, N_MELS);
        for (i, a) in dct.iter().enumerate() {
            for (j, b) in dct.iter().enumerate() {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-4, "rows {i},{j} dot {dot}");
            }
        }
    }

    #[test]
    fn test_padded_sample_reflects() {
        let s = [1.0, 2.0, 3.0, 4.0];
        // pad=2: virtual signal is [3, 2, 1, 2, 3, 4, 3, 2]
        assert!((padded_sample(&s, 0, 2) - 3.0).abs() < f32::EPSILON);
        assert!((padded_sample(&s, 1, 2) - 2.0).abs() < f32::EPSILON);
        assert!((padded_sample(&s, 2, 2) - 1.0).abs() < f32::EPSILON);
        assert!((padded_sample(&s, 5, 2) - 4.0).abs() < f32::EPSILON);
        assert!((padded_sample(&s, 6, 2) - 3.0).abs() < f32::EPSILON);
    }
}
