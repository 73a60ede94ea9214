//! Mel filterbank construction.
//!
//! Slaney-style mel scale with area normalization, matching the filterbank
//! the classifier was trained against.

/// Break frequency between the linear and logarithmic mel regions.
const MIN_LOG_HZ: f32 = 1000.0;
/// Mels per Hz in the linear region (200/3 Hz per mel).
const F_SP: f32 = 200.0 / 3.0;
/// Mel value at the break frequency.
const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;

/// Convert a frequency in Hz to mels.
pub fn hz_to_mel(hz: f32) -> f32 {
    if hz < MIN_LOG_HZ {
        hz / F_SP
    } else {
        let logstep = 6.4f32.ln() / 27.0;
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / logstep
    }
}

/// Convert mels back to a frequency in Hz.
pub fn mel_to_hz(mel: f32) -> f32 {
    if mel < MIN_LOG_MEL {
        mel * F_SP
    } else {
        let logstep = 6.4f32.ln() / 27.0;
        MIN_LOG_HZ * ((mel - MIN_LOG_MEL) * logstep).exp()
    }
}

/// Build a mel filterbank as `n_mels` rows of `n_fft / 2 + 1` weights.
///
/// Triangular filters with equally spaced mel centers from 0 Hz to the
/// Nyquist frequency, each scaled to unit area.
pub fn filterbank(sample_rate: u32, n_fft: usize, n_mels: usize) -> Vec<Vec<f32>> {
    let n_bins = n_fft / 2 + 1;
    #[allow(clippy::cast_precision_loss)]
    let nyquist = sample_rate as f32 / 2.0;

    // n_mels + 2 corner frequencies, equally spaced on the mel scale
    let mel_max = hz_to_mel(nyquist);
    #[allow(clippy::cast_precision_loss)]
    let corners: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let bin_freqs: Vec<f32> = (0..n_bins)
        .map(|k| k as f32 * sample_rate as f32 / n_fft as f32)
        .collect();

    let mut filters = Vec::with_capacity(n_mels);
    for m in 0..n_mels {
        let (lo, center, hi) = (corners[m], corners[m + 1], corners[m + 2]);
        let enorm = 2.0 / (hi - lo);

        let row = bin_freqs
            .iter()
            .map(|&f| {
                let rising = (f - lo) / (center - lo);
                let falling = (hi - f) / (hi - center);
                rising.min(falling).max(0.0) * enorm
            })
            .collect();
        filters.push(row);
    }

    filters
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_mel_scale_linear_below_1khz() {
        assert_eq!(hz_to_mel(0.0), 0.0);
        // 200/3 Hz per mel in the linear region
        assert!((hz_to_mel(200.0) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_mel_hz_roundtrip() {
        for hz in [0.0, 440.0, 999.0, 1000.0, 4000.0, 11025.0] {
            let roundtrip = mel_to_hz(hz_to_mel(hz));
            assert!((roundtrip - hz).abs() < 0.5, "hz={hz} roundtrip={roundtrip}");
        }
    }

    #[test]
    fn test_filterbank_shape() {
        let fb = filterbank(22050, 2048, 128);
        assert_eq!(fb.len(), 128);
        assert_eq!(fb[0].len(), 1025);
    }

    #[test]
    fn test_filterbank_weights_nonnegative() {
        let fb = filterbank(22050, 2048, 40);
        assert!(fb.iter().flatten().all(|&w| w >= 0.0));
    }

    #[test]
    fn test_filterbank_every_filter_has_support() {
        let fb = filterbank(22050, 2048, 128);
        for (m, row) in fb.iter().enumerate() {
            assert!(row.iter().any(|&w| w > 0.0), "filter {m} is all zero");
        }
    }
}
