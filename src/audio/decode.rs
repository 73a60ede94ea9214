//! Audio decoding using symphonia.

use crate::constants::AUDIO_EXTENSIONS;
use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoded audio data.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Audio samples as mono f32 in range [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Duration in seconds.
    pub duration_secs: f32,
}

/// Check that a file extension is on the accepted upload list.
pub fn ensure_supported_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(Error::UnsupportedAudioFormat {
            format: if ext.is_empty() {
                "(no extension)".to_string()
            } else {
                ext
            },
        })
    }
}

/// Decode an audio file to mono f32 samples.
///
/// Supports WAV, MP3, FLAC, and AAC uploads.
pub fn decode_audio_file(path: &Path) -> Result<DecodedAudio> {
    ensure_supported_extension(path)?;

    let file = File::open(path).map_err(|e| Error::AudioOpen {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::AudioOpen {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::NoAudioTracks {
            path: path.to_path_buf(),
        })?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::AudioDecode {
            path: path.to_path_buf(),
            source: "missing sample rate".into(),
        })?;
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(Error::AudioDecode {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet).map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        append_mono(&decoded, channels, &mut samples);
    }

    if samples.is_empty() {
        return Err(Error::EmptyAudio);
    }

    #[allow(clippy::cast_precision_loss)]
    let duration_secs = samples.len() as f32 / sample_rate as f32;

    Ok(DecodedAudio {
        samples,
        sample_rate,
        duration_secs,
    })
}

/// Downmix one decoded packet to mono and append it to `output`.
///
/// `sample_at(ch, frame)` must yield a normalized f32 sample.
fn downmix(
    frames: usize,
    channels: usize,
    sample_at: impl Fn(usize, usize) -> f32,
    output: &mut Vec<f32>,
) {
    #[allow(clippy::cast_precision_loss)]
    let scale = 1.0 / channels as f32;
    for frame in 0..frames {
        let sum: f32 = (0..channels).map(|ch| sample_at(ch, frame)).sum();
        output.push(sum * scale);
    }
}

/// Append decoded samples to the output buffer, converting to mono f32.
#[allow(clippy::cast_precision_loss)]
fn append_mono(buffer: &AudioBufferRef, channels: usize, output: &mut Vec<f32>) {
    const I16_NORM: f32 = 32768.0;
    const I32_NORM: f32 = 2_147_483_648.0;

    match buffer {
        AudioBufferRef::F32(buf) => {
            if channels == 1 {
                output.extend(buf.chan(0));
            } else {
                downmix(buf.frames(), channels, |ch, i| buf.chan(ch)[i], output);
            }
        }
        AudioBufferRef::S16(buf) => {
            downmix(
                buf.frames(),
                channels,
                |ch, i| f32::from(buf.chan(ch)[i]) / I16_NORM,
                output,
            );
        }
        AudioBufferRef::S32(buf) => {
            downmix(
                buf.frames(),
                channels,
                |ch, i| buf.chan(ch)[i] as f32 / I32_NORM,
                output,
            );
        }
        _ => {
            // Unsupported sample layout, skip
        }
    }
}
