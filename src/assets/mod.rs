//! Illustrative species images.
//!
//! Each species label has one image at `<image_dir>/<label>.jpg`. The image
//! is decoded, resized to the fixed display size, re-encoded as JPEG, and
//! returned as a base64 data URI so the result fragment is self-contained.

use crate::constants::display_image::{HEIGHT, JPEG_QUALITY, WIDTH};
use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Resolve the image path for a species label.
pub fn image_path(image_dir: &Path, label: &str) -> PathBuf {
    image_dir.join(format!("{label}.jpg"))
}

/// Load the illustrative image for `label` as an inline data URI.
pub fn inline_image(image_dir: &Path, label: &str) -> Result<String> {
    let path = image_path(image_dir, label);
    if !path.is_file() {
        return Err(Error::ImageNotFound {
            label: label.to_string(),
            path,
        });
    }

    let img = image::open(&path).map_err(|e| Error::ImageDecode {
        path: path.clone(),
        source: e,
    })?;

    let resized = img.resize_exact(WIDTH, HEIGHT, FilterType::CatmullRom);

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), JPEG_QUALITY);
    resized
        .write_with_encoder(encoder)
        .map_err(|e| Error::ImageEncode { source: e })?;

    Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(&jpeg)))
}
