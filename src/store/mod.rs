//! Upload storage.
//!
//! Uploads land in a single flat directory under a generated storage key
//! (UUID plus the sanitized extension) rather than the client-supplied
//! filename, so two concurrent uploads named `robin.wav` can never clobber
//! each other or swap playback associations. The original filename is kept
//! only as display metadata.

use crate::constants::AUDIO_EXTENSIONS;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// A stored upload.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Generated storage key, usable as a path segment and URL component.
    pub key: String,
    /// Client-supplied filename, sanitized for display.
    pub display_name: String,
    /// Absolute or store-relative path of the stored bytes.
    pub path: PathBuf,
}

/// Flat-directory store for uploaded audio clips.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Store an upload under a freshly generated key.
    pub fn save(&self, client_filename: &str, bytes: &[u8]) -> Result<StoredUpload> {
        let ext = audio_extension(client_filename)?;
        let key = format!("{}.{ext}", Uuid::new_v4());
        let path = self.dir.join(&key);

        std::fs::write(&path, bytes).map_err(|e| Error::UploadWrite {
            key: key.clone(),
            source: e,
        })?;

        debug!("Stored upload '{client_filename}' as {key}");

        Ok(StoredUpload {
            key,
            display_name: sanitize_display_name(client_filename),
            path,
        })
    }

    /// Read back the bytes stored under `key`.
    pub fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        std::fs::read(&path).map_err(|_| Error::UploadNotFound {
            key: key.to_string(),
        })
    }

    /// Resolve a key to its on-disk path, rejecting anything that could
    /// escape the store directory.
    pub fn resolve(&self, key: &str) -> Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(Error::UploadNotFound {
                key: key.to_string(),
            });
        }

        let path = self.dir.join(key);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::UploadNotFound {
                key: key.to_string(),
            })
        }
    }
}

/// MIME type for a stored key, derived from its extension.
pub fn content_type(key: &str) -> &'static str {
    match key.rsplit('.').next() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("aac" | "m4a") => "audio/aac",
        _ => "application/octet-stream",
    }
}

/// Extract and validate the audio extension of a client filename.
fn audio_extension(filename: &str) -> Result<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
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

/// Keys are generated by this module: UUID hex, dashes, one dot, extension.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        && !key.contains("..")
}

/// Strip a client filename down to characters safe for HTML display.
fn sanitize_display_name(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    base.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' '))
        .take(128)
        .collect()
}
