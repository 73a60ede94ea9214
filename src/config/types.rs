//! Configuration type definitions.

use crate::constants::{
    DEFAULT_BIND, DEFAULT_IMAGE_DIR, DEFAULT_LABELS_PATH, DEFAULT_MIN_CONFIDENCE,
    DEFAULT_MODEL_PATH, DEFAULT_PORT, DEFAULT_UPLOAD_DIR,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model artifact settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Inference settings.
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Model artifacts loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX model file.
    pub path: PathBuf,

    /// Path to the JSON label map (class index as string key, species name as value).
    pub labels: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            labels: PathBuf::from(DEFAULT_LABELS_PATH),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind: String,

    /// Port to listen on.
    pub port: u16,

    /// Directory for stored uploads.
    pub upload_dir: PathBuf,

    /// Directory holding one illustrative image per species label.
    pub image_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
        }
    }
}

/// Inference settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Minimum confidence in percent below which a prediction is flagged
    /// uncertain. Zero disables the flag.
    pub min_confidence: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_config() {
        let server = ServerConfig::default();
        assert_eq!(server.bind, "0.0.0.0");
        assert_eq!(server.port, 7860);
        assert_eq!(server.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_default_inference_config() {
        let inference = InferenceConfig::default();
        assert_eq!(inference.min_confidence, 0.0);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[server]
port = 9000
"#,
        )
        .unwrap_or_default();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.model.path, PathBuf::from("model.onnx"));
    }
}
