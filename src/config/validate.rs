//! Configuration validation.

use crate::config::Config;
use crate::constants::confidence;
use crate::error::{Error, Result};

/// Validate configuration before starting the server.
///
/// Checks that the model artifacts exist and that numeric settings are in
/// range. The upload directory is created on demand and is not required to
/// exist here.
pub fn validate_config(config: &Config) -> Result<()> {
    if !config.model.path.exists() {
        return Err(Error::ModelFileNotFound {
            path: config.model.path.clone(),
        });
    }

    if !config.model.labels.exists() {
        return Err(Error::LabelsFileNotFound {
            path: config.model.labels.clone(),
        });
    }

    if !config.server.image_dir.is_dir() {
        return Err(Error::ConfigValidation {
            message: format!(
                "image directory does not exist: {}",
                config.server.image_dir.display()
            ),
        });
    }

    if !(confidence::MIN..=confidence::MAX).contains(&config.inference.min_confidence) {
        return Err(Error::ConfigValidation {
            message: format!(
                "min_confidence must be within {}-{}, got {}",
                confidence::MIN,
                confidence::MAX,
                config.inference.min_confidence
            ),
        });
    }

    Ok(())
}
