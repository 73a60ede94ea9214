//! Class-index to species-name mapping.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Label map loaded once at startup.
///
/// The source file is a JSON object keyed by the class index as a string,
/// e.g. `{"0": "Ashy Prinia", "1": "Asian Koel"}`. The map must be dense:
/// every index from zero up to the number of entries has to be present so
/// any class the model produces resolves to a name.
#[derive(Debug, Clone)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl LabelMap {
    /// Load and validate a label map from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::LabelsRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let raw: HashMap<String, String> =
            serde_json::from_str(&contents).map_err(|e| Error::LabelsParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        Self::from_entries(raw)
    }

    /// Build a label map from parsed index/name pairs.
    pub fn from_entries(raw: HashMap<String, String>) -> Result<Self> {
        let mut by_index: HashMap<usize, String> = HashMap::with_capacity(raw.len());
        for (key, name) in raw {
            let index: usize = key.parse().map_err(|_| Error::Internal {
                message: format!("label map key '{key}' is not a class index"),
            })?;
            by_index.insert(index, name);
        }

        let mut labels = Vec::with_capacity(by_index.len());
        for index in 0..by_index.len() {
            let name = by_index
                .remove(&index)
                .ok_or(Error::LabelIndexMissing { index })?;
            labels.push(name);
        }

        Ok(Self { labels })
    }

    /// Resolve a class index to its species name.
    pub fn get(&self, index: usize) -> Result<&str> {
        self.labels
            .get(index)
            .map(String::as_str)
            .ok_or(Error::LabelIndexMissing { index })
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Whether a species name is part of the label set.
    pub fn contains(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }

    /// Iterate over species names in class-index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
