//! Species classification over an ONNX session.

use crate::audio;
use crate::constants::confidence;
use crate::constants::features::{N_MFCC, SAMPLE_RATE};
use crate::error::{Error, Result};
use crate::features;
use crate::inference::labels::LabelMap;
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// A single classification result.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted species name.
    pub label: String,
    /// Arg-max class index.
    pub index: usize,
    /// Confidence as a percentage in [0, 100], rounded to two decimals.
    pub confidence: f32,
    /// Whether the confidence fell below the configured minimum.
    pub uncertain: bool,
}

/// Classification contract used by the request handlers.
///
/// The production implementation wraps an ONNX session; tests substitute a
/// stub so HTTP semantics can be exercised without model artifacts.
pub trait Classifier: Send + Sync {
    /// Classify the audio file at `path`.
    fn classify(&self, path: &Path) -> Result<Prediction>;

    /// The label set predictions are drawn from.
    fn labels(&self) -> &LabelMap;
}

/// ONNX-backed bird species classifier.
///
/// Loads the model and label map once; both are immutable for the process
/// lifetime. Inference runs on CPU.
pub struct SpeciesClassifier {
    session: Mutex<Session>,
    labels: LabelMap,
    min_confidence: f32,
}

impl SpeciesClassifier {
    /// Load the model and label map from disk.
    pub fn load(model_path: &Path, labels_path: &Path, min_confidence: f32) -> Result<Self> {
        if !model_path.exists() {
            return Err(Error::ModelFileNotFound {
                path: model_path.to_path_buf(),
            });
        }

        let labels = LabelMap::load(labels_path)?;

        let session = Session::builder()
            .and_then(|mut b| b.commit_from_file(model_path))
            .map_err(|e| Error::ClassifierBuild {
                reason: e.to_string(),
            })?;

        info!(
            "Loaded model: {} ({} classes)",
            model_path.display(),
            labels.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
            min_confidence,
        })
    }

    /// Run the model on one feature vector and return the class distribution.
    fn infer(&self, feature_vector: &[f32]) -> Result<Vec<f32>> {
        #[allow(clippy::cast_possible_wrap)]
        let shape = vec![1i64, feature_vector.len() as i64, 1];
        let tensor = ort::value::Tensor::from_array((shape, feature_vector.to_vec())).map_err(
            |e| Error::Inference {
                reason: e.to_string(),
            },
        )?;

        let mut session = self.session.lock().map_err(|_| Error::Inference {
            reason: "session lock poisoned".to_string(),
        })?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        let (_, probabilities) =
            outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| Error::Inference {
                    reason: e.to_string(),
                })?;

        Ok(probabilities.to_vec())
    }
}

impl Classifier for SpeciesClassifier {
    fn classify(&self, path: &Path) -> Result<Prediction> {
        let decoded = audio::decode_audio_file(path)?;
        debug!(
            "Decoded {}: {:.2}s at {} Hz",
            path.display(),
            decoded.duration_secs,
            decoded.sample_rate
        );

        let samples = audio::resample(decoded.samples, decoded.sample_rate, SAMPLE_RATE)?;
        let feature_vector = features::mfcc_mean(&samples)?;
        debug_assert_eq!(feature_vector.len(), N_MFCC);

        let probabilities = self.infer(&feature_vector)?;
        let prediction = argmax_prediction(&probabilities, &self.labels, self.min_confidence)?;

        debug!(
            "Predicted '{}' at {:.2}% ({} classes scored)",
            prediction.label,
            prediction.confidence,
            probabilities.len()
        );

        Ok(prediction)
    }

    fn labels(&self) -> &LabelMap {
        &self.labels
    }
}

/// Pick the arg-max class from a probability distribution.
pub fn argmax_prediction(
    probabilities: &[f32],
    labels: &LabelMap,
    min_confidence: f32,
) -> Result<Prediction> {
    let (index, &best) = probabilities
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .ok_or(Error::EmptyPrediction)?;

    let label = labels.get(index)?.to_string();

    // peak probability as a percentage, rounded for display
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let rounding = 10f32.powi(confidence::DECIMAL_PLACES as i32);
    let percent = best.clamp(0.0, 1.0) * confidence::MAX;
    let confidence =
        ((percent * rounding).round() / rounding).clamp(confidence::MIN, confidence::MAX);
    let uncertain = min_confidence > confidence::MIN && confidence < min_confidence;

    Ok(Prediction {
        label,
        index,
        confidence,
        uncertain,
    })
}
