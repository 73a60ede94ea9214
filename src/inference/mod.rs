//! Model loading and inference.

mod classifier;
mod labels;

pub use classifier::{Classifier, Prediction, SpeciesClassifier, argmax_prediction};
pub use labels::LabelMap;
