//! Shared request-handler state.

use crate::inference::Classifier;
use crate::store::UploadStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Immutable context shared by all request handlers.
///
/// Built once at startup; handlers receive it by reference through axum
/// state rather than through process globals.
#[derive(Clone)]
pub struct AppState {
    /// Classifier backing `POST /`.
    pub classifier: Arc<dyn Classifier>,
    /// Upload storage backing `POST /` and `GET /uploads/{key}`.
    pub store: UploadStore,
    /// Directory holding one illustrative image per species label.
    pub image_dir: PathBuf,
}
