//! Request handlers.

use crate::assets;
use crate::constants::AUDIO_FIELD;
use crate::error::Error;
use crate::server::http_error::ApiError;
use crate::server::render;
use crate::server::state::AppState;
use crate::store;
use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, header};
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;
use tracing::info;

/// `GET /` - full page with the upload form.
pub async fn index_page() -> Html<String> {
    Html(render::page(None))
}

/// `POST /` - classify an uploaded audio clip.
///
/// Script-driven requests get a JSON envelope with the result fragment;
/// plain form posts get the full page with the fragment inlined. A missing
/// or empty `audio` field returns the base page unchanged.
pub async fn classify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let wants_json = is_script_driven(&headers);

    let Some((filename, bytes)) = read_audio_field(&mut multipart).await? else {
        return Ok(Html(render::page(None)).into_response());
    };

    let stored = state.store.save(&filename, &bytes)?;

    // Decode and inference are CPU-bound; keep them off the async runtime.
    let classifier = Arc::clone(&state.classifier);
    let clip_path = stored.path.clone();
    let prediction = tokio::task::spawn_blocking(move || classifier.classify(&clip_path))
        .await
        .map_err(|e| {
            ApiError::Service(Error::Internal {
                message: format!("classification task failed: {e}"),
            })
        })??;

    let image_uri = assets::inline_image(&state.image_dir, &prediction.label)?;
    let fragment = render::result_fragment(&prediction, &stored.key, &image_uri);

    info!(
        "Classified '{}' as '{}' ({:.2}%)",
        stored.display_name, prediction.label, prediction.confidence
    );

    if wants_json {
        Ok(Json(serde_json::json!({ "result_html": fragment })).into_response())
    } else {
        Ok(Html(render::page(Some(&fragment))).into_response())
    }
}

/// `GET /uploads/{key}` - stream back a previously stored clip.
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = state.store.read(&key)?;
    let headers = [(header::CONTENT_TYPE, store::content_type(&key))];
    Ok((headers, bytes).into_response())
}

/// `GET /health` - liveness probe.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "classes": state.classifier.labels().len(),
    }))
}

/// Whether the request was issued by page script rather than navigation.
fn is_script_driven(headers: &HeaderMap) -> bool {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase)
    };
    header_value("x-requested-with").is_some_and(|v| v == "xmlhttprequest")
        || header_value("accept").is_some_and(|v| v.contains("application/json"))
}

/// Pull the `audio` field out of the multipart body.
///
/// Returns `None` when the field is absent, carries no filename, or is
/// empty - the form was submitted without a file.
async fn read_audio_field(multipart: &mut Multipart) -> Result<Option<(String, Vec<u8>)>, ApiError> {
    loop {
        let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
        else {
            return Ok(None);
        };

        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;

        if filename.is_empty() || bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some((filename, bytes.to_vec())));
    }
}
