use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use interio_core::media;
use interio_providers::stable_diffusion::first_image;

use crate::error::{AppError, AppResult};
use crate::handlers::parse_json;
use crate::state::AppState;

/// File the most recent txt2img result is written to, inside `SD_OUTPUT_DIR`.
pub const OUTPUT_FILE_NAME: &str = "output.png";

/// POST /api/sd/txt2img
///
/// Forward the body to the WebUI, save the first image to disk and return
/// the WebUI response unchanged.
pub async fn txt2img(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    let payload: serde_json::Value = parse_json(&body, "Invalid JSON in request body")?;

    let response = state.sd.txt2img(&payload).await?;

    let Some(encoded) = first_image(&response) else {
        return Err(AppError::upstream(
            StatusCode::INTERNAL_SERVER_ERROR,
            "No image data returned from the API",
            "txt2img response had no images",
        ));
    };
    let image = media::decode_base64(encoded).map_err(|e| {
        AppError::upstream(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to decode image data",
            e,
        )
    })?;

    let output_dir = &state.config.sd.output_dir;
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("create {}: {e}", output_dir.display())))?;
    let path = output_dir.join(OUTPUT_FILE_NAME);
    tokio::fs::write(&path, &image)
        .await
        .map_err(|e| AppError::InternalError(format!("write {}: {e}", path.display())))?;

    tracing::info!(path = %path.display(), bytes = image.len(), "Saved txt2img output");
    Ok(Json(response))
}
