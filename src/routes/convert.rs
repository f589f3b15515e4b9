use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::info;

use crate::models::{AppState, ConvertResponse};
use crate::types::AppResult;
use crate::upload::ConversionRequest;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/convert", post(convert_file))
        .with_state(state)
}

/// POST /api/convert - multipart `file` + `format`
///
/// The stored upload is deleted when `request` drops, whichever way this
/// handler returns.
async fn convert_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ConvertResponse>> {
    let request = ConversionRequest::from_multipart(multipart, &state.config.server.upload_dir).await?;
    info!(
        "Conversion requested: {:?} -> {:?}",
        request.original_filename, request.output_format
    );

    let download_url = state.converter.convert(&request).await?;

    Ok(Json(ConvertResponse { download_url }))
}
