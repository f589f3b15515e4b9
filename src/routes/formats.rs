use axum::{extract::State, routing::get, Json, Router};

use crate::models::{AppState, FormatsResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/formats", get(list_formats))
        .with_state(state)
}

/// GET /api/formats - conversions the gateway will accept
async fn list_formats(State(state): State<AppState>) -> Json<FormatsResponse> {
    Json(state.converter.formats().rules().clone())
}
