//! API Routes
//!
//! - `/api/convert` - Upload a file and convert it through the vendor
//! - `/api/formats` - Active format compatibility table
//! - `/api/health` - Health checks

pub mod convert;
pub mod formats;
pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the main application router
///
/// Uploads may be as large as the configured limit; everything else keeps
/// axum's defaults.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let max_upload_bytes = state.config.server.max_upload_bytes;
    let allowed_origins = state.config.server.cors_allowed_origins.clone();

    let router = Router::new()
        .merge(convert::router(state.clone()))
        .merge(formats::router(state))
        .merge(health::router())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http());

    apply_cors(router, &allowed_origins)
}
