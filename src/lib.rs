// Convert Gateway - forwards uploads to a cloud conversion API and returns download URLs

pub mod config;
pub mod types;
pub mod models;
pub mod formats;
pub mod upload;
pub mod vendor;     // Remote conversion API (CloudConvert)
pub mod converter;
pub mod routes;
pub mod middleware;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use types::{AppError, AppResult};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
