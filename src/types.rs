// Error taxonomy shared by the gateway and its HTTP mapping

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Unsupported format conversion: {input:?} -> {target:?}")]
    UnsupportedConversion { input: String, target: String },

    #[error("Remote conversion error: {0}")]
    Remote(String),

    #[error("Conversion job {job_id} did not finish after {attempts} status checks")]
    Timeout { job_id: String, attempts: u32 },

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFile | AppError::UnsupportedConversion { .. } => StatusCode::BAD_REQUEST,
            AppError::Remote(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Multipart(e) => e.status(),
        }
    }
}

/// Callers only ever see a fixed plain-text reason; details stay in the logs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = match self {
            AppError::MissingFile => "No file uploaded.".to_string(),
            AppError::UnsupportedConversion { .. } => "Unsupported format conversion.".to_string(),
            AppError::Remote(_) => "Error converting file.".to_string(),
            AppError::Timeout { .. } => "Conversion timed out.".to_string(),
            AppError::Multipart(e) => e.body_text(),
            AppError::Io(_) => "Failed to store upload.".to_string(),
        };

        (status, body).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::UnsupportedConversion { input: "exe".into(), target: "pdf".into() }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Remote("boom".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::Timeout { job_id: "j".into(), attempts: 3 }.status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[tokio::test]
    async fn test_remote_detail_is_not_returned() {
        let response = AppError::Remote("vendor said: secret internals".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Error converting file.");
    }
}
