use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::config::Config;
use crate::converter::{ConversionService, PollPolicy};
use crate::formats::FormatPolicy;
use crate::vendor::{CloudConvertClient, ConversionBackend};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub converter: Arc<ConversionService>,
}

impl AppState {
    /// Wire the production vendor client from configuration.
    pub fn new(config: Config) -> Self {
        let backend: Arc<dyn ConversionBackend> = Arc::new(CloudConvertClient::from_config(&config.vendor));
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: Config, backend: Arc<dyn ConversionBackend>) -> Self {
        let converter = ConversionService::new(
            backend,
            FormatPolicy::from_config(&config.formats),
            PollPolicy::from(&config.polling),
        );
        Self {
            config,
            converter: Arc::new(converter),
        }
    }
}

// API Request/Response types

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub download_url: String,
}

/// Input extension to the output formats it may be converted to.
pub type FormatsResponse = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}
