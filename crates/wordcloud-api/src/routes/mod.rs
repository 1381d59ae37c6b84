pub(crate) mod process;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, routing::post};

use cumulo_wordcloud::{RenderOptions, StopwordSet, Typeface};

use crate::config::ServiceConfig;

#[derive(Clone)]
pub(crate) struct AppState {
    pub typeface: Arc<dyn Typeface>,
    pub stopwords: Arc<StopwordSet>,
    pub options: RenderOptions,
}

/// Both spellings of the path are served; the original deployment's clients
/// were split on the trailing slash.
pub fn router(config: ServiceConfig) -> Router {
    let limit = config.max_upload_bytes;
    let state = AppState {
        typeface: config.typeface,
        stopwords: config.stopwords,
        options: config.options,
    };

    Router::new()
        .route("/process", post(process::handler))
        .route("/process/", post(process::handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(limit))
}
