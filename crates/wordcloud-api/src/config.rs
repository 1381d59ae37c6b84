use std::sync::Arc;

use cumulo_wordcloud::{RenderOptions, StopwordSet, Typeface};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Everything the service needs to process requests, built once at startup
/// and shared read-only. The typeface is the only mandatory piece; stopwords
/// default to the bundled English list.
#[derive(Clone)]
pub struct ServiceConfig {
    pub typeface: Arc<dyn Typeface>,
    pub stopwords: Arc<StopwordSet>,
    pub options: RenderOptions,
    pub max_upload_bytes: usize,
}

impl ServiceConfig {
    pub fn new(typeface: Arc<dyn Typeface>) -> Self {
        ServiceConfig {
            typeface,
            stopwords: Arc::new(StopwordSet::bundled()),
            options: RenderOptions::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_stopwords(mut self, stopwords: StopwordSet) -> Self {
        self.stopwords = Arc::new(stopwords);
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}
