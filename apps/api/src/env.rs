use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

fn default_port() -> u16 {
    8000
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_max_upload_bytes() -> usize {
    cumulo_wordcloud_api::DEFAULT_MAX_UPLOAD_BYTES
}

#[derive(Deserialize)]
pub struct Env {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Font file to render with; unset means system sans-serif lookup.
    #[serde(default)]
    pub font_path: Option<String>,
    /// Replaces the bundled English stopword list.
    #[serde(default)]
    pub stopwords_path: Option<String>,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

static ENV: OnceLock<Env> = OnceLock::new();

pub fn env() -> &'static Env {
    ENV.get_or_init(|| {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

        let _ = dotenvy::from_path(manifest_dir.join(".env"));
        let _ = dotenvy::dotenv();
        envy::from_env().expect("Failed to load environment")
    })
}
