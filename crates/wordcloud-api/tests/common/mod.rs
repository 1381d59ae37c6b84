use std::net::SocketAddr;
use std::sync::Arc;

use image::{Rgb, RgbImage};

use cumulo_wordcloud::BlockTypeface;
use wordcloud_api::ServiceConfig;

/// Router with the deterministic block typeface, so nothing here depends on
/// fonts installed on the machine running the tests.
pub fn test_config() -> ServiceConfig {
    ServiceConfig::new(Arc::new(BlockTypeface::default()))
}

/// Serve the router on an ephemeral port and return its address.
pub async fn start_server(config: ServiceConfig) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("failed to read local addr");
    let app = wordcloud_api::router(config);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("test server crashed");
    });

    addr
}

pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb(rgb));
    cumulo_wordcloud::encode_png(&image).expect("failed to encode fixture png")
}

pub fn png_part(bytes: Vec<u8>) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(bytes)
        .file_name("mask.png")
        .mime_str("image/png")
        .expect("static mime type")
}

pub fn text_part(text: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(text.as_bytes().to_vec()).file_name("input.txt")
}
