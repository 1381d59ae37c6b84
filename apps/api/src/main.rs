mod env;
mod openapi;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{Router, body::Body, extract::MatchedPath, http::Request, response::Html, routing::get};
use tower_http::{
    cors::{self, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::prelude::*;

use cumulo_wordcloud::{FontTypeface, StopwordSet, Typeface};
use cumulo_wordcloud_api::ServiceConfig;

use env::env;

const INDEX_HTML: &str = include_str!("../assets/index.html");

fn app() -> Router {
    let env = env();

    let typeface: Arc<dyn Typeface> = match &env.font_path {
        Some(path) => {
            tracing::info!(path = %path, "font_from_env");
            Arc::new(FontTypeface::from_file(path).expect("failed to load FONT_PATH font"))
        }
        None => Arc::new(FontTypeface::system().expect("no usable system font; set FONT_PATH")),
    };

    let stopwords = match &env.stopwords_path {
        Some(path) => {
            tracing::info!(path = %path, "stopwords_from_env");
            StopwordSet::from_file(Path::new(path)).expect("failed to read STOPWORDS_PATH")
        }
        None => StopwordSet::bundled(),
    };

    let config = ServiceConfig::new(typeface)
        .with_stopwords(stopwords)
        .with_max_upload_bytes(env.max_upload_bytes);

    Router::new()
        .route("/", get(index))
        .route("/health", get(version))
        .route("/openapi.json", get(openapi_json))
        .nest_service("/static", ServeDir::new(&env.static_dir))
        .merge(cumulo_wordcloud_api::router(config))
        .layer(
            CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods(cors::Any)
                .allow_headers(cors::Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let path = request.uri().path();

                    if path == "/health" {
                        return tracing::Span::none();
                    }

                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(path);

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        http.route = %matched_path,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<axum::body::Body>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        if span.is_disabled() {
                            return;
                        }
                        tracing::info!(
                            parent: span,
                            http_status = %response.status().as_u16(),
                            latency_ms = %latency.as_millis(),
                            "http_request_finished"
                        );
                    },
                ),
        )
}

fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let _ = openapi::write_openapi_json();

    let env = env();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let addr = SocketAddr::from(([0, 0, 0, 0], env.port));
            tracing::info!(addr = %addr, "server_listening");

            let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
            axum::serve(listener, app())
                .with_graceful_shutdown(shutdown_signal())
                .await
                .unwrap();
        });

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("shutdown_signal_received");
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(openapi::openapi())
}

async fn version() -> &'static str {
    option_env!("APP_VERSION").unwrap_or("unknown")
}
