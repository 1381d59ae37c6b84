use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cumulo API",
        version = "1.0.0",
        description = "Renders word clouds shaped and colored by an uploaded image: pixels matching a key color become the placement region"
    ),
    tags(
        (name = "wordcloud", description = "Word cloud rendering")
    )
)]
pub struct ApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.merge(cumulo_wordcloud_api::openapi());
    doc
}

pub fn write_openapi_json() -> std::io::Result<std::path::PathBuf> {
    let doc = openapi();
    let json = serde_json::to_string_pretty(&doc)
        .map_err(|e| std::io::Error::other(format!("serialize openapi: {e}")))?;

    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("openapi.gen.json");
    std::fs::write(&path, json)?;
    Ok(path)
}
