use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use utoipa::ToSchema;
use uuid::Uuid;

use cumulo_transcript::TextFormat;
use cumulo_wordcloud::{HexColor, RegionMask, WordCloud, encode_png};

use super::AppState;
use crate::error::{ApiError, Result};

/// Multipart fields of a render request, for the API document only; the
/// handler reads the parts directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ProcessRequest {
    /// UTF-8 text document to draw words from.
    #[schema(format = Binary)]
    text_file: String,
    /// Color image; its key-colored region becomes the placement mask.
    #[schema(format = Binary)]
    image_file: String,
    /// `#RRGGBB` key color selecting the placement region.
    mask_color: String,
    /// `#RRGGBB` canvas color behind the words. Defaults to black.
    background_color: Option<String>,
    /// `plain` (default) or `transcript` (three-line records).
    text_format: Option<String>,
    /// Per-channel tolerance 0-255 for key-color matching. Defaults to 0.
    mask_tolerance: Option<u8>,
}

#[derive(Debug, Default)]
struct ProcessForm {
    text: Option<Bytes>,
    image: Option<Bytes>,
    mask_color: Option<String>,
    background_color: Option<String>,
    text_format: Option<String>,
    mask_tolerance: Option<String>,
}

async fn collect(mut multipart: Multipart) -> Result<ProcessForm> {
    let mut form = ProcessForm::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "text_file" => form.text = Some(field.bytes().await?),
            "image_file" => form.image = Some(field.bytes().await?),
            "mask_color" => form.mask_color = Some(field.text().await?),
            "background_color" => form.background_color = Some(field.text().await?),
            "text_format" => form.text_format = Some(field.text().await?),
            "mask_tolerance" => form.mask_tolerance = Some(field.text().await?),
            other => {
                tracing::debug!(field = other, "ignored_multipart_field");
            }
        }
    }
    Ok(form)
}

#[utoipa::path(
    post,
    path = "/process/",
    request_body(content = ProcessRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Rendered word cloud as PNG"),
        (status = 400, description = "Missing field or malformed multipart body"),
        (status = 415, description = "Image could not be decoded"),
        (status = 422, description = "Invalid color, tolerance, text format, or no usable words"),
        (status = 500, description = "Rendering failed"),
    ),
    tag = "wordcloud",
)]
pub async fn handler(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let request_id = Uuid::new_v4();
    let form = collect(multipart).await?;

    let text_bytes = form.text.ok_or(ApiError::MissingField("text_file"))?;
    let image_bytes = form.image.ok_or(ApiError::MissingField("image_file"))?;
    let mask_color = form.mask_color.ok_or(ApiError::MissingField("mask_color"))?;

    let key = HexColor::parse(&mask_color)?;
    let mut options = state.options.clone();
    if let Some(raw) = &form.background_color {
        options.background = HexColor::parse(raw)?;
    }
    let format = match &form.text_format {
        Some(raw) => raw
            .parse::<TextFormat>()
            .map_err(|e| ApiError::InvalidFieldValue {
                field: "text_format",
                reason: e.to_string(),
            })?,
        None => TextFormat::default(),
    };
    let tolerance = match &form.mask_tolerance {
        Some(raw) => raw
            .trim()
            .parse::<u8>()
            .map_err(|_| ApiError::InvalidFieldValue {
                field: "mask_tolerance",
                reason: format!("'{raw}' is not an integer in 0..=255"),
            })?,
        None => 0,
    };

    tracing::info!(
        request_id = %request_id,
        text_bytes = text_bytes.len(),
        image_bytes = image_bytes.len(),
        mask_color = %key,
        text_format = format.as_str(),
        "wordcloud_request_received"
    );

    let raw_text = String::from_utf8_lossy(&text_bytes).into_owned();
    let text = cumulo_transcript::extract_text(&raw_text, format)?;

    let typeface = state.typeface.clone();
    let stopwords = state.stopwords.clone();
    let png = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        let source = image::load_from_memory(&image_bytes)?.to_rgb8();
        let mask = RegionMask::from_key_color(&source, key, tolerance);
        tracing::debug!(
            request_id = %request_id,
            width = source.width(),
            height = source.height(),
            active = mask.active_count(),
            "mask_derived"
        );
        let cloud = WordCloud::with_options(typeface, options);
        let rendered = cloud.generate(&text, &mask, &stopwords, &source)?;
        encode_png(&rendered).map_err(|e| ApiError::Render(e.to_string()))
    })
    .await
    .map_err(|e| {
        tracing::error!(request_id = %request_id, error = %e, "render_task_panicked");
        ApiError::Render(e.to_string())
    })??;

    tracing::info!(request_id = %request_id, png_bytes = png.len(), "wordcloud_rendered");

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}
