use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error(transparent)]
    InvalidColorFormat(#[from] cumulo_wordcloud::ColorParseError),

    #[error(transparent)]
    MalformedTranscript(#[from] cumulo_transcript::TranscriptError),

    #[error("could not decode image: {0}")]
    UnsupportedImage(#[from] image::ImageError),

    #[error("invalid value for field '{field}': {reason}")]
    InvalidFieldValue {
        field: &'static str,
        reason: String,
    },

    #[error("no words left after filtering; nothing to draw")]
    EmptyVocabulary,

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("rendering failed: {0}")]
    Render(String),
}

impl From<cumulo_wordcloud::WordCloudError> for ApiError {
    fn from(err: cumulo_wordcloud::WordCloudError) -> Self {
        match err {
            cumulo_wordcloud::WordCloudError::EmptyVocabulary => ApiError::EmptyVocabulary,
            other => ApiError::Render(other.to_string()),
        }
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::MissingField(_) => (StatusCode::BAD_REQUEST, "missing_field"),
            Self::Multipart(_) => (StatusCode::BAD_REQUEST, "invalid_multipart"),
            Self::InvalidColorFormat(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_color_format")
            }
            Self::MalformedTranscript(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "malformed_transcript")
            }
            Self::InvalidFieldValue { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_field_value")
            }
            Self::EmptyVocabulary => (StatusCode::UNPROCESSABLE_ENTITY, "empty_vocabulary"),
            Self::UnsupportedImage(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_image")
            }
            Self::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "render_failed"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "render_pipeline_failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(ErrorResponse {
            error: ErrorDetails {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}
