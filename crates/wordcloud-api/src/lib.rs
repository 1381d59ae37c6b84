mod config;
mod error;
mod openapi;
mod routes;

pub use config::{DEFAULT_MAX_UPLOAD_BYTES, ServiceConfig};
pub use error::{ApiError, ErrorResponse};
pub use openapi::openapi;
pub use routes::router;
