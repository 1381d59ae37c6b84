pub mod error;
pub mod parse;
pub mod types;

pub use error::TranscriptError;
pub use parse::{RECORD_STRIDE, extract_text, flatten, parse};
pub use types::{TextFormat, TranscriptRecord};
