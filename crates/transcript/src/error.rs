use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    /// The document does not divide into whole three-line records.
    #[error("transcript has {lines} lines, which is not a multiple of 3")]
    UnevenLineCount { lines: usize },

    #[error("unknown text format {0:?}, expected \"plain\" or \"transcript\"")]
    UnknownFormat(String),
}
