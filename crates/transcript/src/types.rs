use std::str::FromStr;

use crate::error::TranscriptError;

/// One unit of the fixed-stride transcript export format: three consecutive
/// lines holding a timestamp, a speaker label, and the spoken text.
///
/// Timestamps and speaker labels are carried verbatim — no format validation
/// is applied to either. Only the utterance participates in word-cloud input.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptRecord {
    pub timestamp: String,
    pub speaker: String,
    pub utterance: String,
}

/// How an uploaded text document should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    /// The whole document is free text.
    #[default]
    Plain,
    /// The document is a sequence of three-line transcript records; only the
    /// utterance lines feed the word cloud.
    Transcript,
}

impl TextFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextFormat::Plain => "plain",
            TextFormat::Transcript => "transcript",
        }
    }
}

impl FromStr for TextFormat {
    type Err = TranscriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "plain" => Ok(TextFormat::Plain),
            "transcript" => Ok(TextFormat::Transcript),
            other => Err(TranscriptError::UnknownFormat(other.to_string())),
        }
    }
}
