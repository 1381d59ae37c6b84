use crate::error::TranscriptError;
use crate::types::{TextFormat, TranscriptRecord};

/// Lines per transcript record: timestamp, speaker, utterance.
pub const RECORD_STRIDE: usize = 3;

/// Parse a fixed-stride transcript document into records.
///
/// Record *i* occupies lines `[3i, 3i + 2]`. Trailing blank lines (a trailing
/// newline from most editors, or a stray empty last line) are discarded
/// before the stride check, so a well-formed export with a final newline
/// parses cleanly. Interior lines are taken verbatim apart from a stripped
/// `\r`, so CRLF documents behave like LF ones.
///
/// An empty document yields zero records; a document whose line count is not
/// a multiple of three is rejected rather than partially parsed.
pub fn parse(text: &str) -> Result<Vec<TranscriptRecord>, TranscriptError> {
    let mut lines: Vec<&str> = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect();

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        return Ok(Vec::new());
    }

    if lines.len() % RECORD_STRIDE != 0 {
        return Err(TranscriptError::UnevenLineCount { lines: lines.len() });
    }

    Ok(lines
        .chunks_exact(RECORD_STRIDE)
        .map(|chunk| TranscriptRecord {
            timestamp: chunk[0].to_string(),
            speaker: chunk[1].to_string(),
            utterance: chunk[2].to_string(),
        })
        .collect())
}

/// Flatten records into the single lowercase blob the renderer consumes:
/// every utterance, lowercased, joined by single spaces in record order.
pub fn flatten(records: &[TranscriptRecord]) -> String {
    records
        .iter()
        .map(|r| r.utterance.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turn an uploaded document into renderer input according to its format.
///
/// `Plain` passes the document through untouched (the tokenizer normalizes
/// case later); `Transcript` parses the stride format and flattens the
/// utterances.
pub fn extract_text(raw: &str, format: TextFormat) -> Result<String, TranscriptError> {
    match format {
        TextFormat::Plain => Ok(raw.to_string()),
        TextFormat::Transcript => Ok(flatten(&parse(raw)?)),
    }
}
