use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::stopwords::StopwordSet;

/// Tokens shorter than this never make it into the cloud; single letters are
/// almost always noise from contractions and initials.
const MIN_TOKEN_LEN: usize = 2;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}']*").unwrap());

/// A ranked vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCount {
    pub text: String,
    pub count: usize,
}

/// Extract the vocabulary that drives layout, most frequent first.
///
/// The pipeline lowercases the text, tokenizes on letter/digit runs with
/// interior apostrophes, strips possessive `'s`, and drops short tokens,
/// pure numbers, and stopwords. With `collocations` set, adjacent token
/// pairs are counted too and appear as two-word entries. Ties are broken
/// alphabetically so ranking is deterministic.
pub fn ranked_words(
    text: &str,
    stopwords: &StopwordSet,
    collocations: bool,
    max_words: usize,
) -> Vec<WordCount> {
    let lowered = text.to_lowercase();
    let tokens: Vec<String> = TOKEN
        .find_iter(&lowered)
        .map(|m| normalize(m.as_str()))
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .collect();

    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in &tokens {
        if !stopwords.contains(token) {
            *counts.entry(token.clone()).or_insert(0) += 1;
        }
    }
    if collocations {
        for pair in tokens.windows(2) {
            if !stopwords.contains(&pair[0]) && !stopwords.contains(&pair[1]) {
                *counts.entry(format!("{} {}", pair[0], pair[1])).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<WordCount> = counts
        .into_iter()
        .map(|(text, count)| WordCount { text, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.text.cmp(&b.text)));
    ranked.truncate(max_words);
    ranked
}

fn normalize(token: &str) -> String {
    let stripped = token.strip_suffix("'s").unwrap_or(token);
    stripped.trim_end_matches('\'').to_string()
}
