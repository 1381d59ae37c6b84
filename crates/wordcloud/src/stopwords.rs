use std::collections::HashSet;
use std::path::Path;

const BUNDLED_ENGLISH: &str = include_str!("../assets/stopwords-en.txt");

/// Words excluded from the cloud. Built once at startup and shared read-only
/// across requests; membership checks expect lowercased tokens.
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// The English list shipped with the crate.
    pub fn bundled() -> Self {
        Self::from_newline_delimited(BUNDLED_ENGLISH)
    }

    /// One word per line. Blank lines are skipped and entries are lowercased,
    /// so hand-edited lists with stray whitespace or capitals still work.
    pub fn from_newline_delimited(text: &str) -> Self {
        let words = text
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty())
            .collect();
        StopwordSet { words }
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self::from_newline_delimited(&std::fs::read_to_string(
            path,
        )?))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
