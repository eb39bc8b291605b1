//! Denylist of phrases that mark non-item rows on a receipt.

use serde::{Deserialize, Serialize};

/// Version tag of the built-in denylist.
pub const DEFAULT_NOISE_VERSION: &str = "2024.1";

/// Noise phrases, matched as lowercase substrings of a row description.
///
/// Several entries are literal OCR misreads of "price saving" seen on real
/// receipts; keep them verbatim.
const DEFAULT_NOISE_PHRASES: &[&str] = &[
    "balance",
    "change",
    "express",
    "price saving",
    "pricesaving",
    "price savng",
    "price savlng",
    "prlce saving",
    "price sav1ng",
];

/// Versioned list of noise phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseFilter {
    /// Identifies the list revision in stored configs.
    pub version: String,

    /// Phrases that mark a row as noise.
    pub phrases: Vec<String>,
}

impl NoiseFilter {
    pub fn new(version: impl Into<String>, phrases: Vec<String>) -> Self {
        Self {
            version: version.into(),
            phrases,
        }
    }

    /// A filter that lets every row through.
    pub fn empty() -> Self {
        Self::new("empty", Vec::new())
    }

    /// Add a phrase to the end of the list.
    pub fn with_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.phrases.push(phrase.into().to_lowercase());
        self
    }

    /// The first phrase contained in `description`, if any.
    pub fn matching_phrase(&self, description: &str) -> Option<&str> {
        let needle = description.trim().to_lowercase();
        self.phrases
            .iter()
            .filter(|p| !p.is_empty())
            .find(|p| needle.contains(&p.to_lowercase()))
            .map(String::as_str)
    }

    pub fn is_noise(&self, description: &str) -> bool {
        self.matching_phrase(description).is_some()
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_NOISE_VERSION,
            DEFAULT_NOISE_PHRASES.iter().map(|p| p.to_string()).collect(),
        )
    }
}
