//! Client for the daily-solution feed endpoints.
//!
//! Two read-only providers serve pre-computed puzzle answers, one per
//! puzzle category. Their response shapes vary: some spell the plaintext
//! field `answer`, others `solution`, and the hint is either `clue` or
//! `hint`. All of that is absorbed here, at the boundary, by one
//! normalization step, so the rest of the crate only ever sees the
//! canonical [`DailySolution`] shape.

use crate::config::get_config;
use crate::derivation;
use crate::error::QuipsolveError;
use crate::key::{ConflictPolicy, SubstitutionKey};
use log::{debug, trace};
use serde::Deserialize;
use std::time::Duration;

/// The two puzzle categories with a daily feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleKind {
    /// The pun-based daily puzzle.
    Cryptoquip,
    /// The quotation-based daily puzzle.
    Cryptoquote,
}

impl PuzzleKind {
    /// Feed endpoint for this category.
    pub fn endpoint(&self) -> &str {
        let config = get_config();
        match self {
            PuzzleKind::Cryptoquip => &config.cryptoquip_feed_url,
            PuzzleKind::Cryptoquote => &config.cryptoquote_feed_url,
        }
    }

    /// Parses a CLI-style category name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cryptoquip" => Some(PuzzleKind::Cryptoquip),
            "cryptoquote" => Some(PuzzleKind::Cryptoquote),
            _ => None,
        }
    }
}

impl std::fmt::Display for PuzzleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PuzzleKind::Cryptoquip => write!(f, "cryptoquip"),
            PuzzleKind::Cryptoquote => write!(f, "cryptoquote"),
        }
    }
}

/// The raw provider shape. Every field is optional; providers disagree on
/// spellings and omit fields freely.
#[derive(Debug, Deserialize)]
struct RawDailySolution {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    puzzle: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    solution: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    clue: Option<String>,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    key: Option<String>,
    // Present in some feeds, unused here.
    #[serde(default)]
    #[allow(dead_code)]
    timestamp: Option<String>,
}

/// The canonical, normalized daily solution record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySolution {
    /// Publication date as the provider formats it.
    pub date: Option<String>,
    /// The encoded puzzle text.
    pub puzzle: String,
    /// The plaintext answer.
    pub solution: String,
    /// Quote author, when the provider sends one.
    pub author: Option<String>,
    /// Single-letter hint, e.g. `"B = H"`.
    pub hint: Option<String>,
    /// Provider key string, when sent.
    pub key: Option<String>,
}

/// Maps the raw provider shape into the canonical one, accepting either
/// field spelling for the plaintext and the hint.
fn normalize(raw: RawDailySolution) -> Result<DailySolution, QuipsolveError> {
    let puzzle = raw
        .puzzle
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| QuipsolveError::Feed("Feed response has no puzzle field".to_string()))?;
    let solution = raw
        .answer
        .or(raw.solution)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            QuipsolveError::Feed("Feed response has neither answer nor solution".to_string())
        })?;
    Ok(DailySolution {
        date: raw.date,
        puzzle,
        solution,
        author: raw.author.filter(|a| !a.is_empty()),
        hint: raw.clue.or(raw.hint).filter(|h| !h.is_empty()),
        key: raw.key.filter(|k| !k.is_empty()),
    })
}

/// Fetches and normalizes today's solution for one puzzle category.
pub fn fetch_daily(kind: PuzzleKind) -> Result<DailySolution, QuipsolveError> {
    let config = get_config();
    let url = kind.endpoint().to_string();
    trace!("GET {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout))
        .build()
        .map_err(|e| QuipsolveError::Feed(format!("Failed to create HTTP client: {}", e)))?;
    let response = client
        .get(&url)
        .send()
        .map_err(|e| QuipsolveError::Feed(format!("Failed to fetch {} solution: {}", kind, e)))?;
    if !response.status().is_success() {
        return Err(QuipsolveError::Feed(format!(
            "Failed to fetch solution: HTTP {}",
            response.status().as_u16()
        )));
    }

    let raw: RawDailySolution = response
        .json()
        .map_err(|e| QuipsolveError::Feed(format!("Malformed feed response: {}", e)))?;
    normalize(raw)
}

/// Derives the letter mapping for a daily solution.
///
/// The hint entry is applied first and is never overwritten; then the
/// provider's key string when one was sent, else a positional alignment
/// of puzzle and solution.
pub fn letter_mapping(daily: &DailySolution) -> SubstitutionKey {
    let mut key = SubstitutionKey::new();
    if let Some((c, p)) = daily.hint.as_deref().and_then(derivation::from_clue) {
        key.set(c, p);
    }

    let derived = match daily.key.as_deref() {
        Some(key_string) => {
            let parsed = SubstitutionKey::parse(key_string);
            if parsed.is_empty() {
                debug!("Provider key string unusable, falling back to alignment");
                derivation::from_positional_alignment(&daily.puzzle, &daily.solution)
            } else {
                parsed
            }
        }
        None => derivation::from_positional_alignment(&daily.puzzle, &daily.solution),
    };
    key.merge(&derived, ConflictPolicy::KeepExisting);
    key
}

/// Pairs each puzzle word with the solution word at the same index, for
/// word-by-word display. Excess words on either side pair with an empty
/// string.
pub fn word_pairs(daily: &DailySolution) -> Vec<(String, String)> {
    let plain_words: Vec<&str> = daily.solution.split_whitespace().collect();
    daily
        .puzzle
        .split_whitespace()
        .enumerate()
        .map(|(i, cipher_word)| {
            (
                cipher_word.to_string(),
                plain_words.get(i).unwrap_or(&"").to_string(),
            )
        })
        .collect()
}
