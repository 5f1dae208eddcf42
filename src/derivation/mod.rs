//! Derives a [`SubstitutionKey`] from aligned cipher/plain text samples and
//! from single-letter clues.
//!
//! Alignment derivation is a best-effort heuristic. It is only reliable when
//! the cipher and plain texts carry identical letter counts (always true for
//! a pure substitution cipher) and produces garbage for malformed input.
//! That is acceptable by contract: the output is surfaced for human review,
//! never auto-trusted, so disagreements are logged instead of rejected.

use crate::key::{ConflictPolicy, MappingConflict, SubstitutionKey};
use lazy_regex::regex_captures;
use log::{debug, warn};

/// The uppercased letters-only stream of a text.
fn letter_stream(text: &str) -> Vec<char> {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Builds a key by aligning the letters-only streams of both texts
/// position-by-position, up to the shorter length.
///
/// A later pair overwrites an earlier one for the same cipher letter; the
/// disagreement is logged at debug level.
pub fn from_positional_alignment(cipher_text: &str, plain_text: &str) -> SubstitutionKey {
    let mut key = SubstitutionKey::new();
    let cipher_letters = letter_stream(cipher_text);
    let plain_letters = letter_stream(plain_text);

    for (c, p) in cipher_letters.iter().zip(plain_letters.iter()) {
        if let Some(existing) = key.get(*c) {
            if existing != *p {
                debug!("Positional alignment reassigns {} from {} to {}", c, existing, p);
            }
        }
        key.set(*c, *p);
    }
    key
}

/// Builds a key by splitting both texts on whitespace, zipping the word
/// lists by index, and aligning letters position-by-position within each
/// word pair. Letters never align across a word boundary, which reduces
/// cross-word misalignment when word lengths diverge.
///
/// Unlike positional alignment, the first mapping for a cipher letter wins
/// and later disagreements are logged as warnings.
pub fn from_word_alignment(cipher_text: &str, plain_text: &str) -> SubstitutionKey {
    let mut key = SubstitutionKey::new();
    let cipher_words: Vec<&str> = cipher_text.split_whitespace().collect();
    let plain_words: Vec<&str> = plain_text.split_whitespace().collect();

    for (cipher_word, plain_word) in cipher_words.iter().zip(plain_words.iter()) {
        let cipher_letters = letter_stream(cipher_word);
        let plain_letters = letter_stream(plain_word);
        for (c, p) in cipher_letters.iter().zip(plain_letters.iter()) {
            match key.get(*c) {
                Some(existing) if existing != *p => {
                    warn!("Conflicting mapping for {}: {} vs {}", c, existing, p);
                }
                Some(_) => {}
                None => key.set(*c, *p),
            }
        }
    }
    key
}

/// Parses a hint of the literal form `"<letter> = <letter>"` into a single
/// mapping entry. Case-insensitive, surrounding whitespace allowed. Returns
/// `None` if the pattern does not match.
pub fn from_clue(clue_text: &str) -> Option<(char, char)> {
    let (_, cipher, plain) = regex_captures!(r"([A-Za-z])\s*=\s*([A-Za-z])", clue_text)?;
    let cipher = cipher.chars().next()?.to_ascii_uppercase();
    let plain = plain.chars().next()?.to_ascii_uppercase();
    Some((cipher, plain))
}

/// Combines all available sources into one key. Clue entries are applied
/// first and are never overwritten by alignment-derived entries; every
/// disagreement is returned alongside the key for display.
pub fn derive(
    cipher_text: &str,
    plain_text: &str,
    clue_text: Option<&str>,
) -> (SubstitutionKey, Vec<MappingConflict>) {
    let mut key = SubstitutionKey::new();
    if let Some((c, p)) = clue_text.and_then(from_clue) {
        key.set(c, p);
    }
    let aligned = from_word_alignment(cipher_text, plain_text);
    let conflicts = key.merge(&aligned, ConflictPolicy::KeepExisting);
    (key, conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;

    #[test]
    fn positional_alignment_maps_letters_in_order() {
        let key = from_positional_alignment("JGV YXK", "THE CAT");
        assert_eq!(key.get('J'), Some('T'));
        assert_eq!(key.get('G'), Some('H'));
        assert_eq!(key.get('V'), Some('E'));
        assert_eq!(key.get('Y'), Some('C'));
        assert_eq!(key.get('X'), Some('A'));
        assert_eq!(key.get('K'), Some('T'));
    }

    #[test]
    fn positional_alignment_ignores_punctuation_and_case() {
        let key = from_positional_alignment("a-b!", "X Y.");
        assert_eq!(key.get('A'), Some('X'));
        assert_eq!(key.get('B'), Some('Y'));
        assert_eq!(key.len(), 2);
    }

    #[test]
    fn positional_alignment_stops_at_shorter_stream() {
        let key = from_positional_alignment("ABCDE", "XY");
        assert_eq!(key.len(), 2);
    }

    #[test]
    fn positional_round_trip_reproduces_plaintext_letters() {
        // For equal letter-count pairs, decoding with the derived key must
        // reproduce the plaintext's letter sequence exactly.
        let cipher = "Wkh txlfn eurzq ira!";
        let plain = "The quick brown fox!";
        let key = from_positional_alignment(cipher, plain);
        let decoded = decode(cipher, &key);
        assert_eq!(decoded.to_ascii_uppercase(), plain.to_ascii_uppercase());
    }

    #[test]
    fn word_alignment_stays_inside_word_boundaries() {
        // "AB CDEF" vs "XY ZW": the trailing letters of the longer word are
        // simply not aligned, instead of bleeding into the next word.
        let key = from_word_alignment("AB CDEF", "XY ZW");
        assert_eq!(key.get('A'), Some('X'));
        assert_eq!(key.get('B'), Some('Y'));
        assert_eq!(key.get('C'), Some('Z'));
        assert_eq!(key.get('D'), Some('W'));
        assert_eq!(key.get('E'), None);
        assert_eq!(key.get('F'), None);
    }

    #[test]
    fn word_alignment_keeps_first_mapping_on_conflict() {
        // E appears twice with different alignments; the first one sticks.
        let key = from_word_alignment("EE", "AB");
        assert_eq!(key.get('E'), Some('A'));
    }

    #[test]
    fn word_alignment_ignores_excess_words() {
        let key = from_word_alignment("AB", "XY ZW QQ");
        assert_eq!(key.len(), 2);
    }

    #[test]
    fn clue_parses_with_flexible_spacing_and_case() {
        assert_eq!(from_clue("X = A"), Some(('X', 'A')));
        assert_eq!(from_clue("x=a"), Some(('X', 'A')));
        assert_eq!(from_clue("  b =  h "), Some(('B', 'H')));
    }

    #[test]
    fn clue_rejects_non_matching_text() {
        assert_eq!(from_clue(""), None);
        assert_eq!(from_clue("no clue here"), None);
        assert_eq!(from_clue("1 = 2"), None);
    }

    #[test]
    fn derive_gives_clue_precedence_over_alignment() {
        // Alignment says X -> C, the clue says X -> A; the clue wins and
        // the disagreement is reported.
        let (key, conflicts) = derive("X", "C", Some("X = A"));
        assert_eq!(key.get('X'), Some('A'));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].previous, 'A');
        assert_eq!(conflicts[0].incoming, 'C');
    }
}
