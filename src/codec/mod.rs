//! Applies a [`SubstitutionKey`] to render ciphertext as (partial)
//! plaintext.
//!
//! This is not a cryptographic operation; it is a pure, deterministic
//! rendering function with no keyspace-search responsibility. Output always
//! has the same length and structure as the input.

use crate::key::SubstitutionKey;

/// What an unmapped cipher letter renders as. Live decoding always shows
/// the placeholder so partial progress is visually distinguishable from
/// fully solved text.
pub const PLACEHOLDER: char = '_';

/// Decodes `cipher_text` using `key`.
///
/// Every alphabetic character is replaced by its mapped plain letter,
/// preserving the case of the original character; unmapped letters render
/// as [`PLACEHOLDER`]. Non-alphabetic characters (spaces, punctuation,
/// digits) pass through unchanged at the same position.
pub fn decode(cipher_text: &str, key: &SubstitutionKey) -> String {
    cipher_text
        .chars()
        .map(|c| {
            if !c.is_ascii_alphabetic() {
                return c;
            }
            match key.get(c) {
                Some(plain) if c.is_ascii_lowercase() => plain.to_ascii_lowercase(),
                Some(plain) => plain,
                None => PLACEHOLDER,
            }
        })
        .collect()
}
