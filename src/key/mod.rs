//! The substitution key model.
//!
//! A `SubstitutionKey` is a partial mapping from cipher letters (A-Z) to
//! plain letters. It is the live editing state of a solving session: entries
//! can be set, cleared and bulk-merged, and disagreements between sources
//! are reported as conflicts instead of being raised as errors. The map is
//! kept functionally consistent (one plain letter per cipher letter) at all
//! times, but injectivity is only checked by [`SubstitutionKey::validate_complete`],
//! because two cipher letters may legitimately point at the same plain
//! letter while a human is still refining the key.

use log::debug;

/// Number of symbols in the cipher alphabet.
pub const ALPHABET_LEN: usize = 26;

/// What `merge` does when an incoming entry disagrees with an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// The existing entry is preserved. Used for clue-derived hints, which
    /// outrank automatically inferred entries.
    KeepExisting,
    /// The incoming entry overwrites the existing one.
    Overwrite,
}

/// One disagreement observed during a merge. Conflicts are expected noise
/// in frequency-based derivation and are surfaced, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingConflict {
    /// The cipher letter both sources tried to map.
    pub cipher_symbol: char,
    /// What the key held before the merge touched this entry.
    pub previous: char,
    /// What the incoming mapping wanted to assign.
    pub incoming: char,
}

/// A partial bijective mapping between the cipher alphabet and the plain
/// alphabet. Both sides are stored uppercase; lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionKey {
    /// Entry `i` holds the plain letter for cipher letter `'A' + i`.
    entries: [Option<char>; ALPHABET_LEN],
}

/// Index of a letter within the alphabet, if it is one.
fn letter_index(c: char) -> Option<usize> {
    let upper = c.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Some((upper as u8 - b'A') as usize)
    } else {
        None
    }
}

impl SubstitutionKey {
    /// Creates an empty key. No cipher letter is mapped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `plain` to `cipher`. Both are case-normalized to uppercase.
    /// Overwriting an existing entry is allowed and expected during manual
    /// refinement. Non-letter input is ignored.
    pub fn set(&mut self, cipher: char, plain: char) {
        let (Some(idx), Some(_)) = (letter_index(cipher), letter_index(plain)) else {
            debug!("Ignoring non-letter mapping {:?} -> {:?}", cipher, plain);
            return;
        };
        self.entries[idx] = Some(plain.to_ascii_uppercase());
    }

    /// Removes the entry for `cipher`, if any.
    pub fn clear(&mut self, cipher: char) {
        if let Some(idx) = letter_index(cipher) {
            self.entries[idx] = None;
        }
    }

    /// The plain letter currently assigned to `cipher` (uppercase).
    pub fn get(&self, cipher: char) -> Option<char> {
        letter_index(cipher).and_then(|idx| self.entries[idx])
    }

    /// Number of mapped cipher letters.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// True if no cipher letter is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.is_none())
    }

    /// Bulk-applies the entries of `incoming` under the given policy.
    ///
    /// Every disagreement between an existing entry and an incoming one is
    /// recorded in the returned list, whichever side wins. The merge is
    /// all-or-nothing: it never observes a partially applied state.
    pub fn merge(
        &mut self,
        incoming: &SubstitutionKey,
        policy: ConflictPolicy,
    ) -> Vec<MappingConflict> {
        let mut conflicts = Vec::new();
        for (idx, entry) in incoming.entries.iter().enumerate() {
            let Some(new_plain) = entry else { continue };
            match self.entries[idx] {
                Some(existing) if existing != *new_plain => {
                    let cipher_symbol = (b'A' + idx as u8) as char;
                    conflicts.push(MappingConflict {
                        cipher_symbol,
                        previous: existing,
                        incoming: *new_plain,
                    });
                    if policy == ConflictPolicy::Overwrite {
                        self.entries[idx] = Some(*new_plain);
                    }
                }
                Some(_) => {}
                None => self.entries[idx] = Some(*new_plain),
            }
        }
        if !conflicts.is_empty() {
            debug!("Merge produced {} mapping conflicts", conflicts.len());
        }
        conflicts
    }

    /// Ordered `(cipher, plain)` pairs for every mapped letter, sorted by
    /// cipher letter. This ordering is a display contract, not a semantic
    /// one.
    pub fn to_display_pairs(&self) -> Vec<(char, char)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| entry.map(|plain| ((b'A' + idx as u8) as char, plain)))
            .collect()
    }

    /// Serializes to the canonical key-string format
    /// `"<cipherLetters> -> <plainLetters>"`, where position `i` of the left
    /// substring maps to position `i` of the right one.
    pub fn serialize(&self) -> String {
        let pairs = self.to_display_pairs();
        let ciphers: String = pairs.iter().map(|(c, _)| *c).collect();
        let plains: String = pairs.iter().map(|(_, p)| *p).collect();
        format!("{} -> {}", ciphers, plains)
    }

    /// Parses the canonical key-string format.
    ///
    /// Oracle responses carry keys in variable shapes, so parsing is
    /// tolerant: a malformed string (missing ` -> ` separator, unequal
    /// substring lengths) yields an empty mapping rather than an error.
    /// Non-letter positions within the substrings are skipped.
    pub fn parse(key_string: &str) -> Self {
        let mut key = SubstitutionKey::new();
        let Some((ciphers, plains)) = key_string.split_once(" -> ") else {
            debug!("Key string {:?} has no separator, ignoring", key_string);
            return key;
        };
        let cipher_chars: Vec<char> = ciphers.chars().collect();
        let plain_chars: Vec<char> = plains.chars().collect();
        if cipher_chars.len() != plain_chars.len() {
            debug!(
                "Key string halves differ in length ({} vs {}), ignoring",
                cipher_chars.len(),
                plain_chars.len()
            );
            return key;
        }
        for (c, p) in cipher_chars.iter().zip(plain_chars.iter()) {
            key.set(*c, *p);
        }
        key
    }

    /// The complete-solution check: true iff all 26 cipher letters are
    /// mapped and no two of them share a plain letter. This is deliberately
    /// not a live invariant of the editing state.
    pub fn validate_complete(&self) -> bool {
        let mut seen = [false; ALPHABET_LEN];
        for entry in &self.entries {
            let Some(plain) = entry else { return false };
            let idx = (*plain as u8 - b'A') as usize;
            if seen[idx] {
                return false;
            }
            seen[idx] = true;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_normalizes_case() {
        let mut key = SubstitutionKey::new();
        key.set('x', 'a');
        assert_eq!(key.get('X'), Some('A'));
        assert_eq!(key.get('x'), Some('A'));
    }

    #[test]
    fn set_ignores_non_letters() {
        let mut key = SubstitutionKey::new();
        key.set('1', 'A');
        key.set('A', '!');
        assert!(key.is_empty());
    }

    #[test]
    fn overwrite_via_set_is_silent() {
        let mut key = SubstitutionKey::new();
        key.set('A', 'B');
        key.set('A', 'C');
        assert_eq!(key.get('A'), Some('C'));
    }

    #[test]
    fn clear_removes_entry() {
        let mut key = SubstitutionKey::new();
        key.set('A', 'B');
        key.clear('a');
        assert_eq!(key.get('A'), None);
        assert!(key.is_empty());
    }

    #[test]
    fn merge_keep_existing_never_changes_entries() {
        let mut key = SubstitutionKey::new();
        key.set('X', 'A');
        let mut incoming = SubstitutionKey::new();
        incoming.set('X', 'B');
        incoming.set('Y', 'C');

        let conflicts = key.merge(&incoming, ConflictPolicy::KeepExisting);

        assert_eq!(key.get('X'), Some('A'));
        assert_eq!(key.get('Y'), Some('C'));
        assert_eq!(
            conflicts,
            vec![MappingConflict {
                cipher_symbol: 'X',
                previous: 'A',
                incoming: 'B',
            }]
        );
    }

    #[test]
    fn merge_overwrite_adopts_incoming_and_reports() {
        let mut key = SubstitutionKey::new();
        key.set('X', 'A');
        key.set('Y', 'B');
        let mut incoming = SubstitutionKey::new();
        incoming.set('X', 'Q');
        incoming.set('Y', 'B');

        let conflicts = key.merge(&incoming, ConflictPolicy::Overwrite);

        assert_eq!(key.get('X'), Some('Q'));
        // Agreeing entries are not conflicts.
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].previous, 'A');
        assert_eq!(conflicts[0].incoming, 'Q');
    }

    #[test]
    fn display_pairs_sorted_by_cipher_letter() {
        let mut key = SubstitutionKey::new();
        key.set('Z', 'A');
        key.set('B', 'C');
        key.set('M', 'Q');
        assert_eq!(
            key.to_display_pairs(),
            vec![('B', 'C'), ('M', 'Q'), ('Z', 'A')]
        );
    }

    #[test]
    fn serialize_parse_round_trip() {
        // Round trip must hold for any number of entries, 0 through 26.
        let plain_side: Vec<char> = ('A'..='Z').rev().collect();
        for n in 0..=26 {
            let mut key = SubstitutionKey::new();
            for i in 0..n {
                key.set((b'A' + i as u8) as char, plain_side[i]);
            }
            let parsed = SubstitutionKey::parse(&key.serialize());
            assert_eq!(parsed, key, "round trip failed for {} entries", n);
        }
    }

    #[test]
    fn parse_tolerates_missing_separator() {
        let key = SubstitutionKey::parse("ABCDEF");
        assert!(key.is_empty());
    }

    #[test]
    fn parse_tolerates_unequal_lengths() {
        let key = SubstitutionKey::parse("ABC -> XY");
        assert!(key.is_empty());
    }

    #[test]
    fn parse_reads_positional_correspondence() {
        let key = SubstitutionKey::parse("XYZ -> abc");
        assert_eq!(key.get('X'), Some('A'));
        assert_eq!(key.get('Y'), Some('B'));
        assert_eq!(key.get('Z'), Some('C'));
        assert_eq!(key.len(), 3);
    }

    #[test]
    fn validate_complete_requires_full_injective_map() {
        let mut key = SubstitutionKey::new();
        for c in 'A'..='Z' {
            key.set(c, c);
        }
        assert!(key.validate_complete());

        // Two cipher letters pointing at the same plain letter is allowed
        // as live state, but fails the complete-solution check.
        key.set('A', 'B');
        assert!(!key.validate_complete());

        key.set('A', 'A');
        key.clear('Q');
        assert!(!key.validate_complete());
    }
}
