//! Dictionary collaborator: word lookup and pattern enumeration.
//!
//! The engine only needs two questions answered: "is this a word?" and
//! "which words fit this pattern with these letters?". `WordList` is a plain
//! in-memory implementation backed by a word-per-line file.

use crate::letters::WILDCARD;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Word list bundled with the crate
pub const EMBEDDED_WORDS: &str = include_str!("resources/words.txt");

/// Placeholder for an open position in a pattern string
pub const OPEN: char = '-';

/// Lexical lookups used by word resolution and the bot
pub trait Dictionary: Send + Sync {
    /// Whether `word` is a valid word (case-insensitive)
    fn is_valid_word(&self, word: &str) -> bool;

    /// Words that fit `pattern` using only `available` letters for its open positions
    fn find_words_matching(&self, pattern: &WordPattern, available: &[char]) -> Vec<String>;
}

/// Errors raised while loading a word list
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Failed to read word list: {0}")]
    Io(#[from] std::io::Error),

    #[error("Word list is empty")]
    Empty,
}

/// A run of board cells a candidate word must span, plus how far it may grow.
///
/// `core` holds fixed letters and open positions. A matching word covers the
/// whole core and may extend up to `max_prefix` cells before it and
/// `max_suffix` cells after it; every open cell it covers must be filled from
/// the available letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPattern {
    pub core: Vec<Option<char>>,
    pub max_prefix: usize,
    pub max_suffix: usize,
}

impl WordPattern {
    /// Build a pattern from a string where `-` marks an open position
    pub fn parse(core: &str, max_prefix: usize, max_suffix: usize) -> Self {
        Self {
            core: core
                .chars()
                .map(|c| (c != OPEN).then(|| c.to_ascii_uppercase()))
                .collect(),
            max_prefix,
            max_suffix,
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_prefix + self.core.len() + self.max_suffix
    }

    /// Pattern string form, `-` for open positions
    pub fn core_string(&self) -> String {
        self.core.iter().map(|c| c.unwrap_or(OPEN)).collect()
    }

    /// Every prefix length at which `word` fits this pattern with `available` letters.
    ///
    /// A fit must fill at least one open position, otherwise the word would
    /// place nothing.
    pub fn alignments(&self, word: &str, available: &[char]) -> Vec<usize> {
        let word: Vec<char> = word.chars().map(|c| c.to_ascii_uppercase()).collect();
        if word.len() < self.core.len() || word.len() > self.max_len() {
            return Vec::new();
        }

        let mut result = Vec::new();
        let slack = word.len() - self.core.len();
        for prefix in 0..=slack.min(self.max_prefix) {
            let suffix = slack - prefix;
            if suffix > self.max_suffix {
                continue;
            }

            let mut needed: Vec<char> = word[..prefix].to_vec();
            let mut fits = true;
            for (i, cell) in self.core.iter().enumerate() {
                let ch = word[prefix + i];
                match cell {
                    Some(fixed) if *fixed != ch => {
                        fits = false;
                        break;
                    }
                    Some(_) => {}
                    None => needed.push(ch),
                }
            }
            needed.extend_from_slice(&word[prefix + self.core.len()..]);

            if fits && !needed.is_empty() && letters_available(&needed, available) {
                result.push(prefix);
            }
        }
        result
    }
}

/// Whether `needed` letters can be drawn from `available`, wildcards standing in for shortfalls
pub fn letters_available(needed: &[char], available: &[char]) -> bool {
    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in available {
        *counts.entry(c.to_ascii_uppercase()).or_insert(0) += 1;
    }
    let mut wildcards = counts.remove(&WILDCARD).unwrap_or(0);

    for c in needed {
        match counts.get_mut(&c.to_ascii_uppercase()) {
            Some(n) if *n > 0 => *n -= 1,
            _ if wildcards > 0 => wildcards -= 1,
            _ => return false,
        }
    }
    true
}

/// In-memory word list
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: Vec<String>,
    lookup: HashSet<String>,
}

impl WordList {
    /// Parse one word per line; blank lines and non-alphabetic entries are skipped
    pub fn from_text(data: &str) -> Self {
        let mut words: Vec<String> = data
            .lines()
            .map(|line| line.trim().to_uppercase())
            .filter(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_alphabetic()))
            .collect();
        words.sort();
        words.dedup();
        let lookup = words.iter().cloned().collect();
        Self { words, lookup }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let data = fs::read_to_string(path)?;
        let list = Self::from_text(&data);
        if list.is_empty() {
            return Err(DictionaryError::Empty);
        }
        Ok(list)
    }

    /// The bundled word list
    pub fn embedded() -> Self {
        Self::from_text(EMBEDDED_WORDS)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn is_valid_word(&self, word: &str) -> bool {
        self.lookup.contains(&word.to_uppercase())
    }

    fn find_words_matching(&self, pattern: &WordPattern, available: &[char]) -> Vec<String> {
        let max_len = pattern.max_len();
        self.words
            .iter()
            .filter(|w| w.len() >= pattern.core.len() && w.len() <= max_len)
            .filter(|w| !pattern.alignments(w, available).is_empty())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> WordList {
        WordList::from_text("bateau\ncrayon\ntable\nbutte\nallo\nou\nmi\nil\nma\nelle\n\n  Cat  \nca7\n")
    }

    #[test]
    fn test_from_text_normalises() {
        let words = list();
        assert_eq!(words.len(), 11);
        assert!(words.is_valid_word("Bateau"));
        assert!(words.is_valid_word("cat"));
        assert!(!words.is_valid_word("ca7"));
        assert!(!words.is_valid_word("bat"));
    }

    #[test]
    fn test_embedded_list_loads() {
        let words = WordList::embedded();
        assert!(!words.is_empty());
        assert!(words.is_valid_word("bateau"));
    }

    #[test]
    fn test_pattern_parse() {
        let pattern = WordPattern::parse("a-t", 1, 2);
        assert_eq!(pattern.core, vec![Some('A'), None, Some('T')]);
        assert_eq!(pattern.core_string(), "A-T");
        assert_eq!(pattern.max_len(), 6);
    }

    #[test]
    fn test_alignments_respect_fixed_letters() {
        // "BATEAU" with the board holding T at core position 0
        let pattern = WordPattern::parse("t", 2, 3);
        assert_eq!(pattern.alignments("bateau", &['B', 'A', 'E', 'A', 'U']), vec![2]);
        // Prefix too long
        let pattern = WordPattern::parse("t", 1, 3);
        assert!(pattern.alignments("bateau", &['B', 'A', 'E', 'A', 'U']).is_empty());
    }

    #[test]
    fn test_alignments_use_wildcards() {
        let pattern = WordPattern::parse("t", 2, 3);
        assert_eq!(pattern.alignments("bateau", &['B', 'A', '*', 'A', 'U']), vec![2]);
        assert!(pattern.alignments("bateau", &['B', 'A', 'A', 'U']).is_empty());
    }

    #[test]
    fn test_alignments_require_a_new_letter() {
        let pattern = WordPattern::parse("ma", 0, 0);
        assert!(pattern.alignments("ma", &['Z']).is_empty());
    }

    #[test]
    fn test_alignments_can_repeat() {
        // "ALLO" fits an L at either of its two L positions
        let pattern = WordPattern::parse("l", 3, 3);
        assert_eq!(pattern.alignments("allo", &['A', 'L', 'O']), vec![1, 2]);
    }

    #[test]
    fn test_find_words_matching() {
        let words = list();
        let pattern = WordPattern::parse("-a", 0, 0);
        let found = words.find_words_matching(&pattern, &['M', 'C']);
        assert_eq!(found, vec!["MA".to_string()]);
    }

    #[test]
    fn test_letters_available() {
        assert!(letters_available(&['A', 'B'], &['b', 'a']));
        assert!(letters_available(&['A', 'Z'], &['A', '*']));
        assert!(!letters_available(&['A', 'A'], &['A']));
    }
}
