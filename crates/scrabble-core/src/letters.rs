//! Letters and the shared letter bag.
//!
//! This module contains:
//! - The `Letter` tile carried in racks and placed on the board
//! - The letter distribution (counts and point values)
//! - `LetterBag`, the finite multiset players draw from

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Character used for the wildcard (blank) letter
pub const WILDCARD: char = '*';

/// Alphabet in distribution order, wildcard last
const ALPHABET: [char; 27] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', WILDCARD,
];

/// Number of copies of each letter in a fresh bag
const LETTER_COUNTS: [u32; 27] = [
    9, 2, 2, 3, 15, 2, 2, 2, 8, 1, 1, 5, 3, 6, 6, 2, 1, 6, 6, 6, 6, 2, 1, 1, 1, 1, 2,
];

/// Point value of each letter
const LETTER_VALUES: [u32; 27] = [
    1, 3, 3, 2, 1, 4, 2, 4, 1, 8, 10, 1, 2, 1, 1, 3, 8, 1, 1, 1, 1, 4, 10, 10, 10, 10, 0,
];

/// Point value of a letter character (case-insensitive). Unknown characters are worth 0.
pub fn letter_value(ch: char) -> u32 {
    let upper = ch.to_ascii_uppercase();
    ALPHABET
        .iter()
        .position(|&c| c == upper)
        .map(|i| LETTER_VALUES[i])
        .unwrap_or(0)
}

/// A single letter tile.
///
/// Wildcards are stored with `ch == WILDCARD` while in a rack or the bag.
/// Once placed, a wildcard is bound to the letter it stands for but keeps
/// its zero value and `blank` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Letter {
    /// Uppercase letter, or `WILDCARD` for an unbound blank
    pub ch: char,
    /// Points scored by this tile
    pub value: u32,
    /// Whether this tile is a blank (bound or not)
    pub blank: bool,
}

impl Letter {
    /// Create a regular letter with its distribution value
    pub fn new(ch: char) -> Self {
        let ch = ch.to_ascii_uppercase();
        if ch == WILDCARD {
            return Self::wildcard();
        }
        Self {
            ch,
            value: letter_value(ch),
            blank: false,
        }
    }

    /// Create an unbound wildcard
    pub fn wildcard() -> Self {
        Self {
            ch: WILDCARD,
            value: 0,
            blank: true,
        }
    }

    /// Bind a wildcard to a letter for placement on the board
    pub fn bound_blank(ch: char) -> Self {
        Self {
            ch: ch.to_ascii_uppercase(),
            value: 0,
            blank: true,
        }
    }

    /// Whether this is an unbound wildcard
    pub fn is_wildcard(&self) -> bool {
        self.ch == WILDCARD
    }

    /// Case-insensitive letter comparison
    pub fn matches(&self, ch: char) -> bool {
        self.ch.eq_ignore_ascii_case(&ch)
    }
}

/// Errors raised by the letter bag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BagError {
    #[error("Not enough letters in bag ({remaining}) to draw {requested}")]
    NotEnoughLetters { remaining: usize, requested: usize },
}

/// The letter bag: letters not owned by any player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterBag {
    letters: Vec<Letter>,
}

impl LetterBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the standard 102-letter bag, unshuffled
    pub fn standard() -> Self {
        let mut letters = Vec::with_capacity(LETTER_COUNTS.iter().sum::<u32>() as usize);
        for (i, &ch) in ALPHABET.iter().enumerate() {
            letters.extend(std::iter::repeat(Letter::new(ch)).take(LETTER_COUNTS[i] as usize));
        }
        Self { letters }
    }

    /// Create the standard bag and shuffle it
    pub fn shuffled<R: Rng>(rng: &mut R) -> Self {
        let mut bag = Self::standard();
        bag.shuffle(rng);
        bag
    }

    /// Create a bag holding exactly these letters, in draw order
    pub fn from_letters(letters: Vec<Letter>) -> Self {
        Self { letters }
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.letters.shuffle(rng);
    }

    /// Draw exactly `count` letters, failing without side effects if the bag holds fewer
    pub fn draw(&mut self, count: usize) -> Result<Vec<Letter>, BagError> {
        if count > self.letters.len() {
            return Err(BagError::NotEnoughLetters {
                remaining: self.letters.len(),
                requested: count,
            });
        }
        let split = self.letters.len() - count;
        let mut drawn = self.letters.split_off(split);
        drawn.reverse();
        Ok(drawn)
    }

    /// Draw up to `count` letters, returning fewer when the bag runs out
    pub fn draw_up_to(&mut self, count: usize) -> Vec<Letter> {
        let count = count.min(self.letters.len());
        // Cannot fail: count is clamped to what remains.
        self.draw(count).unwrap_or_default()
    }

    /// Put letters back into the bag. Placed blanks come back as wildcards.
    pub fn return_letters<I: IntoIterator<Item = Letter>>(&mut self, letters: I) {
        self.letters.extend(letters.into_iter().map(|l| {
            if l.blank {
                Letter::wildcard()
            } else {
                l
            }
        }));
    }
}
