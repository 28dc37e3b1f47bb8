//! Player state and rack management.
//!
//! This module contains:
//! - `Rack`, the per-player collection of letters with wildcard substitution
//! - `Player` with name, rack and running score

use crate::letters::{Letter, WILDCARD};
use serde::{Deserialize, Serialize};

/// Player identifier (index into the game's player list)
pub type PlayerId = u8;

/// Default number of letters a full rack holds
pub const RACK_CAPACITY: usize = 7;

/// How one demanded character is satisfied from the rack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RackUse {
    /// The rack letter at this index matches exactly
    Exact(usize),
    /// The wildcard at this index stands in for the character
    Wildcard(usize),
}

impl RackUse {
    pub fn index(&self) -> usize {
        match self {
            RackUse::Exact(i) | RackUse::Wildcard(i) => *i,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, RackUse::Wildcard(_))
    }
}

/// A player's letters.
///
/// Demanded characters follow the placement convention: a lowercase letter
/// asks for that letter and falls back to a wildcard when none is left, an
/// uppercase letter explicitly asks for a wildcard, and `*` asks for the
/// wildcard tile itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rack {
    letters: Vec<Letter>,
}

impl Rack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_letters(letters: Vec<Letter>) -> Self {
        Self { letters }
    }

    /// Build a rack from characters, `*` for wildcards
    pub fn from_chars(chars: &str) -> Self {
        Self {
            letters: chars.chars().map(Letter::new).collect(),
        }
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn wildcard_count(&self) -> usize {
        self.letters.iter().filter(|l| l.is_wildcard()).count()
    }

    pub fn has_wildcard(&self) -> bool {
        self.wildcard_count() > 0
    }

    /// Sum of the point values left on the rack
    pub fn total_value(&self) -> u32 {
        self.letters.iter().map(|l| l.value).sum()
    }

    /// Characters on the rack, uppercase, wildcards as `*`
    pub fn chars(&self) -> Vec<char> {
        self.letters.iter().map(|l| l.ch).collect()
    }

    /// Work out which rack letter satisfies each demanded character.
    ///
    /// Exact matches are assigned first, then wildcards cover whatever is
    /// left, which is optimal because a wildcard can stand in for any letter
    /// but a letter can only stand for itself. Returns `None` if the demand
    /// is not a sub-multiset of the rack under that substitution.
    pub fn plan(&self, demand: &[char]) -> Option<Vec<RackUse>> {
        let mut used = vec![false; self.letters.len()];
        let mut plan: Vec<Option<RackUse>> = vec![None; demand.len()];

        for (d, &ch) in demand.iter().enumerate() {
            let wants_exact = ch == WILDCARD || ch.is_ascii_lowercase();
            if !wants_exact {
                continue;
            }
            let found = self
                .letters
                .iter()
                .enumerate()
                .position(|(i, l)| !used[i] && exact_match(l, ch));
            if let Some(i) = found {
                used[i] = true;
                plan[d] = Some(RackUse::Exact(i));
            }
        }

        for (d, &ch) in demand.iter().enumerate() {
            if plan[d].is_some() {
                continue;
            }
            if ch == WILDCARD || !ch.is_ascii_alphabetic() {
                return None;
            }
            let i = self
                .letters
                .iter()
                .enumerate()
                .position(|(i, l)| !used[i] && l.is_wildcard())?;
            used[i] = true;
            plan[d] = Some(RackUse::Wildcard(i));
        }

        plan.into_iter().collect()
    }

    /// Whether the demand can be satisfied under optimal wildcard substitution
    pub fn has_letters(&self, demand: &[char]) -> bool {
        self.plan(demand).is_some()
    }

    /// Remove the letters a plan refers to, returned in plan order
    pub fn take(&mut self, plan: &[RackUse]) -> Vec<Letter> {
        let taken: Vec<Letter> = plan.iter().map(|u| self.letters[u.index()]).collect();
        let mut indices: Vec<usize> = plan.iter().map(RackUse::index).collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        for i in indices {
            self.letters.remove(i);
        }
        taken
    }

    /// Add letters to the rack. Placed blanks come back as wildcards.
    pub fn add<I: IntoIterator<Item = Letter>>(&mut self, letters: I) {
        self.letters.extend(letters.into_iter().map(|l| {
            if l.blank {
                Letter::wildcard()
            } else {
                l
            }
        }));
    }
}

fn exact_match(letter: &Letter, ch: char) -> bool {
    if ch == WILDCARD {
        letter.is_wildcard()
    } else {
        !letter.is_wildcard() && letter.matches(ch)
    }
}

/// Free-function form of [`Rack::has_letters`]
pub fn has_letters_in_rack(rack: &Rack, demand: &str) -> bool {
    let demand: Vec<char> = demand.chars().collect();
    rack.has_letters(&demand)
}

/// A single player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Player ID (turn order index)
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Letters in hand
    pub rack: Rack,
    /// Running score; end-of-game deductions can take it below zero
    pub points: i32,
    /// Whether it is currently this player's turn
    pub active: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            rack: Rack::new(),
            points: 0,
            active: false,
        }
    }
}
