//! Word resolution: which words a placement forms, and whether any is real.
//!
//! The resolver reads the board through an overlay of new placements, so the
//! same code serves the turn engine (letters already written to the board)
//! and the bot (hypothetical letters on an untouched board).

use crate::actions::Placement;
use crate::board::{Board, Coord, Direction};
use crate::dictionary::Dictionary;
use crate::letters::Letter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A maximal run of letters along one line, produced or extended by a placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormedWord {
    /// Squares of the word in reading order with the letter on each
    pub cells: Vec<(Coord, Letter)>,
    pub direction: Direction,
    /// Whether this is the word along the placement direction (as opposed to a cross word)
    pub main: bool,
    /// Whether the dictionary accepted this word
    pub valid: bool,
}

impl FormedWord {
    /// The word as an uppercase string
    pub fn text(&self) -> String {
        self.cells.iter().map(|(_, l)| l.ch).collect()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Every word a placement forms
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub words: Vec<FormedWord>,
}

impl Resolution {
    /// At least one formed word is in the dictionary
    pub fn is_valid(&self) -> bool {
        self.words.iter().any(|w| w.valid)
    }

    pub fn valid_words(&self) -> Vec<&FormedWord> {
        self.words.iter().filter(|w| w.valid).collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.words.iter().map(FormedWord::text).collect()
    }
}

/// Walks the board plus pending placements to collect formed words
pub struct WordResolver<'a> {
    board: &'a Board,
    overlay: HashMap<Coord, Letter>,
}

impl<'a> WordResolver<'a> {
    pub fn new(board: &'a Board, placements: &[Placement]) -> Self {
        Self {
            board,
            overlay: placements.iter().map(|p| (p.coord, p.letter)).collect(),
        }
    }

    fn letter_at(&self, coord: Coord) -> Option<Letter> {
        self.overlay
            .get(&coord)
            .copied()
            .or_else(|| self.board.letter_at(coord))
    }

    /// The maximal run of letters through `coord` along `direction`
    fn run_through(&self, coord: Coord, direction: Direction) -> Vec<(Coord, Letter)> {
        let mut start = coord;
        while let Some(prev) = start.prev(direction) {
            if self.letter_at(prev).is_none() {
                break;
            }
            start = prev;
        }

        let mut cells = Vec::new();
        let mut cursor = Some(start);
        while let Some(c) = cursor {
            match self.letter_at(c) {
                Some(letter) => cells.push((c, letter)),
                None => break,
            }
            cursor = c.next(direction);
        }
        cells
    }

    /// Words formed by the placements: the main word along `direction`, then
    /// one cross word per new letter. Runs shorter than two letters are not words.
    pub fn formed_words(&self, placements: &[Placement], direction: Direction) -> Vec<FormedWord> {
        let mut words = Vec::new();
        let first = match placements.iter().min_by_key(|p| p.coord.along(direction)) {
            Some(p) => p.coord,
            None => return words,
        };

        let main = self.run_through(first, direction);
        if main.len() >= 2 {
            words.push(FormedWord {
                cells: main,
                direction,
                main: true,
                valid: false,
            });
        }

        let cross = direction.perpendicular();
        for placement in placements {
            let cells = self.run_through(placement.coord, cross);
            if cells.len() >= 2 {
                words.push(FormedWord {
                    cells,
                    direction: cross,
                    main: false,
                    valid: false,
                });
            }
        }
        words
    }

    /// Collect formed words and check each against the dictionary
    pub fn resolve(
        &self,
        placements: &[Placement],
        direction: Direction,
        dictionary: &dyn Dictionary,
    ) -> Resolution {
        let mut words = self.formed_words(placements, direction);
        for word in &mut words {
            word.valid = dictionary.is_valid_word(&word.text());
        }
        Resolution { words }
    }
}
