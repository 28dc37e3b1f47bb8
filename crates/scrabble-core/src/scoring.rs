//! Scoring of formed words and the end-of-game adjustment.

use crate::actions::EndReason;
use crate::board::{Board, Coord};
use crate::player::{Player, PlayerId};
use crate::words::FormedWord;
use std::collections::HashSet;

/// Scores placements and settles racks at the end of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCalculator {
    /// Bonus for placing a full rack in one move
    pub bingo_bonus: u32,
    /// Letters on a full rack
    pub rack_capacity: usize,
}

impl ScoreCalculator {
    pub fn new(bingo_bonus: u32, rack_capacity: usize) -> Self {
        Self {
            bingo_bonus,
            rack_capacity,
        }
    }

    /// Points for one word at the board's current multipliers.
    ///
    /// Each square counts once: letter value times its letter multiplier,
    /// summed, then multiplied by every word multiplier the word covers.
    pub fn word_score(board: &Board, word: &FormedWord) -> u32 {
        let mut seen: HashSet<Coord> = HashSet::new();
        let mut sum = 0;
        let mut word_multiplier = 1;
        for (coord, letter) in &word.cells {
            if !seen.insert(*coord) {
                continue;
            }
            let (lm, wm) = board
                .tile(*coord)
                .map(|t| (t.letter_multiplier, t.word_multiplier))
                .unwrap_or((1, 1));
            sum += letter.value * lm;
            word_multiplier *= wm;
        }
        sum * word_multiplier
    }

    /// Points a placement would earn, without consuming any bonus
    pub fn estimate(&self, board: &Board, words: &[&FormedWord], placed: usize) -> u32 {
        let mut total: u32 = words.iter().map(|w| Self::word_score(board, w)).sum();
        if placed == self.rack_capacity {
            total += self.bingo_bonus;
        }
        total
    }

    /// Score a committed placement and consume the bonus of every square involved.
    ///
    /// All words are scored before any bonus is reset, so a bonus square
    /// shared by the main word and a cross word applies to both.
    pub fn score_words(&self, board: &mut Board, words: &[&FormedWord], placed: usize) -> u32 {
        let total = self.estimate(board, words, placed);
        for word in words {
            for (coord, _) in &word.cells {
                if let Some(tile) = board.tile_mut(*coord) {
                    tile.consume_bonus();
                }
            }
        }
        total
    }

    /// Settle remaining racks once the game is over. Returns each player's point change.
    ///
    /// After a pass-out every player loses their rack value. Otherwise the
    /// first player with an empty rack collects the rack values of everyone
    /// else, who each lose theirs.
    pub fn end_of_game_adjustment(players: &mut [Player], reason: EndReason) -> Vec<(PlayerId, i32)> {
        let finisher = match reason {
            EndReason::TooManyPasses => None,
            EndReason::OutOfLetters => players.iter().position(|p| p.rack.is_empty()),
        };

        let mut deltas: Vec<(PlayerId, i32)> = Vec::with_capacity(players.len());
        let mut collected = 0;
        for (i, player) in players.iter_mut().enumerate() {
            if Some(i) == finisher {
                continue;
            }
            let value = player.rack.total_value() as i32;
            player.points -= value;
            collected += value;
            deltas.push((player.id, -value));
        }

        if let Some(i) = finisher {
            players[i].points += collected;
            deltas.insert(i, (players[i].id, collected));
        }
        deltas
    }
}
