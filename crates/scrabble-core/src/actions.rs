//! Game actions that players can take.
//!
//! This module defines the three actions a player can submit, the reasons an
//! action can be structurally rejected, and the events that result from an
//! accepted action.

use crate::board::{Coord, Direction};
use crate::letters::Letter;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Lay out `word` starting at (`x`, `y`).
    ///
    /// Lowercase characters take the matching rack letter (or a wildcard if
    /// none is left); uppercase characters are played with a wildcard.
    PlaceLetter {
        word: String,
        x: usize,
        y: usize,
        direction: Direction,
        player: PlayerId,
    },
    /// Swap rack letters for fresh ones from the bag
    ExchangeLetter { letters: Vec<char>, player: PlayerId },
    /// Give up the turn
    PassTurn { player: PlayerId },
}

impl Action {
    pub fn place(word: &str, x: usize, y: usize, direction: Direction, player: PlayerId) -> Self {
        Action::PlaceLetter {
            word: word.to_string(),
            x,
            y,
            direction,
            player,
        }
    }

    pub fn exchange(letters: &str, player: PlayerId) -> Self {
        Action::ExchangeLetter {
            letters: letters.chars().collect(),
            player,
        }
    }

    pub fn pass(player: PlayerId) -> Self {
        Action::PassTurn { player }
    }

    /// The player submitting this action
    pub fn player(&self) -> PlayerId {
        match self {
            Action::PlaceLetter { player, .. }
            | Action::ExchangeLetter { player, .. }
            | Action::PassTurn { player } => *player,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Action::PassTurn { .. })
    }
}

/// Why an action was refused. The submitting player may try again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("Not your turn")]
    WrongTurn,

    #[error("Word must be non-empty and alphabetic")]
    InvalidWord,

    #[error("Word runs off the board")]
    Overflow,

    #[error("Word conflicts with letters already on the board")]
    Conflict,

    #[error("Word does not add any new letter")]
    NoNewLetters,

    #[error("Missing letters in rack")]
    MissingLetters { has_wildcard: bool },

    #[error("First word must cover the center square")]
    NotOnCenter,

    #[error("Word must touch a letter already on the board")]
    NotAdjacent,

    #[error("No letters to exchange")]
    NothingToExchange,

    #[error("Bag holds {remaining} letters, {required} needed to exchange")]
    BagTooSmall { remaining: usize, required: usize },
}

/// A letter written to a board square by a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub coord: Coord,
    pub letter: Letter,
}

/// How a game came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The consecutive pass limit was reached
    TooManyPasses,
    /// The bag ran dry and a player emptied their rack
    OutOfLetters,
}

/// Events that occur as a result of actions and timers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A placement formed at least one valid word and was committed
    LettersPlaced {
        player: PlayerId,
        placements: Vec<Placement>,
        words: Vec<String>,
        points: u32,
        total: i32,
    },

    /// A placement formed no valid word; it stays on the board until reverted
    PlacementInvalid {
        player: PlayerId,
        placements: Vec<Placement>,
        words: Vec<String>,
        revert_in_ms: u64,
    },

    /// An invalid placement was taken back off the board
    PlacementReverted {
        player: PlayerId,
        coords: Vec<Coord>,
    },

    /// Letters were swapped with the bag
    LettersExchanged { player: PlayerId, count: usize },

    /// A player passed, either by choice or because their time ran out
    TurnPassed { player: PlayerId, timed_out: bool },

    /// Letters were drawn to refill a rack (hidden from other players)
    LettersDrawn { player: PlayerId, count: usize },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    /// The game is over; scores include the end-of-game adjustment
    GameEnded {
        reason: EndReason,
        scores: Vec<(PlayerId, i32)>,
        winners: Vec<PlayerId>,
    },
}
