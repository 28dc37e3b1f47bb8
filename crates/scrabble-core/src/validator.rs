//! Structural validation of actions.
//!
//! Validation is a pure function of the proposed action and a read-only view
//! of the game. It never mutates anything, so the bot can run it against
//! thousands of hypothetical placements, and it is safe to call from several
//! threads over a shared snapshot.
//!
//! Rules are checked in a fixed order and the first failure wins:
//! turn ownership, word shape, bounds, tile conflicts, new letters, rack
//! sufficiency, then center coverage or adjacency.

use crate::actions::{Action, Placement, RejectReason};
use crate::board::{Board, Coord, Direction, BOARD_MAX, CENTER};
use crate::game::TurnState;
use crate::letters::Letter;
use crate::player::{Player, Rack, RackUse};

/// Checks actions against the board, the acting player's rack and the turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionValidator {
    /// Letters the bag must hold for an exchange to be allowed
    pub rack_capacity: usize,
}

impl ActionValidator {
    pub fn new(rack_capacity: usize) -> Self {
        Self { rack_capacity }
    }

    pub fn validate(
        &self,
        action: &Action,
        board: &Board,
        players: &[Player],
        turn: &TurnState,
        bag_len: usize,
    ) -> Result<(), RejectReason> {
        let player = action.player();
        if player != turn.active_player {
            return Err(RejectReason::WrongTurn);
        }
        let rack = match players.get(player as usize) {
            Some(p) => &p.rack,
            None => return Err(RejectReason::WrongTurn),
        };

        match action {
            Action::PlaceLetter {
                word, x, y, direction, ..
            } => self.validate_placement(word, Coord::new(*x, *y), *direction, board, rack),
            Action::ExchangeLetter { letters, .. } => self.validate_exchange(letters, rack, bag_len),
            Action::PassTurn { .. } => Ok(()),
        }
    }

    fn validate_placement(
        &self,
        word: &str,
        start: Coord,
        direction: Direction,
        board: &Board,
        rack: &Rack,
    ) -> Result<(), RejectReason> {
        let cells = covered_cells(word, start, direction)?;

        let mut demand = Vec::with_capacity(cells.len());
        for &(coord, ch) in &cells {
            match board.letter_at(coord) {
                Some(existing) if !existing.matches(ch) => return Err(RejectReason::Conflict),
                Some(_) => {}
                None => demand.push(ch),
            }
        }
        if demand.is_empty() {
            return Err(RejectReason::NoNewLetters);
        }

        if !rack.has_letters(&demand) {
            return Err(RejectReason::MissingLetters {
                has_wildcard: rack.has_wildcard(),
            });
        }

        if board.is_empty() {
            if !cells.iter().any(|&(coord, _)| coord == CENTER) {
                return Err(RejectReason::NotOnCenter);
            }
        } else {
            let touches = cells
                .iter()
                .any(|&(coord, _)| board.is_occupied(coord) || board.has_neighbour(coord));
            if !touches {
                return Err(RejectReason::NotAdjacent);
            }
        }

        Ok(())
    }

    fn validate_exchange(
        &self,
        letters: &[char],
        rack: &Rack,
        bag_len: usize,
    ) -> Result<(), RejectReason> {
        if letters.is_empty() {
            return Err(RejectReason::NothingToExchange);
        }
        if bag_len < self.rack_capacity {
            return Err(RejectReason::BagTooSmall {
                remaining: bag_len,
                required: self.rack_capacity,
            });
        }
        if !rack.has_letters(letters) {
            return Err(RejectReason::MissingLetters {
                has_wildcard: rack.has_wildcard(),
            });
        }
        Ok(())
    }
}

/// Every cell a word covers, paired with the character it asks for there.
///
/// Fails with `InvalidWord` for an empty or non-alphabetic word and with
/// `Overflow` if any cell would fall off the board.
pub fn covered_cells(
    word: &str,
    start: Coord,
    direction: Direction,
) -> Result<Vec<(Coord, char)>, RejectReason> {
    if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(RejectReason::InvalidWord);
    }
    let len = word.chars().count();
    if !start.in_bounds() || start.along(direction) + len - 1 > BOARD_MAX {
        return Err(RejectReason::Overflow);
    }
    Ok(word
        .chars()
        .enumerate()
        .map(|(i, ch)| (start.offset(direction, i), ch))
        .collect())
}

/// Work out which rack letters a placement uses and what lands on the board.
///
/// Only empty covered cells receive a letter. Wildcards are bound to the
/// character they stand for. Returns `None` if the word does not fit or the
/// rack cannot supply it; callers are expected to have validated first.
pub fn plan_placement(
    word: &str,
    start: Coord,
    direction: Direction,
    board: &Board,
    rack: &Rack,
) -> Option<(Vec<RackUse>, Vec<Placement>)> {
    let empty: Vec<(Coord, char)> = covered_cells(word, start, direction)
        .ok()?
        .into_iter()
        .filter(|&(coord, _)| !board.is_occupied(coord))
        .collect();
    let demand: Vec<char> = empty.iter().map(|&(_, ch)| ch).collect();
    let plan = rack.plan(&demand)?;

    let placements = empty
        .iter()
        .zip(&plan)
        .map(|(&(coord, ch), usage)| {
            let letter = match usage {
                RackUse::Wildcard(_) => Letter::bound_blank(ch),
                RackUse::Exact(i) => rack.letters()[*i],
            };
            Placement { coord, letter }
        })
        .collect();
    Some((plan, placements))
}
