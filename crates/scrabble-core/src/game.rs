//! Core game state machine.
//!
//! This module contains the main `GameState` struct: it owns the board, the
//! bag and every rack, accepts actions from the active player, and advances
//! the turn and revert timers.
//!
//! Time is supplied by the caller through [`GameState::tick`]. The engine
//! never reads a clock, so a server can drive it from an interval and tests
//! can drive it by hand.

use crate::actions::{Action, EndReason, GameEvent, Placement, RejectReason};
use crate::board::{Board, BoardLayout, Coord, Direction};
use crate::dictionary::Dictionary;
use crate::letters::LetterBag;
use crate::player::{Player, PlayerId, RACK_CAPACITY};
use crate::scoring::ScoreCalculator;
use crate::validator::{plan_placement, ActionValidator};
use crate::words::WordResolver;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Consecutive passes that end the game
pub const DEFAULT_MAX_CONSECUTIVE_PASSES: u32 = 6;

/// Bonus for placing a full rack
pub const DEFAULT_BINGO_BONUS: u32 = 50;

/// Time an invalid placement stays on the board before it is taken back
pub const DEFAULT_REVERT_DELAY_MS: u64 = 3_000;

/// Time a player has to act before the turn is passed for them
pub const DEFAULT_TURN_DURATION_MS: u64 = 60_000;

/// Rules and timings for one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rack_capacity: usize,
    pub max_consecutive_passes: u32,
    pub bingo_bonus: u32,
    pub revert_delay_ms: u64,
    /// Zero disables the turn timer
    pub turn_duration_ms: u64,
    pub layout: BoardLayout,
    /// Whether a bot with no playable word swaps its rack instead of passing
    pub bot_exchanges_when_stuck: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rack_capacity: RACK_CAPACITY,
            max_consecutive_passes: DEFAULT_MAX_CONSECUTIVE_PASSES,
            bingo_bonus: DEFAULT_BINGO_BONUS,
            revert_delay_ms: DEFAULT_REVERT_DELAY_MS,
            turn_duration_ms: DEFAULT_TURN_DURATION_MS,
            layout: BoardLayout::Standard,
            bot_exchanges_when_stuck: false,
        }
    }
}

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// The active player may submit an action
    WaitingForAction,
    /// An invalid placement is on the board waiting to be reverted
    Resolving,
    /// Game is over
    Finished { reason: EndReason },
}

/// Whose turn it is and how the game has been going
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub active_player: PlayerId,
    /// Passes in a row; any other action resets this to zero
    pub consecutive_passes: u32,
    /// Turn number (starts at 1)
    pub turn_number: u32,
}

impl TurnState {
    pub fn new(active_player: PlayerId) -> Self {
        Self {
            active_player,
            consecutive_passes: 0,
            turn_number: 1,
        }
    }
}

/// A lexically invalid placement waiting to be taken back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRevert {
    pub player: PlayerId,
    pub placements: Vec<Placement>,
    pub remaining_ms: u64,
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("{0}")]
    Rejected(#[from] RejectReason),

    #[error("A placement is still being reverted")]
    RevertPending,

    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("Game is over")]
    GameOver,
}

/// The complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// The game board
    pub board: Board,
    /// Letters not yet drawn
    pub bag: LetterBag,
    /// All players, indexed by id
    pub players: Vec<Player>,
    pub turn: TurnState,
    pub phase: GamePhase,
    pub config: GameConfig,
    /// Time left in the current turn, `None` while the timer is not running
    pub turn_timer_ms: Option<u64>,
    /// At most one placement awaits revert at any time
    pub pending_revert: Option<PendingRevert>,
    /// Random number generator seed (for deterministic replays)
    rng_seed: u64,
}

impl GameState {
    /// Create a new game: shuffle the bag, deal full racks and pick who starts
    pub fn new(player_names: Vec<String>, config: GameConfig) -> Self {
        Self::with_seed(player_names, config, rand::thread_rng().gen())
    }

    /// Create a new game with a fixed seed
    pub fn with_seed(player_names: Vec<String>, config: GameConfig, seed: u64) -> Self {
        assert!(
            (2..=4).contains(&player_names.len()),
            "Must have 2-4 players"
        );

        let mut rng = StdRng::seed_from_u64(seed);
        let mut bag = LetterBag::shuffled(&mut rng);

        let mut players: Vec<Player> = player_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(i as PlayerId, name))
            .collect();
        for player in &mut players {
            player.rack.add(bag.draw_up_to(config.rack_capacity));
        }

        // First player is random
        let first = rng.gen_range(0..players.len()) as PlayerId;
        players[first as usize].active = true;

        let turn_timer_ms = (config.turn_duration_ms > 0).then_some(config.turn_duration_ms);

        Self {
            board: Board::with_layout(config.layout),
            bag,
            players,
            turn: TurnState::new(first),
            phase: GamePhase::WaitingForAction,
            config,
            turn_timer_ms,
            pending_revert: None,
            rng_seed: seed,
        }
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub fn active_player(&self) -> PlayerId {
        self.turn.active_player
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Finished { .. })
    }

    pub fn validator(&self) -> ActionValidator {
        ActionValidator::new(self.config.rack_capacity)
    }

    pub fn scorer(&self) -> ScoreCalculator {
        ScoreCalculator::new(self.config.bingo_bonus, self.config.rack_capacity)
    }

    /// Structural check of an action against the current state. Never mutates.
    pub fn validate(&self, action: &Action) -> Result<(), RejectReason> {
        self.validator()
            .validate(action, &self.board, &self.players, &self.turn, self.bag.len())
    }

    /// Every player's points, in id order
    pub fn scores(&self) -> Vec<(PlayerId, i32)> {
        self.players.iter().map(|p| (p.id, p.points)).collect()
    }

    /// Players tied at the highest score once the game is finished
    pub fn winners(&self) -> Vec<PlayerId> {
        if !self.is_finished() {
            return Vec::new();
        }
        let best = match self.players.iter().map(|p| p.points).max() {
            Some(best) => best,
            None => return Vec::new(),
        };
        self.players
            .iter()
            .filter(|p| p.points == best)
            .map(|p| p.id)
            .collect()
    }

    /// Apply an action to the game state
    pub fn apply_action(
        &mut self,
        action: Action,
        dictionary: &dyn Dictionary,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }

        let player = action.player();
        if self.get_player(player).is_none() {
            return Err(GameError::UnknownPlayer(player));
        }

        if let Some(pending) = &self.pending_revert {
            if pending.player == player {
                return Err(GameError::RevertPending);
            }
            return Err(RejectReason::WrongTurn.into());
        }

        if let Err(reason) = self.validate(&action) {
            debug!(player, ?reason, "Action rejected");
            return Err(reason.into());
        }

        // Accepted: the turn countdown stops here
        self.turn_timer_ms = None;

        match action {
            Action::PlaceLetter {
                word,
                x,
                y,
                direction,
                ..
            } => self.perform_placement(player, &word, Coord::new(x, y), direction, dictionary),
            Action::ExchangeLetter { letters, .. } => self.perform_exchange(player, &letters),
            Action::PassTurn { .. } => Ok(self.perform_pass(player, false)),
        }
    }

    /// Advance the timers by `elapsed_ms`.
    ///
    /// A pending revert fires once its delay has fully elapsed. Otherwise a
    /// running turn timer that runs out passes the turn for the active
    /// player. Time left over after a deadline fires is dropped.
    pub fn tick(&mut self, elapsed_ms: u64) -> Vec<GameEvent> {
        if self.is_finished() {
            return Vec::new();
        }

        if let Some(mut pending) = self.pending_revert.take() {
            pending.remaining_ms = pending.remaining_ms.saturating_sub(elapsed_ms);
            if pending.remaining_ms > 0 {
                self.pending_revert = Some(pending);
                return Vec::new();
            }
            return self.revert_placement(pending);
        }

        if let Some(remaining) = self.turn_timer_ms {
            let remaining = remaining.saturating_sub(elapsed_ms);
            if remaining > 0 {
                self.turn_timer_ms = Some(remaining);
                return Vec::new();
            }
            let player = self.turn.active_player;
            info!(player, "Turn timed out");
            self.turn_timer_ms = None;
            return self.perform_pass(player, true);
        }

        Vec::new()
    }

    fn perform_placement(
        &mut self,
        player: PlayerId,
        word: &str,
        start: Coord,
        direction: Direction,
        dictionary: &dyn Dictionary,
    ) -> Result<Vec<GameEvent>, GameError> {
        let idx = player as usize;
        let (plan, placements) =
            plan_placement(word, start, direction, &self.board, &self.players[idx].rack)
                .ok_or(RejectReason::MissingLetters {
                    has_wildcard: self.players[idx].rack.has_wildcard(),
                })?;

        self.players[idx].rack.take(&plan);
        for placement in &placements {
            self.board.place(placement.coord, placement.letter);
        }

        let resolution =
            WordResolver::new(&self.board, &placements).resolve(&placements, direction, dictionary);

        if !resolution.is_valid() {
            let delay = self.config.revert_delay_ms;
            info!(player, words = ?resolution.texts(), delay, "Placement formed no valid word");
            self.phase = GamePhase::Resolving;
            self.pending_revert = Some(PendingRevert {
                player,
                placements: placements.clone(),
                remaining_ms: delay,
            });
            return Ok(vec![GameEvent::PlacementInvalid {
                player,
                placements,
                words: resolution.texts(),
                revert_in_ms: delay,
            }]);
        }

        let valid = resolution.valid_words();
        let scorer = self.scorer();
        let points = scorer.score_words(&mut self.board, &valid, placements.len());
        let words: Vec<String> = valid.iter().map(|w| w.text()).collect();

        let total = {
            let p = &mut self.players[idx];
            p.points += points as i32;
            p.points
        };
        self.turn.consecutive_passes = 0;
        info!(player, ?words, points, total, "Placement committed");

        let mut events = vec![GameEvent::LettersPlaced {
            player,
            placements,
            words,
            points,
            total,
        }];
        events.extend(self.refill_rack(player));
        events.extend(self.end_turn());
        Ok(events)
    }

    fn perform_exchange(
        &mut self,
        player: PlayerId,
        letters: &[char],
    ) -> Result<Vec<GameEvent>, GameError> {
        let idx = player as usize;
        let rack = &mut self.players[idx].rack;
        let plan = rack.plan(letters).ok_or(RejectReason::MissingLetters {
            has_wildcard: rack.has_wildcard(),
        })?;

        let taken = rack.take(&plan);
        let count = taken.len();

        // Draw before returning so the swapped letters cannot come straight back
        let drawn = self.bag.draw_up_to(count);
        self.players[idx].rack.add(drawn);
        self.bag.return_letters(taken);
        let mut rng = StdRng::seed_from_u64(self.rng_seed ^ u64::from(self.turn.turn_number));
        self.bag.shuffle(&mut rng);

        self.turn.consecutive_passes = 0;
        info!(player, count, "Letters exchanged");

        let mut events = vec![GameEvent::LettersExchanged { player, count }];
        events.extend(self.end_turn());
        Ok(events)
    }

    fn perform_pass(&mut self, player: PlayerId, timed_out: bool) -> Vec<GameEvent> {
        self.turn.consecutive_passes += 1;
        debug!(player, timed_out, passes = self.turn.consecutive_passes, "Turn passed");

        let mut events = vec![GameEvent::TurnPassed { player, timed_out }];
        events.extend(self.end_turn());
        events
    }

    /// Take an invalid placement back off the board and return its letters.
    /// The turn still counts, with zero points.
    fn revert_placement(&mut self, pending: PendingRevert) -> Vec<GameEvent> {
        let player = pending.player;
        let mut coords = Vec::with_capacity(pending.placements.len());
        let mut letters = Vec::with_capacity(pending.placements.len());
        for placement in &pending.placements {
            if let Some(letter) = self.board.remove(placement.coord) {
                letters.push(letter);
            }
            coords.push(placement.coord);
        }
        if let Some(p) = self.players.get_mut(player as usize) {
            p.rack.add(letters);
        }

        self.phase = GamePhase::WaitingForAction;
        self.turn.consecutive_passes = 0;
        info!(player, "Placement reverted");

        let mut events = vec![GameEvent::PlacementReverted { player, coords }];
        events.extend(self.end_turn());
        events
    }

    /// Top the player's rack back up from the bag; a short bag is fine
    fn refill_rack(&mut self, player: PlayerId) -> Option<GameEvent> {
        let p = self.players.get_mut(player as usize)?;
        let missing = self.config.rack_capacity.saturating_sub(p.rack.len());
        let drawn = self.bag.draw_up_to(missing);
        if drawn.is_empty() {
            return None;
        }
        let count = drawn.len();
        p.rack.add(drawn);
        Some(GameEvent::LettersDrawn { player, count })
    }

    fn end_reason(&self) -> Option<EndReason> {
        if self.turn.consecutive_passes >= self.config.max_consecutive_passes {
            Some(EndReason::TooManyPasses)
        } else if self.bag.is_empty() && self.players.iter().any(|p| p.rack.is_empty()) {
            Some(EndReason::OutOfLetters)
        } else {
            None
        }
    }

    fn end_turn(&mut self) -> Vec<GameEvent> {
        if let Some(reason) = self.end_reason() {
            return self.finish(reason);
        }

        let player = self.turn.active_player;
        let next_player = ((player as usize + 1) % self.players.len()) as PlayerId;
        for p in &mut self.players {
            p.active = p.id == next_player;
        }
        self.turn.active_player = next_player;
        self.turn.turn_number += 1;
        self.phase = GamePhase::WaitingForAction;
        self.turn_timer_ms =
            (self.config.turn_duration_ms > 0).then_some(self.config.turn_duration_ms);

        vec![GameEvent::TurnEnded {
            player,
            next_player,
        }]
    }

    fn finish(&mut self, reason: EndReason) -> Vec<GameEvent> {
        ScoreCalculator::end_of_game_adjustment(&mut self.players, reason);
        for p in &mut self.players {
            p.active = false;
        }
        self.phase = GamePhase::Finished { reason };
        self.turn_timer_ms = None;
        self.pending_revert = None;

        let scores = self.scores();
        let winners = self.winners();
        info!(?reason, ?scores, ?winners, "Game ended");
        vec![GameEvent::GameEnded {
            reason,
            scores,
            winners,
        }]
    }
}
