//! Scrabble-style word game engine
//!
//! This crate provides the core game logic, including:
//! - Letters, the letter bag and per-player racks with wildcard substitution
//! - The 15x15 board with one-shot letter and word multipliers
//! - Structural validation of placements, exchanges and passes
//! - Word resolution against a pluggable dictionary
//! - Scoring and the end-of-game rack settlement
//! - The turn state machine with turn and revert timers
//! - Bot players that search the board for scoring placements
//!
//! # Architecture
//!
//! The engine is transport-agnostic and clock-agnostic. A host feeds it
//! actions through [`GameState::apply_action`] and elapsed time through
//! [`GameState::tick`], and receives [`GameEvent`]s back.
//!
//! # Modules
//!
//! - [`letters`]: Letter tiles, distribution and the bag
//! - [`board`]: Coordinates, tiles and the board
//! - [`player`]: Racks and players
//! - [`actions`]: Actions, rejection reasons and events
//! - [`validator`]: Structural action validation
//! - [`words`]: Formed-word resolution
//! - [`scoring`]: Word scores and end-of-game adjustment
//! - [`dictionary`]: Dictionary trait and word lists
//! - [`game`]: Game state machine
//! - [`bot`]: Bot move generation

pub mod actions;
pub mod board;
pub mod bot;
pub mod dictionary;
pub mod game;
pub mod letters;
pub mod player;
pub mod scoring;
pub mod validator;
pub mod words;

// Re-export commonly used types
pub use actions::{Action, EndReason, GameEvent, Placement, RejectReason};
pub use board::{Board, BoardLayout, Coord, Direction, Tile, BOARD_SIZE, CENTER};
pub use bot::{pick_bot_name, Bot, BotDifficulty, Candidate, BOT_NAMES};
pub use dictionary::{Dictionary, DictionaryError, WordList, WordPattern};
pub use game::{GameConfig, GameError, GamePhase, GameState, PendingRevert, TurnState};
pub use letters::{BagError, Letter, LetterBag, WILDCARD};
pub use player::{has_letters_in_rack, Player, PlayerId, Rack, RackUse, RACK_CAPACITY};
pub use scoring::ScoreCalculator;
pub use validator::ActionValidator;
pub use words::{FormedWord, Resolution, WordResolver};
