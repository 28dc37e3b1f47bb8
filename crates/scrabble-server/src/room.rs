//! Game room management.
//!
//! A room binds connection ids to engine seats and owns one `GameState`.

use rand::thread_rng;
use scrabble_core::{
    pick_bot_name, Action, Bot, BotDifficulty, Dictionary, GameConfig, GameError, GameEvent,
    GameState, PlayerId,
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::protocol::{GameView, PlayerInfo, RoomInfo, RoomStatus, SeatView};

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Game is full")]
    RoomFull,

    #[error("Player not in game")]
    PlayerNotInRoom,

    #[error("Not the host")]
    NotHost,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Not enough players")]
    NotEnoughPlayers,

    #[error("Game not started")]
    GameNotStarted,

    #[error("Action submitted for another seat")]
    WrongSeat,

    #[error(transparent)]
    Game(#[from] GameError),
}

/// A human player in a room.
#[derive(Debug, Clone)]
pub struct RoomPlayer {
    pub id: Uuid,
    pub name: String,
    pub connected: bool,
    /// Seat in the game, assigned when the game starts
    pub seat: Option<PlayerId>,
}

impl RoomPlayer {
    pub fn new(id: Uuid, name: String) -> Self {
        Self {
            id,
            name,
            connected: true,
            seat: None,
        }
    }

    pub fn to_info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            connected: self.connected,
        }
    }
}

/// A bot occupying one seat of the room.
pub struct RoomBot {
    pub name: String,
    pub difficulty: BotDifficulty,
    /// Engine driver, created when the game starts
    pub driver: Option<Bot>,
}

pub struct GameRoom {
    pub id: Uuid,
    pub name: String,
    pub max_players: u8,
    pub host_id: Uuid,
    pub status: RoomStatus,
    pub players: HashMap<Uuid, RoomPlayer>,
    /// Seat order of the human players
    pub player_order: Vec<Uuid>,
    pub bot: Option<RoomBot>,
    pub config: GameConfig,
    pub game: Option<GameState>,
}

impl GameRoom {
    pub fn new(
        id: Uuid,
        host_id: Uuid,
        host_name: String,
        max_players: u8,
        bot: Option<BotDifficulty>,
        config: GameConfig,
    ) -> Self {
        let mut players = HashMap::new();
        players.insert(host_id, RoomPlayer::new(host_id, host_name.clone()));

        let bot = bot.map(|difficulty| RoomBot {
            name: pick_bot_name(&mut thread_rng(), &host_name).to_string(),
            difficulty,
            driver: None,
        });

        Self {
            id,
            name: format!("{}'s Game", host_name),
            max_players: max_players.clamp(2, 4),
            host_id,
            status: RoomStatus::Waiting,
            players,
            player_order: vec![host_id],
            bot,
            config,
            game: None,
        }
    }

    /// Occupied seats, the bot included
    pub fn seat_count(&self) -> usize {
        self.players.len() + self.bot.is_some() as usize
    }

    pub fn is_full(&self) -> bool {
        self.seat_count() >= self.max_players as usize
    }

    pub fn add_player(&mut self, player_id: Uuid, name: String) -> Result<(), RoomError> {
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.is_full() {
            return Err(RoomError::RoomFull);
        }

        self.players.insert(player_id, RoomPlayer::new(player_id, name));
        self.player_order.push(player_id);
        Ok(())
    }

    /// Remove a player. Returns true if no human is left.
    pub fn remove_player(&mut self, player_id: Uuid) -> Result<bool, RoomError> {
        if self.players.remove(&player_id).is_none() {
            return Err(RoomError::PlayerNotInRoom);
        }
        self.player_order.retain(|&id| id != player_id);

        if player_id == self.host_id {
            if let Some(&next) = self.player_order.first() {
                self.host_id = next;
            }
        }

        Ok(self.players.is_empty())
    }

    pub fn set_player_connected(&mut self, player_id: Uuid, connected: bool) {
        if let Some(player) = self.players.get_mut(&player_id) {
            player.connected = connected;
        }
    }

    pub fn start_game(&mut self, requester_id: Uuid) -> Result<(), RoomError> {
        if requester_id != self.host_id {
            return Err(RoomError::NotHost);
        }
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.seat_count() < 2 {
            return Err(RoomError::NotEnoughPlayers);
        }

        let mut names = Vec::with_capacity(self.seat_count());
        for (seat, id) in self.player_order.iter().enumerate() {
            if let Some(player) = self.players.get_mut(id) {
                player.seat = Some(seat as PlayerId);
                names.push(player.name.clone());
            }
        }
        if let Some(bot) = self.bot.as_mut() {
            let seat = names.len() as PlayerId;
            bot.driver = Some(Bot::new(seat, bot.difficulty));
            names.push(bot.name.clone());
        }

        info!(room = %self.id, players = names.len(), "Game started");
        self.game = Some(GameState::new(names, self.config.clone()));
        self.status = RoomStatus::InGame;
        Ok(())
    }

    /// Apply a human action, then let the bot answer if it is up next.
    pub fn apply_action(
        &mut self,
        player_id: Uuid,
        action: Action,
        dictionary: &dyn Dictionary,
    ) -> Result<Vec<GameEvent>, RoomError> {
        let seat = self
            .players
            .get(&player_id)
            .ok_or(RoomError::PlayerNotInRoom)?
            .seat;
        let game = self.game.as_mut().ok_or(RoomError::GameNotStarted)?;
        let seat = seat.ok_or(RoomError::PlayerNotInRoom)?;
        if action.player() != seat {
            return Err(RoomError::WrongSeat);
        }

        let mut events = game.apply_action(action, dictionary)?;
        events.extend(self.play_bot(dictionary));
        self.update_status();
        Ok(events)
    }

    /// Advance the game's timers, then let the bot move if the turn passed to it.
    pub fn tick(&mut self, elapsed_ms: u64, dictionary: &dyn Dictionary) -> Vec<GameEvent> {
        let Some(game) = self.game.as_mut() else {
            return Vec::new();
        };
        let mut events = game.tick(elapsed_ms);
        events.extend(self.play_bot(dictionary));
        self.update_status();
        events
    }

    fn play_bot(&mut self, dictionary: &dyn Dictionary) -> Vec<GameEvent> {
        let (Some(game), Some(bot)) = (
            self.game.as_mut(),
            self.bot.as_mut().and_then(|b| b.driver.as_mut()),
        ) else {
            return Vec::new();
        };

        let mut events = Vec::new();
        while let Some(action) = bot.choose_action(game, dictionary) {
            match game.apply_action(action, dictionary) {
                Ok(produced) => events.extend(produced),
                Err(e) => {
                    debug!(room = %self.id, "Bot action refused: {}", e);
                    break;
                }
            }
        }
        events
    }

    fn update_status(&mut self) {
        if self.game.as_ref().is_some_and(|g| g.is_finished()) {
            self.status = RoomStatus::Finished;
        }
    }

    /// Snapshot of the game as seen by one connection.
    pub fn view_for(&self, player_id: Uuid) -> Option<GameView> {
        let game = self.game.as_ref()?;
        let you = self.players.get(&player_id).and_then(|p| p.seat);
        Some(GameView {
            board: game.board.clone(),
            rows: game.board.to_rows(),
            bag_remaining: game.bag.len(),
            players: game
                .players
                .iter()
                .map(|p| SeatView {
                    id: p.id,
                    name: p.name.clone(),
                    points: p.points,
                    rack_size: p.rack.len(),
                    active: p.active,
                })
                .collect(),
            you,
            rack: you
                .and_then(|seat| game.get_player(seat))
                .map(|p| p.rack.clone()),
            turn: game.turn,
            phase: game.phase,
            turn_timer_ms: game.turn_timer_ms,
            revert_pending: game.pending_revert.is_some(),
        })
    }

    /// Final scores of the human seats, by name
    pub fn human_scores(&self) -> Vec<(String, i32)> {
        let Some(game) = self.game.as_ref() else {
            return Vec::new();
        };
        self.player_order
            .iter()
            .filter_map(|id| self.players.get(id)?.seat)
            .filter_map(|seat| game.get_player(seat))
            .map(|p| (p.name.clone(), p.points))
            .collect()
    }

    pub fn seat_names(&self, seats: &[PlayerId]) -> Vec<String> {
        let Some(game) = self.game.as_ref() else {
            return Vec::new();
        };
        seats
            .iter()
            .filter_map(|&seat| game.get_player(seat))
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn to_info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id,
            name: self.name.clone(),
            players: self
                .player_order
                .iter()
                .filter_map(|id| self.players.get(id).map(|p| p.to_info()))
                .collect(),
            bot: self.bot.as_ref().map(|b| b.name.clone()),
            max_players: self.max_players,
            host_id: self.host_id,
            status: self.status,
        }
    }
}
