//! WebSocket protocol messages for the word game server.

use scrabble_core::{
    Action, Board, BotDifficulty, GameEvent, GamePhase, PlayerId, Rack, TurnState,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Open a new game, optionally against a bot
    CreateGame {
        player_name: String,
        max_players: u8,
        bot: Option<BotDifficulty>,
    },

    /// Join an existing game by id
    JoinGame { game_id: Uuid, player_name: String },

    /// Leave the current game
    LeaveGame,

    /// Start the game (host only)
    StartGame,

    /// Submit a turn action
    Action { action: Action },

    /// Request the list of games waiting for players
    ListGames,

    /// Request the best recorded scores
    GetLeaderboard,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with assigned connection id
    Welcome { player_id: Uuid },

    GameCreated { game_id: Uuid },

    JoinedGame { game: RoomInfo },

    LeftGame,

    /// Seats changed (player joined, left or disconnected)
    GameUpdated { game: RoomInfo },

    GameList { games: Vec<RoomInfo> },

    GameStarted { state: GameView },

    /// Fresh snapshot after a turn result
    GameState { state: GameView },

    /// Result of the sender's own action
    ActionResult {
        success: bool,
        events: Vec<GameEvent>,
        error: Option<String>,
    },

    /// Turn results produced by other players, bots or timers
    Events { events: Vec<GameEvent> },

    Leaderboard { entries: Vec<LeaderboardEntry> },

    Error { message: String },

    Pong,

    /// Final standings by name
    GameOver {
        scores: Vec<(String, i32)>,
        winners: Vec<String>,
    },
}

/// Game information for clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: Uuid,
    pub name: String,
    pub players: Vec<PlayerInfo>,
    pub bot: Option<String>,
    pub max_players: u8,
    pub host_id: Uuid,
    pub status: RoomStatus,
}

/// A connected player's seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: Uuid,
    pub name: String,
    pub connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Waiting,
    InGame,
    Finished,
}

/// What one seat is allowed to see of a running game.
///
/// Opponents' racks are reduced to their size; only the viewer's own rack
/// is included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub board: Board,
    /// Plain-text rendering of the board, one string per row
    pub rows: Vec<String>,
    pub bag_remaining: usize,
    pub players: Vec<SeatView>,
    pub you: Option<PlayerId>,
    pub rack: Option<Rack>,
    pub turn: TurnState,
    pub phase: GamePhase,
    pub turn_timer_ms: Option<u64>,
    pub revert_pending: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatView {
    pub id: PlayerId,
    pub name: String,
    pub points: i32,
    pub rack_size: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub points: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrabble_core::Direction;

    #[test]
    fn test_client_message_wire_shape() {
        let msg = ClientMessage::Action {
            action: Action::place("bateau", 4, 7, Direction::Horizontal, 0),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "Action");
        assert_eq!(json["payload"]["action"]["PlaceLetter"]["word"], "bateau");

        let text = r#"{"type":"JoinGame","payload":{"game_id":"6f1c2a44-5d1e-4c5b-9a0e-1b2c3d4e5f60","player_name":"Ana"}}"#;
        match serde_json::from_str::<ClientMessage>(text).unwrap() {
            ClientMessage::JoinGame { player_name, .. } => assert_eq!(player_name, "Ana"),
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_unit_messages_have_no_payload() {
        let json = serde_json::to_string(&ServerMessage::Pong).unwrap();
        assert_eq!(json, r#"{"type":"Pong"}"#);
    }
}
