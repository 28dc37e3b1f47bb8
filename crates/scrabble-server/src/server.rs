//! WebSocket server, connection handling and the timer tick task.

use crate::protocol::{ClientMessage, LeaderboardEntry, RoomInfo, RoomStatus, ServerMessage};
use crate::room::GameRoom;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use scrabble_core::{GameConfig, GameEvent, WordList};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// All open games
    pub rooms: DashMap<Uuid, GameRoom>,
    /// Mapping from connection id to its game
    pub player_rooms: DashMap<Uuid, Uuid>,
    /// Mapping from connection id to its message sender
    pub player_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    /// Best final score per player name
    pub leaderboard: DashMap<String, i32>,
    pub dictionary: WordList,
    /// Settings for every new game
    pub config: GameConfig,
}

impl ServerState {
    pub fn new(dictionary: WordList, config: GameConfig) -> Self {
        Self {
            rooms: DashMap::new(),
            player_rooms: DashMap::new(),
            player_senders: DashMap::new(),
            leaderboard: DashMap::new(),
            dictionary,
            config,
        }
    }

    /// Send a message to a specific player.
    pub fn send_to_player(&self, player_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    /// Broadcast a message to all players in a room.
    pub fn broadcast_to_room(&self, room_id: Uuid, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(&room_id) {
            for player_id in room.players.keys() {
                self.send_to_player(*player_id, msg.clone());
            }
        }
    }

    /// Broadcast a message to all players in a room except one.
    pub fn broadcast_to_room_except(&self, room_id: Uuid, except: Uuid, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(&room_id) {
            for player_id in room.players.keys() {
                if *player_id != except {
                    self.send_to_player(*player_id, msg.clone());
                }
            }
        }
    }

    /// Send each player of a room their own view of the game.
    ///
    /// When the events close the game, the final standings are broadcast
    /// and the human scores are recorded on the leaderboard.
    pub fn publish_state(&self, room_id: Uuid, events: &[GameEvent]) {
        let Some(room) = self.rooms.get(&room_id) else {
            return;
        };
        for player_id in room.players.keys() {
            if let Some(view) = room.view_for(*player_id) {
                self.send_to_player(*player_id, ServerMessage::GameState { state: view });
            }
        }

        let ended = events.iter().find_map(|e| match e {
            GameEvent::GameEnded { scores, winners, .. } => Some((scores, winners)),
            _ => None,
        });
        if let Some((scores, winners)) = ended {
            let seats: Vec<_> = scores.iter().map(|(seat, _)| *seat).collect();
            let names = room.seat_names(&seats);
            let msg = ServerMessage::GameOver {
                scores: names
                    .into_iter()
                    .zip(scores.iter().map(|(_, points)| *points))
                    .collect(),
                winners: room.seat_names(winners),
            };
            for player_id in room.players.keys() {
                self.send_to_player(*player_id, msg.clone());
            }
            for (name, points) in room.human_scores() {
                self.record_score(name, points);
            }
        }
    }

    /// Keep the best score seen for a name.
    pub fn record_score(&self, name: String, points: i32) {
        info!(%name, points, "Recording final score");
        self.leaderboard
            .entry(name)
            .and_modify(|best| *best = (*best).max(points))
            .or_insert(points);
    }

    /// Leaderboard entries, best first.
    pub fn leaderboard_entries(&self) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .leaderboard
            .iter()
            .map(|e| LeaderboardEntry {
                name: e.key().clone(),
                points: *e.value(),
            })
            .collect();
        entries.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));
        entries
    }

    /// Get list of games waiting for players.
    pub fn get_waiting_rooms(&self) -> Vec<RoomInfo> {
        self.rooms
            .iter()
            .filter(|r| r.status == RoomStatus::Waiting)
            .map(|r| r.to_info())
            .collect()
    }

    /// Advance every running game by `elapsed_ms` and publish what happened.
    pub fn tick_rooms(&self, elapsed_ms: u64) {
        let running: Vec<Uuid> = self
            .rooms
            .iter()
            .filter(|r| r.status == RoomStatus::InGame)
            .map(|r| *r.key())
            .collect();

        for room_id in running {
            let events = match self.rooms.get_mut(&room_id) {
                Some(mut room) => room.tick(elapsed_ms, &self.dictionary),
                None => continue,
            };
            if events.is_empty() {
                continue;
            }
            self.broadcast_to_room(room_id, ServerMessage::Events { events: events.clone() });
            self.publish_state(room_id, &events);
        }
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Word game server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Drive the game timers every `period`.
///
/// The elapsed time handed to the games is measured, not assumed, so a late
/// tick still advances the timers by the real delay.
pub async fn run_ticker(state: Arc<ServerState>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    loop {
        interval.tick().await;
        let now = Instant::now();
        let elapsed = now.duration_since(last).as_millis() as u64;
        last = now;
        state.tick_rooms(elapsed);
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let player_id = Uuid::new_v4();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.player_senders.insert(player_id, tx);

    let welcome = serde_json::to_string(&ServerMessage::Welcome { player_id })?;
    ws_sender.send(Message::Text(welcome.into())).await?;

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(player_id, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {}", player_id, e);
                    state.send_to_player(
                        player_id,
                        ServerMessage::Error {
                            message: format!("Invalid message: {}", e),
                        },
                    );
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", player_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to_player(player_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", player_id, e);
                break;
            }
            _ => {}
        }
    }

    handle_disconnect(player_id, &state);
    state.player_senders.remove(&player_id);
    send_task.abort();

    info!("Connection closed for {}", player_id);
    Ok(())
}

fn send_error(state: &ServerState, player_id: Uuid, message: impl ToString) {
    state.send_to_player(
        player_id,
        ServerMessage::Error {
            message: message.to_string(),
        },
    );
}

/// Handle a client message.
fn handle_message(player_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::CreateGame {
            player_name,
            max_players,
            bot,
        } => {
            let room_id = Uuid::new_v4();
            let room = GameRoom::new(
                room_id,
                player_id,
                player_name,
                max_players,
                bot,
                state.config.clone(),
            );
            let room_info = room.to_info();

            state.rooms.insert(room_id, room);
            state.player_rooms.insert(player_id, room_id);

            state.send_to_player(player_id, ServerMessage::GameCreated { game_id: room_id });
            state.send_to_player(player_id, ServerMessage::JoinedGame { game: room_info });
        }

        ClientMessage::JoinGame {
            game_id,
            player_name,
        } => {
            let Some(mut room) = state.rooms.get_mut(&game_id) else {
                send_error(state, player_id, "Game not found");
                return;
            };
            match room.add_player(player_id, player_name) {
                Ok(()) => {
                    let room_info = room.to_info();
                    drop(room);
                    state.player_rooms.insert(player_id, game_id);

                    state.send_to_player(
                        player_id,
                        ServerMessage::JoinedGame {
                            game: room_info.clone(),
                        },
                    );
                    state.broadcast_to_room_except(
                        game_id,
                        player_id,
                        ServerMessage::GameUpdated { game: room_info },
                    );
                }
                Err(e) => {
                    drop(room);
                    send_error(state, player_id, e);
                }
            }
        }

        ClientMessage::LeaveGame => {
            handle_disconnect(player_id, state);
            state.send_to_player(player_id, ServerMessage::LeftGame);
        }

        ClientMessage::StartGame => {
            let Some(room_id) = state.player_rooms.get(&player_id).map(|r| *r) else {
                send_error(state, player_id, "Not in a game");
                return;
            };
            let Some(mut room) = state.rooms.get_mut(&room_id) else {
                return;
            };
            if let Err(e) = room.start_game(player_id) {
                drop(room);
                send_error(state, player_id, e);
                return;
            }
            // The bot may hold the first turn
            let events = room.tick(0, &state.dictionary);
            let views: Vec<_> = room
                .players
                .keys()
                .filter_map(|id| room.view_for(*id).map(|view| (*id, view)))
                .collect();
            drop(room);

            for (id, view) in views {
                state.send_to_player(id, ServerMessage::GameStarted { state: view });
            }
            if !events.is_empty() {
                state.broadcast_to_room(room_id, ServerMessage::Events { events: events.clone() });
                state.publish_state(room_id, &events);
            }
        }

        ClientMessage::Action { action } => {
            let Some(room_id) = state.player_rooms.get(&player_id).map(|r| *r) else {
                send_error(state, player_id, "Not in a game");
                return;
            };
            let Some(mut room) = state.rooms.get_mut(&room_id) else {
                return;
            };
            let result = room.apply_action(player_id, action, &state.dictionary);
            drop(room);

            match result {
                Ok(events) => {
                    state.send_to_player(
                        player_id,
                        ServerMessage::ActionResult {
                            success: true,
                            events: events.clone(),
                            error: None,
                        },
                    );
                    state.broadcast_to_room_except(
                        room_id,
                        player_id,
                        ServerMessage::Events {
                            events: events.clone(),
                        },
                    );
                    state.publish_state(room_id, &events);
                }
                Err(e) => {
                    state.send_to_player(
                        player_id,
                        ServerMessage::ActionResult {
                            success: false,
                            events: vec![],
                            error: Some(e.to_string()),
                        },
                    );
                }
            }
        }

        ClientMessage::ListGames => {
            let games = state.get_waiting_rooms();
            state.send_to_player(player_id, ServerMessage::GameList { games });
        }

        ClientMessage::GetLeaderboard => {
            let entries = state.leaderboard_entries();
            state.send_to_player(player_id, ServerMessage::Leaderboard { entries });
        }

        ClientMessage::Ping => {
            state.send_to_player(player_id, ServerMessage::Pong);
        }
    }
}

/// Release a connection's seat.
///
/// Players of a running game keep their seat and are only marked as
/// disconnected; their turns then run out on the turn timer.
fn handle_disconnect(player_id: Uuid, state: &Arc<ServerState>) {
    let Some((_, room_id)) = state.player_rooms.remove(&player_id) else {
        return;
    };
    let Some(mut room) = state.rooms.get_mut(&room_id) else {
        return;
    };

    if room.status == RoomStatus::InGame {
        room.set_player_connected(player_id, false);
    } else if room.remove_player(player_id).unwrap_or(false) {
        drop(room);
        state.rooms.remove(&room_id);
        info!(room = %room_id, "Game closed");
        return;
    }

    let room_info = room.to_info();
    drop(room);
    state.broadcast_to_room(room_id, ServerMessage::GameUpdated { game: room_info });
}
