//! WebSocket server and connection handling.

use crate::config::ServerConfig;
use crate::host::{catalog_message, PlayerSession};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::writer::{ChannelStore, SaveRequest};
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use outbreak_core::{Catalog, GameSession, PlayerProfile, Progress, SessionStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

const DEFAULT_DISPLAY_NAME: &str = "Player";

/// Server state shared across all connections.
pub struct ServerState {
    pub config: ServerConfig,
    pub catalog: Catalog,
    /// One live session per player, kept across reconnects
    pub sessions: DashMap<Uuid, PlayerSession>,
    /// Mapping from player ID to the sender of its one live connection
    pub player_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    saves: mpsc::UnboundedSender<SaveRequest>,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        catalog: Catalog,
        saves: mpsc::UnboundedSender<SaveRequest>,
    ) -> Self {
        Self {
            config,
            catalog,
            sessions: DashMap::new(),
            player_senders: DashMap::new(),
            saves,
        }
    }

    /// Send a message to a specific player.
    pub fn send_to_player(&self, player_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    /// The player's session, restoring saved progress on first use.
    pub fn session_for(
        &self,
        player_id: Uuid,
        display_name: Option<String>,
    ) -> RefMut<'_, Uuid, PlayerSession> {
        self.sessions
            .entry(player_id)
            .or_insert_with(|| self.open_session(player_id, display_name))
    }

    fn open_session(&self, player_id: Uuid, display_name: Option<String>) -> PlayerSession {
        let store = ChannelStore::new(self.config.progress_path(player_id), self.saves.clone());
        let store = SessionStore::open(Box::new(store)).with_config(self.config.session);
        let name = display_name
            .or_else(|| {
                store
                    .progress()
                    .player
                    .as_ref()
                    .map(|p| p.display_name.clone())
            })
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());
        info!("Opened session for player {}", player_id);
        PlayerSession::new(PlayerProfile::new(player_id, name), store)
    }
}

/// Run the WebSocket server.
pub async fn run_server(state: Arc<ServerState>) -> anyhow::Result<()> {
    let addr = state.config.addr;
    let listener = TcpListener::bind(addr).await?;
    info!("Outbreak server listening on {}", addr);

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

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Assign a fresh player ID; the client may switch with Resume
    let mut player_id = Uuid::new_v4();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.player_senders.insert(player_id, tx);

    // Send welcome message
    let welcome = ServerMessage::Welcome { player_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text)).await?;

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(&mut player_id, client_msg, &state),
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
            Err(e) => {
                error!("WebSocket error from {}: {}", player_id, e);
                break;
            }
            _ => {}
        }
    }

    handle_disconnect(player_id, &state);
    send_task.abort();

    info!("Connection closed for {}", player_id);
    Ok(())
}

/// Handle a client message.
pub fn handle_message(player_id: &mut Uuid, msg: ClientMessage, state: &ServerState) {
    match msg {
        ClientMessage::Ping => {
            state.send_to_player(*player_id, ServerMessage::Pong);
        }

        ClientMessage::Resume {
            player_id: target,
            display_name,
        } => {
            if target != *player_id {
                let Some((_, tx)) = state.player_senders.remove(&*player_id) else {
                    return;
                };
                match state.player_senders.entry(target) {
                    Entry::Occupied(_) => {
                        state.player_senders.insert(*player_id, tx);
                        state.send_to_player(
                            *player_id,
                            ServerMessage::Error {
                                message: "Player is already connected".to_string(),
                            },
                        );
                        return;
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(tx);
                    }
                }
                info!("Connection {} resumed as player {}", player_id, target);
                *player_id = target;
            }

            let progress = {
                let mut session = state.session_for(target, Some(display_name.clone()));
                session.rename(display_name);
                session.store.progress().clone()
            };
            state.send_to_player(
                target,
                ServerMessage::Resumed {
                    player_id: target,
                    progress,
                },
            );
        }

        ClientMessage::ListCatalog => {
            state.send_to_player(*player_id, catalog_message(&state.catalog));
        }

        ClientMessage::GetState if !state.sessions.contains_key(&*player_id) => {
            state.send_to_player(
                *player_id,
                ServerMessage::SessionState {
                    session: GameSession::default(),
                    progress: Progress::default(),
                },
            );
        }

        other => {
            let result = {
                let mut session = state.session_for(*player_id, None);
                session.handle(&state.catalog, other)
            };
            match result {
                Ok(replies) => {
                    for reply in replies {
                        state.send_to_player(*player_id, reply);
                    }
                }
                Err(e) => {
                    warn!("Rejected intent from {}: {}", player_id, e);
                    state.send_to_player(
                        *player_id,
                        ServerMessage::Error {
                            message: e.to_string(),
                        },
                    );
                }
            }
        }
    }
}

/// Handle player disconnect.
fn handle_disconnect(player_id: Uuid, state: &ServerState) {
    state.player_senders.remove(&player_id);

    // Sessions with nothing to resume are dropped; anything else stays for Resume
    let evicted = state.sessions.remove_if(&player_id, |_, session| {
        session.store.progress().is_blank() && !session.store.session().is_in_progress()
    });
    if evicted.is_some() {
        info!("Dropped idle session for player {}", player_id);
    } else if let Some(session) = state.sessions.get(&player_id) {
        info!(
            "Player {} disconnected with a {:?} session",
            player_id,
            session.store.session().game_type()
        );
    }
}
