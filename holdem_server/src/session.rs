//! Per-connection session handling.
//!
//! One OS thread per client, blocking reads on its socket. The engine
//! stays free of I/O: this layer owns the (table id, seat name) to
//! socket map and pushes `UPDATE_GAME` snapshots to every seat after a
//! state change. Snapshots are rendered under the table lock but
//! written after it is released, so a stalled connection can never
//! stall the game.

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use thiserror::Error;

use holdem::protocol::{self, Command, ProtocolError};
use holdem::{PlayerName, Registry, TableError, TableSnapshot};

type SharedWriter = Arc<Mutex<TcpStream>>;

/// Key into the peer map: table id plus lower-cased seat name, so the
/// map agrees with the table's case-insensitive name uniqueness.
type PeerKey = (String, String);

#[derive(Debug, Error)]
enum CommandError {
    #[error("unknown game id {0}")]
    UnknownGame(String),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// What a successfully handled command sends back: an optional status
/// line for the sender, and the id of a table whose seats should all
/// receive a fresh snapshot.
struct Reply {
    status: Option<String>,
    broadcast: Option<String>,
}

/// Shared server state: the table registry plus the seat -> connection
/// map that the engine itself is not allowed to know about.
pub struct SessionState {
    registry: Registry,
    peers: Mutex<HashMap<PeerKey, SharedWriter>>,
}

fn peer_key(game_id: &str, name: &PlayerName) -> PeerKey {
    (game_id.to_string(), name.as_str().to_ascii_lowercase())
}

fn send_line(writer: &SharedWriter, line: &str) -> io::Result<()> {
    let mut stream = writer.lock().unwrap_or_else(|e| e.into_inner());
    stream.write_all(line.as_bytes())?;
    stream.write_all(b"\n")?;
    stream.flush()
}

impl SessionState {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            peers: Mutex::new(HashMap::new()),
        }
    }

    fn peers(&self) -> MutexGuard<'_, HashMap<PeerKey, SharedWriter>> {
        self.peers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Push the table's current snapshot to every seated connection.
    /// The table lock is released before any socket write.
    fn broadcast(&self, game_id: &str) {
        let Some(table) = self.registry.get(game_id) else {
            return;
        };
        let line = {
            let guard = table.lock().unwrap_or_else(|e| e.into_inner());
            match protocol::update_game_line(&TableSnapshot::of(&guard)) {
                Ok(line) => line,
                Err(e) => {
                    error!("table {game_id}: snapshot serialization failed: {e}");
                    return;
                }
            }
        };
        let writers: Vec<SharedWriter> = self
            .peers()
            .iter()
            .filter(|((id, _), _)| id == game_id)
            .map(|(_, writer)| Arc::clone(writer))
            .collect();
        for writer in writers {
            if let Err(e) = send_line(&writer, &line) {
                // The failing peer's own read loop will clean it up.
                warn!("table {game_id}: broadcast write failed: {e}");
            }
        }
    }

    fn dispatch(
        &self,
        line: &str,
        writer: &SharedWriter,
        membership: &mut Option<(String, PlayerName)>,
    ) -> Result<Reply, CommandError> {
        match Command::parse(line)? {
            Command::Create { name } => {
                let (id, _) = self.registry.create_table(name.clone());
                self.peers()
                    .insert(peer_key(&id, &name), Arc::clone(writer));
                *membership = Some((id.clone(), name));
                Ok(Reply {
                    status: Some(format!("Game created successfully! Game ID: {id}")),
                    broadcast: Some(id),
                })
            }
            Command::Join { name, game_id } => {
                let table = self
                    .registry
                    .get(&game_id)
                    .ok_or_else(|| CommandError::UnknownGame(game_id.clone()))?;
                table
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .add_seat(name.clone())?;
                self.peers()
                    .insert(peer_key(&game_id, &name), Arc::clone(writer));
                *membership = Some((game_id.clone(), name));
                Ok(Reply {
                    status: Some(format!("Joined game: {game_id}")),
                    broadcast: Some(game_id),
                })
            }
            Command::StartGame { game_id } => {
                let table = self
                    .registry
                    .get(&game_id)
                    .ok_or_else(|| CommandError::UnknownGame(game_id.clone()))?;
                table
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .start_hand()?;
                Ok(Reply {
                    status: Some("Game started".to_string()),
                    broadcast: Some(game_id),
                })
            }
            Command::Action {
                game_id,
                name,
                action,
                amount,
            } => {
                let table = self
                    .registry
                    .get(&game_id)
                    .ok_or_else(|| CommandError::UnknownGame(game_id.clone()))?;
                table
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .apply_action(&name, action, amount)?;
                Ok(Reply {
                    status: None,
                    broadcast: Some(game_id),
                })
            }
            Command::NextGame { game_id, name } => {
                let table = self
                    .registry
                    .get(&game_id)
                    .ok_or_else(|| CommandError::UnknownGame(game_id.clone()))?;
                table
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .next_hand(&name)?;
                Ok(Reply {
                    status: Some("Next hand started".to_string()),
                    broadcast: Some(game_id),
                })
            }
            Command::Leave { name, game_id } => {
                self.leave(&game_id, &name)?;
                if membership
                    .as_ref()
                    .is_some_and(|(id, own)| *id == game_id && own.eq_ignore_case(&name))
                {
                    *membership = None;
                }
                let broadcast = self.registry.get(&game_id).map(|_| game_id.clone());
                Ok(Reply {
                    status: Some(format!("Left game: {game_id}")),
                    broadcast,
                })
            }
        }
    }

    /// Remove a seat, drop its connection mapping, and deregister the
    /// table if it is now empty.
    fn leave(&self, game_id: &str, name: &PlayerName) -> Result<(), CommandError> {
        let table = self
            .registry
            .get(game_id)
            .ok_or_else(|| CommandError::UnknownGame(game_id.to_string()))?;
        table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove_seat(name)?;
        self.peers().remove(&peer_key(game_id, name));
        self.registry.remove_if_empty(game_id);
        Ok(())
    }

    /// Connection teardown: the seat leaves its table as if it had
    /// sent `LEAVE_GAME`, and the remaining seats hear about it.
    fn disconnect(&self, membership: Option<(String, PlayerName)>) {
        let Some((game_id, name)) = membership else {
            return;
        };
        info!("{name} disconnected from table {game_id}");
        if self.leave(&game_id, &name).is_ok() && self.registry.get(&game_id).is_some() {
            self.broadcast(&game_id);
        }
    }
}

/// Serve one client until it disconnects. Protocol and domain errors
/// are answered with an `ERROR:` line and the connection stays open;
/// only socket-level failures end the session.
pub fn handle_connection(state: &Arc<SessionState>, stream: TcpStream) {
    let peer_addr = stream
        .peer_addr()
        .map_or_else(|_| "<unknown>".to_string(), |addr| addr.to_string());
    debug!("connection from {peer_addr}");

    let reader_stream = match stream.try_clone() {
        Ok(clone) => clone,
        Err(e) => {
            warn!("{peer_addr}: failed to clone stream: {e}");
            return;
        }
    };
    let writer: SharedWriter = Arc::new(Mutex::new(stream));
    let mut reader = BufReader::new(reader_stream);
    let mut membership: Option<(String, PlayerName)> = None;
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("{peer_addr}: read failed: {e}");
                break;
            }
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match state.dispatch(trimmed, &writer, &mut membership) {
            Ok(reply) => {
                let mut write_failed = false;
                if let Some(status) = reply.status {
                    write_failed = send_line(&writer, &status).is_err();
                }
                if let Some(game_id) = reply.broadcast {
                    state.broadcast(&game_id);
                }
                if write_failed {
                    break;
                }
            }
            Err(e) => {
                debug!("{peer_addr}: rejected {trimmed:?}: {e}");
                if send_line(&writer, &format!("ERROR:{e}")).is_err() {
                    break;
                }
            }
        }
    }

    debug!("connection from {peer_addr} closed");
    state.disconnect(membership);
}

/// Accept connections forever, one thread per client.
pub fn serve(listener: &TcpListener, state: &Arc<SessionState>) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let state = Arc::clone(state);
                thread::spawn(move || handle_connection(&state, stream));
            }
            Err(e) => warn!("accept failed: {e}"),
        }
    }
}
