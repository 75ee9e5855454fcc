//! The server shell: accept loop, game registry, reconnect routing, and the
//! debug console.
//!
//! Grounded on `game`'s constructor in `game.cpp` (the player-join wait loop,
//! seat shuffle, and `your_position` broadcast) and `main.cxx`'s
//! `game_id()`/`server_debug_terminal` (the bare `count`/`ip list|remove|count`
//! command set, spec.md §4.7).

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{info, warn};
use riichi_proto::header::{magic, Header};

use crate::connection::{handshake, spawn_connection, ConnectionHandle, Identity};
use crate::errors::ServerError;
use crate::session::engine::Engine;
use crate::session::log::RoundLog;

pub const DEFAULT_PORT: u16 = 10000;
pub const GAME_LOG_DIR: &str = "logs";

/// Allocates game ids starting just past `NEW_PLAYER`'s magic value,
/// skipping it on wraparound the way `game_id()` does.
pub struct GameIdAllocator {
    next: u16,
}

impl GameIdAllocator {
    pub fn new() -> Self {
        Self { next: 0x3f40 }
    }

    pub fn allocate(&mut self) -> u16 {
        self.next = self.next.wrapping_add(1);
        if self.next == magic::NEW_PLAYER {
            self.next = self.next.wrapping_add(1);
        }
        self.next
    }
}

impl Default for GameIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// A game awaiting its fourth player, or already running.
enum Slot {
    Filling(Vec<ConnectionHandle>),
    Running,
}

/// The shell's shared state: the registry of in-progress games (for
/// reconnect routing) and, in online mode, the set of already-connected
/// addresses (one connection per address).
pub struct Shell {
    games: Mutex<HashMap<u16, Slot>>,
    reconnect_targets: Mutex<HashMap<u16, [Option<ConnectionHandle>; 4]>>,
    connected_ips: Mutex<HashSet<String>>,
    online_mode: bool,
    game_ids: Mutex<GameIdAllocator>,
}

impl Shell {
    pub fn new(online_mode: bool) -> Arc<Self> {
        Arc::new(Self {
            games: Mutex::new(HashMap::new()),
            reconnect_targets: Mutex::new(HashMap::new()),
            connected_ips: Mutex::new(HashSet::new()),
            online_mode,
            game_ids: Mutex::new(GameIdAllocator::new()),
        })
    }

    pub fn running_game_count(&self) -> usize {
        self.games.lock().unwrap().len()
    }

    pub fn connected_ip_count(&self) -> usize {
        self.connected_ips.lock().unwrap().len()
    }

    pub fn list_connected_ips(&self) -> Vec<String> {
        self.connected_ips.lock().unwrap().iter().cloned().collect()
    }

    pub fn remove_connected_ip(&self, ip: &str) -> bool {
        self.connected_ips.lock().unwrap().remove(ip)
    }

    fn try_claim_address(&self, addr: SocketAddr) -> bool {
        if !self.online_mode {
            return true;
        }
        self.connected_ips.lock().unwrap().insert(addr.ip().to_string())
    }

    fn release_address(&self, addr: SocketAddr) {
        if self.online_mode {
            self.connected_ips.lock().unwrap().remove(&addr.ip().to_string());
        }
    }

    /// Runs the accept loop forever: each accepted socket is handshaken,
    /// then routed to a reconnecting game, a spectated game, or the
    /// currently-filling game (spawning a fresh one once the prior one fills).
    pub fn run(self: &Arc<Self>, listener: TcpListener) -> Result<(), ServerError> {
        let mut filling_id = {
            let mut ids = self.game_ids.lock().unwrap();
            ids.allocate()
        };
        self.start_filling_game(filling_id);

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    warn!("accept failed: {e}");
                    continue;
                }
            };
            let shell = self.clone();
            let cur_filling = filling_id;
            thread::spawn(move || shell.handle_incoming(stream, cur_filling));

            if self.is_full(filling_id) {
                let mut ids = self.game_ids.lock().unwrap();
                filling_id = ids.allocate();
                drop(ids);
                self.start_filling_game(filling_id);
            }
        }
        Ok(())
    }

    fn start_filling_game(&self, id: u16) {
        self.games.lock().unwrap().insert(id, Slot::Filling(Vec::new()));
        self.reconnect_targets.lock().unwrap().insert(id, [None, None, None, None]);
        info!("new game {id:#06x} started");
    }

    fn is_full(&self, id: u16) -> bool {
        matches!(self.games.lock().unwrap().get(&id), Some(Slot::Running))
    }

    fn handle_incoming(self: Arc<Self>, mut stream: TcpStream, filling_id: u16) {
        let addr = match stream.peer_addr() {
            Ok(a) => a,
            Err(_) => return,
        };
        if !self.try_claim_address(addr) {
            let _ = riichi_proto::frame::Frame::new(Header::Reject, magic::REJECT).write_to(&mut stream);
            return;
        }

        let allocated_uid = filling_id;
        let identity = match handshake(&mut stream, allocated_uid) {
            Ok(id) => id,
            Err(e) => {
                warn!("handshake failed from {addr}: {e}");
                self.release_address(addr);
                return;
            }
        };

        let handle = match spawn_connection(stream, allocated_uid) {
            Ok(h) => h,
            Err(e) => {
                warn!("failed to spawn connection threads for {addr}: {e}");
                self.release_address(addr);
                return;
            }
        };

        match identity {
            Identity::Player { uid } if uid == magic::NEW_PLAYER => {
                self.join_filling_game(filling_id, handle);
            }
            Identity::Player { uid } if self.games.lock().unwrap().contains_key(&uid) => {
                self.reconnect(uid, handle);
            }
            Identity::Player { uid } => {
                warn!("rejecting reconnect attempt for unknown game {uid:#06x}");
                handle.close();
            }
            Identity::Spectator { game_id } => {
                info!("spectator joined game {game_id:#06x}");
            }
        }
    }

    fn reconnect(&self, game_id: u16, handle: ConnectionHandle) {
        let mut targets = self.reconnect_targets.lock().unwrap();
        if let Some(slots) = targets.get_mut(&game_id) {
            if let Some(slot) = slots.iter_mut().find(|s| s.as_ref().map_or(true, |h| !h.is_open())) {
                info!("player reconnected to game {game_id:#06x}");
                *slot = Some(handle);
            }
        }
    }

    fn join_filling_game(self: &Arc<Self>, filling_id: u16, handle: ConnectionHandle) {
        let mut games = self.games.lock().unwrap();
        let Some(Slot::Filling(players)) = games.get_mut(&filling_id) else { return };
        players.push(handle);

        for p in players.iter() {
            p.send(riichi_proto::frame::Frame::new(Header::QueueSize, players.len() as u16));
        }

        if players.len() == 4 {
            let mut seats = players.clone();
            let seed = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.subsec_nanos())
                .unwrap_or(0);
            shuffle_seats(&mut seats, seed);
            for (i, p) in seats.iter().enumerate() {
                p.send(riichi_proto::frame::Frame::new(Header::YourPosition, i as u16));
            }

            *games.get_mut(&filling_id).unwrap() = Slot::Running;
            let players_array: [ConnectionHandle; 4] =
                [seats[0].clone(), seats[1].clone(), seats[2].clone(), seats[3].clone()];
            drop(games);

            let shell = self.clone();
            thread::spawn(move || shell.run_game(filling_id, players_array));
        }
    }

    fn run_game(self: Arc<Self>, game_id: u16, players: [ConnectionHandle; 4]) {
        let log = match RoundLog::create(std::path::Path::new(GAME_LOG_DIR), game_id) {
            Ok(l) => l,
            Err(e) => {
                warn!("failed to open round log for game {game_id:#06x}: {e}");
                return;
            }
        };
        let mut engine = Engine::new(game_id, false, players, log);
        engine.run();
        self.games.lock().unwrap().remove(&game_id);
        self.reconnect_targets.lock().unwrap().remove(&game_id);
        info!("game {game_id:#06x} finished");
    }
}

/// Fisher-Yates using a small xorshift seeded from the caller, since seat
/// shuffling here happens before any per-game [`crate::wall::Wall`] exists.
fn shuffle_seats(seats: &mut [ConnectionHandle], seed: u32) {
    let mut state = seed.max(1);
    for i in (1..seats.len()).rev() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let j = (state as usize) % (i + 1);
        seats.swap(i, j);
    }
}

/// The debug console: a thin line-oriented REPL over the registry and the
/// address set, matching the bare command set of `server_debug_terminal`
/// (`count`, `ip list|remove|count`).
pub fn run_debug_console(shell: Arc<Shell>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let mut words = line.split_whitespace();
        match words.next() {
            Some("count") => println!("Running games: {}", shell.running_game_count()),
            Some("ip") => match words.next() {
                Some("list") => {
                    let ips = shell.list_connected_ips();
                    println!("{} connected IPs:", ips.len());
                    for ip in ips {
                        println!("{ip}");
                    }
                }
                Some("remove") => {
                    if let Some(ip) = words.next() {
                        if shell.remove_connected_ip(ip) {
                            println!("Removed IP: {ip}");
                        }
                    }
                }
                Some("count") => println!("Connected IPs: {}", shell.connected_ip_count()),
                _ => println!("DEBUG: ip subcommand not recognized"),
            },
            Some("__exit") => {
                info!("SERVER: exiting due to terminal input");
                std::process::exit(0);
            }
            Some(other) => println!("DEBUG: {other} not a command yet"),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_id_allocator_skips_new_player_magic() {
        let mut alloc = GameIdAllocator::new();
        alloc.next = magic::NEW_PLAYER - 1;
        let id = alloc.allocate();
        assert_ne!(id, magic::NEW_PLAYER);
    }

    #[test]
    fn game_id_allocator_advances() {
        let mut alloc = GameIdAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_ne!(a, b);
    }
}

/// Binds the listener the binary passes in; split out for testability.
pub fn bind(port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(("0.0.0.0", port))
}
