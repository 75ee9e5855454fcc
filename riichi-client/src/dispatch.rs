//! The receive thread: reads frames off the socket, auto-replies to pings
//! inline, and folds everything else into the shared [`SharedMirror`].
//!
//! Grounded on `receiver.cpp`'s `R::recv_impl` loop: the original replies to
//! `ping` directly from the socket rather than handing it to the consumer,
//! and otherwise queues frames for `game::turn()` to read one at a time. This
//! version folds that second half into mutations on the mirror instead of a
//! queue, since there's no second consumer thread here that needs raw frames.
//!
//! A bare `Tile` frame is ambiguous on its own -- `draw()`, `dispatch_call()`,
//! and `discard_tile()` all broadcast it the same way. [`session::Pending`]
//! disambiguates by tracking which control header (`this_player_drew`,
//! `this_player_pong`/`chow`/`kong`) preceded it; absent a pending draw or
//! call, a bare `Tile` means the active player just discarded it.

use std::io;
use std::net::TcpStream;
use std::sync::Arc;

use log::{info, warn};
use riichi_decomp::decompose::is_agari;
use riichi_decomp::hand::Hand;
use riichi_elements::meld::{Meld, MeldKind};
use riichi_elements::player::{Seat, Wind};
use riichi_elements::tile::Tile;
use riichi_proto::frame::{Frame, FrameError};
use riichi_proto::header::{magic, Header};
use thiserror::Error;

use crate::session::{Pending, SharedMirror};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Runs until the socket closes or a frame can't be decoded. Meant to be the
/// body of a dedicated thread; `stream` must be a clone of the same
/// `TcpStream` the input thread writes to.
pub fn run(mut stream: TcpStream, mirror: Arc<SharedMirror>) -> Result<(), DispatchError> {
    loop {
        let frame = match Frame::read_from(&mut stream) {
            Ok(f) => f,
            Err(FrameError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                info!("CLIENT: connection closed by server");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if frame.header == Header::Ping {
            Frame::new(Header::Ping, magic::PING).write_to(&mut stream)?;
            continue;
        }

        handle(frame, &mirror);
    }
}

fn handle(frame: Frame, mirror: &SharedMirror) {
    match frame.header {
        Header::QueueSize => info!("CLIENT: {} players waiting", frame.payload),
        Header::YourPosition => {
            mirror.with(|m| m.my_seat = Seat::new(frame.payload as u8));
            info!("CLIENT: seated at position {}", frame.payload);
        }
        Header::NewRound => {
            let prevailing = frame.payload >> 2;
            let round_no = (frame.payload & 3) as u8;
            mirror.with(|m| {
                for seat in &mut m.seats {
                    *seat = Default::default();
                }
                m.dora_indicators.clear();
                m.prevailing_wind = wind_from_u16(prevailing);
                m.dealer = Seat::new(round_no);
                m.cur_player = Seat::new(round_no);
                m.pending = None;
                m.reveal = None;
            });
            info!("CLIENT: new round, dealer is seat {}", round_no);
        }
        Header::ThisPlayerDrew => {
            let seat = Seat::new(frame.payload as u8);
            mirror.with(|m| {
                m.cur_player = seat;
                m.pending = Some(Pending::Draw(seat));
            });
        }
        Header::ThisPlayerHand => {
            let seat = Seat::new(frame.payload as u8);
            mirror.with(|m| m.reveal = Some((seat, Vec::new())));
        }
        Header::ClosedHand => {
            if frame.payload == magic::END_STREAM {
                mirror.with(|m| {
                    if let Some((seat, tiles)) = m.reveal.take() {
                        m.seats[seat.value() as usize].hand = tiles;
                    }
                });
            }
            // START_STREAM needs no action: `this_player_hand` already opened
            // `reveal`.
        }
        Header::Tile => {
            let tile = Tile::from_id9(frame.payload);
            mirror.with(|m| apply_tile(m, tile));
        }
        Header::DoraIndicator => {
            let tile = Tile::from_id9(frame.payload);
            mirror.with(|m| m.dora_indicators.push(tile));
            info!("CLIENT: new dora indicator {}", Tile::from_id9(frame.payload));
        }
        Header::ThisPlayerPong | Header::ThisPlayerChow | Header::ThisPlayerKong => {
            let seat = Seat::new(frame.payload as u8);
            let header = frame.header;
            mirror.with(|m| begin_call(m, seat, header));
            info!("CLIENT: seat {seat} called {}", call_label(header));
        }
        Header::ThisPlayerRiichi => {
            let seat = Seat::new(frame.payload as u8);
            mirror.with(|m| m.seats[seat.value() as usize].riichi = true);
            info!("CLIENT: seat {seat} declared riichi");
        }
        Header::ThisPlayerTsumo | Header::ThisPlayerRon => {
            let seat = Seat::new(frame.payload as u8);
            info!("CLIENT: seat {seat} won by {}", if frame.header == Header::ThisPlayerTsumo { "tsumo" } else { "ron" });
        }
        Header::ThisPlayerWon => {
            let seat = Seat::new(frame.payload as u8);
            info!("CLIENT: seat {seat} collects points");
        }
        Header::ThisManyPoints => {
            info!("CLIENT: {} points", frame.payload as i16);
        }
        Header::FuCount => info!("CLIENT: {} fu", frame.payload),
        Header::YakuFanCount => info!("CLIENT: {} han", frame.payload),
        Header::YakuList | Header::WinningYaku => {
            info!("CLIENT: yaku id {}", frame.payload);
        }
        Header::ExhaustiveDraw => {
            let reason = match frame.payload {
                magic::TENPAI => "tenpai",
                magic::NO_TEN => "no-ten",
                magic::FOUR_KONGS => "four kongs",
                magic::NINE_TERMINALS => "nine terminals",
                magic::FOUR_WINDS => "four winds",
                _ => "unknown",
            };
            info!("CLIENT: exhaustive draw ({reason})");
        }
        Header::Reject => warn!("CLIENT: server rejected last command"),
        Header::Error => warn!("CLIENT: server reported an error"),
        other => {
            info!("CLIENT: unhandled header {other} payload {}", frame.payload);
        }
    }
}

/// Starts collecting a called meld's tiles, or (for a kong, which reuses the
/// same header for both self-declared and called forms) defers its exact
/// shape until the kongd tile itself arrives.
fn begin_call(m: &mut crate::session::Mirror, seat: Seat, header: Header) {
    let discarder = m.cur_player;
    let (kind, claimed, want) = match header {
        Header::ThisPlayerPong => (MeldKind::Pong, Some(m.cur_tile), 2),
        Header::ThisPlayerChow => (MeldKind::Chow, Some(m.cur_tile), 2),
        Header::ThisPlayerKong if seat == m.cur_player => (MeldKind::ClosedKong, None, 1),
        Header::ThisPlayerKong => (MeldKind::OpenKong, Some(m.cur_tile), 3),
        _ => return,
    };
    m.pending = Some(Pending::Call { seat, kind, discarder, claimed, want, have: Vec::new() });
    m.cur_player = seat;
}

fn apply_tile(m: &mut crate::session::Mirror, tile: Tile) {
    if let Some((_, tiles)) = m.reveal.as_mut() {
        if tile.is_valid() {
            tiles.push(tile);
        }
        return;
    }

    match m.pending.take() {
        Some(Pending::Draw(seat)) => {
            if tile.is_valid() {
                m.seats[seat.value() as usize].hand.push(tile);
                m.seats[seat.value() as usize].hand.sort();
            }
            m.cur_tile = tile;
        }
        Some(Pending::Call { seat, kind, discarder, claimed, want, mut have }) => {
            have.push(tile);
            if let Some(pos) = m.seats[seat.value() as usize].hand.iter().position(|t| t.id9() == tile.id9()) {
                m.seats[seat.value() as usize].hand.remove(pos);
            }
            if have.len() < want {
                m.pending = Some(Pending::Call { seat, kind, discarder, claimed, want, have });
                return;
            }

            let kind = if kind == MeldKind::ClosedKong && has_matching_open_pong(&m.seats[seat.value() as usize].melds, have[0]) {
                MeldKind::AddedKong
            } else {
                kind
            };
            let called_from = seat.offset_to(discarder).max(1);
            let meld = build_meld(kind, claimed, &have, called_from);
            m.seats[seat.value() as usize].melds.push(meld);
        }
        None => {
            // A bare Tile with no pending draw/call context: the active
            // player discarded it.
            let seat = m.cur_player;
            if let Some(pos) = m.seats[seat.value() as usize].hand.iter().position(|t| t.id9() == tile.id9()) {
                m.seats[seat.value() as usize].hand.remove(pos);
            }
            m.seats[seat.value() as usize].discards.push(tile);
            m.cur_tile = tile;
        }
    }
}

fn has_matching_open_pong(melds: &[Meld], tile: Tile) -> bool {
    melds.iter().any(|meld| meld.kind() == MeldKind::Pong && meld.first().id7() == tile.id7())
}

fn build_meld(kind: MeldKind, claimed: Option<Tile>, have: &[Tile], called_from: u8) -> Meld {
    match kind {
        MeldKind::Pong => Meld::pong([claimed.unwrap(), have[0], have[1]], called_from),
        MeldKind::Chow => {
            let mut members = [claimed.unwrap(), have[0], have[1]];
            members.sort();
            Meld::chow(members, called_from)
        }
        MeldKind::OpenKong => Meld::open_kong([claimed.unwrap(), have[0], have[1], have[2]], called_from),
        MeldKind::ClosedKong => Meld::closed_kong([have[0], have[0], have[0], have[0]]),
        MeldKind::AddedKong => Meld::added_kong([have[0], have[0], have[0], have[0]], called_from),
    }
}

fn call_label(header: Header) -> &'static str {
    match header {
        Header::ThisPlayerPong => "pong",
        Header::ThisPlayerChow => "chow",
        _ => "kong",
    }
}

fn wind_from_u16(n: u16) -> Wind {
    match n & 0b11 {
        0 => Wind::East,
        1 => Wind::South,
        2 => Wind::West,
        _ => Wind::North,
    }
}

/// True if the mirrored hand plus `winning_tile` forms a complete hand --
/// used by the input thread to validate a `T`/`R` command locally before
/// sending it, the way `game::turn()` checks before issuing `call_tsumo`.
pub fn can_declare_win(hand: &[Tile], melds: &[Meld], winning_tile: Tile) -> bool {
    let mut trial = Hand::new(hand.to_vec());
    trial.push(winning_tile);
    is_agari(trial.tiles(), melds)
}
