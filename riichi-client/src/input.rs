//! The input thread: reads single-character commands from stdin, validates
//! them against the mirrored hand, and writes the corresponding frame(s) to
//! the server.
//!
//! Grounded on `client::game::turn()`'s intended command set (the switch is
//! unfinished reference code in the original; this implements the complete
//! set it was clearly meant to cover, not its literal fall-through body):
//! `p` pass, `R` ron, `T` tsumo, `r` riichi, `P` pong, `c`-`l` chow by
//! candidate pair, `K`-`N` kong (called or self-declared) by candidate quad,
//! `G` tsumogiri, `0`-`9` discard the n-th hand tile, `quit` to exit.
//!
//! A pong/chow/kong call is two or more frames on the wire: the declaring
//! header, then one `CallWithTile` per constituent tile the engine's
//! `collect_call_tiles` expects (section 4.6). A self-declared kong during
//! one's own self-call window instead sends a single `CallWithTile` aux
//! frame naming the kongd face.

use std::io::{self, BufRead, Write};
use std::net::TcpStream;
use std::sync::Arc;

use riichi_decomp::calls::{added_kong_available, chow_available, closed_kong_available, kong_available, pong_available};
use riichi_elements::tile::Tile;
use riichi_proto::frame::{Frame, FrameError};
use riichi_proto::header::Header;
use thiserror::Error;

use crate::dispatch::can_declare_win;
use crate::session::SharedMirror;

#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Runs the command loop until stdin closes or the user types `quit`.
pub fn run(mut stream: TcpStream, mirror: Arc<SharedMirror>) -> Result<(), InputError> {
    let stdin = io::stdin();
    print_prompt();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            print_prompt();
            continue;
        }
        if line == "quit" {
            return Ok(());
        }

        match dispatch_command(line, &mirror) {
            Ok(frames) => {
                for frame in frames {
                    frame.write_to(&mut stream)?;
                }
            }
            Err(msg) => println!("{msg}"),
        }
        print_prompt();
    }
    Ok(())
}

fn print_prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn dispatch_command(line: &str, mirror: &SharedMirror) -> Result<Vec<Frame>, String> {
    let cmd = line.chars().next().ok_or_else(|| "empty command".to_string())?;

    match cmd {
        'p' => Ok(vec![Frame::new(Header::PassCalls, 0)]),
        'R' => ron(mirror),
        'T' => tsumo(mirror),
        'r' => Ok(vec![Frame::new(Header::CallRiichi, 0)]),
        'P' => pong(mirror),
        'c'..='l' => chow(mirror, (cmd as u8 - b'c') as usize),
        'K'..='N' => kong(mirror, (cmd as u8 - b'K') as usize),
        'G' => tsumogiri(mirror),
        '0'..='9' => discard(mirror, (cmd as u8 - b'0') as usize),
        other => Err(format!("unrecognized command {other:?}")),
    }
}

fn ron(mirror: &SharedMirror) -> Result<Vec<Frame>, String> {
    mirror.with(|m| {
        let seat = m.my_seat;
        let melds = m.seats[seat.value() as usize].melds.clone();
        if can_declare_win(m.my_hand(), &melds, m.cur_tile) {
            Ok(vec![Frame::new(Header::CallRon, 0)])
        } else {
            Err("hand is not complete with the discarded tile".to_string())
        }
    })
}

fn tsumo(mirror: &SharedMirror) -> Result<Vec<Frame>, String> {
    mirror.with(|m| {
        let seat = m.my_seat;
        let melds = m.seats[seat.value() as usize].melds.clone();
        let hand = m.my_hand().to_vec();
        let drawn = m.cur_tile;
        if can_declare_win(&without_one(&hand, drawn), &melds, drawn) {
            Ok(vec![Frame::new(Header::CallTsumo, 0)])
        } else {
            Err("hand is not complete".to_string())
        }
    })
}

fn without_one(hand: &[Tile], tile: Tile) -> Vec<Tile> {
    let mut out = hand.to_vec();
    if let Some(pos) = out.iter().position(|t| t.id9() == tile.id9()) {
        out.remove(pos);
    }
    out
}

fn pong(mirror: &SharedMirror) -> Result<Vec<Frame>, String> {
    mirror.with(|m| {
        let seat = m.my_seat;
        let hand = &m.seats[seat.value() as usize].hand;
        if !pong_available(hand, m.cur_tile) {
            return Err("no pair to pong with".to_string());
        }
        let tiles: Vec<Tile> = hand.iter().filter(|t| t.id7() == m.cur_tile.id7()).take(2).copied().collect();
        let mut frames = vec![Frame::new(Header::CallPong, 0)];
        frames.extend(tiles.iter().map(|t| Frame::new(Header::CallWithTile, t.id9())));
        Ok(frames)
    })
}

fn chow(mirror: &SharedMirror, index: usize) -> Result<Vec<Frame>, String> {
    mirror.with(|m| {
        let seat = m.my_seat;
        let hand = &m.seats[seat.value() as usize].hand;
        let candidates = chow_available(hand, m.cur_tile);
        let Some(&(low, high)) = candidates.get(index) else {
            return Err(format!("no chow candidate #{index}"));
        };
        Ok(vec![
            Frame::new(Header::CallChow, index as u16),
            Frame::new(Header::CallWithTile, low.id9()),
            Frame::new(Header::CallWithTile, high.id9()),
        ])
    })
}

fn kong(mirror: &SharedMirror, index: usize) -> Result<Vec<Frame>, String> {
    mirror.with(|m| {
        let seat = m.my_seat;
        let hand = &m.seats[seat.value() as usize].hand;

        if m.is_my_turn() {
            let open_pongs: Vec<Tile> = m.seats[seat.value() as usize]
                .melds
                .iter()
                .filter(|meld| meld.kind() == riichi_elements::meld::MeldKind::Pong)
                .map(|meld| meld.first())
                .collect();

            let closed_candidates: Vec<Tile> = distinct_faces(hand).into_iter().filter(|&t| closed_kong_available(hand, t)).collect();
            if let Some(&tile) = closed_candidates.get(index) {
                return Ok(vec![Frame::new(Header::CallKong, 0), Frame::new(Header::CallWithTile, tile.id9())]);
            }

            let added_candidates: Vec<Tile> = open_pongs.iter().copied().filter(|&t| added_kong_available(&open_pongs, hand, t)).collect();
            let added_index = index.saturating_sub(closed_candidates.len());
            if let Some(&tile) = added_candidates.get(added_index) {
                return Ok(vec![Frame::new(Header::CallKong, 0), Frame::new(Header::CallWithTile, tile.id9())]);
            }
            Err("no kong available".to_string())
        } else if kong_available(hand, m.cur_tile) {
            let tiles: Vec<Tile> = hand.iter().filter(|t| t.id7() == m.cur_tile.id7()).take(3).copied().collect();
            let mut frames = vec![Frame::new(Header::CallKong, 0)];
            frames.extend(tiles.iter().map(|t| Frame::new(Header::CallWithTile, t.id9())));
            Ok(frames)
        } else {
            Err("no triplet to kong with".to_string())
        }
    })
}

fn distinct_faces(hand: &[Tile]) -> Vec<Tile> {
    let mut out: Vec<Tile> = Vec::new();
    for &t in hand {
        if !out.iter().any(|&u| u.id7() == t.id7()) {
            out.push(t);
        }
    }
    out
}

fn tsumogiri(mirror: &SharedMirror) -> Result<Vec<Frame>, String> {
    mirror.with(|m| Ok(vec![Frame::new(Header::DiscardTile, m.cur_tile.id9())]))
}

fn discard(mirror: &SharedMirror, index: usize) -> Result<Vec<Frame>, String> {
    mirror.with(|m| {
        let seat = m.my_seat;
        let hand = &m.seats[seat.value() as usize].hand;
        match hand.get(index) {
            Some(&tile) => Ok(vec![Frame::new(Header::DiscardTile, tile.id9())]),
            None => Err(format!("no tile at index {index}")),
        }
    })
}
