//! The client's mirror of server-authoritative state: four seats' hands,
//! melds, discards, scores, plus dora indicators and round metadata.
//!
//! Grounded on `client::game`'s private data members (`game.hpp`): the
//! array-of-four layout is kept, indexed by [`riichi_elements::player::Seat`]
//! the way the server's `SeatState` array is.

use std::sync::Mutex;

use riichi_elements::meld::{Meld, MeldKind};
use riichi_elements::player::{Seat, Wind};
use riichi_elements::tile::Tile;

#[derive(Debug, Default)]
pub struct MirroredSeat {
    pub hand: Vec<Tile>,
    pub melds: Vec<Meld>,
    pub discards: Vec<Tile>,
    pub score: i32,
    pub riichi: bool,
}

/// What the next bare `Tile` frame(s) mean, set by whichever control header
/// (`this_player_drew`/`this_player_pong`/etc.) preceded them. Without this,
/// a `Tile` frame is ambiguous between "seat drew this", "seat called with
/// this", and "seat discarded this" -- the three shapes `draw`/`dispatch_call`
/// /`discard_tile` all broadcast as the same bare header.
#[derive(Debug, Clone)]
pub enum Pending {
    Draw(Seat),
    Call { seat: Seat, kind: MeldKind, discarder: Seat, claimed: Option<Tile>, want: usize, have: Vec<Tile> },
}

#[derive(Debug)]
pub struct Mirror {
    pub my_seat: Seat,
    pub seats: [MirroredSeat; 4],
    pub dora_indicators: Vec<Tile>,
    pub prevailing_wind: Wind,
    pub dealer: Seat,
    pub cur_player: Seat,
    pub cur_tile: Tile,
    pub pending: Option<Pending>,
    /// Set between a `this_player_hand`/`closed_hand` start-stream bracket
    /// and its end-stream marker: the seat whose full hand is being
    /// revealed, and the tiles collected so far.
    pub reveal: Option<(Seat, Vec<Tile>)>,
}

impl Mirror {
    pub fn new(my_seat: Seat) -> Self {
        Self {
            my_seat,
            seats: Default::default(),
            dora_indicators: Vec::new(),
            prevailing_wind: Wind::East,
            dealer: Seat::EAST,
            cur_player: Seat::EAST,
            cur_tile: Tile::INVALID,
            pending: None,
            reveal: None,
        }
    }

    pub fn my_hand(&self) -> &[Tile] {
        &self.seats[self.my_seat.value() as usize].hand
    }

    pub fn is_my_turn(&self) -> bool {
        self.cur_player == self.my_seat
    }

    pub fn seat_wind(&self) -> Wind {
        self.my_seat.wind_relative_to(self.dealer)
    }
}

/// The "single write mutex" spec.md §4.8 calls for: every mutation to the
/// mirror (from the dispatch thread) or read for local command validation
/// (from the input thread) goes through this lock.
pub struct SharedMirror(Mutex<Mirror>);

impl SharedMirror {
    pub fn new(my_seat: Seat) -> Self {
        Self(Mutex::new(Mirror::new(my_seat)))
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Mirror) -> R) -> R {
        let mut guard = self.0.lock().unwrap();
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_my_turn_checks_cur_player() {
        let mirror = Mirror::new(Seat::new(1));
        assert!(!mirror.is_my_turn());
    }

    #[test]
    fn seat_wind_rotates_with_dealer() {
        let mut mirror = Mirror::new(Seat::new(2));
        mirror.dealer = Seat::new(1);
        assert_eq!(mirror.seat_wind(), Wind::South);
    }
}
