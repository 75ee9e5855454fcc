//! Per-round game state: the four seats' hands, melds, and discards, plus
//! the shared round-level bookkeeping (dealer, wind, dora, deposit).
//!
//! Ported from `game`'s private data members in `game.hpp`: the struct of
//! arrays (`hands`, `melds`, `discards`, `flags`) becomes one `[SeatState; 4]`
//! array indexed by [`Seat`], since Rust's `Seat` newtype makes that indexing
//! self-documenting where the original relied on a bare `int`.

use riichi_decomp::hand::Hand;
use riichi_elements::meld::Meld;
use riichi_elements::player::{Seat, Wind};
use riichi_elements::tile::Tile;

use crate::wall::Wall;

pub const RIICHI_DEPOSIT: i32 = 1000;
/// Honba bonus: added to a win's score (×3 to the winner) and subtracted
/// from the loser(s) each round the dealer repeats, per round at ×100.
pub const BONUS_SCORE_STEP: i32 = 100;
pub const MANGAN: i32 = 2000;

#[derive(Debug, Default)]
pub struct SeatFlags {
    pub riichi: bool,
    pub double_riichi: bool,
    pub ippatsu: bool,
    /// Still this player's first discard opportunity with no intervening call,
    /// the precondition for [`Self::double_riichi`] (`FIRST_TURN_FLAG`).
    pub first_turn: bool,
}

#[derive(Debug)]
pub struct SeatState {
    pub hand: Hand,
    pub melds: Vec<Meld>,
    pub discards: Vec<Tile>,
    pub score: i32,
    pub flags: SeatFlags,
}

impl SeatState {
    fn new(starting_score: i32) -> Self {
        Self {
            hand: Hand::new(Vec::with_capacity(14)),
            melds: Vec::new(),
            discards: Vec::with_capacity(20),
            score: starting_score,
            flags: SeatFlags { first_turn: true, ..Default::default() },
        }
    }

    pub fn is_closed(&self) -> bool {
        self.melds.iter().all(|m| !m.is_open())
    }

    pub fn open_pongs_on(&self, tile: Tile) -> Vec<Tile> {
        self.melds
            .iter()
            .filter(|m| matches!(m.kind(), riichi_elements::meld::MeldKind::Pong) && m.repr().id7() == tile.id7())
            .map(|m| m.repr())
            .collect()
    }
}

pub const STARTING_SCORE: i32 = 30000;

#[derive(Debug)]
pub struct GameState {
    pub seats: [SeatState; 4],
    pub wall: Wall,
    pub dora_indicators: Vec<Tile>,
    pub prevailing_wind: Wind,
    pub dealer: Seat,
    pub cur_player: Seat,
    pub cur_tile: Tile,
    pub deposit: i32,
    pub bonus_score: i32,
    pub heads_up: bool,
    pub first_turn: bool,
    pub kong_flag: bool,
    pub other_kong_flag: bool,
    pub closed_kong_flag: bool,
    /// Kongs declared this round, across all seats; five triggers FOUR_KONGS.
    pub kong_count: u32,
}

impl GameState {
    pub fn new(heads_up: bool) -> Self {
        Self {
            seats: [
                SeatState::new(STARTING_SCORE),
                SeatState::new(STARTING_SCORE),
                SeatState::new(STARTING_SCORE),
                SeatState::new(STARTING_SCORE),
            ],
            wall: Wall::new(),
            dora_indicators: Vec::with_capacity(5),
            prevailing_wind: Wind::East,
            dealer: Seat::EAST,
            cur_player: Seat::EAST,
            cur_tile: Tile::INVALID,
            deposit: 0,
            bonus_score: 0,
            heads_up,
            first_turn: true,
            kong_flag: false,
            other_kong_flag: false,
            closed_kong_flag: false,
            kong_count: 0,
        }
    }

    pub fn seat(&self, seat: Seat) -> &SeatState {
        &self.seats[seat.value() as usize]
    }

    pub fn seat_mut(&mut self, seat: Seat) -> &mut SeatState {
        &mut self.seats[seat.value() as usize]
    }

    pub fn cur(&self) -> &SeatState {
        self.seat(self.cur_player)
    }

    pub fn cur_mut(&mut self) -> &mut SeatState {
        self.seat_mut(self.cur_player)
    }

    /// Resets per-round state (hands/melds/discards) and reshuffles the
    /// wall, leaving scores, dealer, and prevailing wind untouched.
    pub fn reset_round(&mut self) {
        for seat in &mut self.seats {
            seat.hand = Hand::new(Vec::with_capacity(14));
            seat.melds.clear();
            seat.discards.clear();
            seat.flags = SeatFlags { first_turn: true, ..Default::default() };
        }
        self.dora_indicators.clear();
        self.wall.reset();
        self.cur_tile = Tile::INVALID;
        self.first_turn = true;
        self.kong_flag = false;
        self.other_kong_flag = false;
        self.closed_kong_flag = false;
        self.kong_count = 0;
    }

    /// Counts how many of `indicator`'s dora successors appear across a
    /// seat's concealed hand and melds, mirroring `game::calc_dora`'s use
    /// in both `call_tsumo` and the ron branch of `opponent_call`.
    pub fn dora_count_for(&self, seat: Seat, indicator: Tile) -> u32 {
        let successor = indicator.dora_successor();
        let state = self.seat(seat);
        let mut n = state.hand.tiles().iter().filter(|t| t.id7() == successor.id7()).count() as u32;
        for meld in &state.melds {
            for t in meld.tiles() {
                if *t != Tile::INVALID && t.id7() == successor.id7() {
                    n += 1;
                }
            }
        }
        n
    }

    pub fn total_dora_count(&self, seat: Seat) -> u32 {
        self.dora_indicators.iter().map(|&ind| self.dora_count_for(seat, ind)).sum()
    }
}
