//! The 136-tile wall: live draws, dead-wall dora, and the pacing RNG.
//!
//! Ported from `deck`/`deck.cpp`: a shuffled deque split into a live
//! drawable portion and a dead wall whose tail yields dora indicators.
//! The original's `std::mt19937` seeded from `std::random_device` becomes
//! `rand_mt`'s 64-bit Mersenne Twister seeded from OS entropy, matching the
//! "internal 64-bit Mersenne-Twister-class RNG" requirement.

use rand::RngCore;
use rand_mt::Mt64;
use riichi_elements::tile::{Suit, Tile};
use std::collections::VecDeque;

pub const DECK_SIZE: usize = 136;
pub const DEAD_WALL_SIZE: usize = 14;
pub const LIVE_WALL_SIZE: usize = DECK_SIZE - DEAD_WALL_SIZE;
pub const MAX_DORA_INDICATORS: usize = 5;

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum WallError {
    #[error("live wall is empty")]
    Empty,
    #[error("all {MAX_DORA_INDICATORS} dora indicators have already been revealed")]
    NoMoreDora,
}

pub struct Wall {
    tiles: VecDeque<Tile>,
    live_remaining: usize,
    dora_drawn: usize,
    rng: Mt64,
}

impl Wall {
    pub fn new() -> Self {
        let mut seed_bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut seed_bytes);
        let mut wall = Self {
            tiles: VecDeque::with_capacity(DECK_SIZE),
            live_remaining: LIVE_WALL_SIZE,
            dora_drawn: 0,
            rng: Mt64::new(u64::from_le_bytes(seed_bytes)),
        };
        wall.reset();
        wall
    }

    /// Rebuilds and shuffles the full 136-tile wall.
    pub fn reset(&mut self) {
        self.tiles.clear();
        for suit in [Suit::Man, Suit::Pin, Suit::Sou] {
            for number in 0..9 {
                for copy in 0..4 {
                    self.tiles.push_back(Tile::new(suit, number, copy));
                }
            }
        }
        for number in 0..4 {
            for copy in 0..4 {
                self.tiles.push_back(Tile::new(Suit::Wind, number, copy));
            }
        }
        for number in 0..3 {
            for copy in 0..4 {
                self.tiles.push_back(Tile::new(Suit::Dragon, number, copy));
            }
        }

        // Fisher-Yates using the session's own RNG, mirroring std::shuffle.
        let mut slice: Vec<Tile> = self.tiles.drain(..).collect();
        for i in (1..slice.len()).rev() {
            let j = (self.rng.next_u64() % (i as u64 + 1)) as usize;
            slice.swap(i, j);
        }
        self.tiles = slice.into();

        self.live_remaining = LIVE_WALL_SIZE;
        self.dora_drawn = 0;
    }

    /// Pops from the live wall's head. `Err(Empty)` signals exhaustive draw.
    pub fn draw(&mut self) -> Result<Tile, WallError> {
        if self.live_remaining == 0 {
            return Err(WallError::Empty);
        }
        self.live_remaining -= 1;
        Ok(self.tiles.pop_front().expect("live_remaining tracks the deque length"))
    }

    /// Pops a dora indicator from the dead wall's tail. At most
    /// [`MAX_DORA_INDICATORS`] per round.
    pub fn draw_dora(&mut self) -> Result<Tile, WallError> {
        if self.dora_drawn >= MAX_DORA_INDICATORS {
            return Err(WallError::NoMoreDora);
        }
        self.dora_drawn += 1;
        Ok(self.tiles.pop_back().expect("dead wall still has tiles for 5 reveals"))
    }

    pub fn size(&self) -> usize {
        self.live_remaining
    }

    pub fn dora_drawn(&self) -> usize {
        self.dora_drawn
    }

    /// A uniform u16, used for call-arbitration pacing delays and seat
    /// shuffling.
    pub fn tiger(&mut self) -> u16 {
        (self.rng.next_u64() & 0xffff) as u16
    }
}

impl Default for Wall {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_wall_has_122_live_tiles() {
        let wall = Wall::new();
        assert_eq!(wall.size(), LIVE_WALL_SIZE);
    }

    #[test]
    fn draining_live_wall_signals_empty_at_123rd_draw() {
        let mut wall = Wall::new();
        for _ in 0..LIVE_WALL_SIZE {
            assert!(wall.draw().is_ok());
        }
        assert_eq!(wall.draw(), Err(WallError::Empty));
    }

    #[test]
    fn dora_draws_do_not_touch_live_count() {
        let mut wall = Wall::new();
        let before = wall.size();
        wall.draw_dora().unwrap();
        assert_eq!(wall.size(), before);
    }

    #[test]
    fn at_most_five_dora_indicators() {
        let mut wall = Wall::new();
        for _ in 0..5 {
            assert!(wall.draw_dora().is_ok());
        }
        assert_eq!(wall.draw_dora(), Err(WallError::NoMoreDora));
    }

    #[test]
    fn reset_restores_full_wall() {
        let mut wall = Wall::new();
        wall.draw().unwrap();
        wall.draw_dora().unwrap();
        wall.reset();
        assert_eq!(wall.size(), LIVE_WALL_SIZE);
        assert_eq!(wall.dora_drawn(), 0);
    }
}
