//! [`Meld`] --- a called group of 3 or 4 tiles (chow, pong, or kong), packed for
//! the wire the way [`crate::tile::Tile`] is.
//!
//! ## Bit layout (64 bits)
//!
//! ```text
//! 63        48 47        32 31        16 15         0  ...  kind/open/kong in low byte
//! | tile[3]    | tile[2]    | tile[1]    | tile[0]     |
//! ```
//!
//! Each tile slot holds a full 16-bit [`Tile`] (0xffff for an unused slot in a
//! 3-tile meld). The low byte below bit 0 of tile[0] is reused: `pack()` stores
//! `kind`/`open` in a trailing metadata byte appended after the four tile
//! slots, since a `u64` only covers the four tiles exactly -- callers needing
//! the flags alongside the packed tiles should also persist metadata()
//! separately; `pack()`/`unpack()` round-trip the tiles verbatim and `kind`
//! is recovered from which slots are valid plus the `open`/`kong` booleans
//! carried in the call event that produced the meld (section 4.2).

use crate::tile::Tile;
use core::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeldKind {
    Chow,
    Pong,
    /// Called kong (minkan): completed by claiming a discard or a fourth tile.
    OpenKong,
    /// Concealed kong (ankan): all four copies drawn/held by the caller.
    ClosedKong,
    /// Kong added to an existing open pong (shouminkan).
    AddedKong,
}

impl MeldKind {
    pub const fn is_kong(self) -> bool {
        matches!(self, MeldKind::OpenKong | MeldKind::ClosedKong | MeldKind::AddedKong)
    }

    pub const fn is_open(self) -> bool {
        !matches!(self, MeldKind::ClosedKong)
    }

    pub const fn tile_count(self) -> usize {
        if self.is_kong() { 4 } else { 3 }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Meld {
    tiles: [Tile; 4],
    kind: MeldKind,
    /// Seat offset (1..=3, relative to the caller) the called tile came from.
    /// Irrelevant (0) for a closed kong.
    called_from: u8,
}

impl Meld {
    /// Builds a chow from its three tiles, already in ascending order.
    pub fn chow(tiles: [Tile; 3], called_from: u8) -> Self {
        Self { tiles: [tiles[0], tiles[1], tiles[2], Tile::INVALID], kind: MeldKind::Chow, called_from }
    }

    pub fn pong(tiles: [Tile; 3], called_from: u8) -> Self {
        Self { tiles: [tiles[0], tiles[1], tiles[2], Tile::INVALID], kind: MeldKind::Pong, called_from }
    }

    pub fn open_kong(tiles: [Tile; 4], called_from: u8) -> Self {
        Self { tiles, kind: MeldKind::OpenKong, called_from }
    }

    pub fn closed_kong(tiles: [Tile; 4]) -> Self {
        Self { tiles, kind: MeldKind::ClosedKong, called_from: 0 }
    }

    pub fn added_kong(tiles: [Tile; 4], called_from: u8) -> Self {
        Self { tiles, kind: MeldKind::AddedKong, called_from }
    }

    pub const fn kind(self) -> MeldKind {
        self.kind
    }

    pub const fn is_open(self) -> bool {
        self.kind.is_open()
    }

    pub const fn is_kong(self) -> bool {
        self.kind.is_kong()
    }

    pub const fn is_sequence(self) -> bool {
        matches!(self.kind, MeldKind::Chow)
    }

    pub const fn is_triplet_family(self) -> bool {
        !self.is_sequence()
    }

    pub const fn called_from(self) -> u8 {
        self.called_from
    }

    pub const fn len(self) -> usize {
        self.kind.tile_count()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles[..self.len()]
    }

    pub const fn first(self) -> Tile {
        self.tiles[0]
    }

    pub const fn second(self) -> Tile {
        self.tiles[1]
    }

    pub const fn third(self) -> Tile {
        self.tiles[2]
    }

    /// Only meaningful for kongs.
    pub const fn fourth(self) -> Option<Tile> {
        if self.is_kong() { Some(self.tiles[3]) } else { None }
    }

    /// The representative tile for scoring/sorting purposes: the lowest-number
    /// tile of a chow, otherwise any member (they're all the same face).
    pub const fn repr(self) -> Tile {
        self.tiles[0]
    }

    pub fn is_terminal_or_honor(&self) -> bool {
        self.tiles().iter().all(|t| t.is_terminal_or_honor())
    }

    pub fn is_pure_terminal_set(&self) -> bool {
        !self.is_sequence() && self.repr().is_pure_terminal()
    }

    pub fn has_red_five(&self) -> bool {
        self.tiles().iter().any(|t| t.is_red())
    }

    /// Packs the tile slots into 64 bits. Unused slots (3-tile melds) are
    /// [`Tile::INVALID`].
    pub fn pack(&self) -> u64 {
        let mut out: u64 = 0;
        for (i, t) in self.tiles.iter().enumerate() {
            out |= (t.raw() as u64) << (i * 16);
        }
        out
    }

    /// Rebuilds the tile slots from a packed value. The caller must supply
    /// `kind`/`called_from` separately (they travel alongside in the call
    /// event, not inside the 64-bit tile payload).
    pub fn unpack(packed: u64, kind: MeldKind, called_from: u8) -> Self {
        let mut tiles = [Tile::INVALID; 4];
        for (i, slot) in tiles.iter_mut().enumerate() {
            *slot = Tile::from_raw(((packed >> (i * 16)) & 0xffff) as u16);
        }
        Self { tiles, kind, called_from }
    }
}

impl core::fmt::Debug for Meld {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "Meld({:?}, {:?})", self.kind, self.tiles())
    }
}

impl Display for Meld {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        for t in self.tiles() {
            write!(f, "{}", t)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Suit;

    #[test]
    fn chow_packs_with_invalid_fourth_slot() {
        let m = Meld::chow(
            [Tile::new(Suit::Man, 2, 0), Tile::new(Suit::Man, 3, 0), Tile::new(Suit::Man, 4, 0)],
            1,
        );
        let packed = m.pack();
        let back = Meld::unpack(packed, MeldKind::Chow, 1);
        assert_eq!(back.tiles(), m.tiles());
        assert_eq!(back.fourth(), None);
    }

    #[test]
    fn kong_round_trips_all_four_slots() {
        let tiles = [
            Tile::new(Suit::Dragon, 1, 0),
            Tile::new(Suit::Dragon, 1, 1),
            Tile::new(Suit::Dragon, 1, 2),
            Tile::new(Suit::Dragon, 1, 3),
        ];
        let m = Meld::closed_kong(tiles);
        let back = Meld::unpack(m.pack(), MeldKind::ClosedKong, 0);
        assert_eq!(back.fourth(), Some(tiles[3]));
        assert!(back.is_kong());
        assert!(!back.is_open());
    }

    #[test]
    fn open_kong_is_open() {
        let tiles = [Tile::new(Suit::Pin, 8, 0); 4];
        let m = Meld::open_kong(tiles, 2);
        assert!(m.is_open());
        assert!(m.is_kong());
    }

    #[test]
    fn pure_terminal_pong_detected() {
        let tiles = [Tile::new(Suit::Sou, 0, 0), Tile::new(Suit::Sou, 0, 1), Tile::new(Suit::Sou, 0, 2)];
        let m = Meld::pong(tiles, 3);
        assert!(m.is_pure_terminal_set());
        assert!(m.is_terminal_or_honor());
    }
}
