//! [`Seat`] and [`Wind`] -- mod-4 table position arithmetic.

use core::fmt::{Display, Formatter};

/// A seat at the table, 0..=3, relative to the dealer's initial seat 0 (East).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Seat(u8);

impl Seat {
    pub const EAST: Self = Self(0);
    pub const SOUTH: Self = Self(1);
    pub const WEST: Self = Self(2);
    pub const NORTH: Self = Self(3);

    pub const fn new(n: u8) -> Self {
        Self(n % 4)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// The seat downstream of this one (to the right, i.e. next to act).
    pub const fn succ(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    pub const fn oppo(self) -> Self {
        Self((self.0 + 2) % 4)
    }

    pub const fn pred(self) -> Self {
        Self((self.0 + 3) % 4)
    }

    /// Seats strictly downstream of `self`, nearest first -- the priority order
    /// opponent-call arbitration (section 4.6) scans in.
    pub const fn downstream_order(self) -> [Self; 3] {
        [self.succ(), self.oppo(), self.pred()]
    }

    /// How many seats `target` is downstream of `self` (1, 2, or 3).
    pub const fn offset_to(self, target: Self) -> u8 {
        (target.0 + 4 - self.0) % 4
    }

    /// This seat's wind, given the current dealer seat (rotates each hand).
    pub const fn wind_relative_to(self, dealer: Self) -> Wind {
        match (self.0 + 4 - dealer.0) % 4 {
            0 => Wind::East,
            1 => Wind::South,
            2 => Wind::West,
            _ => Wind::North,
        }
    }
}

impl Display for Seat {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "seat{}", self.0)
    }
}

/// A round wind or seat wind.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Wind {
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl Wind {
    pub const fn succ(self) -> Self {
        match self {
            Wind::East => Wind::South,
            Wind::South => Wind::West,
            Wind::West => Wind::North,
            Wind::North => Wind::East,
        }
    }

    pub const fn as_tile_number(self) -> u8 {
        self as u8
    }

    pub const fn char(self) -> char {
        match self {
            Wind::East => 'E',
            Wind::South => 'S',
            Wind::West => 'W',
            Wind::North => 'N',
        }
    }
}

impl Display for Wind {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downstream_order_is_succ_oppo_pred() {
        let s = Seat::new(1);
        assert_eq!(s.downstream_order(), [Seat::new(2), Seat::new(3), Seat::new(0)]);
    }

    #[test]
    fn offset_to_matches_priority_distance() {
        let s = Seat::new(0);
        assert_eq!(s.offset_to(Seat::new(1)), 1);
        assert_eq!(s.offset_to(Seat::new(2)), 2);
        assert_eq!(s.offset_to(Seat::new(3)), 3);
    }

    #[test]
    fn seat_wind_rotates_with_dealer() {
        let dealer = Seat::new(2);
        assert_eq!(dealer.wind_relative_to(dealer), Wind::East);
        assert_eq!(Seat::new(3).wind_relative_to(dealer), Wind::South);
        assert_eq!(Seat::new(0).wind_relative_to(dealer), Wind::West);
        assert_eq!(Seat::new(1).wind_relative_to(dealer), Wind::North);
    }

    #[test]
    fn wind_succ_wraps() {
        assert_eq!(Wind::North.succ(), Wind::East);
    }
}
