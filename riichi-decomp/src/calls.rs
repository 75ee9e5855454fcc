//! Call availability predicates, ported from `mj_pong_available`,
//! `mj_kong_available`, and `mj_chow_available`.

use riichi_elements::tile::{Suit, Tile};

pub fn pong_available(hand: &[Tile], tile: Tile) -> bool {
    hand.iter().filter(|t| t.id7() == tile.id7()).count() >= 2
}

pub fn kong_available(hand: &[Tile], tile: Tile) -> bool {
    hand.iter().filter(|t| t.id7() == tile.id7()).count() >= 3
}

/// A closed kong can be declared from four tiles already in hand (no call).
pub fn closed_kong_available(hand: &[Tile], tile: Tile) -> bool {
    hand.iter().filter(|t| t.id7() == tile.id7()).count() >= 4
}

/// An added kong (shouminkan) extends an already-open pong of the same face.
pub fn added_kong_available(open_pongs: &[Tile], hand: &[Tile], tile: Tile) -> bool {
    open_pongs.iter().any(|p| p.id7() == tile.id7()) && hand.iter().any(|t| t.id7() == tile.id7())
}

/// Every pair of hand tiles that can complete a chow with `tile`, as
/// `(low, high)` -- the two hand tiles, in ascending order, that combined
/// with `tile` form a sequence.
pub fn chow_available(hand: &[Tile], tile: Tile) -> Vec<(Tile, Tile)> {
    if tile.suit() == Suit::Wind || tile.suit() == Suit::Dragon {
        return Vec::new();
    }

    let number = tile.number() as i8;
    let mut out = Vec::new();
    let shapes: [(i8, i8); 3] = [(-2, -1), (-1, 1), (1, 2)];

    for (d1, d2) in shapes {
        let (n1, n2) = (number + d1, number + d2);
        if !(0..9).contains(&n1) || !(0..9).contains(&n2) {
            continue;
        }
        let low = hand.iter().find(|t| t.suit() == tile.suit() && t.number() as i8 == n1);
        let high = hand.iter().find(|t| t.suit() == tile.suit() && t.number() as i8 == n2);
        if let (Some(&low), Some(&high)) = (low, high) {
            out.push((low, high));
        }
    }

    out
}

/// True if `discard` plus the two caller-supplied tiles form a legal
/// same-suit, three-consecutive-number chow (order-independent). Used to
/// validate a claimed chow's auxiliary tiles before it's melded, since a
/// caller could otherwise name two tiles that don't actually complete a run.
pub fn is_valid_chow(discard: Tile, a: Tile, b: Tile) -> bool {
    if discard.suit() == Suit::Wind || discard.suit() == Suit::Dragon {
        return false;
    }
    if a.suit() != discard.suit() || b.suit() != discard.suit() {
        return false;
    }
    let mut numbers = [discard.number(), a.number(), b.number()];
    numbers.sort_unstable();
    numbers[0] + 1 == numbers[1] && numbers[1] + 1 == numbers[2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use riichi_elements::tile::parse_hand;

    #[test]
    fn pong_needs_two_matching() {
        let hand = parse_hand("55m").unwrap();
        let tile = Tile::new(Suit::Man, 4, 0);
        assert!(pong_available(&hand, tile));
        assert!(!kong_available(&hand, tile));
    }

    #[test]
    fn chow_finds_all_three_shapes() {
        let hand = parse_hand("234678m").unwrap();
        let tile = Tile::new(Suit::Man, 4, 0); // 5m: 34_ / _5_? check shapes
        let chows = chow_available(&hand, tile);
        assert!(!chows.is_empty());
    }

    #[test]
    fn honor_tiles_never_chow() {
        let hand = parse_hand("123w").unwrap();
        let tile = Tile::new(Suit::Wind, 3, 0);
        assert!(chow_available(&hand, tile).is_empty());
    }

    #[test]
    fn is_valid_chow_accepts_consecutive_same_suit_run() {
        let discard = Tile::new(Suit::Man, 4, 0);
        let a = Tile::new(Suit::Man, 3, 0);
        let b = Tile::new(Suit::Man, 5, 0);
        assert!(is_valid_chow(discard, a, b));
        assert!(is_valid_chow(discard, b, a));
    }

    #[test]
    fn is_valid_chow_rejects_non_consecutive_or_mixed_suit() {
        let discard = Tile::new(Suit::Man, 4, 0);
        let gap = Tile::new(Suit::Man, 6, 0);
        let other_suit = Tile::new(Suit::Pin, 5, 0);
        assert!(!is_valid_chow(discard, Tile::new(Suit::Man, 3, 0), gap));
        assert!(!is_valid_chow(discard, Tile::new(Suit::Man, 3, 0), other_suit));
    }
}
