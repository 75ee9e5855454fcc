//! Agari (winning-hand) and tenpai (waiting-hand) decomposition.
//!
//! The original kernel (`mj_n_triples`/`dfs`/`mj_traverse_tree` in
//! `mahjong.c`) builds an explicit malloc'd tree of every triplet/sequence
//! choice and counts leaves. This is the same search re-expressed as a
//! recursive function over a 34-face tile-count array, returning every
//! decomposition directly as a `Vec` instead of walking a separately
//! allocated tree afterwards.

use itertools::Itertools;
use riichi_elements::meld::Meld;
use riichi_elements::tile::{Suit, Tile};

pub const NUM_FACES: usize = 34;

/// Maps a tile to 0..34: 0..=8 man, 9..=17 pin, 18..=26 sou, 27..=30 wind,
/// 31..=33 dragon.
pub fn face_index(tile: Tile) -> usize {
    let base = match tile.suit() {
        Suit::Man => 0,
        Suit::Pin => 9,
        Suit::Sou => 18,
        Suit::Wind => 27,
        Suit::Dragon => 31,
    };
    base + tile.number() as usize
}

pub fn face_to_tile(face: usize) -> Tile {
    let (suit, offset) = if face < 9 {
        (Suit::Man, 0)
    } else if face < 18 {
        (Suit::Pin, 9)
    } else if face < 27 {
        (Suit::Sou, 18)
    } else if face < 31 {
        (Suit::Wind, 27)
    } else {
        (Suit::Dragon, 31)
    };
    Tile::new(suit, (face - offset) as u8, 0)
}

fn counts_of(tiles: &[Tile]) -> [u8; NUM_FACES] {
    let mut counts = [0u8; NUM_FACES];
    for &t in tiles {
        counts[face_index(t)] += 1;
    }
    counts
}

/// One of the four (or fewer, if melds were called) sets making up a
/// standard hand, restricted to the concealed portion still in hand.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SetShape {
    Sequence(Tile),
    Triplet(Tile),
}

impl SetShape {
    pub fn repr(self) -> Tile {
        match self {
            SetShape::Sequence(t) | SetShape::Triplet(t) => t,
        }
    }

    pub fn is_sequence(self) -> bool {
        matches!(self, SetShape::Sequence(_))
    }
}

/// One full interpretation of a hand: a pair plus the called melds plus the
/// concealed sets completing it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Decomposition {
    pub pair: Tile,
    pub closed_sets: Vec<SetShape>,
    pub melds: Vec<Meld>,
}

impl Decomposition {
    pub fn set_count(&self) -> usize {
        self.closed_sets.len() + self.melds.len()
    }
}

/// Recursively removes triplets/sequences from `counts`, exploring every
/// branch (a run like 111222333 is both three triplets and three identical
/// sequences -- both are valid and both must be returned).
fn search_sets(counts: &mut [u8; NUM_FACES], needed: usize) -> Vec<Vec<SetShape>> {
    if needed == 0 {
        return if counts.iter().all(|&c| c == 0) { vec![vec![]] } else { vec![] };
    }

    let Some(i) = counts.iter().position(|&c| c > 0) else {
        return vec![];
    };

    let mut results = Vec::new();
    let is_numeral = i < 27;
    let within_suit = i % 9;

    if counts[i] >= 3 {
        counts[i] -= 3;
        for mut branch in search_sets(counts, needed - 1) {
            branch.push(SetShape::Triplet(face_to_tile(i)));
            results.push(branch);
        }
        counts[i] += 3;
    }

    if is_numeral && within_suit <= 6 && counts[i + 1] > 0 && counts[i + 2] > 0 {
        counts[i] -= 1;
        counts[i + 1] -= 1;
        counts[i + 2] -= 1;
        for mut branch in search_sets(counts, needed - 1) {
            branch.push(SetShape::Sequence(face_to_tile(i)));
            results.push(branch);
        }
        counts[i] += 1;
        counts[i + 1] += 1;
        counts[i + 2] += 1;
    }

    results
}

/// Every way to complete a standard (4 sets + 1 pair) hand from the
/// concealed tiles plus the already-called melds. `concealed` must have
/// exactly `3 * (4 - melds.len()) + 2` tiles.
pub fn agari_decompositions(concealed: &[Tile], melds: &[Meld]) -> Vec<Decomposition> {
    let needed_closed_sets = 4usize.saturating_sub(melds.len());
    let expected_len = 3 * needed_closed_sets + 2;
    if concealed.len() != expected_len {
        return vec![];
    }

    let mut out = Vec::new();
    let pair_faces: Vec<usize> = {
        let counts = counts_of(concealed);
        (0..NUM_FACES).filter(|&f| counts[f] >= 2).collect()
    };

    for pair_face in pair_faces {
        let mut counts = counts_of(concealed);
        counts[pair_face] -= 2;
        for sets in search_sets(&mut counts, needed_closed_sets) {
            out.push(Decomposition {
                pair: face_to_tile(pair_face),
                closed_sets: sets,
                melds: melds.to_vec(),
            });
        }
    }

    out.into_iter().unique_by(|d| (d.pair, d.closed_sets.clone())).collect()
}

/// Thirteen orphans: one of each terminal/honor, plus a duplicate of one of
/// them as the pair. Named but commented out (unimplemented) in the original
/// kernel; implemented here as a supplemented feature.
pub fn is_kokushi(concealed: &[Tile]) -> bool {
    if concealed.len() != 14 {
        return false;
    }
    let counts = counts_of(concealed);
    let orphan_faces = [0, 8, 9, 17, 18, 26, 27, 28, 29, 30, 31, 32, 33];
    let mut pair_seen = false;
    for f in 0..NUM_FACES {
        let expected_present = orphan_faces.contains(&f);
        match counts[f] {
            0 if expected_present => return false,
            0 => {}
            1 if expected_present => {}
            2 if expected_present && !pair_seen => pair_seen = true,
            _ => return false,
        }
    }
    pair_seen
}

/// Seven pairs: exactly seven distinct faces, each with exactly two tiles.
pub fn is_chiitoitsu(concealed: &[Tile]) -> bool {
    if concealed.len() != 14 {
        return false;
    }
    let counts = counts_of(concealed);
    counts.iter().filter(|&&c| c == 2).count() == 7 && counts.iter().all(|&c| c == 0 || c == 2)
}

pub fn is_agari(concealed: &[Tile], melds: &[Meld]) -> bool {
    is_chiitoitsu(concealed) || is_kokushi(concealed) || !agari_decompositions(concealed, melds).is_empty()
}

/// Every tile (one representative per face) that would complete the hand if
/// drawn or claimed by ron, i.e. the tenpai waits.
pub fn tenpai_waits(concealed: &[Tile], melds: &[Meld]) -> Vec<Tile> {
    let mut waits = Vec::new();
    for face in 0..NUM_FACES {
        let candidate = face_to_tile(face);
        let mut trial = concealed.to_vec();
        trial.push(candidate);
        trial.sort();
        if is_agari(&trial, melds) {
            waits.push(candidate);
        }
    }
    waits
}

pub fn is_tenpai(concealed: &[Tile], melds: &[Meld]) -> bool {
    !tenpai_waits(concealed, melds).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use riichi_elements::tile::parse_hand;

    fn tiles(s: &str) -> Vec<Tile> {
        parse_hand(s).unwrap()
    }

    #[test]
    fn standard_hand_decomposes() {
        let hand = tiles("123456789m123p55s");
        assert_eq!(hand.len(), 14);
        let decomps = agari_decompositions(&hand, &[]);
        assert!(!decomps.is_empty());
        assert!(decomps.iter().all(|d| d.pair.suit() == Suit::Sou));
    }

    #[test]
    fn ambiguous_run_has_two_decompositions() {
        // 111222333m + any pair: valid both as three triplets and three sequences.
        let hand = tiles("111222333m11p");
        let decomps = agari_decompositions(&hand, &[]);
        let has_triplets = decomps.iter().any(|d| d.closed_sets.iter().all(|s| !s.is_sequence()));
        let has_sequences = decomps.iter().any(|d| d.closed_sets.iter().all(|s| s.is_sequence()));
        assert!(has_triplets && has_sequences);
    }

    #[test]
    fn chiitoitsu_detected() {
        let hand = tiles("11223344556677m");
        assert!(is_chiitoitsu(&hand));
    }

    #[test]
    fn tenpai_on_single_wait() {
        // 123456789m + 11p + 2s: needs 2s or... build a clean single-wait shape.
        let hand = tiles("123456789m11p2s");
        assert_eq!(hand.len(), 13);
        let waits = tenpai_waits(&hand, &[]);
        assert!(waits.iter().any(|t| t.suit() == Suit::Sou && t.number() == 1));
    }
}
