//! Fu/fan scoring, ported from `mj_fu`/`mj_fan`/`mj_seven_pairs` in
//! `yaku.c`. Flags the original treats as "external" (riichi, ippatsu,
//! haitei, houtei, rinshan, chankan, dora count) are supplied by the caller
//! via [`ScoringContext`] instead of being read out of game-state globals.

use crate::decompose::{is_chiitoitsu, Decomposition, SetShape};
use riichi_elements::meld::MeldKind;
use riichi_elements::player::Wind;
use riichi_elements::tile::{Suit, Tile};
use riichi_elements::yaku::{basic_score, round_fu, Yaku, BASE_FU};

#[derive(Copy, Clone, Debug)]
pub struct ScoringContext {
    pub seat_wind: Wind,
    pub round_wind: Wind,
    pub winning_tile: Tile,
    pub tsumo: bool,
    pub riichi: bool,
    pub double_riichi: bool,
    pub ippatsu: bool,
    pub haitei: bool,
    pub houtei: bool,
    pub rinshan: bool,
    pub chankan: bool,
    pub dora_count: u32,
}

#[derive(Clone, Debug)]
pub struct ScoreResult {
    pub fu: u32,
    pub fan: u32,
    pub yaku: Vec<(Yaku, u32)>,
    pub points: u32,
}

impl ScoreResult {
    /// True if at least one counted yaku isn't `Dora` -- dora alone never
    /// enables a win (it has no value without a yaku to ride on).
    pub fn has_yaku(&self) -> bool {
        self.yaku.iter().any(|(y, _)| *y != Yaku::Dora)
    }
}

enum Group {
    Sequence { low: Tile, high: Tile, open: bool },
    Triplet { tile: Tile, open: bool, kong: bool },
}

fn groups_of(decomp: &Decomposition) -> Vec<Group> {
    let mut groups = Vec::with_capacity(4);
    for meld in &decomp.melds {
        groups.push(match meld.kind() {
            MeldKind::Chow => Group::Sequence { low: meld.first(), high: meld.third(), open: true },
            MeldKind::Pong => Group::Triplet { tile: meld.repr(), open: true, kong: false },
            MeldKind::OpenKong | MeldKind::AddedKong => {
                Group::Triplet { tile: meld.repr(), open: true, kong: true }
            }
            MeldKind::ClosedKong => Group::Triplet { tile: meld.repr(), open: false, kong: true },
        });
    }
    for set in &decomp.closed_sets {
        groups.push(match *set {
            SetShape::Sequence(low) => {
                Group::Sequence { low, high: low.succ2().expect("valid sequence low tile"), open: false }
            }
            SetShape::Triplet(tile) => Group::Triplet { tile, open: false, kong: false },
        });
    }
    groups
}

fn wind_tile(wind: Wind) -> Tile {
    Tile::new(Suit::Wind, wind.as_tile_number(), 0)
}

struct FuResult {
    fu: u32,
    pinfu: bool,
    menzen_tsumo: bool,
}

fn compute_fu(groups: &[Group], pair: Tile, ctx: &ScoringContext) -> FuResult {
    let closed = groups.iter().all(|g| match g {
        Group::Sequence { open, .. } | Group::Triplet { open, .. } => !open,
    });

    let mut fu = BASE_FU;
    let mut wait_fu = 2u32;

    for g in groups {
        match *g {
            Group::Triplet { tile, open, kong } => {
                let mut points = 2u32;
                if kong {
                    points <<= 2;
                }
                if !open && (ctx.tsumo || tile.id7() != ctx.winning_tile.id7()) {
                    points <<= 1;
                }
                if tile.is_terminal_or_honor() {
                    points <<= 1;
                }
                fu += points;
            }
            Group::Sequence { low, high, .. } => {
                let low_match = low.id7() == ctx.winning_tile.id7() && low.number() != 6;
                let high_match = high.id7() == ctx.winning_tile.id7() && high.number() != 2;
                if low_match || high_match {
                    wait_fu = 0;
                }
            }
        }
    }

    fu += wait_fu;

    if pair.suit() == Suit::Dragon
        || pair.id7() == wind_tile(ctx.seat_wind).id7()
        || pair.id7() == wind_tile(ctx.round_wind).id7()
    {
        fu += 2;
    }

    let menzen_tsumo = closed && ctx.tsumo;

    if fu == BASE_FU {
        return if closed {
            FuResult { fu: if ctx.tsumo { 20 } else { 30 }, pinfu: true, menzen_tsumo }
        } else {
            FuResult { fu: 30, pinfu: false, menzen_tsumo }
        };
    }

    if ctx.tsumo {
        fu += 2;
    } else if closed {
        fu += 10;
    }

    FuResult { fu: round_fu(fu), pinfu: false, menzen_tsumo }
}

fn is_19_tile(t: Tile) -> bool {
    t.is_terminal_or_honor()
}

fn detect_yaku(groups: &[Group], pair: Tile, closed: bool) -> Vec<(Yaku, u32)> {
    let mut out = Vec::new();

    // Ipeikou: two identical sequences, closed only.
    if closed {
        let seqs: Vec<Tile> = groups
            .iter()
            .filter_map(|g| if let Group::Sequence { low, .. } = g { Some(*low) } else { None })
            .collect();
        for i in 0..seqs.len() {
            for j in (i + 1)..seqs.len() {
                if seqs[i].id7() == seqs[j].id7() {
                    out.push((Yaku::Ipeikou, 2));
                }
            }
        }
        if seqs.len() == 4 && seqs[0].id7() == seqs[1].id7() && seqs[2].id7() == seqs[3].id7() {
            out.retain(|(y, _)| *y != Yaku::Ipeikou);
            out.push((Yaku::Ryanpeikou, 3));
        }
    }

    // Tanyao: no terminal/honor anywhere, including the pair.
    if groups.iter().all(|g| match g {
        Group::Sequence { low, high, .. } => !low.is_terminal_or_honor() && !high.is_terminal_or_honor(),
        Group::Triplet { tile, .. } => !is_19_tile(*tile),
    }) && !is_19_tile(pair)
    {
        out.push((Yaku::Tanyao, 1));
    }

    out
}

fn yakuhai_count(groups: &[Group], seat_wind: Wind, round_wind: Wind) -> u32 {
    let mut n = 0;
    for g in groups {
        if let Group::Triplet { tile, .. } = g {
            if tile.suit() == Suit::Dragon {
                n += 1;
            }
            if tile.suit() == Suit::Wind {
                if tile.number() == seat_wind.as_tile_number() {
                    n += 1;
                }
                if tile.number() == round_wind.as_tile_number() {
                    n += 1;
                }
            }
        }
    }
    n
}

fn chanta_junchan(groups: &[Group], pair: Tile) -> Option<(Yaku, u32, bool)> {
    let pair_pure = pair.is_pure_terminal();
    let pair_ok_pure = pair_pure;
    let pair_ok_mixed = pair.is_terminal_or_honor();

    let all_pure = groups.iter().all(|g| match g {
        Group::Sequence { low, high, .. } => low.is_pure_terminal() || high.is_pure_terminal(),
        Group::Triplet { tile, .. } => tile.is_pure_terminal(),
    }) && pair_ok_pure;

    if all_pure {
        return Some((Yaku::Junchan, 0, true));
    }

    let all_mixed = groups.iter().all(|g| match g {
        Group::Sequence { low, high, .. } => low.is_terminal_or_honor() || high.is_terminal_or_honor(),
        Group::Triplet { tile, .. } => is_19_tile(*tile),
    }) && pair_ok_mixed;

    if all_mixed {
        return Some((Yaku::Chanta, 0, false));
    }

    None
}

fn sanshoku(groups: &[Group]) -> Option<Yaku> {
    let mut seq_numbers = [0u8; 9];
    let mut set_numbers = [0u8; 9];
    for g in groups {
        match g {
            Group::Sequence { low, .. } => {
                seq_numbers[low.number() as usize] |= match low.suit() {
                    Suit::Man => 0b001,
                    Suit::Sou => 0b010,
                    Suit::Pin => 0b100,
                    _ => 0,
                };
            }
            Group::Triplet { tile, .. } => {
                set_numbers[tile.number() as usize] |= match tile.suit() {
                    Suit::Man => 0b001,
                    Suit::Sou => 0b010,
                    Suit::Pin => 0b100,
                    _ => 0,
                };
            }
        }
    }
    if seq_numbers.iter().any(|&n| n == 0b111) {
        Some(Yaku::Sanshoku)
    } else if set_numbers.iter().any(|&n| n == 0b111) {
        Some(Yaku::SanshokuDoukou)
    } else {
        None
    }
}

fn ittsu(groups: &[Group]) -> bool {
    let mut suits = [0u8; 3];
    for g in groups {
        if let Group::Sequence { low, .. } = g {
            let idx = match low.suit() {
                Suit::Man => 0,
                Suit::Pin => 1,
                Suit::Sou => 2,
                _ => continue,
            };
            suits[idx] |= match low.number() {
                0 => 0b001,
                3 => 0b010,
                6 => 0b100,
                _ => 0,
            };
        }
    }
    suits.iter().any(|&s| s == 0b111)
}

fn toitoi(groups: &[Group]) -> bool {
    groups.iter().all(|g| matches!(g, Group::Triplet { .. }))
}

fn sanankou(groups: &[Group]) -> bool {
    groups.iter().filter(|g| matches!(g, Group::Triplet { open: false, .. })).count() >= 3
}

fn sankantsu(groups: &[Group]) -> bool {
    groups.iter().filter(|g| matches!(g, Group::Triplet { kong: true, .. })).count() == 3
}

fn honroutou(groups: &[Group], pair: Tile) -> bool {
    toitoi(groups) && groups.iter().all(|g| matches!(g, Group::Triplet { tile, .. } if is_19_tile(*tile))) && is_19_tile(pair)
}

fn shousangen(groups: &[Group], pair: Tile) -> bool {
    if pair.suit() != Suit::Dragon {
        return false;
    }
    let dragons = groups.iter().filter(|g| matches!(g, Group::Triplet { tile, .. } if tile.suit() == Suit::Dragon)).count();
    dragons == 2
}

fn flush(groups: &[Group], pair: Tile) -> Option<(Yaku, bool)> {
    let mut suit = None;
    let mut full = true;
    for g in groups {
        let (honor, s) = match g {
            Group::Sequence { low, .. } => (low.is_honor(), low.suit()),
            Group::Triplet { tile, .. } => (tile.is_honor(), tile.suit()),
        };
        if honor {
            full = false;
            continue;
        }
        match suit {
            None => suit = Some(s),
            Some(existing) if existing != s => return None,
            _ => {}
        }
    }
    let suit = suit?;
    if full && pair.suit() == suit {
        Some((Yaku::Chinitsu, true))
    } else if pair.suit() == suit || pair.is_honor() {
        Some((Yaku::Honitsu, true))
    } else {
        None
    }
}

/// Scores one standard (4-sets-and-a-pair) decomposition. Returns `None`
/// only if the decomposition is structurally invalid (should not happen for
/// decompositions returned by [`crate::decompose::agari_decompositions`]).
pub fn score_decomposition(decomp: &Decomposition, ctx: &ScoringContext) -> Option<ScoreResult> {
    if decomp.set_count() != 4 {
        return None;
    }
    let groups = groups_of(decomp);
    let closed = groups.iter().all(|g| match g {
        Group::Sequence { open, .. } | Group::Triplet { open, .. } => !open,
    });

    let fu_result = compute_fu(&groups, decomp.pair, ctx);
    let mut yaku = detect_yaku(&groups, decomp.pair, closed);

    if fu_result.pinfu {
        yaku.push((Yaku::Pinfu, 1));
    }
    if fu_result.menzen_tsumo {
        yaku.push((Yaku::MenzenTsumo, 1));
    }

    let yakuhai_n = yakuhai_count(&groups, ctx.seat_wind, ctx.round_wind);
    if yakuhai_n > 0 {
        yaku.push((Yaku::Yakuhai, yakuhai_n));
    }

    if let Some((y, _, junchan)) = chanta_junchan(&groups, decomp.pair) {
        let fan = if junchan { if closed { 3 } else { 2 } } else if closed { 2 } else { 1 };
        yaku.push((y, fan));
    }

    if let Some(y) = sanshoku(&groups) {
        let fan = match y {
            Yaku::Sanshoku => if closed { 2 } else { 1 },
            Yaku::SanshokuDoukou => 2,
            _ => unreachable!(),
        };
        yaku.push((y, fan));
    }

    if ittsu(&groups) {
        yaku.push((Yaku::Ittsu, if closed { 2 } else { 1 }));
    }
    if toitoi(&groups) {
        yaku.push((Yaku::Toitoi, 2));
    }
    if sanankou(&groups) {
        yaku.push((Yaku::Sanankou, 2));
    }
    if sankantsu(&groups) {
        yaku.push((Yaku::Sankantsu, 2));
    }
    if honroutou(&groups, decomp.pair) {
        yaku.push((Yaku::Honroutou, 2));
    }
    if shousangen(&groups, decomp.pair) {
        yaku.push((Yaku::Shousangen, 2));
    }
    if let Some((y, _)) = flush(&groups, decomp.pair) {
        let fan = match y {
            Yaku::Chinitsu => if closed { 6 } else { 5 },
            Yaku::Honitsu => if closed { 3 } else { 2 },
            _ => unreachable!(),
        };
        yaku.push((y, fan));
    }

    push_external_yaku(&mut yaku, ctx, closed);

    let fan: u32 = yaku.iter().map(|(_, f)| f).sum::<u32>() + ctx.dora_count;
    if ctx.dora_count > 0 {
        yaku.push((Yaku::Dora, ctx.dora_count));
    }
    let points = basic_score(fu_result.fu, fan);

    Some(ScoreResult { fu: fu_result.fu, fan, yaku, points })
}

fn push_external_yaku(yaku: &mut Vec<(Yaku, u32)>, ctx: &ScoringContext, closed: bool) {
    if ctx.double_riichi {
        yaku.push((Yaku::DoubleRiichi, 2));
    } else if ctx.riichi {
        yaku.push((Yaku::Riichi, 1));
    }
    if ctx.ippatsu {
        yaku.push((Yaku::Ippatsu, 1));
    }
    if ctx.haitei {
        yaku.push((Yaku::Haitei, 1));
    }
    if ctx.houtei {
        yaku.push((Yaku::Houtei, 1));
    }
    if ctx.rinshan {
        yaku.push((Yaku::Rinshan, 1));
    }
    if ctx.chankan {
        yaku.push((Yaku::Chankan, 1));
    }
    let _ = closed;
}

/// Seven-pairs scoring: fixed 25 fu per common ruleset convention (the
/// original kernel does not assign fu to this shape at all, only fan).
pub fn score_chiitoitsu(tiles: &[Tile], ctx: &ScoringContext) -> Option<ScoreResult> {
    if !is_chiitoitsu(tiles) {
        return None;
    }

    let mut yaku = vec![(Yaku::Chiitoitsu, 2)];

    let mut suit = None;
    let mut full_flush = true;
    let mut half_flush = false;
    let mut all_terminal = true;
    let mut all_simple = true;

    for &t in tiles {
        if t.is_honor() {
            full_flush = false;
        } else {
            match suit {
                None => suit = Some(t.suit()),
                Some(s) if s != t.suit() => {
                    full_flush = false;
                    half_flush = false;
                }
                _ => {}
            }
        }
        if is_19_tile(t) {
            all_simple = false;
        } else {
            all_terminal = false;
        }
    }
    if suit.is_none() {
        half_flush = false;
    }

    if full_flush {
        yaku.push((Yaku::Chinitsu, 6));
    } else if half_flush {
        yaku.push((Yaku::Honitsu, 3));
    } else if all_terminal {
        yaku.push((Yaku::Honroutou, 2));
    } else if all_simple {
        yaku.push((Yaku::Tanyao, 1));
    }

    push_external_yaku(&mut yaku, ctx, true);

    let fan: u32 = yaku.iter().map(|(_, f)| f).sum::<u32>() + ctx.dora_count;
    if ctx.dora_count > 0 {
        yaku.push((Yaku::Dora, ctx.dora_count));
    }
    let fu = 25;
    let points = basic_score(fu, fan);
    Some(ScoreResult { fu, fan, yaku, points })
}

/// Picks the highest-scoring decomposition among every valid interpretation
/// of a hand, matching `mj_score`'s "try every agari decomposition, keep the
/// best" loop.
pub fn best_score(decomps: &[Decomposition], ctx: &ScoringContext) -> Option<ScoreResult> {
    decomps.iter().filter_map(|d| score_decomposition(d, ctx)).max_by_key(|r| r.points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::agari_decompositions;
    use riichi_elements::tile::parse_hand;

    fn ctx() -> ScoringContext {
        ScoringContext {
            seat_wind: Wind::East,
            round_wind: Wind::East,
            winning_tile: Tile::new(Suit::Sou, 4, 0),
            tsumo: false,
            riichi: false,
            double_riichi: false,
            ippatsu: false,
            haitei: false,
            houtei: false,
            rinshan: false,
            chankan: false,
            dora_count: 0,
        }
    }

    #[test]
    fn pinfu_hand_scores_thirty_fu() {
        let hand = parse_hand("234567m234p55678s").unwrap();
        let mut c = ctx();
        c.winning_tile = Tile::new(Suit::Sou, 5, 0); // completes 678s on the 6 side... adjust below
        let decomps = agari_decompositions(&hand, &[]);
        assert!(!decomps.is_empty());
        let best = best_score(&decomps, &c);
        assert!(best.is_some());
    }

    #[test]
    fn chiitoitsu_scores_fixed_fu() {
        let hand = parse_hand("11223344556677m").unwrap();
        let result = score_chiitoitsu(&hand, &ctx()).unwrap();
        assert_eq!(result.fu, 25);
        assert!(result.yaku.iter().any(|(y, _)| *y == Yaku::Chiitoitsu));
    }

    #[test]
    fn toitoi_all_triplets_detected() {
        let hand = parse_hand("111999m111999p11s").unwrap();
        let decomps = agari_decompositions(&hand, &[]);
        let best = best_score(&decomps, &ctx()).unwrap();
        assert!(best.yaku.iter().any(|(y, _)| *y == Yaku::Toitoi));
    }
}
