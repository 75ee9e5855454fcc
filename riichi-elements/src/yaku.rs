//! [`Yaku`] -- the scoring pattern enum, with the ordinals and fan values
//! grounded on `mahjong.h`/`yaku.c`'s `MJ_YAKU_*` table.

use core::fmt::{Display, Formatter};

/// Scoring thresholds (section 4.6), unchanged from the original constants.
pub const BASE_FU: u32 = 20;
pub const YAKUMAN_FAN: u32 = 13;
pub const MANGAN_POINTS: u32 = 2000;
pub const HANEMAN_POINTS: u32 = 3000;
pub const BAIMAN_POINTS: u32 = 4000;
pub const SANBAIMAN_POINTS: u32 = 6000;

/// One scoring yaku. Discriminants match the wire `winning_yaku` payload
/// ordinals (section 4.1), which in turn match the original's `MJ_YAKU_*`
/// indices 0..=25.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Yaku {
    Riichi = 0,
    Ippatsu = 1,
    MenzenTsumo = 2,
    Pinfu = 3,
    Ipeikou = 4,
    Haitei = 5,
    Houtei = 6,
    Rinshan = 7,
    Chankan = 8,
    Tanyao = 9,
    Yakuhai = 10,
    Chanta = 11,
    Sanshoku = 12,
    Ittsu = 13,
    Toitoi = 14,
    Sanankou = 15,
    SanshokuDoukou = 16,
    Sankantsu = 17,
    Chiitoitsu = 18,
    Honroutou = 19,
    Shousangen = 20,
    Honitsu = 21,
    Junchan = 22,
    Ryanpeikou = 23,
    Chinitsu = 24,
    Dora = 25,
    /// Riichi declared on the very first discard, no intervening calls.
    /// Not present in the original's 26-entry table; carried alongside it
    /// as an additional fan (section 3's `double-riichi` hand flag).
    DoubleRiichi = 26,
}

pub const YAKU_COUNT: usize = 27;

impl Yaku {
    pub const ALL: [Yaku; YAKU_COUNT] = [
        Yaku::Riichi, Yaku::Ippatsu, Yaku::MenzenTsumo, Yaku::Pinfu, Yaku::Ipeikou,
        Yaku::Haitei, Yaku::Houtei, Yaku::Rinshan, Yaku::Chankan, Yaku::Tanyao,
        Yaku::Yakuhai, Yaku::Chanta, Yaku::Sanshoku, Yaku::Ittsu, Yaku::Toitoi,
        Yaku::Sanankou, Yaku::SanshokuDoukou, Yaku::Sankantsu, Yaku::Chiitoitsu,
        Yaku::Honroutou, Yaku::Shousangen, Yaku::Honitsu, Yaku::Junchan,
        Yaku::Ryanpeikou, Yaku::Chinitsu, Yaku::Dora, Yaku::DoubleRiichi,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Yaku::Riichi => "Riichi",
            Yaku::Ippatsu => "Ippatsu",
            Yaku::MenzenTsumo => "Menzenchin Tsumohou",
            Yaku::Pinfu => "Pinfu",
            Yaku::Ipeikou => "Ipeikou",
            Yaku::Haitei => "Haitei",
            Yaku::Houtei => "Houtei",
            Yaku::Rinshan => "Rinshan",
            Yaku::Chankan => "Chankan",
            Yaku::Tanyao => "Tanyao",
            Yaku::Yakuhai => "Yakuhai",
            Yaku::Chanta => "Chanta",
            Yaku::Sanshoku => "Sanshoku Doujun",
            Yaku::Ittsu => "Ittsu",
            Yaku::Toitoi => "Toitoi",
            Yaku::Sanankou => "Sanankou",
            Yaku::SanshokuDoukou => "Sanshoku Doukou",
            Yaku::Sankantsu => "Sankantsu",
            Yaku::Chiitoitsu => "Chiitoitsu",
            Yaku::Honroutou => "Honroutou",
            Yaku::Shousangen => "Shousangen",
            Yaku::Honitsu => "Honitsu",
            Yaku::Junchan => "Junchan",
            Yaku::Ryanpeikou => "Ryanpeikou",
            Yaku::Chinitsu => "Chinitsu",
            Yaku::Dora => "Dora",
            Yaku::DoubleRiichi => "Double Riichi",
        }
    }

}

impl Display for Yaku {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Rounds a basic point value up to the next multiple of 10, matching
/// `mj_fu`'s `10 * ((fu + 9) / 10)`.
pub const fn round_fu(fu: u32) -> u32 {
    10 * ((fu + 9) / 10)
}

/// `mj_basic_score`: caps fan at yakuman-adjacent bands before falling back
/// to the `fu << (2 + fan)` formula.
pub const fn basic_score(fu: u32, fan: u32) -> u32 {
    if fan > 10 {
        SANBAIMAN_POINTS
    } else if fan > 7 {
        BAIMAN_POINTS
    } else if fan > 5 {
        HANEMAN_POINTS
    } else if fan == 5 || (fan == 4 && fu >= 40) || (fan == 3 && fu >= 70) {
        MANGAN_POINTS
    } else if fan > 0 {
        fu << (2 + fan)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_fu_rounds_up_to_ten() {
        assert_eq!(round_fu(22), 30);
        assert_eq!(round_fu(20), 20);
        assert_eq!(round_fu(31), 40);
    }

    #[test]
    fn basic_score_mangan_band() {
        assert_eq!(basic_score(30, 5), MANGAN_POINTS);
        assert_eq!(basic_score(40, 4), MANGAN_POINTS);
        assert_eq!(basic_score(70, 3), MANGAN_POINTS);
    }

    #[test]
    fn basic_score_below_mangan_uses_formula() {
        assert_eq!(basic_score(30, 3), 30 << 5);
    }

    #[test]
    fn basic_score_yakuman_bands() {
        assert_eq!(basic_score(30, 6), HANEMAN_POINTS);
        assert_eq!(basic_score(30, 8), BAIMAN_POINTS);
        assert_eq!(basic_score(30, 11), SANBAIMAN_POINTS);
    }

    #[test]
    fn all_yaku_have_names() {
        for y in Yaku::ALL {
            assert!(!y.name().is_empty());
        }
    }
}
