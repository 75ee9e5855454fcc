//! The human-readable per-round game log written to `logs/NNNN.log`
//! (spec.md §6.3), grounded on `game::log_cur`/`game.cpp`'s `game_log`
//! stream. Advisory and plain-text; not required to round-trip, unlike the
//! wire protocol.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use riichi_elements::player::Seat;
use riichi_elements::tile::Tile;

pub struct RoundLog {
    file: File,
}

impl RoundLog {
    pub fn create(dir: &Path, game_id: u16) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path: PathBuf = dir.join(format!("{game_id:04}.log"));
        let file = File::options().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// One line per discard/call event, `"<seat> <verb> <tile>"`, matching
    /// `log_cur`'s `cur_player msg number suit` format.
    pub fn record(&mut self, seat: Seat, verb: &str, tile: Tile) -> io::Result<()> {
        writeln!(self.file, "{} {} {}", seat.value(), verb, tile)
    }

    pub fn record_round_start(&mut self, round: u32, dealer: Seat) -> io::Result<()> {
        writeln!(self.file, "--- round {round}, dealer seat{} ---", dealer.value())
    }

    pub fn record_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.file, "{line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riichi_elements::tile::Suit;

    #[test]
    fn record_writes_a_line() {
        let dir = std::env::temp_dir().join(format!("riichi-log-test-{:?}", std::thread::current().id()));
        let mut log = RoundLog::create(&dir, 1).unwrap();
        log.record(Seat::new(0), "discarded", Tile::new(Suit::Man, 0, 0)).unwrap();
        let contents = fs::read_to_string(dir.join("0001.log")).unwrap();
        assert!(contents.contains("discarded"));
        let _ = fs::remove_dir_all(&dir);
    }
}
