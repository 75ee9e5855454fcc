use riichi_elements::tile::Tile;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum DecompError {
    #[error("hand notation is malformed")]
    BadNotation,
    #[error("hand has {0} tiles, expected 13 or 14 concealed plus called melds")]
    WrongSize(usize),
    #[error("tile {0} is not present in the hand")]
    TileNotInHand(Tile),
}
