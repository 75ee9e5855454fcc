//! Error taxonomy for the server, mirroring the teacher's
//! `ActionError`/`ReactionError` split: one rejectable-condition enum per
//! seam, aggregated at the top for `main`'s `anyhow::Result`.

use riichi_elements::tile::Tile;
use thiserror::Error;

use crate::wall::WallError;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("tile {0} is not in the discarding player's hand")]
    DiscardNotInHand(Tile),
    #[error("riichi requires a closed hand")]
    RiichiWithOpenMeld,
    #[error("riichi requires at least 1000 points")]
    RiichiWithoutPoints,
    #[error("riichi requires a tenpai hand after discarding")]
    RiichiWhileNotTenpai,
    #[error("under riichi, only the just-drawn tile may be discarded")]
    DiscardNotDrawnTileUnderRiichi(Tile),
    #[error("not enough {0} in hand for a closed kong")]
    NotEnoughForClosedKong(Tile),
    #[error("no matching open pong for added kong on {0}")]
    NoPongForAddedKong(Tile),
    #[error("tsumo declared with zero yaku")]
    TsumoWithoutYaku,
}

#[derive(Debug, Error)]
pub enum ReactionError {
    #[error("no discard to react to")]
    NoPendingDiscard,
    #[error("seat is in furiten and cannot ron")]
    Furiten,
    #[error("ron declared with zero yaku")]
    RonWithoutYaku,
    #[error("chow is only legal from the immediate downstream seat")]
    ChowNotFromUpstream,
    #[error("call_with_tile supplied {0} tiles, call needs {1}")]
    WrongAuxiliaryTileCount(usize, usize),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Wall(#[from] WallError),
    #[error(transparent)]
    Frame(#[from] riichi_proto::frame::FrameError),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Reaction(#[from] ReactionError),
    #[error("no seat is free to accept a new player")]
    NoSeatAvailable,
    #[error("unknown game id {0:#06x}")]
    UnknownGame(u16),
}
