//! Client-side session mirror, input thread, and dispatch thread for
//! four-player riichi mahjong.

pub mod dispatch;
pub mod handshake;
pub mod input;
pub mod session;

pub mod prelude {
    pub use crate::dispatch::{can_declare_win, run as run_dispatch};
    pub use crate::handshake::{join_as_player, rejoin_as_player, HandshakeError};
    pub use crate::input::run as run_input;
    pub use crate::session::{Mirror, MirroredSeat, SharedMirror};
}
