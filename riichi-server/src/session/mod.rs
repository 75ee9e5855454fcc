//! The per-game session: round state, opponent-call arbitration, the
//! round log, and the turn FSM tying them together.

pub mod arbitration;
pub mod engine;
pub mod log;
pub mod state;

pub mod prelude {
    pub use super::arbitration::{apply_call, priority_order, winning_slot, CallKind, Candidate, Slot, SlotState};
    pub use super::engine::{Engine, RoundState};
    pub use super::log::RoundLog;
    pub use super::state::{GameState, SeatFlags, SeatState};
}
