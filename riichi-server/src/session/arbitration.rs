//! Opponent-call priority arbitration: after a discard, every other seat
//! gets a chance to call it, resolved ron > kong > pong > chow, ties broken
//! by closeness to the discarder (the next seat downstream wins).
//!
//! Grounded on `game::opponent_call` in `game.cpp`. The original builds a
//! 10-slot `priority` array and a switch statement whose case labels fall
//! through from `ron` down to `pass_calls` -- per the resolved Open Question
//! (spec.md §9), that fall-through is a bug in the original, not an
//! intentional cascade (a ron call should not also arm that seat's pong/chow
//! slots). This module builds the equivalent ordering explicitly and applies
//! each incoming call to exactly the slot it names.

use riichi_elements::player::Seat;
use riichi_elements::tile::Tile;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CallKind {
    Chow,
    Pong,
    Kong,
    Ron,
}

impl CallKind {
    /// Relative priority: higher wins. Matches the original's slot banding
    /// (chow lowest, then pong, kong, ron highest).
    fn rank(self) -> u8 {
        match self {
            CallKind::Chow => 0,
            CallKind::Pong => 1,
            CallKind::Kong => 2,
            CallKind::Ron => 3,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SlotState {
    /// The call is structurally legal but not yet confirmed by the seat.
    Maybe,
    /// The seat has declared this call.
    Confirmed,
}

#[derive(Copy, Clone, Debug)]
pub struct Slot {
    pub seat: Seat,
    pub kind: CallKind,
    pub state: SlotState,
}

/// One opponent's set of legal reactions to the current discard, built from
/// call-availability predicates plus whether their hand would win on it.
pub struct Candidate {
    pub seat: Seat,
    pub can_chow: bool,
    pub can_pong: bool,
    pub can_kong: bool,
    pub can_ron: bool,
}

/// Builds the priority-ordered slot list: ron slots (closest seat to the
/// discarder first), then kong, then pong, then the single chow slot (only
/// the immediate downstream seat may chow). Iterating this list front-to-back
/// and taking the first `Confirmed` slot reproduces the original's
/// "walk max_priority down until something sticks" search without the
/// fall-through bug.
pub fn priority_order(discarder: Seat, candidates: &[Candidate]) -> Vec<Slot> {
    let downstream = discarder.downstream_order();
    let mut slots = Vec::with_capacity(10);

    for &seat in &downstream {
        if let Some(c) = candidates.iter().find(|c| c.seat == seat) {
            if c.can_ron {
                slots.push(Slot { seat, kind: CallKind::Ron, state: SlotState::Maybe });
            }
        }
    }
    for &seat in &downstream {
        if let Some(c) = candidates.iter().find(|c| c.seat == seat) {
            if c.can_kong {
                slots.push(Slot { seat, kind: CallKind::Kong, state: SlotState::Maybe });
            }
        }
    }
    for &seat in &downstream {
        if let Some(c) = candidates.iter().find(|c| c.seat == seat) {
            if c.can_pong {
                slots.push(Slot { seat, kind: CallKind::Pong, state: SlotState::Maybe });
            }
        }
    }
    // Chow is only legal from the immediate downstream seat.
    let chow_seat = downstream[0];
    if let Some(c) = candidates.iter().find(|c| c.seat == chow_seat) {
        if c.can_chow {
            slots.push(Slot { seat: chow_seat, kind: CallKind::Chow, state: SlotState::Maybe });
        }
    }

    slots.sort_by(|a, b| b.kind.rank().cmp(&a.kind.rank()));
    slots
}

/// Marks every slot belonging to `seat` with call kind `kind` as confirmed.
/// A pass (`kind: None`) removes all of that seat's slots instead, matching
/// "priority[...] = MJ_FALSE" on `pass_calls` in the original.
pub fn apply_call(slots: &mut Vec<Slot>, seat: Seat, kind: Option<CallKind>) {
    match kind {
        Some(kind) => {
            for slot in slots.iter_mut() {
                if slot.seat == seat && slot.kind == kind {
                    slot.state = SlotState::Confirmed;
                }
            }
        }
        None => slots.retain(|s| s.seat != seat),
    }
}

/// The highest-priority confirmed slot, if any -- but only once no
/// higher-ranked `Maybe` slot is still unresolved. A seat that confirms a
/// pong before a higher-priority ron seat has responded must not resolve
/// the pong out from under that still-pending ron.
pub fn winning_slot(slots: &[Slot]) -> Option<Slot> {
    let max_pending_rank = slots.iter().filter(|s| s.state == SlotState::Maybe).map(|s| s.kind.rank()).max();
    slots
        .iter()
        .filter(|s| s.state == SlotState::Confirmed)
        .filter(|s| match max_pending_rank {
            Some(r) => s.kind.rank() >= r,
            None => true,
        })
        .max_by_key(|s| s.kind.rank())
        .copied()
}

/// A pacing delay (0..END_TURN_DELAY) when nobody calls, ported from
/// `wall.tiger() / 0xffff * END_TURN_DELAY`.
pub fn end_turn_delay_millis(tiger: u16, end_turn_delay_millis: u64) -> u64 {
    (tiger as u64 * end_turn_delay_millis) / 0xffff
}

#[derive(Copy, Clone, Debug)]
pub struct RonTarget {
    pub seat: Seat,
    pub winning_tile: Tile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(seat: Seat) -> Candidate {
        Candidate { seat, can_chow: false, can_pong: false, can_kong: false, can_ron: false }
    }

    #[test]
    fn ron_outranks_everything_regardless_of_seat_order() {
        let discarder = Seat::new(0);
        let mut far = candidate(Seat::new(3));
        far.can_ron = true;
        let mut near = candidate(Seat::new(1));
        near.can_pong = true;
        let slots = priority_order(discarder, &[far, near]);
        assert_eq!(slots[0].kind, CallKind::Ron);
    }

    #[test]
    fn only_immediate_downstream_seat_gets_a_chow_slot() {
        let discarder = Seat::new(0);
        let mut skip = candidate(Seat::new(2));
        skip.can_chow = true;
        let slots = priority_order(discarder, &[skip]);
        assert!(slots.is_empty());
    }

    #[test]
    fn a_ron_call_does_not_arm_that_seats_pong_slot() {
        let discarder = Seat::new(0);
        let mut c = candidate(Seat::new(1));
        c.can_ron = true;
        c.can_pong = true;
        let mut slots = priority_order(discarder, &[c]);
        apply_call(&mut slots, Seat::new(1), Some(CallKind::Ron));
        let pong_confirmed = slots.iter().any(|s| s.kind == CallKind::Pong && s.state == SlotState::Confirmed);
        assert!(!pong_confirmed);
        assert_eq!(winning_slot(&slots).unwrap().kind, CallKind::Ron);
    }

    #[test]
    fn confirmed_pong_does_not_resolve_while_ron_is_still_pending() {
        let discarder = Seat::new(0);
        let mut ron_seat = candidate(Seat::new(3));
        ron_seat.can_ron = true;
        let mut pong_seat = candidate(Seat::new(1));
        pong_seat.can_pong = true;
        let mut slots = priority_order(discarder, &[ron_seat, pong_seat]);
        apply_call(&mut slots, Seat::new(1), Some(CallKind::Pong));
        assert!(winning_slot(&slots).is_none());

        apply_call(&mut slots, Seat::new(3), None);
        assert_eq!(winning_slot(&slots).unwrap().kind, CallKind::Pong);
    }

    #[test]
    fn passing_removes_all_of_a_seats_slots() {
        let discarder = Seat::new(0);
        let mut c = candidate(Seat::new(1));
        c.can_pong = true;
        c.can_kong = true;
        let mut slots = priority_order(discarder, &[c]);
        apply_call(&mut slots, Seat::new(1), None);
        assert!(slots.is_empty());
    }
}
