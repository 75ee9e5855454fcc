//! The per-round turn FSM: draw, self-call, discard, opponent-call
//! arbitration, after-kong dora reveal, exhaustive draw, chombo, and
//! dealer/honba progression.
//!
//! Ported from `game::play`'s state-machine switch and its per-state
//! methods in `game.cpp`. The original runs this as one detached thread per
//! `game`; here it's a method on [`Engine`] meant to be run on its own
//! thread by the server shell, one per active game.

use std::time::{Duration, Instant};

use log::{info, warn};
use riichi_decomp::calls::{chow_available, closed_kong_available, is_valid_chow, kong_available, pong_available};
use riichi_decomp::decompose::{agari_decompositions, is_tenpai};
use riichi_decomp::hand::Hand;
use riichi_decomp::scoring::{best_score, score_chiitoitsu, ScoringContext};
use riichi_elements::meld::Meld;
use riichi_elements::player::Seat;
use riichi_elements::tile::Tile;
use riichi_proto::frame::Frame;
use riichi_proto::header::{magic, Header};

use crate::connection::ConnectionHandle;
use crate::errors::{ActionError, ReactionError};
use crate::session::arbitration::{apply_call, priority_order, winning_slot, CallKind, Candidate, SlotState};
use crate::session::log::RoundLog;
use crate::session::state::{GameState, BONUS_SCORE_STEP, MANGAN, RIICHI_DEPOSIT};

pub const SELF_CALL_TIMEOUT: Duration = Duration::from_secs(60);
pub const DISCARD_TIMEOUT: Duration = Duration::from_secs(60);
pub const OPPONENT_CALL_TIMEOUT: Duration = Duration::from_secs(60);
pub const TENPAI_TIMEOUT: Duration = Duration::from_secs(60);
pub const END_TURN_DELAY_MS: u64 = 2000;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RoundState {
    StartRound,
    Draw,
    SelfCall,
    Discard,
    OpponentCall,
    AfterKong,
    Next,
    Renchan,
    ExhaustiveDraw,
    FourKongsDraw,
    Tsumogiri,
    Chombo,
    GameOver,
}

pub struct Engine {
    pub game_id: u16,
    pub state: GameState,
    pub players: [ConnectionHandle; 4],
    pub spectators: Vec<ConnectionHandle>,
    pub log: RoundLog,
    cur_state: RoundState,
    /// Draws taken since the deal this round; the very first four (one per
    /// seat) are the window double-riichi can still apply in.
    turns_since_deal: u8,
}

impl Engine {
    pub fn new(game_id: u16, heads_up: bool, players: [ConnectionHandle; 4], log: RoundLog) -> Self {
        Self {
            game_id,
            state: GameState::new(heads_up),
            players,
            spectators: Vec::new(),
            log,
            cur_state: RoundState::StartRound,
            turns_since_deal: 0,
        }
    }

    fn broadcast(&self, header: Header, payload: u16) {
        for p in &self.players {
            p.send(Frame::new(header, payload));
        }
        for s in &self.spectators {
            s.send(Frame::new(header, payload));
        }
    }

    fn broadcast_exclusive(&self, header: Header, payload: u16, exclude: Seat) {
        for (i, p) in self.players.iter().enumerate() {
            if i != exclude.value() as usize {
                p.send(Frame::new(header, payload));
            }
        }
        for s in &self.spectators {
            s.send(Frame::new(header, payload));
        }
    }

    fn broadcast_hand(&self, seat: Seat) {
        self.broadcast(Header::ThisPlayerHand, seat.value() as u16);
        self.broadcast(Header::ClosedHand, magic::START_STREAM);
        for &t in self.state.seat(seat).hand.tiles() {
            self.broadcast(Header::Tile, t.id9());
        }
        self.broadcast(Header::ClosedHand, magic::END_STREAM);
    }

    fn payment(&mut self, seat: Seat, score: i32) {
        self.state.seat_mut(seat).score += score;
        self.broadcast(Header::ThisPlayerWon, seat.value() as u16);
        self.broadcast(Header::ThisManyPoints, score as u16);
    }

    /// Runs until the round (or the whole game, at `prevailing_wind` ==
    /// West) ends. One call corresponds to `game::play`'s outer loop.
    pub fn run(&mut self) {
        loop {
            match self.cur_state {
                RoundState::GameOver => return,
                RoundState::StartRound => self.start_round(),
                RoundState::Draw => self.draw(),
                RoundState::SelfCall => self.cur_state = self.self_call(),
                RoundState::Discard => self.cur_state = self.discard(),
                RoundState::OpponentCall => self.cur_state = self.opponent_call(),
                RoundState::AfterKong => {
                    self.new_dora();
                    self.cur_state = if self.state.kong_count >= 5 {
                        RoundState::FourKongsDraw
                    } else {
                        RoundState::Draw
                    };
                }
                RoundState::Next => self.next(),
                RoundState::Renchan => self.renchan(),
                RoundState::ExhaustiveDraw => self.exhaustive_draw(),
                RoundState::FourKongsDraw => self.four_kongs_draw(),
                RoundState::Tsumogiri => self.cur_state = self.tsumogiri(),
                RoundState::Chombo => self.chombo_penalty(),
            }
        }
    }

    fn start_round(&mut self) {
        use riichi_elements::player::Wind;
        if self.state.prevailing_wind == Wind::West {
            self.cur_state = RoundState::GameOver;
            return;
        }

        self.state.reset_round();
        self.state.cur_player = self.state.dealer;

        for _ in 0..4 {
            for _ in 0..13 {
                self.draw_one();
            }
            self.state.cur_player = self.state.cur_player.succ();
        }
        self.new_dora();

        self.state.first_turn = true;
        self.turns_since_deal = 0;
        self.state.cur_player = self.state.dealer;
        self.state.cur_tile = Tile::INVALID;
        self.cur_state = RoundState::Draw;
    }

    /// One unchecked draw used by the deal loop; doesn't touch `cur_state`.
    fn draw_one(&mut self) {
        if let Ok(tile) = self.state.wall.draw() {
            let seat = self.state.cur_player;
            self.state.seat_mut(seat).hand.push(tile);
        }
    }

    fn draw(&mut self) {
        let tile = match self.state.wall.draw() {
            Ok(t) => t,
            Err(_) => {
                self.cur_state = RoundState::ExhaustiveDraw;
                return;
            }
        };

        self.turns_since_deal += 1;
        if self.turns_since_deal > 4 {
            self.state.first_turn = false;
        }

        let seat = self.state.cur_player;
        self.state.seat_mut(seat).hand.push(tile);
        self.state.seat_mut(seat).flags.ippatsu = false;

        self.broadcast(Header::ThisPlayerDrew, seat.value() as u16);
        if tile.is_opaque() {
            self.broadcast_exclusive(Header::Tile, Tile::INVALID.id9(), seat);
            self.players[seat.value() as usize].send(Frame::new(Header::Tile, tile.id9()));
        } else {
            self.broadcast(Header::Tile, tile.id9());
        }

        self.state.cur_tile = tile;
        let _ = self.log.record(seat, "drew", tile);
        self.cur_state = RoundState::SelfCall;
    }

    fn new_dora(&mut self) {
        if let Ok(indicator) = self.state.wall.draw_dora() {
            self.state.dora_indicators.push(indicator);
            self.broadcast(Header::DoraIndicator, indicator.id9());
        }
    }

    fn scoring_context(&self, seat: Seat, winning_tile: Tile, tsumo: bool) -> ScoringContext {
        let seat_state = self.state.seat(seat);
        ScoringContext {
            seat_wind: seat.wind_relative_to(self.state.dealer),
            round_wind: self.state.prevailing_wind,
            winning_tile,
            tsumo,
            riichi: seat_state.flags.riichi,
            double_riichi: seat_state.flags.double_riichi,
            ippatsu: seat_state.flags.ippatsu,
            haitei: tsumo && self.state.wall.size() == 0,
            houtei: !tsumo && self.state.wall.size() == 0,
            rinshan: self.state.kong_flag,
            chankan: self.state.other_kong_flag,
            dora_count: self.state.total_dora_count(seat),
        }
    }

    /// `game::self_call`: the current player's post-draw window. Returns the
    /// next round state.
    fn self_call(&mut self) -> RoundState {
        let deadline = Instant::now() + SELF_CALL_TIMEOUT;
        let seat = self.state.cur_player;

        loop {
            let frame = self.players[seat.value() as usize].recv_until(deadline);
            match frame.header {
                Header::CallKong => {
                    let aux = self.players[seat.value() as usize].recv_until(deadline);
                    if aux.header != Header::CallWithTile {
                        self.reject(seat);
                        continue;
                    }
                    let tile = Tile::from_id9(aux.payload);
                    match self.try_self_kong(seat, tile) {
                        Ok(()) => return RoundState::AfterKong,
                        Err(_) => {
                            self.reject(seat);
                            continue;
                        }
                    }
                }
                Header::CallTsumo => return self.call_tsumo(),
                Header::CallRiichi => {
                    if let Err(e) = self.declare_riichi(seat) {
                        warn!("rejected riichi: {e}");
                        self.reject(seat);
                        continue;
                    }
                    return RoundState::Discard;
                }
                Header::PassCalls => return RoundState::Discard,
                Header::DiscardTile => {
                    let tile = Tile::from_id9(frame.payload);
                    match self.discard_tile(seat, tile) {
                        Ok(()) => return RoundState::OpponentCall,
                        Err(_) => {
                            self.reject(seat);
                            continue;
                        }
                    }
                }
                Header::Timeout => return RoundState::Tsumogiri,
                _ => {
                    self.reject(seat);
                }
            }
        }
    }

    fn reject(&self, seat: Seat) {
        self.players[seat.value() as usize].send(Frame::new(Header::Reject, magic::REJECT));
    }

    fn declare_riichi(&mut self, seat: Seat) -> Result<(), ActionError> {
        if !self.state.seat(seat).is_closed() {
            return Err(ActionError::RiichiWithOpenMeld);
        }
        if self.state.seat(seat).score < RIICHI_DEPOSIT {
            return Err(ActionError::RiichiWithoutPoints);
        }
        if !is_tenpai(self.state.seat(seat).hand.tiles(), &self.state.seat(seat).melds) {
            return Err(ActionError::RiichiWhileNotTenpai);
        }

        self.broadcast(Header::ThisPlayerRiichi, seat.value() as u16);
        self.payment(seat, -RIICHI_DEPOSIT);
        self.state.deposit += RIICHI_DEPOSIT;

        let first_turn = self.state.seat(seat).flags.first_turn;
        let state = self.state.seat_mut(seat);
        if first_turn && self.state.first_turn {
            state.flags.double_riichi = true;
        } else {
            state.flags.riichi = true;
        }
        Ok(())
    }

    fn try_self_kong(&mut self, seat: Seat, tile: Tile) -> Result<(), ActionError> {
        let open_pongs = self.state.seat(seat).open_pongs_on(tile);
        if let Some(_existing) = open_pongs.first() {
            self.state.seat_mut(seat).hand.remove_id9(tile).map_err(|_| ActionError::NoPongForAddedKong(tile))?;
            let meld = self
                .state
                .seat_mut(seat)
                .melds
                .iter_mut()
                .find(|m| matches!(m.kind(), riichi_elements::meld::MeldKind::Pong) && m.repr().id7() == tile.id7())
                .ok_or(ActionError::NoPongForAddedKong(tile))?;
            let added = Meld::added_kong([meld.first(), meld.second(), meld.third(), tile], meld.called_from());
            *meld = added;
            self.state.other_kong_flag = true;
        } else if closed_kong_available(self.state.seat(seat).hand.tiles(), tile) {
            let mut tiles = Vec::new();
            for _ in 0..4 {
                tiles.push(self.state.seat_mut(seat).hand.remove_id9(tile).map_err(|_| ActionError::NotEnoughForClosedKong(tile))?);
            }
            self.state.seat_mut(seat).melds.push(Meld::closed_kong([tiles[0], tiles[1], tiles[2], tiles[3]]));
            self.state.closed_kong_flag = true;
        } else {
            return Err(ActionError::NotEnoughForClosedKong(tile));
        }

        self.state.kong_flag = true;
        self.state.kong_count += 1;
        self.state.first_turn = false;
        self.broadcast(Header::ThisPlayerKong, seat.value() as u16);
        self.broadcast(Header::Tile, tile.id9());
        Ok(())
    }

    fn discard_tile(&mut self, seat: Seat, tile: Tile) -> Result<(), ActionError> {
        let hand = &self.state.seat(seat).hand;
        if !hand.tiles().iter().any(|t| t.id9() == tile.id9()) {
            return Err(ActionError::DiscardNotInHand(tile));
        }
        self.state.seat_mut(seat).hand.remove_id9(tile).ok();
        self.state.seat_mut(seat).discards.push(tile);
        self.state.seat_mut(seat).flags.first_turn = false;
        self.broadcast(Header::Tile, tile.id9());
        self.state.cur_tile = tile;
        let _ = self.log.record(seat, "discarded", tile);
        Ok(())
    }

    /// `game::discard`: the follow-up discard after a passed self-call.
    fn discard(&mut self) -> RoundState {
        let deadline = Instant::now() + DISCARD_TIMEOUT;
        let seat = self.state.cur_player;
        self.state.kong_flag = false;

        let frame = self.players[seat.value() as usize].recv_until(deadline);
        if frame.header != Header::DiscardTile {
            return RoundState::Tsumogiri;
        }
        let tile = Tile::from_id9(frame.payload);

        let under_riichi = self.state.seat(seat).flags.riichi || self.state.seat(seat).flags.double_riichi;
        if under_riichi && tile.id9() != self.state.cur_tile.id9() {
            return RoundState::Chombo;
        }

        match self.discard_tile(seat, tile) {
            Ok(()) => RoundState::OpponentCall,
            Err(e) => {
                warn!("invalid discard from seat{}: {e}", seat.value());
                self.reject(seat);
                RoundState::Tsumogiri
            }
        }
    }

    fn tsumogiri(&mut self) -> RoundState {
        let seat = self.state.cur_player;
        let tile = self.state.cur_tile;
        if self.discard_tile(seat, tile).is_ok() {
            let _ = self.log.record(seat, "tsumogiri", tile);
        }
        RoundState::OpponentCall
    }

    fn call_tsumo(&mut self) -> RoundState {
        let seat = self.state.cur_player;
        self.broadcast(Header::ThisPlayerTsumo, seat.value() as u16);
        self.broadcast_hand(seat);

        let ctx = self.scoring_context(seat, self.state.cur_tile, true);
        let concealed: Vec<Tile> = self.state.seat(seat).hand.tiles().to_vec();
        let melds = self.state.seat(seat).melds.clone();

        let result = if riichi_decomp::decompose::is_chiitoitsu(&concealed) {
            score_chiitoitsu(&concealed, &ctx)
        } else {
            best_score(&agari_decompositions(&concealed, &melds), &ctx)
        };

        let Some(result) = result.filter(|r| r.has_yaku()) else {
            return RoundState::Chombo;
        };

        self.broadcast(Header::FuCount, result.fu as u16);
        self.broadcast(Header::YakuList, magic::START_STREAM);
        for (yaku, fan) in &result.yaku {
            self.broadcast(Header::WinningYaku, *yaku as u16);
            self.broadcast(Header::YakuFanCount, *fan as u16);
        }
        self.broadcast(Header::YakuList, magic::END_STREAM);

        for s in &mut self.state.seats {
            s.flags.ippatsu = false;
        }

        let score = result.points as i32 + self.state.bonus_score;
        let deposit = self.state.deposit;
        self.state.deposit = 0;
        if seat == self.state.dealer {
            for p in 0..4 {
                let p = Seat::new(p);
                if p == seat {
                    self.payment(p, 6 * score + deposit + 3 * self.state.bonus_score);
                } else {
                    self.payment(p, -2 * score - self.state.bonus_score);
                }
            }
            RoundState::Renchan
        } else {
            for p in 0..4 {
                let p = Seat::new(p);
                if p == seat {
                    self.payment(p, 4 * score + deposit + 3 * self.state.bonus_score);
                } else if p == self.state.dealer {
                    self.payment(p, -2 * score - self.state.bonus_score);
                } else {
                    self.payment(p, -score - self.state.bonus_score);
                }
            }
            RoundState::Next
        }
    }

    /// `game::opponent_call`: ron > kong > pong > chow arbitration.
    fn opponent_call(&mut self) -> RoundState {
        let discarder = self.state.cur_player;
        let cur_tile = self.state.cur_tile;
        let downstream = discarder.downstream_order();

        let candidates: Vec<Candidate> = downstream
            .iter()
            .map(|&seat| {
                let in_furiten = self.state.seat(seat).discards.iter().any(|d| d.id7() == cur_tile.id7());
                let hand = self.state.seat(seat).hand.tiles();
                let can_ron = !in_furiten && {
                    let mut trial: Vec<Tile> = hand.to_vec();
                    trial.push(cur_tile);
                    trial.sort();
                    let ctx = self.scoring_context(seat, cur_tile, false);
                    let result = if riichi_decomp::decompose::is_chiitoitsu(&trial) {
                        score_chiitoitsu(&trial, &ctx)
                    } else {
                        best_score(&agari_decompositions(&trial, &self.state.seat(seat).melds), &ctx)
                    };
                    result.is_some_and(|r| r.has_yaku())
                };
                Candidate {
                    seat,
                    can_chow: seat == downstream[0] && !chow_available(hand, cur_tile).is_empty(),
                    can_pong: pong_available(hand, cur_tile),
                    can_kong: kong_available(hand, cur_tile),
                    can_ron,
                }
            })
            .collect();

        let mut slots = priority_order(discarder, &candidates);
        if slots.is_empty() {
            self.pause_end_turn();
            return RoundState::Draw;
        }

        let deadline = Instant::now() + OPPONENT_CALL_TIMEOUT;
        loop {
            if let Some(winner) = winning_slot(&slots) {
                return self.dispatch_call(winner.seat, winner.kind, deadline);
            }

            let mut received_any = false;
            for &seat in &downstream {
                if let Some(frame) = self.players[seat.value() as usize].incoming.try_pop() {
                    received_any = true;
                    match frame.header {
                        Header::CallRon => apply_call(&mut slots, seat, Some(CallKind::Ron)),
                        Header::CallKong => apply_call(&mut slots, seat, Some(CallKind::Kong)),
                        Header::CallPong => apply_call(&mut slots, seat, Some(CallKind::Pong)),
                        Header::CallChow => apply_call(&mut slots, seat, Some(CallKind::Chow)),
                        Header::PassCalls => apply_call(&mut slots, seat, None),
                        _ => {}
                    }
                }
            }

            if slots.is_empty() {
                self.pause_end_turn();
                return RoundState::Draw;
            }
            if Instant::now() >= deadline {
                // The window is closed: any seat still `Maybe` gets treated
                // as a pass rather than blocking a lower-priority confirmed
                // call forever.
                slots.retain(|s| s.state == SlotState::Confirmed);
                if let Some(winner) = winning_slot(&slots) {
                    let aux_deadline = Instant::now() + OPPONENT_CALL_TIMEOUT;
                    return self.dispatch_call(winner.seat, winner.kind, aux_deadline);
                }
                self.pause_end_turn();
                return RoundState::Draw;
            }
            if !received_any {
                std::thread::sleep(Duration::from_millis(20));
            }
        }
    }

    fn pause_end_turn(&mut self) {
        let tiger = self.state.wall.tiger();
        let millis = crate::session::arbitration::end_turn_delay_millis(tiger, END_TURN_DELAY_MS);
        std::thread::sleep(Duration::from_millis(millis));
    }

    fn collect_call_tiles(&self, seat: Seat, count: usize, deadline: Instant) -> Result<Vec<Tile>, ReactionError> {
        let mut tiles = Vec::with_capacity(count);
        while tiles.len() < count {
            if Instant::now() >= deadline {
                return Err(ReactionError::WrongAuxiliaryTileCount(tiles.len(), count));
            }
            let frame = self.players[seat.value() as usize].recv_until(deadline);
            if frame.header == Header::CallWithTile {
                tiles.push(Tile::from_id9(frame.payload));
            } else {
                self.reject(seat);
            }
        }
        Ok(tiles)
    }

    fn dispatch_call(&mut self, seat: Seat, kind: CallKind, deadline: Instant) -> RoundState {
        let cur_tile = self.state.cur_tile;
        if kind != CallKind::Ron {
            self.state.first_turn = false;
        }
        match kind {
            CallKind::Ron => self.resolve_ron(seat, cur_tile),
            CallKind::Kong => {
                let tiles = match self.collect_call_tiles(seat, 3, deadline) {
                    Ok(t) => t,
                    Err(_) => return RoundState::Draw,
                };
                for &t in &tiles {
                    let _ = self.state.seat_mut(seat).hand.remove_id9(t);
                }
                self.broadcast(Header::ThisPlayerKong, seat.value() as u16);
                for &t in &tiles {
                    self.broadcast(Header::Tile, t.id9());
                }
                self.state.seat_mut(seat).melds.push(Meld::open_kong([cur_tile, tiles[0], tiles[1], tiles[2]], discarder_offset(seat, self.state.cur_player)));
                self.state.other_kong_flag = true;
                self.state.kong_count += 1;
                self.state.cur_player = seat;
                for s in &mut self.state.seats {
                    s.flags.ippatsu = false;
                }
                RoundState::AfterKong
            }
            CallKind::Pong => {
                let tiles = match self.collect_call_tiles(seat, 2, deadline) {
                    Ok(t) => t,
                    Err(_) => return RoundState::Draw,
                };
                for &t in &tiles {
                    let _ = self.state.seat_mut(seat).hand.remove_id9(t);
                }
                self.broadcast(Header::ThisPlayerPong, seat.value() as u16);
                for &t in &tiles {
                    self.broadcast(Header::Tile, t.id9());
                }
                self.state.seat_mut(seat).melds.push(Meld::pong([cur_tile, tiles[0], tiles[1]], discarder_offset(seat, self.state.cur_player)));
                self.state.cur_player = seat;
                for s in &mut self.state.seats {
                    s.flags.ippatsu = false;
                }
                RoundState::Discard
            }
            CallKind::Chow => {
                let tiles = match self.collect_call_tiles(seat, 2, deadline) {
                    Ok(t) => t,
                    Err(_) => return RoundState::Draw,
                };
                if !is_valid_chow(cur_tile, tiles[0], tiles[1]) {
                    warn!("invalid chow from seat{}: {:?} + {:?} with {cur_tile}", seat.value(), tiles[0], tiles[1]);
                    self.reject(seat);
                    self.pause_end_turn();
                    return RoundState::Draw;
                }
                for &t in &tiles {
                    let _ = self.state.seat_mut(seat).hand.remove_id9(t);
                }
                self.broadcast(Header::ThisPlayerChow, seat.value() as u16);
                for &t in &tiles {
                    self.broadcast(Header::Tile, t.id9());
                }
                let mut members = [cur_tile, tiles[0], tiles[1]];
                members.sort();
                self.state.seat_mut(seat).melds.push(Meld::chow(members, 1));
                self.state.cur_player = seat;
                for s in &mut self.state.seats {
                    s.flags.ippatsu = false;
                }
                RoundState::Discard
            }
        }
    }

    fn resolve_ron(&mut self, seat: Seat, winning_tile: Tile) -> RoundState {
        self.broadcast(Header::ThisPlayerRon, seat.value() as u16);

        let mut hand_tiles = self.state.seat(seat).hand.tiles().to_vec();
        hand_tiles.push(winning_tile);
        hand_tiles.sort();
        let ctx = self.scoring_context(seat, winning_tile, false);
        let melds = self.state.seat(seat).melds.clone();

        let result = if riichi_decomp::decompose::is_chiitoitsu(&hand_tiles) {
            score_chiitoitsu(&hand_tiles, &ctx)
        } else {
            best_score(&agari_decompositions(&hand_tiles, &melds), &ctx)
        };
        let Some(result) = result.filter(|r| r.has_yaku()) else {
            return RoundState::Draw;
        };

        self.state.seat_mut(seat).hand = Hand::new(hand_tiles);
        self.broadcast_hand(seat);
        self.broadcast(Header::FuCount, result.fu as u16);
        self.broadcast(Header::YakuList, magic::START_STREAM);
        for (yaku, fan) in &result.yaku {
            self.broadcast(Header::WinningYaku, *yaku as u16);
            self.broadcast(Header::YakuFanCount, *fan as u16);
        }
        self.broadcast(Header::YakuList, magic::END_STREAM);

        for s in &mut self.state.seats {
            s.flags.ippatsu = false;
        }

        let discarder = self.state.cur_player;
        let score = result.points as i32;
        let deposit = self.state.deposit;
        self.state.deposit = 0;
        if seat == self.state.dealer {
            self.payment(seat, 6 * score + deposit + 3 * self.state.bonus_score);
            self.payment(discarder, -6 * score - 3 * self.state.bonus_score);
            RoundState::Renchan
        } else {
            self.payment(seat, 4 * score + deposit + 3 * self.state.bonus_score);
            self.payment(discarder, -4 * score - 3 * self.state.bonus_score);
            RoundState::Next
        }
    }

    fn next(&mut self) {
        self.state.bonus_score = 0;
        self.state.deposit = 0;
        let next_dealer = self.state.dealer.succ();
        if next_dealer == Seat::EAST {
            self.state.prevailing_wind = self.state.prevailing_wind.succ();
        }
        self.state.dealer = next_dealer;
        self.cur_state = RoundState::StartRound;
    }

    fn renchan(&mut self) {
        self.state.bonus_score += BONUS_SCORE_STEP;
        self.cur_state = RoundState::StartRound;
    }

    fn exhaustive_draw(&mut self) {
        self.broadcast(Header::ExhaustiveDraw, magic::NO_INFO);
        let deadline = Instant::now() + TENPAI_TIMEOUT;

        let mut tenpai = [false; 4];
        let mut claimed_tenpai = [false; 4];
        for p in 0..4 {
            let seat = Seat::new(p);
            let frame = self.players[p as usize].recv_until(deadline);
            claimed_tenpai[p as usize] = frame.header == Header::CallTenpai && frame.payload == magic::TENPAI;
            let _ = seat;
        }

        let mut players_tenpai = 0;
        for p in 0..4 {
            let seat = Seat::new(p);
            let actually_tenpai = claimed_tenpai[p as usize]
                && is_tenpai(self.state.seat(seat).hand.tiles(), &self.state.seat(seat).melds);
            if actually_tenpai {
                self.broadcast_hand(seat);
                tenpai[p as usize] = true;
                players_tenpai += 1;
            } else {
                let under_riichi = self.state.seat(seat).flags.riichi || self.state.seat(seat).flags.double_riichi;
                if under_riichi {
                    self.state.cur_player = seat;
                    self.cur_state = RoundState::Chombo;
                    return;
                }
            }
        }

        let (winner_gain, loser_loss) = match players_tenpai {
            1 => (3000, 1000),
            2 => (1500, 1500),
            3 => (1000, 3000),
            _ => (0, 0),
        };
        if players_tenpai >= 1 && players_tenpai <= 3 {
            for p in 0..4 {
                let seat = Seat::new(p);
                if tenpai[p as usize] {
                    self.payment(seat, winner_gain);
                } else {
                    self.payment(seat, -loser_loss);
                }
            }
        }

        if tenpai[self.state.dealer.value() as usize] {
            self.cur_state = RoundState::Renchan;
        } else {
            let next_dealer = self.state.dealer.succ();
            if next_dealer == Seat::EAST {
                self.state.prevailing_wind = self.state.prevailing_wind.succ();
            }
            self.state.dealer = next_dealer;
            self.state.bonus_score += BONUS_SCORE_STEP;
            self.cur_state = RoundState::StartRound;
        }
    }

    /// A fifth kong this round aborts it outright: no tenpai payments, dealer
    /// keeps the seat on a renchan (spec.md §4.6's after-kong boundary).
    fn four_kongs_draw(&mut self) {
        self.broadcast(Header::ExhaustiveDraw, magic::FOUR_KONGS);
        self.cur_state = RoundState::Renchan;
    }

    fn chombo_penalty(&mut self) {
        let seat = self.state.cur_player;
        if self.state.heads_up {
            self.payment(seat, -2 * MANGAN);
            self.payment(seat.succ(), -2 * MANGAN);
            self.payment(seat.oppo(), 2 * MANGAN);
            self.payment(seat.pred(), 2 * MANGAN);
        } else if seat == self.state.dealer {
            for p in 0..4 {
                let p = Seat::new(p);
                if p == seat {
                    self.payment(p, -6 * MANGAN);
                } else {
                    self.payment(p, 2 * MANGAN);
                }
            }
        } else {
            for p in 0..4 {
                let p = Seat::new(p);
                if p == self.state.dealer {
                    self.payment(p, 2 * MANGAN);
                } else if p == seat {
                    self.payment(p, -4 * MANGAN);
                } else {
                    self.payment(p, MANGAN);
                }
            }
        }
        self.cur_state = RoundState::StartRound;
    }
}

fn discarder_offset(caller: Seat, discarder: Seat) -> u8 {
    caller.offset_to(discarder).max(1)
}
