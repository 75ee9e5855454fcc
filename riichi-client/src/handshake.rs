//! Client-side half of the handshake: wait for `your_id`, reply
//! `join_as_player`, then echo `my_id` back.
//!
//! Grounded on `client::game`'s constructor in `game.cpp`: canonical order is
//! server sends `your_id` first (spec.md §9's resolved Open Question).

use std::io;
use std::net::TcpStream;

use riichi_proto::frame::{Frame, FrameError};
use riichi_proto::header::{magic, Header};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("expected your_id first, got {0}")]
    UnexpectedHeader(Header),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Performs the join handshake and returns the uid the server confirmed
/// (equal to what it sent, for a brand-new player; the client's own
/// remembered uid, for a reconnect).
pub fn join_as_player(stream: &mut TcpStream) -> Result<u16, HandshakeError> {
    let your_id = Frame::read_from(stream)?;
    if your_id.header != Header::YourId {
        return Err(HandshakeError::UnexpectedHeader(your_id.header));
    }

    Frame::new(Header::JoinAsPlayer, magic::NEW_PLAYER).write_to(stream)?;
    Frame::new(Header::MyId, your_id.payload).write_to(stream)?;
    Ok(your_id.payload)
}

/// Reconnects using a previously-confirmed uid instead of claiming a new one.
pub fn rejoin_as_player(stream: &mut TcpStream, uid: u16) -> Result<u16, HandshakeError> {
    let your_id = Frame::read_from(stream)?;
    if your_id.header != Header::YourId {
        return Err(HandshakeError::UnexpectedHeader(your_id.header));
    }

    Frame::new(Header::JoinAsPlayer, uid).write_to(stream)?;
    Frame::new(Header::MyId, uid).write_to(stream)?;
    Ok(uid)
}
