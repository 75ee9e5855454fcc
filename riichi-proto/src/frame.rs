//! The fixed 3-byte frame: `[header:1B][payload:u16 LE]`, ported from
//! `msg::buffer_data`/`msg::data` in `utils/message.hpp`.

use crate::header::Header;
use std::io::{self, Read, Write};
use thiserror::Error;

pub const BUFFER_SIZE: usize = 3;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Frame {
    pub header: Header,
    pub payload: u16,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("unrecognized header byte {0:#04x}")]
    UnknownHeader(u8),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Frame {
    pub const fn new(header: Header, payload: u16) -> Self {
        Self { header, payload }
    }

    pub fn encode(self) -> [u8; BUFFER_SIZE] {
        let [lo, hi] = self.payload.to_le_bytes();
        [self.header.as_byte(), lo, hi]
    }

    pub fn decode(buf: [u8; BUFFER_SIZE]) -> Result<Self, FrameError> {
        let header = Header::from_byte(buf[0]).ok_or(FrameError::UnknownHeader(buf[0]))?;
        let payload = u16::from_le_bytes([buf[1], buf[2]]);
        Ok(Self { header, payload })
    }

    pub fn write_to<W: Write>(self, w: &mut W) -> Result<(), FrameError> {
        w.write_all(&self.encode())?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, FrameError> {
        let mut buf = [0u8; BUFFER_SIZE];
        r.read_exact(&mut buf)?;
        Self::decode(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips_every_header() {
        use crate::header::Header::*;
        let headers = [
            MyId, JoinAsPlayer, DiscardTile, CallPong, CallChow, CallKong, CallRiichi,
            CallRon, CallTsumo, Ping, Reject, QueueSize, YourId, YourPosition, ThisPlayerDrew,
            Tile, ThisPlayerWon, DoraIndicator, NewRound, Timeout,
        ];
        for h in headers {
            for payload in [0u16, 1, 255, 256, 0x1009, 0xefe0, u16::MAX] {
                let frame = Frame::new(h, payload);
                let encoded = frame.encode();
                let decoded = Frame::decode(encoded).unwrap();
                assert_eq!(decoded, frame);
            }
        }
    }

    #[test]
    fn decode_rejects_unknown_header_byte() {
        let buf = [0x01u8, 0, 0];
        assert!(matches!(Frame::decode(buf), Err(FrameError::UnknownHeader(1))));
    }

    #[test]
    fn write_read_round_trip_over_a_cursor() {
        let mut buf = Vec::new();
        Frame::new(crate::header::Header::Ping, 0xefe0).write_to(&mut buf).unwrap();
        let mut cursor = io::Cursor::new(buf);
        let frame = Frame::read_from(&mut cursor).unwrap();
        assert_eq!(frame.payload, 0xefe0);
    }
}
