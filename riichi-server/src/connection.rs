//! Per-socket connection state machine: handshake, heartbeat, and the
//! send/recv contracts that isolate the session engine from raw I/O.
//!
//! Grounded on `client/receiver.cpp`'s RX-thread/ping-thread split and the
//! handshake sequence from `utils/message.hpp`'s header table. Two
//! long-lived threads per connection are kept (matching `spec.md` §4.5 and
//! §9's note that the per-connection thread pair is preserved, not
//! collapsed, since `std::net`/`std::thread` has no task primitive to fold
//! them into).

use std::io::{self, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use riichi_proto::frame::{Frame, FrameError};
use riichi_proto::header::{magic, Header};
use riichi_proto::queue::MessageQueue;

pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(400);
pub const PING_INTERVAL: Duration = Duration::from_secs(15);
pub const PING_ACK_TIMEOUT: Duration = Duration::from_millis(300);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Identity {
    Player { uid: u16 },
    Spectator { game_id: u16 },
}

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("handshake timed out")]
    Timeout,
    #[error("unexpected header {0} during handshake")]
    UnexpectedHeader(Header),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Sends `your_id`, then expects `join_as_player`/`join_as_spectator`
/// followed by `my_id`, all within [`HANDSHAKE_TIMEOUT`].
pub fn handshake(stream: &mut TcpStream, allocated_uid: u16) -> Result<Identity, HandshakeError> {
    stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
    Frame::new(Header::YourId, allocated_uid).write_to(stream)?;

    let join = read_frame_timing_out(stream)?;
    let provisional = match join.header {
        Header::JoinAsPlayer if join.payload == magic::NEW_PLAYER => Identity::Player { uid: allocated_uid },
        Header::JoinAsSpectator => Identity::Spectator { game_id: join.payload },
        other => return Err(HandshakeError::UnexpectedHeader(other)),
    };

    let my_id = read_frame_timing_out(stream)?;
    match (provisional, my_id.header) {
        (Identity::Player { .. }, Header::MyId) => Ok(Identity::Player { uid: my_id.payload }),
        (spectator @ Identity::Spectator { .. }, Header::MyId) => Ok(spectator),
        (_, other) => Err(HandshakeError::UnexpectedHeader(other)),
    }
}

fn read_frame_timing_out(stream: &mut TcpStream) -> Result<Frame, HandshakeError> {
    match Frame::read_from(stream) {
        Ok(frame) => Ok(frame),
        Err(FrameError::Io(e)) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
            Err(HandshakeError::Timeout)
        }
        Err(e) => Err(e.into()),
    }
}

/// A live connection's write side, plus its liveness flag and its own
/// inbound queue. Cheap to clone (just a handful of `Arc`s), shared between
/// the session engine (to send/recv) and this module's own threads.
///
/// Each connection gets its own queue rather than one shared across a game
/// (contrast `riichi_proto::queue::MessageQueue` used for opponent-call
/// broadcasts in the engine): self-call and discard windows address a
/// single player directly, the way the original's per-socket `recv` did.
#[derive(Clone)]
pub struct ConnectionHandle {
    writer: Arc<Mutex<TcpStream>>,
    pub closed: Arc<AtomicBool>,
    pub incoming: Arc<MessageQueue<Frame>>,
    ping_ack: Arc<(Mutex<bool>, Condvar)>,
}

impl ConnectionHandle {
    /// Best-effort send: any I/O error closes the socket and returns
    /// `false`, matching the "send is best-effort" contract (§4.5).
    pub fn send(&self, frame: Frame) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        let mut writer = self.writer.lock().unwrap();
        match frame.write_to(&mut *writer) {
            Ok(()) => true,
            Err(e) => {
                warn!("send failed, closing connection: {e}");
                self.close();
                false
            }
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let _ = self.writer.lock().unwrap().shutdown(std::net::Shutdown::Both);
    }

    /// Recv-with-deadline: the next non-ping frame, or a `Timeout` frame if
    /// `deadline` passes first. Never blocks past the deadline (§4.5).
    pub fn recv_until(&self, deadline: Instant) -> Frame {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.incoming.pop_timeout(remaining) {
            Some(frame) => frame,
            None => Frame::new(Header::Timeout, magic::TIMEOUT),
        }
    }

    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }
}

/// Inbound queue depth: generous enough that a burst of opponent-call
/// chatter (call_with_tile frames) never blocks the RX thread.
pub const INCOMING_QUEUE_CAPACITY: usize = 32;

/// Spawns the RX and ping threads for an already-handshaken socket. Frames
/// other than `ping` are pushed into the connection's own `incoming` queue;
/// `ping` acks are routed to a local condvar instead, per §4.5.
pub fn spawn_connection(stream: TcpStream, uid: u16) -> io::Result<ConnectionHandle> {
    let rx_stream = stream.try_clone()?;
    let writer = Arc::new(Mutex::new(stream));
    let closed = Arc::new(AtomicBool::new(false));
    let incoming = Arc::new(MessageQueue::new(INCOMING_QUEUE_CAPACITY));
    let ping_ack = Arc::new((Mutex::new(false), Condvar::new()));

    let handle = ConnectionHandle {
        writer: writer.clone(),
        closed: closed.clone(),
        incoming: incoming.clone(),
        ping_ack: ping_ack.clone(),
    };

    {
        let mut rx_stream = rx_stream;
        let incoming = incoming.clone();
        let closed = closed.clone();
        let ping_ack = ping_ack.clone();
        thread::Builder::new()
            .name(format!("rx-{uid:04x}"))
            .spawn(move || rx_loop(&mut rx_stream, uid, &incoming, &closed, &ping_ack))
            .expect("spawning the RX thread");
    }

    {
        let handle = handle.clone();
        thread::Builder::new()
            .name(format!("ping-{uid:04x}"))
            .spawn(move || ping_loop(handle))
            .expect("spawning the ping thread");
    }

    Ok(handle)
}

fn rx_loop(
    stream: &mut TcpStream,
    uid: u16,
    incoming: &MessageQueue<Frame>,
    closed: &AtomicBool,
    ping_ack: &(Mutex<bool>, Condvar),
) {
    loop {
        match Frame::read_from(stream) {
            Ok(frame) if frame.header == Header::Ping => {
                let (lock, cvar) = ping_ack;
                *lock.lock().unwrap() = true;
                cvar.notify_one();
            }
            Ok(frame) => {
                debug!("uid {uid:04x} <- {:?}", frame.header);
                incoming.push(frame);
            }
            Err(e) => {
                info!("uid {uid:04x} connection closed: {e}");
                closed.store(true, Ordering::Release);
                return;
            }
        }
    }
}

fn ping_loop(handle: ConnectionHandle) {
    while handle.is_open() {
        thread::sleep(PING_INTERVAL);
        if !handle.is_open() {
            return;
        }
        if !handle.send(Frame::new(Header::Ping, magic::PING)) {
            return;
        }
        let (lock, cvar) = &*handle.ping_ack;
        let guard = lock.lock().unwrap();
        let (mut guard, result) = cvar.wait_timeout(guard, PING_ACK_TIMEOUT).unwrap();
        if result.timed_out() && !*guard {
            warn!("ping ack timed out, closing connection");
            handle.close();
            return;
        }
        *guard = false;
    }
}
