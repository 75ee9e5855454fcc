//! The client binary: connects to a server, performs the join handshake,
//! then runs the dispatch (read) and input (write) threads side by side.
//! Grounded on `src/client/main.cpp`'s equivalent startup sequence.

use std::net::TcpStream;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use log::info;
use riichi_client::dispatch;
use riichi_client::handshake::{join_as_player, rejoin_as_player};
use riichi_client::input;
use riichi_client::session::SharedMirror;
use riichi_elements::player::Seat;

#[derive(Parser, Debug)]
#[command(about = "Client for four-player riichi mahjong")]
struct Cli {
    /// Server hostname or address.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Previously-confirmed game id to reconnect with, instead of joining fresh.
    #[arg(long)]
    reconnect: Option<u16>,
}

const DEFAULT_PORT: u16 = 10000;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut stream = TcpStream::connect((cli.host.as_str(), cli.port))?;
    let uid = match cli.reconnect {
        Some(uid) => rejoin_as_player(&mut stream, uid)?,
        None => join_as_player(&mut stream)?,
    };
    info!("CLIENT: joined as uid {uid:#06x}");

    let mirror = Arc::new(SharedMirror::new(Seat::EAST));

    let dispatch_stream = stream.try_clone()?;
    let dispatch_mirror = mirror.clone();
    let dispatch_thread = thread::spawn(move || dispatch::run(dispatch_stream, dispatch_mirror));

    let input_stream = stream.try_clone()?;
    input::run(input_stream, mirror)?;

    let _ = dispatch_thread.join();
    Ok(())
}
