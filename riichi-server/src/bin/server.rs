//! The server binary: CLI parsing, logging setup, the debug console thread,
//! and the accept loop. Grounded on `src/server/main.cxx`.

use clap::Parser;
use log::info;
use riichi_server::shell::{bind, run_debug_console, Shell, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(about = "Authoritative networked server for four-player riichi mahjong")]
struct Cli {
    /// Enforce one connection per remote address.
    #[arg(long)]
    online: bool,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    std::fs::create_dir_all(riichi_server::shell::GAME_LOG_DIR)?;
    info!(
        "SERVER: starting on port {} ({} mode)",
        cli.port,
        if cli.online { "online" } else { "offline" }
    );

    let shell = Shell::new(cli.online);

    {
        let shell = shell.clone();
        std::thread::spawn(move || run_debug_console(shell));
    }

    let listener = bind(cli.port)?;
    shell.run(listener)?;
    Ok(())
}
