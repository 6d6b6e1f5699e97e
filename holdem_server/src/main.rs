//! Multiplayer Texas Hold'em server over plain TCP.
//!
//! One thread per client connection, blocking reads, line-oriented
//! commands. Tables live in a single registry shared by all handlers.

use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;

use holdem::Registry;
use holdem_server::config::ServerConfig;
use holdem_server::session::{self, SessionState};

const HELP: &str = "\
Run a multiplayer Texas Hold'em server

USAGE:
  holdem_server [OPTIONS]

OPTIONS:
  --bind  IP:PORT          Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:12345]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:12345)
  TABLE_MAX_SEATS          Seats per table             [default: 4]
  TABLE_SMALL_BLIND        Small blind                 [default: 50]
  TABLE_BIG_BLIND          Big blind                   [default: 100]
  TABLE_STARTING_CHIPS     Starting stack per seat     [default: 1000]
";

fn main() -> Result<(), Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override = pargs.opt_value_from_str("--bind")?;
    let config = ServerConfig::from_env(bind_override)?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();
    info!("Starting poker server at {}", config.bind);

    let registry = Registry::new(config.table.clone());
    let state = Arc::new(SessionState::new(registry));

    let listener = TcpListener::bind(config.bind)
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;
    info!(
        "Server is running at {}. Press Ctrl+C to stop.",
        config.bind
    );

    session::serve(&listener, &state);
    Ok(())
}
