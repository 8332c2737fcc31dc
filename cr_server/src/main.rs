//! Multi-table card room server.
//!
//! Spawns a table actor per game, routed by the in-process game server,
//! with token verification against the shared auth secret.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;

use card_room::GameServer;
use card_room::auth::JwtVerifier;
use card_room::store::InMemoryChipStore;
use cr_server::api::{self, AppState};
use cr_server::config::ServerConfig;

const HELP: &str = "\
Run a multi-table card room server

USAGE:
  cr_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:7777]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  JWT_SECRET               Token verification secret (required)
  STARTING_CHIPS           Default stack for seated players
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists.
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let config = ServerConfig::from_env(bind_override)?;
    info!("starting card room server at {}", config.bind);

    let verifier = Arc::new(JwtVerifier::new(&config.jwt_secret));
    let chip_store = Arc::new(InMemoryChipStore::new(config.starting_chips));
    let server = Arc::new(GameServer::new(verifier, chip_store));

    let app = api::create_router(AppState { server });
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
