use std::env;
use std::io::Error;
use std::sync::Arc;
use env_logger::{Builder, Target};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use log::LevelFilter::Info;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::Message;
use private_tally::configs::server::{ElectionSetup, ServerConfig, DEFAULT_CONFIG_PATH};
use private_tally::election::ElectionManager;
use private_tally::service;

type SharedManager = Arc<ElectionManager>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let mut builder = Builder::new();
    builder.filter_level(Info);
    builder.parse_default_env();
    builder.target(Target::Stdout);
    builder.init();

    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let voting_server_config = ServerConfig::load(&config_path).unwrap_or_else(|e| {
        warn!("{}. Using the default configuration.", e);
        ServerConfig::default()
    });
    let manager: SharedManager = Arc::new(ElectionManager::new());
    if let Some(setup) = &voting_server_config.election {
        start_configured_election(&manager, setup);
    }

    let addr = env::args().nth(2).unwrap_or(voting_server_config.listen_addr);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on: {}", addr);

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(accept_connection(stream, manager.clone()));
    }

    Ok(())
}

fn start_configured_election(manager: &ElectionManager, setup: &ElectionSetup) {
    let public_key = match setup.load_public_key() {
        Ok(public_key) => public_key,
        Err(e) => {
            error!("Configured election not started: {}", e);
            return;
        }
    };
    match manager.start(setup.candidates.clone(), setup.parties.clone(), public_key) {
        Ok(handle) => info!("Configured election started with {} options.", handle.vector_length),
        Err(e) => error!("Configured election not started: {}", e),
    }
}

async fn accept_connection(stream: TcpStream, manager: SharedManager) {
    let addr = match stream.peer_addr() {
        Ok(addr) => addr.to_string(),
        Err(_) => "unknown".to_string(),
    };
    info!("Peer address: {}", addr);

    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws_stream) => ws_stream,
        Err(e) => {
            error!("Error during the websocket handshake with {}: {}", addr, e);
            return;
        }
    };

    info!("New WebSocket connection: {}", addr);
    let (mut write, mut read) = ws_stream.split();

    while let Some(result) = read.next().await {
        match result {
            Ok(msg) => {
                if msg.is_close() {
                    break;
                }
                if !(msg.is_text() || msg.is_binary()) {
                    continue;
                }
                let text = match msg.into_text() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Dropping non UTF-8 message from {}: {}", addr, e);
                        continue;
                    }
                };
                // Tallying can take a while on large ballot boxes.
                let manager = manager.clone();
                let reply = match tokio::task::spawn_blocking(move || service::handle_message(&*manager, &text)).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        error!("Request handler failed: {}", e);
                        break;
                    }
                };
                if let Err(e) = write.send(Message::from(reply)).await {
                    error!("Error sending reply to {}: {}", addr, e);
                    break;
                }
            }
            Err(e) => {
                error!("Error receiving message: {}", e);
                break;
            }
        }
    }
    info!("Connection closed: {}", addr);
}
