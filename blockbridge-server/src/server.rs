use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use blockbridge_network_bedrock::{BedrockListener, BedrockTransport};
use blockbridge_network_common::{ConnectionError, ServerKeyPair};
use log::{debug, info, warn};
use scopeguard::ScopeGuard;
use tokio::net::TcpListener;

use crate::{
    config::ServerConfig,
    game::{messages::control::ControlMessage, GameConfig},
    protocol::{bedrock::run_bedrock_session, java::run_java_session, ProtocolServerError},
};

/// Shared by every session task.
pub struct ServerContext {
    pub config: ServerConfig,
    pub game_config: GameConfig,
    pub key_pair: ServerKeyPair,
    pub control_tx: crossbeam_channel::Sender<ControlMessage>,
    online_players: AtomicUsize,
}

impl ServerContext {
    pub fn new(
        config: ServerConfig,
        game_config: GameConfig,
        key_pair: ServerKeyPair,
        control_tx: crossbeam_channel::Sender<ControlMessage>,
    ) -> Self {
        Self {
            config,
            game_config,
            key_pair,
            control_tx,
            online_players: AtomicUsize::new(0),
        }
    }

    /// Players currently in play, as reported to server list queries.
    pub fn online_players(&self) -> usize {
        self.online_players.load(Ordering::Relaxed)
    }

    /// Counts a session as online until the guard is dropped.
    pub fn track_online<'a>(&'a self) -> ScopeGuard<&'a AtomicUsize, impl FnOnce(&'a AtomicUsize)> {
        self.online_players.fetch_add(1, Ordering::Relaxed);
        scopeguard::guard(&self.online_players, |online_players| {
            online_players.fetch_sub(1, Ordering::Relaxed);
        })
    }
}

fn log_session_end(peer: &str, result: Result<(), anyhow::Error>) {
    match result {
        Ok(()) => debug!("{} closed", peer),
        Err(error) if ProtocolServerError::is_clean_exit(&error) => {
            info!("{} disconnected: {}", peer, error)
        }
        Err(error)
            if matches!(
                error.downcast_ref::<ConnectionError>(),
                Some(ConnectionError::ConnectionLost)
            ) =>
        {
            info!("{} connection lost", peer)
        }
        Err(error) => warn!("{} session error: {:#}", peer, error),
    }
}

pub async fn run_java_listener(
    listener: TcpListener,
    context: Arc<ServerContext>,
) -> Result<(), anyhow::Error> {
    info!("java listener on {}", listener.local_addr()?);
    loop {
        let (socket, peer): (_, SocketAddr) = listener.accept().await?;
        socket.set_nodelay(true).ok();
        let context = context.clone();
        tokio::spawn(async move {
            debug!("{} connected", peer);
            let result = run_java_session(&context, Box::new(socket)).await;
            log_session_end(&peer.to_string(), result);
        });
    }
}

/// Accepts bedrock sessions until the transport closes the listener.
pub async fn run_bedrock_listener<L: BedrockListener>(mut listener: L, context: Arc<ServerContext>) {
    while let Some(transport) = listener.accept().await {
        let context = context.clone();
        tokio::spawn(async move {
            let peer = transport.peer_addr();
            debug!("{} connected", peer);
            let transport: Box<dyn BedrockTransport> = Box::new(transport);
            let result = run_bedrock_session(&context, transport).await;
            log_session_end(&peer, result);
        });
    }
    info!("bedrock listener closed");
}
