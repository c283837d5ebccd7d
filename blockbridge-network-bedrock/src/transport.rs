use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use blockbridge_network_common::ConnectionError;
use tokio::sync::mpsc;

/// One reliable, ordered session of the UDP transport. Payloads are the
/// already deframed game messages, each beginning with the batch header.
#[async_trait]
pub trait BedrockTransport: Send {
    /// `None` once the peer has gone.
    async fn recv(&mut self) -> Option<Vec<u8>>;

    async fn send(&mut self, payload: Vec<u8>) -> Result<(), ConnectionError>;

    fn peer_addr(&self) -> String;
}

#[async_trait]
impl<T: BedrockTransport + ?Sized> BedrockTransport for Box<T> {
    async fn recv(&mut self) -> Option<Vec<u8>> {
        (**self).recv().await
    }

    async fn send(&mut self, payload: Vec<u8>) -> Result<(), ConnectionError> {
        (**self).send(payload).await
    }

    fn peer_addr(&self) -> String {
        (**self).peer_addr()
    }
}

#[async_trait]
pub trait BedrockListener: Send {
    type Transport: BedrockTransport + 'static;

    /// `None` once the listener is closed.
    async fn accept(&mut self) -> Option<Self::Transport>;
}

/// An in-process transport, one end per side.
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    peer: String,
}

impl ChannelTransport {
    pub fn pair(server_peer: &str, client_peer: &str) -> (ChannelTransport, ChannelTransport) {
        let (server_tx, client_rx) = mpsc::unbounded_channel();
        let (client_tx, server_rx) = mpsc::unbounded_channel();
        (
            ChannelTransport {
                tx: server_tx,
                rx: server_rx,
                peer: client_peer.to_string(),
            },
            ChannelTransport {
                tx: client_tx,
                rx: client_rx,
                peer: server_peer.to_string(),
            },
        )
    }
}

#[async_trait]
impl BedrockTransport for ChannelTransport {
    async fn recv(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }

    async fn send(&mut self, payload: Vec<u8>) -> Result<(), ConnectionError> {
        self.tx
            .send(payload)
            .map_err(|_| ConnectionError::ConnectionLost)
    }

    fn peer_addr(&self) -> String {
        self.peer.clone()
    }
}

pub struct ChannelListener {
    incoming: mpsc::UnboundedReceiver<ChannelTransport>,
}

#[async_trait]
impl BedrockListener for ChannelListener {
    type Transport = ChannelTransport;

    async fn accept(&mut self) -> Option<ChannelTransport> {
        self.incoming.recv().await
    }
}

#[derive(Clone)]
pub struct ChannelConnector {
    outgoing: mpsc::UnboundedSender<ChannelTransport>,
    next_peer: Arc<AtomicUsize>,
}

impl ChannelConnector {
    /// Returns the client end, or `None` when the listener was dropped.
    pub fn connect(&self) -> Option<ChannelTransport> {
        let peer = self.next_peer.fetch_add(1, Ordering::Relaxed);
        let (server, client) = ChannelTransport::pair("memory:server", &format!("memory:{}", peer));
        self.outgoing.send(server).ok()?;
        Some(client)
    }
}

pub fn channel_listener() -> (ChannelListener, ChannelConnector) {
    let (outgoing, incoming) = mpsc::unbounded_channel();
    (
        ChannelListener { incoming },
        ChannelConnector {
            outgoing,
            next_peer: Arc::new(AtomicUsize::new(1)),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connector_reaches_listener() {
        let (mut listener, connector) = channel_listener();
        let mut client = connector.connect().unwrap();
        let mut server = listener.accept().await.unwrap();
        assert_eq!(server.peer_addr(), "memory:1");

        client.send(vec![0xfe, 1, 2]).await.unwrap();
        assert_eq!(server.recv().await, Some(vec![0xfe, 1, 2]));

        drop(client);
        assert_eq!(server.recv().await, None);
        assert!(server.send(vec![0xfe]).await.is_err());
    }

    #[tokio::test]
    async fn dropped_listener_refuses_connections() {
        let (listener, connector) = channel_listener();
        drop(listener);
        assert!(connector.connect().is_none());
    }
}
