use std::sync::mpsc;
use std::time::Duration;

use thiserror::Error;

pub type ConnId = u64;

/// Payload carried by a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Events,
    Log,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A text frame, or a binary frame decoded lossily as UTF-8.
    Message {
        conn: ConnId,
        stream: Stream,
        text: String,
    },
    /// The socket is gone. `reason` is `None` when we closed it ourselves or
    /// the server closed it without saying why.
    Closed {
        conn: ConnId,
        reason: Option<String>,
    },
    /// Progress ticker fired; unix seconds.
    Tick { now: f64 },
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported url scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}
