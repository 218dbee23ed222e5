use std::fmt;
use std::time::Duration;

/// Handle of one socket opened on behalf of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// What a socket carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// JSON envelopes, delivered as `Msg::Frame`.
    Events,
    /// Raw log text, delivered as `Msg::LogChunk`.
    Log,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenSocket {
        conn: ConnectionId,
        path: String,
        stream: StreamKind,
    },
    CloseSocket {
        conn: ConnectionId,
    },
    /// Start the progress ticker, replacing any running one.
    StartTicker {
        period: Duration,
    },
    CancelTicker,
    SetTitle(String),
    ScrollLogToBottom,
}
