//! Dashboard engine: socket and timer IO driven by core effects.
mod engine;
mod socket;
mod ticker;
mod types;

pub use engine::{EngineConfig, EngineHandle};
pub use socket::socket_url;
pub use types::{ChannelEventSink, ConnId, ConnectError, EngineEvent, EventSink, Stream};
