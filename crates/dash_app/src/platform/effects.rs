use std::sync::{mpsc, Arc};

use dash_core::{ConnectionId, Effect, Msg, StreamKind};
use dash_engine::{EngineConfig, EngineEvent, EngineHandle, EventSink, Stream};
use engine_logging::{engine_debug, engine_info};

use super::config::Settings;

/// Feeds engine events back into the update loop.
struct MsgSink {
    msg_tx: mpsc::Sender<Msg>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.msg_tx.send(map_event(event));
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Message {
            conn,
            stream: Stream::Events,
            text,
        } => Msg::Frame {
            conn: ConnectionId(conn),
            text,
        },
        EngineEvent::Message {
            conn,
            stream: Stream::Log,
            text,
        } => Msg::LogChunk {
            conn: ConnectionId(conn),
            text,
        },
        EngineEvent::Closed { conn, reason } => Msg::SocketClosed {
            conn: ConnectionId(conn),
            reason,
        },
        EngineEvent::Tick { now } => Msg::Tick { now },
    }
}

fn map_stream(stream: StreamKind) -> Stream {
    match stream {
        StreamKind::Events => Stream::Events,
        StreamKind::Log => Stream::Log,
    }
}

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: &Settings, msg_tx: mpsc::Sender<Msg>) -> Self {
        let config = EngineConfig::new(settings.server.clone());
        let engine = EngineHandle::new(config, Arc::new(MsgSink { msg_tx }));
        Self { engine }
    }

    /// Runs the I/O effects and hands back the ones meant for the screen.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut screen = Vec::new();
        for effect in effects {
            match effect {
                Effect::OpenSocket { conn, path, stream } => {
                    engine_info!("Open {} {:?} {}", conn, stream, path);
                    self.engine.open(conn.0, path, map_stream(stream));
                }
                Effect::CloseSocket { conn } => {
                    engine_debug!("Close {}", conn);
                    self.engine.close(conn.0);
                }
                Effect::StartTicker { period } => self.engine.start_ticker(period),
                Effect::CancelTicker => self.engine.cancel_ticker(),
                Effect::SetTitle(_) | Effect::ScrollLogToBottom => screen.push(effect),
            }
        }
        screen
    }

    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn engine_events_map_to_messages() {
        assert_eq!(
            map_event(EngineEvent::Message {
                conn: 3,
                stream: Stream::Events,
                text: "{}".into(),
            }),
            Msg::Frame {
                conn: ConnectionId(3),
                text: "{}".into(),
            }
        );
        assert_eq!(
            map_event(EngineEvent::Message {
                conn: 4,
                stream: Stream::Log,
                text: "line\n".into(),
            }),
            Msg::LogChunk {
                conn: ConnectionId(4),
                text: "line\n".into(),
            }
        );
        assert_eq!(
            map_event(EngineEvent::Closed {
                conn: 4,
                reason: Some("reset".into()),
            }),
            Msg::SocketClosed {
                conn: ConnectionId(4),
                reason: Some("reset".into()),
            }
        );
        assert_eq!(
            map_event(EngineEvent::Tick { now: 12.5 }),
            Msg::Tick { now: 12.5 }
        );
    }
}
