use crate::ConnectionId;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked for another page.
    Navigate(String),
    /// Text frame from an event stream.
    Frame { conn: ConnectionId, text: String },
    /// Chunk of raw log text from a log stream.
    LogChunk { conn: ConnectionId, text: String },
    /// The socket went away, either closed by us or by the server.
    SocketClosed {
        conn: ConnectionId,
        reason: Option<String>,
    },
    /// Progress ticker fired; `now` is unix seconds.
    Tick { now: f64 },
    /// User edited the job search box.
    SearchChanged(String),
    /// User picked a tag filter, or cleared it.
    TagSelected(Option<String>),
    /// User toggled log autoscroll.
    AutoscrollToggled(bool),
    /// Application is quitting; tear everything down.
    Shutdown,
    /// Changes nothing and produces no effects.
    NoOp,
}
