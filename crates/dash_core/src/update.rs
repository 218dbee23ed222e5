use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Navigate(path) => state.navigate(&path),
        Msg::Frame { conn, text } => state.receive_frame(conn, &text),
        Msg::LogChunk { conn, text } => state.receive_log(conn, &text),
        Msg::SocketClosed { conn, reason } => {
            state.socket_closed(conn, reason.as_deref());
            Vec::new()
        }
        Msg::Tick { now } => {
            state.tick(now);
            Vec::new()
        }
        Msg::SearchChanged(search) => {
            state.set_search(search);
            Vec::new()
        }
        Msg::TagSelected(tag) => {
            state.select_tag(tag);
            Vec::new()
        }
        Msg::AutoscrollToggled(autoscroll) => {
            state.set_autoscroll(autoscroll);
            Vec::new()
        }
        Msg::Shutdown => state.shutdown(),
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
