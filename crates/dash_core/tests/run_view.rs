use std::sync::Once;

use dash_core::{
    update, AppState, ConnectionId, Effect, Msg, PageView, Progress, RunResult, RunView,
    StreamKind,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

const EVENTS: ConnectionId = ConnectionId(1);
const LOG: ConnectionId = ConnectionId(2);

const RUNNING_STATUS: &str = r#"{"type":"status","title":"Laminar","data":{
    "name":"build","number":4,"result":"running","reason":"push",
    "started":100,"etc":200,"queued":3,"latestNum":4,
    "artifacts":[{"url":"/archive/build/4/out.tar","filename":"out.tar"}]
}}"#;

fn frame(state: AppState, conn: ConnectionId, text: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::Frame {
            conn,
            text: text.to_string(),
        },
    )
}

fn log(state: AppState, conn: ConnectionId, text: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::LogChunk {
            conn,
            text: text.to_string(),
        },
    )
}

fn run_page() -> AppState {
    let (state, _) = update(AppState::new(), Msg::Navigate("/jobs/build/4".into()));
    frame(state, EVENTS, RUNNING_STATUS).0
}

fn run(state: &AppState) -> RunView {
    match state.view().page {
        PageView::Run(run) => run,
        other => panic!("run page expected, got {other:?}"),
    }
}

#[test]
fn status_replaces_run_detail() {
    init_logging();
    let state = run_page();
    let view = run(&state);
    assert_eq!(view.run().number, 4);
    assert_eq!(view.run().result, RunResult::Running);
    assert_eq!(view.run().reason.as_deref(), Some("push"));
    assert_eq!(view.run().artifacts[0].filename, "out.tar");
    assert_eq!(view.latest_num(), Some(4));
    assert_eq!(view.running().len(), 1);
    assert!(!view.run_complete());
}

#[test]
fn log_chunks_accumulate_and_scroll_after_backfill() {
    init_logging();
    let state = run_page();
    let (state, _) = update(state, Msg::AutoscrollToggled(true));

    let (state, effects) = log(state, LOG, "line1\n");
    assert!(effects.is_empty());

    let (state, effects) = log(state, LOG, "line2\n");
    assert_eq!(effects, vec![Effect::ScrollLogToBottom]);
    assert_eq!(run(&state).log(), "line1\nline2\n");
}

#[test]
fn log_does_not_scroll_without_autoscroll() {
    init_logging();
    let state = run_page();
    let (state, _) = log(state, LOG, "line1\n");
    let (state, effects) = log(state, LOG, "line2\n");
    assert!(effects.is_empty());
    assert_eq!(run(&state).log(), "line1\nline2\n");
}

#[test]
fn log_from_event_socket_id_is_ignored() {
    init_logging();
    let state = run_page();
    let (state, _) = log(state, EVENTS, "nope");
    assert_eq!(run(&state).log(), "");
}

#[test]
fn another_run_starting_advances_latest_number() {
    init_logging();
    let state = run_page();
    let (state, _) = frame(
        state,
        EVENTS,
        r#"{"type":"job_started","data":{"name":"build","number":5}}"#,
    );
    let view = run(&state);
    assert_eq!(view.latest_num(), Some(5));
    assert_eq!(view.run().number, 4);
    assert_eq!(view.next_run(), Some(5));
}

#[test]
fn completion_replaces_detail_and_stops_progress() {
    init_logging();
    let state = run_page();
    let (state, _) = update(state, Msg::Tick { now: 150.0 });
    assert_eq!(
        run(&state).running()[0].progress,
        Some(Progress::Percent(50.0))
    );

    let (state, effects) = frame(
        state,
        EVENTS,
        r#"{"type":"job_completed","data":{"name":"build","number":4,"result":"success","duration":90,"started":100,"completed":190}}"#,
    );
    assert_eq!(effects, vec![Effect::CancelTicker]);
    let view = run(&state);
    assert!(view.run_complete());
    assert_eq!(view.run().duration, Some(90));
    assert!(view.running().is_empty());
}

#[test]
fn finished_run_has_no_progress() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::Navigate("/jobs/build/3".into()));
    let (state, effects) = frame(
        state,
        EVENTS,
        r#"{"type":"status","title":"Laminar","data":{"name":"build","number":3,"result":"failed","started":1,"completed":9,"latestNum":4}}"#,
    );
    assert!(!effects.contains(&Effect::CancelTicker));
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::StartTicker { .. })));
    assert!(run(&state).running().is_empty());
}

#[test]
fn switching_runs_reconnects_both_streams() {
    init_logging();
    let state = run_page();
    let (state, _) = update(state, Msg::AutoscrollToggled(true));
    let (state, _) = log(state, LOG, "old log\n");

    let (state, effects) = update(state, Msg::Navigate("/jobs/build/3".into()));
    assert_eq!(
        effects,
        vec![
            Effect::CloseSocket { conn: EVENTS },
            Effect::CloseSocket { conn: LOG },
            Effect::OpenSocket {
                conn: ConnectionId(3),
                path: "/jobs/build/3".to_string(),
                stream: StreamKind::Events,
            },
            Effect::CancelTicker,
        ]
    );

    // Late chunk from the closed log socket.
    let (state, effects) = log(state, LOG, "late\n");
    assert!(effects.is_empty());
    assert_eq!(run(&state).log(), "old log\n");

    let (state, effects) = frame(
        state,
        ConnectionId(3),
        r#"{"type":"status","title":"Laminar","data":{"name":"build","number":3,"result":"success","latestNum":4}}"#,
    );
    assert_eq!(
        effects[0],
        Effect::OpenSocket {
            conn: ConnectionId(4),
            path: "/jobs/build/3/log".to_string(),
            stream: StreamKind::Log,
        }
    );
    let view = run(&state);
    assert_eq!(view.run().number, 3);
    assert_eq!(view.log(), "");
    assert!(view.autoscroll());

    // The first chunk of the new stream is a backfill again.
    let (state, effects) = log(state, ConnectionId(4), "new log\n");
    assert!(effects.is_empty());
    let (_state, effects) = log(state, ConnectionId(4), "more\n");
    assert_eq!(effects, vec![Effect::ScrollLogToBottom]);
}
