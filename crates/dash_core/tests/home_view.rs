use std::sync::Once;
use std::time::Duration;

use dash_core::{
    update, AppState, ConnectionId, DayBucket, Effect, HomeView, Msg, PageView, Progress,
    QueuedRun, RunResult, TICK_PERIOD,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

const HOME_STATUS: &str = r#"{"type":"status","title":"Laminar","data":{
    "queued":[],
    "running":[],
    "recent":[{"name":"lint","number":1,"result":"success","started":10,"duration":5}],
    "executorsTotal":4,
    "executorsBusy":0,
    "buildsPerDay":[{},{},{},{},{},{},{"success":1}],
    "buildsPerJob":{"lint":1},
    "timePerJob":{"lint":5}
}}"#;

fn home_page() -> (AppState, ConnectionId) {
    let (state, _) = update(AppState::new(), Msg::Navigate("/".into()));
    let conn = ConnectionId(1);
    let (state, _) = send(state, conn, HOME_STATUS);
    (state, conn)
}

fn send(state: AppState, conn: ConnectionId, text: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::Frame {
            conn,
            text: text.to_string(),
        },
    )
}

fn home(state: &AppState) -> HomeView {
    match state.view().page {
        PageView::Home(home) => home,
        other => panic!("home page expected, got {other:?}"),
    }
}

fn queued(state: AppState, conn: ConnectionId, name: &str) -> AppState {
    let text = format!(r#"{{"type":"job_queued","data":{{"name":"{name}"}}}}"#);
    send(state, conn, &text).0
}

fn started(
    state: AppState,
    conn: ConnectionId,
    name: &str,
    number: u32,
) -> (AppState, Vec<Effect>) {
    let text = format!(
        r#"{{"type":"job_started","data":{{"name":"{name}","number":{number},"queueIndex":0,"started":100,"etc":200}}}}"#
    );
    send(state, conn, &text)
}

fn completed(
    state: AppState,
    conn: ConnectionId,
    name: &str,
    number: u32,
    result: &str,
) -> (AppState, Vec<Effect>) {
    let text = format!(
        r#"{{"type":"job_completed","data":{{"name":"{name}","number":{number},"result":"{result}","started":100,"duration":30}}}}"#
    );
    send(state, conn, &text)
}

fn names_queued(view: &HomeView) -> Vec<&str> {
    view.queued().iter().map(|run| run.name.as_str()).collect()
}

#[test]
fn queued_jobs_are_most_recent_first() {
    init_logging();
    let (state, conn) = home_page();
    let state = queued(state, conn, "A");
    let state = queued(state, conn, "B");

    assert_eq!(names_queued(&home(&state)), vec!["B", "A"]);
}

#[test]
fn run_moves_from_queued_to_running_to_recent() {
    init_logging();
    let (state, conn) = home_page();
    let state = queued(state, conn, "A");
    let state = queued(state, conn, "B");

    let view = home(&state);
    assert_eq!(view.queued().len(), 2);
    assert!(view.running().is_empty());

    let (state, effects) = started(state, conn, "A", 7);
    assert_eq!(
        effects,
        vec![Effect::StartTicker {
            period: TICK_PERIOD
        }]
    );
    let view = home(&state);
    assert_eq!(names_queued(&view), vec!["B"]);
    assert_eq!(view.running().len(), 1);
    assert_eq!(view.running()[0].number, 7);
    assert_eq!(view.executors_busy(), 1);
    assert!(!view.recent().iter().any(|run| run.is_run("A", 7)));

    let (state, effects) = completed(state, conn, "A", 7, "failed");
    assert_eq!(effects, vec![Effect::CancelTicker]);
    let view = home(&state);
    assert_eq!(names_queued(&view), vec!["B"]);
    assert!(view.running().is_empty());
    assert!(view.recent()[0].is_run("A", 7));
    assert_eq!(view.recent()[0].result, RunResult::Failed);
    assert_eq!(view.recent().len(), 2);
    assert_eq!(view.executors_busy(), 0);
    assert_eq!(
        view.builds_per_day()[6],
        DayBucket {
            success: 1,
            failed: 1
        }
    );
    assert_eq!(view.builds_per_job().get("A"), Some(&1));
}

#[test]
fn started_removes_the_oldest_queued_entry_of_that_job() {
    init_logging();
    let (state, conn) = home_page();
    let state = queued(state, conn, "A");
    let state = queued(state, conn, "B");
    let state = queued(state, conn, "A");

    let (state, _) = started(state, conn, "A", 1);
    assert_eq!(names_queued(&home(&state)), vec!["A", "B"]);

    let (state, _) = started(state, conn, "A", 2);
    assert_eq!(names_queued(&home(&state)), vec!["B"]);
    let running: Vec<u32> = home(&state).running().iter().map(|run| run.number).collect();
    assert_eq!(running, vec![2, 1]);
}

#[test]
fn completion_without_matching_run_changes_nothing() {
    init_logging();
    let (state, conn) = home_page();
    let (state, _) = started(state, conn, "A", 1);
    let before = home(&state);

    let (state, effects) = completed(state, conn, "A", 2, "success");
    assert!(effects.is_empty());
    assert_eq!(home(&state), before);

    let (state, _) = completed(state, conn, "B", 1, "success");
    assert_eq!(home(&state), before);
}

#[test]
fn completion_counts_toward_existing_job_statistics() {
    init_logging();
    let (state, conn) = home_page();
    let (state, _) = started(state, conn, "lint", 2);
    let (state, _) = completed(state, conn, "lint", 2, "success");

    let view = home(&state);
    assert_eq!(view.builds_per_job().get("lint"), Some(&2));
    assert_eq!(
        view.builds_per_day()[6],
        DayBucket {
            success: 2,
            failed: 0
        }
    );
    let chart = view.builds_per_job_chart();
    assert_eq!(chart.labels, vec!["lint".to_string()]);
    assert_eq!(chart.datasets[0].data, vec![2.0]);
}

#[test]
fn ticks_update_progress_of_running_jobs() {
    init_logging();
    let (state, conn) = home_page();
    let (state, _) = started(state, conn, "A", 1);

    let (state, _) = update(state, Msg::Tick { now: 150.0 });
    assert_eq!(
        home(&state).running()[0].progress,
        Some(Progress::Percent(50.0))
    );

    let (state, _) = update(state, Msg::Tick { now: 205.0 });
    assert_eq!(
        home(&state).running()[0].progress,
        Some(Progress::Percent(99.0))
    );

    let (state, _) = update(state, Msg::Tick { now: 250.0 });
    assert_eq!(home(&state).running()[0].progress, Some(Progress::Overtime));
}

#[test]
fn status_replaces_everything() {
    init_logging();
    let (state, conn) = home_page();
    let state = queued(state, conn, "A");
    let (state, _) = send(state, conn, HOME_STATUS);

    let view = home(&state);
    assert_eq!(view.queued(), &[] as &[QueuedRun]);
    assert_eq!(view.recent().len(), 1);
    assert_eq!(view.executors_total(), 4);
    assert_eq!(view.utilization_chart().datasets[0].data, vec![0.0, 4.0]);
    assert_eq!(view.builds_per_day_chart(0).labels.last().map(String::as_str), Some("Sun"));
}

#[test]
fn day_buckets_chart_only_success_and_failed_counts() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::Navigate("/".into()));
    let (state, _) = send(
        state,
        ConnectionId(1),
        r#"{"type":"status","title":"Laminar","data":{
            "buildsPerDay":[{},{},{},{},{},{"success":2,"failed":1,"aborted":4},{}]
        }}"#,
    );
    let view = home(&state);
    assert_eq!(
        view.builds_per_day()[5],
        DayBucket {
            success: 2,
            failed: 1
        }
    );
    assert_eq!(view.builds_per_day()[6], DayBucket::default());
}

#[test]
fn configured_tick_period_drives_the_ticker() {
    init_logging();
    let period = Duration::from_millis(500);
    let (state, _) = update(AppState::with_tick_period(period), Msg::Navigate("/".into()));
    let (state, _) = send(state, ConnectionId(1), HOME_STATUS);

    let (_, effects) = started(state, ConnectionId(1), "A", 1);
    assert_eq!(effects, vec![Effect::StartTicker { period }]);
}
