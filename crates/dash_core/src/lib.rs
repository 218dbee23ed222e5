//! Dashboard core: pure state machine, page view models and wire types.
mod chart;
mod effect;
mod event;
mod msg;
mod progress;
mod route;
mod state;
mod types;
mod update;
mod view_model;
mod views;

pub use chart::{ChartData, Dataset, Style, FAILED_STYLE, WEEKDAYS};
pub use effect::{ConnectionId, Effect, StreamKind};
pub use event::{DecodeError, Envelope, Event, EventKind};
pub use msg::Msg;
pub use progress::{
    apply_progress, estimate, Progress, ProgressTimer, CLAMPED_PERCENT, OVERTIME_THRESHOLD,
    TICK_PERIOD,
};
pub use route::{Route, RouteError, ViewKind};
pub use state::AppState;
pub use types::{
    Artifact, JobSummary, QueuedRun, RunKey, RunNumber, RunPointer, RunRecord, RunResult,
};
pub use update::update;
pub use view_model::{AppViewModel, PageView};
pub use views::{
    dispatch, Applied, DayBucket, HomeSnapshot, HomeView, JobSnapshot, JobView, JobsSnapshot,
    JobsView, RunSnapshot, RunView, View, ViewModel,
};
