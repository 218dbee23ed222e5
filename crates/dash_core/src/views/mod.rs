//! Per-page view models and event dispatch.

mod home;
mod job;
mod jobs;
mod run;

use serde::de::DeserializeOwned;

use crate::event::{DecodeError, Envelope, Event, EventKind};
use crate::route::{Route, ViewKind};
use crate::types::{QueuedRun, RunRecord};

pub use home::{DayBucket, HomeSnapshot, HomeView};
pub use job::{JobSnapshot, JobView};
pub use jobs::{JobsSnapshot, JobsView};
pub use run::{RunSnapshot, RunView};

/// State of one page plus a handler for every event kind. Views that have
/// nothing to do for an event implement its handler as an explicit no-op.
pub trait ViewModel {
    type Snapshot: DeserializeOwned;

    /// Replaces the view's state with a full snapshot.
    fn status(&mut self, snapshot: Self::Snapshot);
    fn job_queued(&mut self, run: QueuedRun);
    fn job_started(&mut self, run: RunRecord);
    fn job_completed(&mut self, run: RunRecord);
}

/// What applying one frame did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Status { title: String },
    Event(EventKind),
    /// Event type unknown to this client.
    Ignored,
}

pub fn dispatch<V: ViewModel>(view: &mut V, event: Event<V::Snapshot>) -> Applied {
    let kind = event.kind();
    match event {
        Event::Status { title, snapshot } => {
            view.status(snapshot);
            return Applied::Status { title };
        }
        Event::JobQueued(run) => view.job_queued(run),
        Event::JobStarted(run) => view.job_started(run),
        Event::JobCompleted(run) => view.job_completed(run),
    }
    Applied::Event(kind)
}

/// Decodes `envelope` against the view's snapshot type and dispatches it.
/// The view is untouched when decoding fails.
fn decode_and_dispatch<V: ViewModel>(
    view: &mut V,
    envelope: Envelope,
) -> Result<Applied, DecodeError> {
    match envelope.decode::<V::Snapshot>()? {
        Some(event) => Ok(dispatch(view, event)),
        None => Ok(Applied::Ignored),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Home(HomeView),
    Jobs(JobsView),
    Job(JobView),
    Run(RunView),
}

impl View {
    /// A fresh, not yet initialized view for `route`.
    pub fn for_route(route: &Route) -> Self {
        match route.kind() {
            ViewKind::Home => View::Home(HomeView::default()),
            ViewKind::Jobs => View::Jobs(JobsView::default()),
            ViewKind::Job => View::Job(JobView::default()),
            ViewKind::Run => View::Run(RunView::default()),
        }
    }

    pub fn apply(&mut self, envelope: Envelope) -> Result<Applied, DecodeError> {
        match self {
            View::Home(view) => decode_and_dispatch(view, envelope),
            View::Jobs(view) => decode_and_dispatch(view, envelope),
            View::Job(view) => decode_and_dispatch(view, envelope),
            View::Run(view) => decode_and_dispatch(view, envelope),
        }
    }

    /// Runs watched by the progress estimator. Only the home and run pages
    /// show progress.
    pub fn running(&self) -> &[RunRecord] {
        match self {
            View::Home(view) => view.running(),
            View::Run(view) => view.running(),
            View::Jobs(_) | View::Job(_) => &[],
        }
    }

    pub fn running_mut(&mut self) -> Option<&mut [RunRecord]> {
        match self {
            View::Home(view) => Some(view.running_mut()),
            View::Run(view) => Some(view.running_mut()),
            View::Jobs(_) | View::Job(_) => None,
        }
    }
}
