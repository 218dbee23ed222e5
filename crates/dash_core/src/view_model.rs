use crate::route::Route;
use crate::views::{HomeView, JobView, JobsView, RunView};

/// Snapshot handed to the renderer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub title: String,
    pub route: Option<Route>,
    pub page: PageView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PageView {
    /// Nothing navigated to yet.
    #[default]
    Idle,
    /// Waiting for the first `status` of `path`.
    Loading { path: String },
    Home(HomeView),
    Jobs(JobsView),
    Job(JobView),
    Run(RunView),
}
