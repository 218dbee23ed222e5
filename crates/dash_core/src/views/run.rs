use serde::Deserialize;

use super::ViewModel;
use crate::types::{QueuedRun, RunNumber, RunRecord};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunSnapshot {
    #[serde(flatten)]
    pub run: RunRecord,
    /// Highest run number of the job known to the server.
    pub latest_num: Option<RunNumber>,
}

/// Detail of one run and its live log.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunView {
    run: RunRecord,
    latest_num: Option<RunNumber>,
    log: String,
    autoscroll: bool,
    /// Set once the backfill chunk of the current log stream arrived.
    log_backfilled: bool,
    running: Vec<RunRecord>,
}

impl RunView {
    pub fn run(&self) -> &RunRecord {
        &self.run
    }

    pub fn latest_num(&self) -> Option<RunNumber> {
        self.latest_num
    }

    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn autoscroll(&self) -> bool {
        self.autoscroll
    }

    pub fn set_autoscroll(&mut self, autoscroll: bool) {
        self.autoscroll = autoscroll;
    }

    /// The run itself while it is running with a completion estimate.
    pub fn running(&self) -> &[RunRecord] {
        &self.running
    }

    pub(crate) fn running_mut(&mut self) -> &mut [RunRecord] {
        &mut self.running
    }

    pub fn run_complete(&self) -> bool {
        self.run.result.is_terminal()
    }

    pub fn previous_run(&self) -> Option<RunNumber> {
        self.run.number.checked_sub(1).filter(|number| *number > 0)
    }

    pub fn next_run(&self) -> Option<RunNumber> {
        let latest = self.latest_num?;
        (latest > self.run.number).then_some(self.run.number + 1)
    }

    /// Appends a log chunk. Returns whether the page should scroll to the
    /// bottom, which never happens for the first chunk of a stream.
    pub fn append_log(&mut self, chunk: &str) -> bool {
        self.log.push_str(chunk);
        if !self.log_backfilled {
            self.log_backfilled = true;
            return false;
        }
        self.autoscroll
    }

    /// A new log stream is about to replay the log from the start.
    pub fn log_connected(&mut self) {
        self.log.clear();
        self.log_backfilled = false;
    }

    /// The route moved to another run of the same job.
    pub fn route_changed(&mut self) {
        self.running.clear();
    }
}

impl ViewModel for RunView {
    type Snapshot = RunSnapshot;

    fn status(&mut self, snapshot: RunSnapshot) {
        self.log.clear();
        self.latest_num = snapshot.latest_num;
        self.running = if snapshot.run.etc.is_some() {
            vec![snapshot.run.clone()]
        } else {
            Vec::new()
        };
        self.run = snapshot.run;
    }

    fn job_queued(&mut self, _run: QueuedRun) {}

    fn job_started(&mut self, _run: RunRecord) {
        self.latest_num = Some(self.latest_num.unwrap_or_default().saturating_add(1));
    }

    fn job_completed(&mut self, run: RunRecord) {
        self.run = run;
        self.running.clear();
    }
}
