use std::fmt;

use serde::Deserialize;

use crate::progress::Progress;

/// Build number of a run, unique per job.
pub type RunNumber = u32;

/// Outcome of a run as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunResult {
    Success,
    Failed,
    Aborted,
    Running,
    Pending,
    #[default]
    #[serde(other)]
    Unknown,
}

impl RunResult {
    /// True once the run can no longer change state.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunResult::Success | RunResult::Failed | RunResult::Aborted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunResult::Success => "success",
            RunResult::Failed => "failed",
            RunResult::Aborted => "aborted",
            RunResult::Running => "running",
            RunResult::Pending => "pending",
            RunResult::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a run: `(job name, run number)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunKey {
    pub name: String,
    pub number: RunNumber,
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.name, self.number)
    }
}

/// An archived file produced by a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Artifact {
    pub url: String,
    pub filename: String,
}

/// One execution of a job. Every field is optional on the wire; the server
/// sends different subsets depending on the page and the event.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunRecord {
    pub name: String,
    pub number: RunNumber,
    pub result: RunResult,
    /// Unix seconds.
    pub started: Option<i64>,
    /// Estimated completion, unix seconds.
    pub etc: Option<i64>,
    pub completed: Option<i64>,
    /// Seconds.
    pub duration: Option<i64>,
    /// Seconds spent waiting in the queue.
    pub queued: Option<i64>,
    pub reason: Option<String>,
    pub node: Option<String>,
    pub queue_index: Option<i64>,
    pub artifacts: Vec<Artifact>,
    /// Client-side progress, maintained by the progress estimator.
    #[serde(skip)]
    pub progress: Option<Progress>,
}

impl RunRecord {
    pub fn key(&self) -> RunKey {
        RunKey {
            name: self.name.clone(),
            number: self.number,
        }
    }

    pub fn is_run(&self, name: &str, number: RunNumber) -> bool {
        self.name == name && self.number == number
    }
}

/// Entry of the fleet-wide queue. Queued runs have no number yet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct QueuedRun {
    pub name: String,
    pub number: Option<RunNumber>,
}

impl QueuedRun {
    /// Whether this queue entry is the one that became `run`.
    pub fn matches(&self, run: &RunRecord) -> bool {
        self.name == run.name && self.number.map_or(true, |number| number == run.number)
    }
}

/// Catalog entry on the jobs page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct JobSummary {
    pub name: String,
    /// Number of the most recent run.
    pub number: RunNumber,
    pub result: RunResult,
    pub started: Option<i64>,
    pub tags: Vec<String>,
}

impl JobSummary {
    /// Refresh the aggregate columns from a finished run. Tags are kept.
    pub fn absorb_completed(&mut self, run: &RunRecord) {
        self.number = run.number;
        self.result = run.result;
        self.started = run.started;
    }
}

/// Pointer to a notable run, e.g. the last successful one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RunPointer {
    pub number: RunNumber,
    pub started: Option<i64>,
}

impl From<&RunRecord> for RunPointer {
    fn from(run: &RunRecord) -> Self {
        Self {
            number: run.number,
            started: run.started,
        }
    }
}
