use serde::Deserialize;

use super::ViewModel;
use crate::chart::{ChartData, Dataset, FAILED_STYLE, SUCCESS_STYLE};
use crate::types::{QueuedRun, RunPointer, RunRecord, RunResult};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobSnapshot {
    pub recent: Vec<RunRecord>,
    pub running: Vec<RunRecord>,
    pub n_queued: u32,
    pub last_success: Option<RunPointer>,
    pub last_failed: Option<RunPointer>,
}

/// History of a single job. Runs are identified by number alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobView {
    running: Vec<RunRecord>,
    recent: Vec<RunRecord>,
    n_queued: u32,
    last_success: Option<RunPointer>,
    last_failed: Option<RunPointer>,
}

impl JobView {
    pub fn running(&self) -> &[RunRecord] {
        &self.running
    }

    pub fn recent(&self) -> &[RunRecord] {
        &self.recent
    }

    pub fn n_queued(&self) -> u32 {
        self.n_queued
    }

    pub fn last_success(&self) -> Option<RunPointer> {
        self.last_success
    }

    pub fn last_failed(&self) -> Option<RunPointer> {
        self.last_failed
    }

    /// Durations of recent runs, oldest first, failures highlighted.
    pub fn build_time_chart(&self) -> ChartData {
        let runs = self.recent.iter().rev();
        let mut dataset = Dataset::new(
            None,
            runs.clone()
                .map(|run| run.duration.unwrap_or_default() as f64)
                .collect(),
            SUCCESS_STYLE,
        );
        dataset.point_styles = runs
            .clone()
            .map(|run| {
                if run.result == RunResult::Success {
                    SUCCESS_STYLE
                } else {
                    FAILED_STYLE
                }
            })
            .collect();
        ChartData {
            labels: runs.map(|run| format!("#{}", run.number)).collect(),
            datasets: vec![dataset],
        }
    }
}

impl ViewModel for JobView {
    type Snapshot = JobSnapshot;

    fn status(&mut self, snapshot: JobSnapshot) {
        *self = JobView {
            running: snapshot.running,
            recent: snapshot.recent,
            n_queued: snapshot.n_queued,
            last_success: snapshot.last_success,
            last_failed: snapshot.last_failed,
        };
    }

    fn job_queued(&mut self, _run: QueuedRun) {
        self.n_queued = self.n_queued.saturating_add(1);
    }

    fn job_started(&mut self, run: RunRecord) {
        self.n_queued = self.n_queued.saturating_sub(1);
        self.running.retain(|existing| existing.number != run.number);
        self.running.insert(0, run);
    }

    fn job_completed(&mut self, run: RunRecord) {
        let Some(index) = self
            .running
            .iter()
            .position(|existing| existing.number == run.number)
        else {
            return;
        };
        self.running.remove(index);
        if run.result == RunResult::Success {
            self.last_success = Some(RunPointer::from(&run));
        } else {
            self.last_failed = Some(RunPointer::from(&run));
        }
        self.recent.insert(0, run);
    }
}
