use std::collections::BTreeMap;

use serde::Deserialize;

use super::ViewModel;
use crate::chart::{
    last_week_labels, ChartData, Dataset, BAR_STYLE, BUSY_STYLE, FAILED_STYLE, IDLE_STYLE,
    SUCCESS_STYLE,
};
use crate::types::{QueuedRun, RunRecord, RunResult};

const DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HomeSnapshot {
    pub queued: Vec<QueuedRun>,
    pub running: Vec<RunRecord>,
    pub recent: Vec<RunRecord>,
    pub executors_total: u32,
    pub executors_busy: u32,
    /// One map of result name to count per day, oldest first.
    pub builds_per_day: Vec<BTreeMap<String, u32>>,
    pub builds_per_job: BTreeMap<String, u32>,
    /// Average run time per job in seconds.
    pub time_per_job: BTreeMap<String, i64>,
}

/// Completed builds of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayBucket {
    pub success: u32,
    pub failed: u32,
}

impl DayBucket {
    /// Only the `success` and `failed` keys of the server's per-result
    /// counts are charted.
    fn from_counts(counts: &BTreeMap<String, u32>) -> Self {
        let count = |result: RunResult| counts.get(result.as_str()).copied().unwrap_or(0);
        DayBucket {
            success: count(RunResult::Success),
            failed: count(RunResult::Failed),
        }
    }

    fn record(&mut self, result: RunResult) {
        if result == RunResult::Success {
            self.success += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Fleet-wide overview: queue, running and recent builds, executor usage and
/// build statistics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeView {
    queued: Vec<QueuedRun>,
    running: Vec<RunRecord>,
    recent: Vec<RunRecord>,
    executors_total: u32,
    executors_busy: u32,
    builds_per_day: [DayBucket; DAYS],
    builds_per_job: BTreeMap<String, u32>,
    time_per_job: BTreeMap<String, i64>,
}

impl HomeView {
    pub fn queued(&self) -> &[QueuedRun] {
        &self.queued
    }

    pub fn running(&self) -> &[RunRecord] {
        &self.running
    }

    pub(crate) fn running_mut(&mut self) -> &mut [RunRecord] {
        &mut self.running
    }

    pub fn recent(&self) -> &[RunRecord] {
        &self.recent
    }

    pub fn executors_total(&self) -> u32 {
        self.executors_total
    }

    pub fn executors_busy(&self) -> u32 {
        self.executors_busy
    }

    /// Oldest day first; the last bucket is today.
    pub fn builds_per_day(&self) -> &[DayBucket] {
        &self.builds_per_day
    }

    pub fn builds_per_job(&self) -> &BTreeMap<String, u32> {
        &self.builds_per_job
    }

    pub fn time_per_job(&self) -> &BTreeMap<String, i64> {
        &self.time_per_job
    }

    pub fn utilization_chart(&self) -> ChartData {
        let idle = self.executors_total.saturating_sub(self.executors_busy);
        let mut dataset = Dataset::new(
            None,
            vec![f64::from(self.executors_busy), f64::from(idle)],
            BUSY_STYLE,
        );
        dataset.point_styles = vec![BUSY_STYLE, IDLE_STYLE];
        ChartData {
            labels: vec!["Busy".to_string(), "Idle".to_string()],
            datasets: vec![dataset],
        }
    }

    /// `today` is the weekday index of the last bucket, 0 = Sunday.
    pub fn builds_per_day_chart(&self, today: usize) -> ChartData {
        let success = self
            .builds_per_day
            .iter()
            .map(|day| f64::from(day.success))
            .collect();
        let failed = self
            .builds_per_day
            .iter()
            .map(|day| f64::from(day.failed))
            .collect();
        ChartData {
            labels: last_week_labels(today),
            datasets: vec![
                Dataset::new(Some("Successful Builds"), success, SUCCESS_STYLE),
                Dataset::new(Some("Failed Builds"), failed, FAILED_STYLE),
            ],
        }
    }

    pub fn builds_per_job_chart(&self) -> ChartData {
        horizontal_bars(self.builds_per_job.iter().map(|(name, count)| (name, f64::from(*count))))
    }

    pub fn time_per_job_chart(&self) -> ChartData {
        horizontal_bars(self.time_per_job.iter().map(|(name, secs)| (name, *secs as f64)))
    }

    fn take_queued(&mut self, run: &RunRecord) -> Option<QueuedRun> {
        // The oldest matching entry is the one the server dequeued.
        let index = self.queued.iter().rposition(|queued| queued.matches(run))?;
        Some(self.queued.remove(index))
    }
}

fn horizontal_bars<'a>(entries: impl Iterator<Item = (&'a String, f64)>) -> ChartData {
    let (labels, data): (Vec<String>, Vec<f64>) =
        entries.map(|(name, value)| (name.clone(), value)).unzip();
    ChartData {
        labels,
        datasets: vec![Dataset::new(None, data, BAR_STYLE)],
    }
}

impl ViewModel for HomeView {
    type Snapshot = HomeSnapshot;

    fn status(&mut self, snapshot: HomeSnapshot) {
        let mut builds_per_day = [DayBucket::default(); DAYS];
        let skip = snapshot.builds_per_day.len().saturating_sub(DAYS);
        let offset = DAYS.saturating_sub(snapshot.builds_per_day.len());
        for (slot, counts) in builds_per_day[offset..]
            .iter_mut()
            .zip(snapshot.builds_per_day.iter().skip(skip))
        {
            *slot = DayBucket::from_counts(counts);
        }

        *self = HomeView {
            queued: snapshot.queued,
            running: snapshot.running,
            recent: snapshot.recent,
            executors_total: snapshot.executors_total,
            executors_busy: snapshot.executors_busy,
            builds_per_day,
            builds_per_job: snapshot.builds_per_job,
            time_per_job: snapshot.time_per_job,
        };
    }

    fn job_queued(&mut self, run: QueuedRun) {
        self.queued.insert(0, run);
    }

    fn job_started(&mut self, run: RunRecord) {
        self.take_queued(&run);
        self.running
            .retain(|existing| !existing.is_run(&run.name, run.number));
        self.running.insert(0, run);
        self.executors_busy = self.executors_busy.saturating_add(1);
    }

    fn job_completed(&mut self, run: RunRecord) {
        let Some(index) = self
            .running
            .iter()
            .position(|existing| existing.is_run(&run.name, run.number))
        else {
            return;
        };
        self.running.remove(index);
        self.builds_per_day[DAYS - 1].record(run.result);
        *self.builds_per_job.entry(run.name.clone()).or_insert(0) += 1;
        self.executors_busy = self.executors_busy.saturating_sub(1);
        self.recent.insert(0, run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn short_history_is_aligned_to_today() {
        let mut view = HomeView::default();
        view.status(HomeSnapshot {
            builds_per_day: vec![
                counts(&[("success", 2)]),
                counts(&[("failed", 1), ("aborted", 1), ("success", 3)]),
            ],
            ..HomeSnapshot::default()
        });
        let days = view.builds_per_day();
        assert_eq!(days[..5], [DayBucket::default(); 5]);
        assert_eq!(days[5], DayBucket { success: 2, failed: 0 });
        assert_eq!(days[6], DayBucket { success: 3, failed: 2 });
    }

    #[test]
    fn utilization_reports_idle_executors() {
        let mut view = HomeView::default();
        view.status(HomeSnapshot {
            executors_total: 4,
            executors_busy: 1,
            ..HomeSnapshot::default()
        });
        let chart = view.utilization_chart();
        assert_eq!(chart.datasets[0].data, vec![1.0, 3.0]);
        assert_eq!(chart.datasets[0].style_at(1), IDLE_STYLE);
    }
}
