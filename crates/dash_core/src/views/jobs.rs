use serde::Deserialize;

use super::ViewModel;
use crate::types::{JobSummary, QueuedRun, RunRecord};

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct JobsSnapshot {
    pub jobs: Vec<JobSummary>,
}

/// Job catalog with a client-side name search and tag filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobsView {
    jobs: Vec<JobSummary>,
    tags: Vec<String>,
    search: String,
    tag: Option<String>,
}

impl JobsView {
    pub fn jobs(&self) -> &[JobSummary] {
        &self.jobs
    }

    /// Union of all jobs' tags, in first-seen order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn select_tag(&mut self, tag: Option<String>) {
        self.tag = tag.filter(|tag| !tag.is_empty());
    }

    /// Jobs carrying the selected tag whose name contains the search text.
    pub fn filtered_jobs(&self) -> Vec<&JobSummary> {
        self.jobs
            .iter()
            .filter(|job| match &self.tag {
                Some(tag) => job.tags.contains(tag),
                None => true,
            })
            .filter(|job| self.search.is_empty() || job.name.contains(self.search.as_str()))
            .collect()
    }
}

fn collect_tags(jobs: &[JobSummary]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in jobs.iter().flat_map(|job| job.tags.iter()) {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}

impl ViewModel for JobsView {
    type Snapshot = JobsSnapshot;

    fn status(&mut self, snapshot: JobsSnapshot) {
        self.tags = collect_tags(&snapshot.jobs);
        self.jobs = snapshot.jobs;
    }

    fn job_queued(&mut self, _run: QueuedRun) {}

    fn job_started(&mut self, _run: RunRecord) {}

    fn job_completed(&mut self, run: RunRecord) {
        if let Some(job) = self.jobs.iter_mut().find(|job| job.name == run.name) {
            job.absorb_completed(&run);
        }
    }
}
