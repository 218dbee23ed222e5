//! Plain-text rendering of the current page.

use std::fmt::{self, Write as _};

use chrono::{Local, TimeZone};
use dash_core::{
    AppViewModel, ChartData, HomeView, JobView, JobsView, PageView, Progress, RunPointer,
    RunRecord, RunResult, RunView, FAILED_STYLE,
};

const BAR_WIDTH: usize = 30;
const PROGRESS_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Weekday of today, 0 = Sunday.
    pub today: usize,
    /// How many log lines the run page shows.
    pub log_lines: usize,
    /// Show the tail of the log instead of its head.
    pub follow_log: bool,
}

pub fn render_page(view: &AppViewModel, options: &RenderOptions) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_page(&mut out, view, options);
    out
}

fn write_page(out: &mut String, view: &AppViewModel, options: &RenderOptions) -> fmt::Result {
    let route = view
        .route
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    writeln!(out, "== {} == {}", view.title, route)?;
    writeln!(out)?;
    match &view.page {
        PageView::Idle => writeln!(out, "Nothing to show yet."),
        PageView::Loading { path } => writeln!(out, "Connecting to {path} ..."),
        PageView::Home(home) => write_home(out, home, options),
        PageView::Jobs(jobs) => write_jobs(out, jobs),
        PageView::Job(job) => write_job(out, job),
        PageView::Run(run) => write_run(out, run, options),
    }
}

fn write_home(out: &mut String, home: &HomeView, options: &RenderOptions) -> fmt::Result {
    writeln!(
        out,
        "Executors: {}/{} busy",
        home.executors_busy(),
        home.executors_total()
    )?;
    write_chart(out, &home.utilization_chart())?;

    writeln!(out, "\nQueued ({}):", home.queued().len())?;
    for queued in home.queued() {
        match queued.number {
            Some(number) => writeln!(out, "  {} #{}", queued.name, number)?,
            None => writeln!(out, "  {}", queued.name)?,
        }
    }

    writeln!(out, "\nRunning ({}):", home.running().len())?;
    for run in home.running() {
        write_running(out, run, true)?;
    }

    writeln!(out, "\nRecent ({}):", home.recent().len())?;
    for run in home.recent() {
        write_finished(out, run, true)?;
    }

    writeln!(out, "\nBuilds per day:")?;
    write_chart(out, &home.builds_per_day_chart(options.today))?;
    writeln!(out, "\nBuilds per job:")?;
    write_chart(out, &home.builds_per_job_chart())?;
    writeln!(out, "\nAverage build time (s):")?;
    write_chart(out, &home.time_per_job_chart())
}

fn write_jobs(out: &mut String, jobs: &JobsView) -> fmt::Result {
    writeln!(
        out,
        "Search: \"{}\"  Tag: {}",
        jobs.search(),
        jobs.tag().unwrap_or("(all)")
    )?;
    if !jobs.tags().is_empty() {
        writeln!(out, "Tags: {}", jobs.tags().join(", "))?;
    }
    writeln!(out)?;
    let filtered = jobs.filtered_jobs();
    if filtered.is_empty() {
        return writeln!(out, "No matching jobs.");
    }
    for job in filtered {
        write!(out, "  {} {} #{}", run_icon(job.result), job.name, job.number)?;
        if let Some(started) = job.started {
            write!(out, "  {}", format_date(started))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_job(out: &mut String, job: &JobView) -> fmt::Result {
    writeln!(out, "Queued: {}", job.n_queued())?;
    write_pointer(out, "Last success", job.last_success())?;
    write_pointer(out, "Last failure", job.last_failed())?;

    writeln!(out, "\nRunning ({}):", job.running().len())?;
    for run in job.running() {
        write_running(out, run, false)?;
    }

    writeln!(out, "\nRecent ({}):", job.recent().len())?;
    for run in job.recent() {
        write_finished(out, run, false)?;
    }

    writeln!(out, "\nBuild time (s):")?;
    write_chart(out, &job.build_time_chart())
}

fn write_pointer(out: &mut String, label: &str, pointer: Option<RunPointer>) -> fmt::Result {
    match pointer {
        Some(RunPointer {
            number,
            started: Some(started),
        }) => writeln!(out, "{label}: #{number} at {}", format_date(started)),
        Some(RunPointer { number, .. }) => writeln!(out, "{label}: #{number}"),
        None => writeln!(out, "{label}: never"),
    }
}

fn write_run(out: &mut String, view: &RunView, options: &RenderOptions) -> fmt::Result {
    let run = view.run();
    writeln!(
        out,
        "{} {} #{}  {}",
        run_icon(run.result),
        run.name,
        run.number,
        run.result
    )?;
    if let Some(reason) = &run.reason {
        writeln!(out, "Reason: {reason}")?;
    }
    if let Some(node) = &run.node {
        writeln!(out, "Node: {node}")?;
    }
    if let Some(queued) = run.queued {
        writeln!(out, "Queued for: {}", format_duration(queued))?;
    }
    if let Some(started) = run.started {
        writeln!(out, "Started: {}", format_date(started))?;
    }
    if view.run_complete() {
        if let Some(completed) = run.completed {
            writeln!(out, "Completed: {}", format_date(completed))?;
        }
        if let Some(duration) = run.duration {
            writeln!(out, "Duration: {}", format_duration(duration))?;
        }
    } else if let Some(running) = view.running().first() {
        writeln!(out, "Progress: {}", progress_bar(running.progress))?;
    }
    if !run.artifacts.is_empty() {
        writeln!(out, "Artifacts:")?;
        for artifact in &run.artifacts {
            writeln!(out, "  {} ({})", artifact.filename, artifact.url)?;
        }
    }

    let previous = view
        .previous_run()
        .map(|number| format!("< #{number}"))
        .unwrap_or_default();
    let next = view
        .next_run()
        .map(|number| format!("#{number} >"))
        .unwrap_or_default();
    writeln!(out, "{previous:<10}{next}")?;

    writeln!(
        out,
        "\nLog (autoscroll {}):",
        if view.autoscroll() { "on" } else { "off" }
    )?;
    let lines: Vec<&str> = view.log().lines().collect();
    let shown = if options.follow_log {
        &lines[lines.len().saturating_sub(options.log_lines)..]
    } else {
        &lines[..lines.len().min(options.log_lines)]
    };
    for line in shown {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

fn write_running(out: &mut String, run: &RunRecord, with_name: bool) -> fmt::Result {
    write!(out, "  ")?;
    if with_name {
        write!(out, "{} ", run.name)?;
    }
    write!(out, "#{}", run.number)?;
    if let Some(started) = run.started {
        write!(out, "  started {}", format_date(started))?;
    }
    if run.progress.is_some() {
        write!(out, "  {}", progress_bar(run.progress))?;
    }
    writeln!(out)
}

fn write_finished(out: &mut String, run: &RunRecord, with_name: bool) -> fmt::Result {
    write!(out, "  {} ", run_icon(run.result))?;
    if with_name {
        write!(out, "{} ", run.name)?;
    }
    write!(out, "#{}", run.number)?;
    if let Some(started) = run.started {
        write!(out, "  {}", format_date(started))?;
    }
    if let Some(duration) = run.duration {
        write!(out, "  {}", format_duration(duration))?;
    }
    writeln!(out)
}

fn write_chart(out: &mut String, chart: &ChartData) -> fmt::Result {
    let max = chart
        .datasets
        .iter()
        .flat_map(|dataset| dataset.data.iter().copied())
        .fold(0.0_f64, f64::max);
    let width = chart
        .labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0);

    for (index, label) in chart.labels.iter().enumerate() {
        for dataset in &chart.datasets {
            let value = dataset.data.get(index).copied().unwrap_or(0.0);
            let fill = if dataset.style_at(index) == FAILED_STYLE {
                '!'
            } else {
                '#'
            };
            let bar: String = std::iter::repeat(fill).take(bar_len(value, max)).collect();
            write!(out, "  {label:<width$} |{bar:<BAR_WIDTH$}| {value}")?;
            if let Some(series) = &dataset.label {
                write!(out, " ({series})")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

fn bar_len(value: f64, max: f64) -> usize {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    ((value / max) * BAR_WIDTH as f64).round() as usize
}

fn progress_bar(progress: Option<Progress>) -> String {
    match progress {
        Some(Progress::Percent(percent)) => {
            let filled = ((percent / 100.0) * PROGRESS_WIDTH as f64).round() as usize;
            let filled = filled.min(PROGRESS_WIDTH);
            format!(
                "[{}{}] {:>3.0}%",
                "=".repeat(filled),
                " ".repeat(PROGRESS_WIDTH - filled),
                percent
            )
        }
        Some(Progress::Overtime) => format!("[{:^width$}]", "overtime", width = PROGRESS_WIDTH),
        None => format!("[{}]   ?", " ".repeat(PROGRESS_WIDTH)),
    }
}

pub fn run_icon(result: RunResult) -> char {
    match result {
        RunResult::Success => '✔',
        RunResult::Failed | RunResult::Aborted => '✘',
        _ => ' ',
    }
}

/// `14:05 on Tue 3. Mar 2026`, in local time.
pub fn format_date(unix: i64) -> String {
    Local
        .timestamp_opt(unix, 0)
        .single()
        .map(|date| date.format("%-H:%M on %a %-d. %b %Y").to_string())
        .unwrap_or_default()
}

pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
