//! Plain-text report for `--once` and `--watch` modes.

use owo_colors::OwoColorize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use crate::models::{JobState, QueueSnapshot};

/// Table row for job display
#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "JobID")]
    job_id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Account")]
    account: String,

    #[tabled(rename = "State")]
    state: String,

    #[tabled(rename = "Runtime")]
    runtime: String,

    #[tabled(rename = "TimeLimit")]
    time_limit: String,

    #[tabled(rename = "GPUs")]
    gpus: String,

    #[tabled(rename = "Priority")]
    priority: String,

    #[tabled(rename = "Higher")]
    higher: String,
}

/// Format a job state with color
fn format_state(state: JobState, label: &str) -> String {
    match state {
        JobState::Running => label.green().to_string(),
        JobState::Pending => label.yellow().to_string(),
        JobState::Other => label.white().to_string(),
    }
}

/// Format the full snapshot report: overview counts, GPU totals, job table.
pub fn format_snapshot(snapshot: &QueueSnapshot) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\nQueue summary for {}\n\n",
        snapshot.username.bold()
    ));
    output.push_str(&format!("  Total jobs: {}\n", snapshot.total()));
    output.push_str(&format!(
        "  Running:    {}\n",
        snapshot.running.green()
    ));
    output.push_str(&format!(
        "  Pending:    {}\n",
        snapshot.pending.yellow()
    ));

    if !snapshot.gpus_running.is_empty() {
        output.push_str("\nGPU allocations (running):\n");
        for (gpu_type, count) in &snapshot.gpus_running {
            output.push_str(&format!(
                "  {:<15} {}\n",
                gpu_type,
                format!("{} GPUs", count).green()
            ));
        }
        output.push_str(&format!(
            "  {:<15} {}\n",
            "total",
            format!("{} GPUs", snapshot.total_gpus_running()).bold()
        ));
    }

    if !snapshot.gpus_requested.is_empty() {
        output.push_str("\nGPU requests (pending):\n");
        for (gpu_type, count) in &snapshot.gpus_requested {
            output.push_str(&format!(
                "  {:<15} {}\n",
                gpu_type,
                format!("{} GPUs", count).yellow()
            ));
        }
        output.push_str(&format!(
            "  {:<15} {}\n",
            "total",
            format!("{} GPUs", snapshot.total_gpus_requested()).bold()
        ));
    }

    output.push('\n');
    output.push_str(&format_jobs(snapshot));
    output
}

/// Display the user's jobs in a table format
pub fn format_jobs(snapshot: &QueueSnapshot) -> String {
    if snapshot.jobs.is_empty() {
        return "No jobs in queue".yellow().to_string();
    }

    let rows: Vec<JobRow> = snapshot
        .jobs
        .iter()
        .map(|job| JobRow {
            job_id: job.job_id.clone(),
            name: job.name.clone(),
            account: job.account.clone(),
            state: format_state(job.state, &job.state_label),
            runtime: job.runtime.clone(),
            time_limit: job.time_limit.clone(),
            gpus: if job.gpu_count > 0 {
                format!("{} {}", job.gpu_count, job.gpu_type_display())
            } else {
                "-".to_string()
            },
            priority: job.priority.to_string(),
            // Queue rank only makes sense for pending jobs
            higher: if job.is_pending() {
                snapshot.rank(job).to_string()
            } else {
                "-".to_string()
            },
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Job;

    fn snapshot() -> QueueSnapshot {
        let mut snapshot = QueueSnapshot {
            username: "alice".to_string(),
            ..Default::default()
        };
        snapshot.jobs.push(Job {
            job_id: "100".to_string(),
            name: "train".to_string(),
            account: "lab".to_string(),
            state: JobState::Pending,
            state_label: "PENDING".to_string(),
            priority: 40,
            ..Default::default()
        });
        snapshot.pending = 1;
        snapshot.global_pending = vec![
            Job { priority: 90, ..Default::default() },
            Job { priority: 10, ..Default::default() },
        ];
        snapshot
    }

    #[test]
    fn test_format_jobs_empty() {
        let empty = QueueSnapshot::default();
        assert!(format_jobs(&empty).contains("No jobs in queue"));
    }

    #[test]
    fn test_format_jobs_includes_rank() {
        let text = format_jobs(&snapshot());
        assert!(text.contains("100"));
        assert!(text.contains("train"));
        // priority 90 in the global queue outranks this job's 40
        assert!(text.contains('1'));
    }

    #[test]
    fn test_format_snapshot_counts() {
        let text = format_snapshot(&snapshot());
        assert!(text.contains("alice"));
        assert!(text.contains("Total jobs: 1"));
    }
}
