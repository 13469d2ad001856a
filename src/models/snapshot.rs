//! Queue snapshot: the complete in-memory picture of one poll cycle.
//!
//! A snapshot is built atomically from a single round of queries and replaced
//! wholesale on refresh - there is no incremental merge. Jobs whose detail
//! fetch fails or comes back empty are dropped silently; the snapshot itself
//! never fails to build.

use std::collections::BTreeMap;

use crate::models::{Job, JobState};
use crate::parse::parse_job;
use crate::slurm::QueueSource;

/// All queue state derived from one refresh.
#[derive(Debug, Default)]
pub struct QueueSnapshot {
    pub username: String,
    /// The polled user's jobs, in fetch order.
    pub jobs: Vec<Job>,
    /// Every pending job cluster-wide with priority > 0, sorted by priority
    /// descending (stable; ties keep fetch order). Used only for ranking.
    pub global_pending: Vec<Job>,
    pub running: usize,
    pub pending: usize,
    /// GPU type -> total GPUs allocated by the user's running jobs.
    pub gpus_running: BTreeMap<String, u32>,
    /// GPU type -> total GPUs requested by the user's pending jobs.
    pub gpus_requested: BTreeMap<String, u32>,
}

impl QueueSnapshot {
    /// Build a snapshot for `username` by querying `source`.
    ///
    /// Queries run sequentially and block until each completes. Listing
    /// failures yield empty collections; per-job failures skip that job.
    pub fn fetch(source: &dyn QueueSource, username: &str) -> Self {
        let mut snapshot = QueueSnapshot {
            username: username.to_string(),
            ..Default::default()
        };

        let user_ids = match source.user_job_ids(username) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(user = username, error = %e, "job listing failed");
                String::new()
            }
        };

        for id in user_ids.split_whitespace() {
            match source.job_detail(id) {
                Ok(block) => snapshot.add_job(parse_job(id, &block)),
                Err(e) => {
                    tracing::debug!(job_id = id, error = %e, "skipping job");
                }
            }
        }

        let pending_ids = match source.pending_job_ids() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "pending queue listing failed");
                String::new()
            }
        };

        for id in pending_ids.split_whitespace() {
            match source.job_detail(id) {
                Ok(block) => {
                    let job = parse_job(id, &block);
                    if job.priority > 0 {
                        snapshot.global_pending.push(job);
                    }
                }
                Err(e) => {
                    tracing::debug!(job_id = id, error = %e, "skipping pending job");
                }
            }
        }

        // Stable sort: equal priorities keep fetch order
        snapshot
            .global_pending
            .sort_by(|a, b| b.priority.cmp(&a.priority));

        snapshot
    }

    fn add_job(&mut self, job: Job) {
        match job.state {
            JobState::Running => {
                self.running += 1;
                if job.gpu_count > 0 {
                    *self.gpus_running.entry(job.gpu_type.clone()).or_default() +=
                        job.gpu_count;
                }
            }
            JobState::Pending => {
                self.pending += 1;
                if job.gpu_count > 0 {
                    *self
                        .gpus_requested
                        .entry(job.gpu_type.clone())
                        .or_default() += job.gpu_count;
                }
            }
            JobState::Other => {}
        }
        self.jobs.push(job);
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    /// Jobs that are neither running nor pending.
    #[must_use]
    pub fn other(&self) -> usize {
        self.total() - self.running - self.pending
    }

    /// The user's running jobs, in fetch order.
    #[must_use]
    pub fn running_jobs(&self) -> Vec<&Job> {
        self.jobs.iter().filter(|j| j.is_running()).collect()
    }

    /// The user's pending jobs, sorted by priority descending (stable).
    #[must_use]
    pub fn pending_jobs(&self) -> Vec<&Job> {
        let mut jobs: Vec<&Job> = self.jobs.iter().filter(|j| j.is_pending()).collect();
        jobs.sort_by(|a, b| b.priority.cmp(&a.priority));
        jobs
    }

    /// How many globally-pending jobs outrank `job`.
    ///
    /// Counts strictly greater priorities only; ties are excluded.
    /// Recomputed per row at render time rather than cached on the job.
    #[must_use]
    pub fn rank(&self, job: &Job) -> usize {
        self.global_pending
            .iter()
            .filter(|other| other.priority > job.priority)
            .count()
    }

    #[must_use]
    pub fn total_gpus_running(&self) -> u32 {
        self.gpus_running.values().sum()
    }

    #[must_use]
    pub fn total_gpus_requested(&self) -> u32 {
        self.gpus_requested.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slurm::testing::StaticQueue;

    fn block(state: &str, priority: i64, tres: &str) -> String {
        format!(
            "JobName=work Account=lab JobState={} Reason=None RunTime=01:00:00 \
             TimeLimit=02:00:00 Priority={} AllocTRES={} ReqTRES={}",
            state, priority, tres, tres
        )
    }

    fn sample_queue() -> StaticQueue {
        StaticQueue {
            user_ids: "1 2 3 4".to_string(),
            pending_ids: "10 11 12 13".to_string(),
            ..Default::default()
        }
        .with_job("1", &block("RUNNING", 900, "cpu=8,gres/gpu:a100=4"))
        .with_job("2", &block("RUNNING", 800, "cpu=4,gres/gpu:h100=2"))
        .with_job("3", &block("PENDING", 500, "cpu=2,gres/gpu:a100=1"))
        .with_job("4", &block("COMPLETING", 100, "cpu=1"))
        .with_job("10", &block("PENDING", 500, "cpu=1"))
        .with_job("11", &block("PENDING", 300, "cpu=1"))
        .with_job("12", &block("PENDING", 300, "cpu=1"))
        .with_job("13", &block("PENDING", 100, "cpu=1"))
    }

    #[test]
    fn test_snapshot_counts() {
        let snapshot = QueueSnapshot::fetch(&sample_queue(), "alice");
        assert_eq!(snapshot.total(), 4);
        assert_eq!(snapshot.running, 2);
        assert_eq!(snapshot.pending, 1);
        assert_eq!(snapshot.other(), 1);
        assert_eq!(
            snapshot.total(),
            snapshot.running + snapshot.pending + snapshot.other()
        );
    }

    #[test]
    fn test_snapshot_gpu_aggregates() {
        let snapshot = QueueSnapshot::fetch(&sample_queue(), "alice");
        assert_eq!(snapshot.gpus_running.get("a100"), Some(&4));
        assert_eq!(snapshot.gpus_running.get("h100"), Some(&2));
        assert_eq!(snapshot.total_gpus_running(), 6);
        assert_eq!(snapshot.gpus_requested.get("a100"), Some(&1));
        assert_eq!(snapshot.total_gpus_requested(), 1);
    }

    #[test]
    fn test_snapshot_zero_gpu_jobs_not_aggregated() {
        let queue = StaticQueue {
            user_ids: "1".to_string(),
            ..Default::default()
        }
        .with_job("1", &block("RUNNING", 10, "cpu=8,mem=32G"));
        let snapshot = QueueSnapshot::fetch(&queue, "alice");
        assert_eq!(snapshot.running, 1);
        assert!(snapshot.gpus_running.is_empty());
    }

    #[test]
    fn test_snapshot_omits_failed_fetches() {
        let queue = StaticQueue {
            user_ids: "1 999 2".to_string(), // 999 has no detail block
            ..Default::default()
        }
        .with_job("1", &block("RUNNING", 10, "cpu=1"))
        .with_job("2", &block("PENDING", 10, "cpu=1"));
        let snapshot = QueueSnapshot::fetch(&queue, "alice");
        assert_eq!(snapshot.total(), 2);
        assert!(snapshot.jobs.iter().all(|j| j.job_id != "999"));
    }

    #[test]
    fn test_snapshot_listing_failure_yields_empty() {
        // StaticQueue with no details: every id lookup fails
        let queue = StaticQueue {
            user_ids: "1 2 3".to_string(),
            pending_ids: "4 5".to_string(),
            ..Default::default()
        };
        let snapshot = QueueSnapshot::fetch(&queue, "alice");
        assert_eq!(snapshot.total(), 0);
        assert!(snapshot.global_pending.is_empty());
    }

    #[test]
    fn test_global_pending_filtered_and_sorted() {
        let queue = StaticQueue {
            pending_ids: "20 21 22 23".to_string(),
            ..Default::default()
        }
        .with_job("20", &block("PENDING", 100, "cpu=1"))
        .with_job("21", &block("PENDING", 0, "cpu=1")) // filtered out
        .with_job("22", &block("PENDING", 900, "cpu=1"))
        .with_job("23", &block("PENDING", 100, "cpu=1"));
        let snapshot = QueueSnapshot::fetch(&queue, "alice");

        let priorities: Vec<i64> =
            snapshot.global_pending.iter().map(|j| j.priority).collect();
        assert_eq!(priorities, vec![900, 100, 100]);

        // Stable: the two priority-100 entries keep fetch order
        assert_eq!(snapshot.global_pending[1].job_id, "20");
        assert_eq!(snapshot.global_pending[2].job_id, "23");
    }

    #[test]
    fn test_rank_counts_strictly_higher() {
        // Global pending priorities [500, 300, 300, 100]
        let snapshot = QueueSnapshot::fetch(&sample_queue(), "alice");

        let probe = Job {
            priority: 300,
            ..Default::default()
        };
        // Only the 500 entry outranks; the other 300 is a tie and excluded
        assert_eq!(snapshot.rank(&probe), 1);

        let top = Job {
            priority: 500,
            ..Default::default()
        };
        assert_eq!(snapshot.rank(&top), 0);

        let bottom = Job {
            priority: 1,
            ..Default::default()
        };
        assert_eq!(snapshot.rank(&bottom), 4);
    }

    #[test]
    fn test_pending_jobs_sorted_desc() {
        let queue = StaticQueue {
            user_ids: "1 2 3".to_string(),
            ..Default::default()
        }
        .with_job("1", &block("PENDING", 10, "cpu=1"))
        .with_job("2", &block("PENDING", 30, "cpu=1"))
        .with_job("3", &block("PENDING", 20, "cpu=1"));
        let snapshot = QueueSnapshot::fetch(&queue, "alice");
        let ids: Vec<&str> = snapshot
            .pending_jobs()
            .iter()
            .map(|j| j.job_id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }
}
