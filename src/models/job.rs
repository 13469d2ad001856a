//! Job entity and state classification.

use serde::Serialize;

/// Coarse job state used for view filtering and aggregation.
///
/// The scheduler reports many more states (COMPLETING, SUSPENDED, ...); for
/// queue monitoring everything that is neither running nor pending lands in
/// `Other` while the raw label is kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum JobState {
    Running,
    Pending,
    #[default]
    Other,
}

impl JobState {
    /// Classify a raw `JobState=` label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "RUNNING" => JobState::Running,
            "PENDING" => JobState::Pending,
            _ => JobState::Other,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Running => "RUNNING",
            JobState::Pending => "PENDING",
            JobState::Other => "OTHER",
        }
    }
}

/// One job as parsed from a scheduler detail block.
///
/// String fields default to empty and `priority` to 0 when the source block
/// is missing or malformed; `gpu_type` is only meaningful when
/// `gpu_count > 0`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Job {
    pub job_id: String,
    pub name: String,
    pub account: String,
    pub state: JobState,
    /// Raw state text as reported by the scheduler (e.g. "COMPLETING").
    pub state_label: String,
    pub reason: String,
    pub gpu_count: u32,
    pub gpu_type: String,
    pub runtime: String,
    pub time_limit: String,
    pub priority: i64,
}

impl Job {
    /// GPU type for display: "N/A" whenever no GPUs are attached.
    #[must_use]
    pub fn gpu_type_display(&self) -> &str {
        if self.gpu_count > 0 { &self.gpu_type } else { "N/A" }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state == JobState::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_label() {
        assert_eq!(JobState::from_label("RUNNING"), JobState::Running);
        assert_eq!(JobState::from_label("PENDING"), JobState::Pending);
        assert_eq!(JobState::from_label("COMPLETED"), JobState::Other);
        assert_eq!(JobState::from_label(""), JobState::Other);
        // Classification is case-sensitive, as the scheduler emits uppercase
        assert_eq!(JobState::from_label("running"), JobState::Other);
    }

    #[test]
    fn test_gpu_type_display() {
        let mut job = Job {
            gpu_count: 2,
            gpu_type: "a100".to_string(),
            ..Default::default()
        };
        assert_eq!(job.gpu_type_display(), "a100");

        job.gpu_count = 0;
        assert_eq!(job.gpu_type_display(), "N/A");
    }
}
