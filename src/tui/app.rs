//! Application state and core logic for the TUI.
//!
//! The state machine is deliberately small: an active view, a scroll offset,
//! and an optional focused column. View switches reset scroll and focus;
//! refresh rebuilds the snapshot synchronously and keeps the rest.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::models::{Job, QueueSnapshot, TopConfig};
use crate::slurm::QueueSource;
use crate::tui::event::{EventResult, KeyAction};
use crate::tui::layout::{PENDING_COLUMNS, RUNNING_COLUMNS};

/// Fixed vertical chrome: tab bar, controls bar, title, spacer, table header,
/// footer. Everything else is table rows.
pub const CHROME_LINES: usize = 6;

/// Current view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Overview,
    Running,
    Pending,
    All,
}

impl View {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Running => "Running",
            View::Pending => "Pending",
            View::All => "All",
        }
    }

    /// Number of table columns in this view (0 = no table).
    #[must_use]
    pub fn column_count(&self) -> usize {
        match self {
            View::Overview => 0,
            View::Pending => PENDING_COLUMNS.len(),
            View::Running | View::All => RUNNING_COLUMNS.len(),
        }
    }
}

/// Export operation result for the transient status toast
#[derive(Debug, Clone)]
pub struct ExportFeedback {
    pub message: String,
    pub success: bool,
    pub timestamp: Instant,
}

impl ExportFeedback {
    pub fn success(message: String) -> Self {
        Self {
            message,
            success: true,
            timestamp: Instant::now(),
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            message,
            success: false,
            timestamp: Instant::now(),
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.timestamp.elapsed() < Duration::from_secs(2)
    }
}

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Main application state
pub struct App {
    pub running: bool,
    pub view: View,
    /// First visible row index. Clamped to `[0, rows - visible_rows]`.
    pub scroll_offset: usize,
    /// Focused column in the active view; None = no focus.
    pub focused_column: Option<usize>,
    /// Table rows that fit on screen; updated from the terminal size before
    /// every draw.
    pub visible_rows: usize,
    pub username: String,
    pub snapshot: QueueSnapshot,
    pub last_refresh: Option<chrono::DateTime<chrono::Local>>,
    pub feedback: Option<ExportFeedback>,
    pub config: TopConfig,
}

impl App {
    #[must_use]
    pub fn new(username: String, config: TopConfig) -> Self {
        Self {
            running: true,
            view: View::Overview,
            scroll_offset: 0,
            focused_column: None,
            visible_rows: 0,
            username,
            snapshot: QueueSnapshot::default(),
            last_refresh: None,
            feedback: None,
            config,
        }
    }

    /// Rebuild the snapshot from `source`, blocking until every query
    /// completes. The previous snapshot stays readable until the new one is
    /// swapped in. View and focus are preserved; scroll resets.
    pub fn refresh(&mut self, source: &dyn QueueSource) {
        self.snapshot = QueueSnapshot::fetch(source, &self.username);
        self.scroll_offset = 0;
        self.last_refresh = Some(chrono::Local::now());
    }

    /// Row count of the active view's table.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self.view {
            View::Overview => 0,
            View::Running => self.snapshot.running,
            View::Pending => self.snapshot.pending,
            View::All => self.snapshot.total(),
        }
    }

    fn max_scroll(&self) -> usize {
        self.row_count().saturating_sub(self.visible_rows)
    }

    /// Keep the scroll offset within the scrollable range.
    pub fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    fn switch_view(&mut self, view: View) {
        self.view = view;
        self.scroll_offset = 0;
        self.focused_column = None;
    }

    /// Cycle focus one column left or right, passing through the unfocused
    /// state between the first and last column. No-op in Overview.
    fn cycle_focus(&mut self, forward: bool) {
        let columns = self.view.column_count();
        if columns == 0 {
            return;
        }
        let max = columns - 1;
        self.focused_column = if forward {
            match self.focused_column {
                None => Some(0),
                Some(i) if i >= max => None,
                Some(i) => Some(i + 1),
            }
        } else {
            match self.focused_column {
                None => Some(max),
                Some(0) => None,
                Some(i) => Some(i - 1),
            }
        };
    }

    /// Apply one input action. Refresh queries `source` synchronously.
    pub fn handle_action(&mut self, action: KeyAction, source: &dyn QueueSource) -> EventResult {
        match action {
            KeyAction::Quit => {
                self.running = false;
                return EventResult::Quit;
            }
            KeyAction::Refresh => self.refresh(source),
            KeyAction::SwitchToOverview => self.switch_view(View::Overview),
            KeyAction::SwitchToRunning => self.switch_view(View::Running),
            KeyAction::SwitchToPending => self.switch_view(View::Pending),
            KeyAction::SwitchToAll => self.switch_view(View::All),
            KeyAction::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            KeyAction::ScrollDown => {
                self.scroll_offset += 1;
                self.clamp_scroll();
            }
            KeyAction::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(self.visible_rows.max(1));
            }
            KeyAction::PageDown => {
                self.scroll_offset += self.visible_rows.max(1);
                self.clamp_scroll();
            }
            KeyAction::FocusLeft => self.cycle_focus(false),
            KeyAction::FocusRight => self.cycle_focus(true),
            KeyAction::ExportJson => self.export(ExportFormat::Json),
            KeyAction::ExportCsv => self.export(ExportFormat::Csv),
            KeyAction::Unknown => return EventResult::Unchanged,
        }
        EventResult::Continue
    }

    /// Export the user's jobs to a timestamped file in the working directory.
    fn export(&mut self, format: ExportFormat) {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let (extension, contents) = match format {
            ExportFormat::Json => ("json", serialize_jobs_json(&self.snapshot.jobs)),
            ExportFormat::Csv => ("csv", Ok(serialize_jobs_csv(&self.snapshot.jobs))),
        };
        let filename = format!("qtop-jobs-{}.{}", timestamp, extension);

        let result = contents.and_then(|text| {
            std::fs::write(&filename, text)
                .with_context(|| format!("failed to write {}", filename))
        });

        self.feedback = Some(match result {
            Ok(()) => {
                tracing::debug!(file = %filename, "exported jobs");
                ExportFeedback::success(format!("Exported to {}", filename))
            }
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                ExportFeedback::failure(format!("Export failed: {}", e))
            }
        });
    }

    /// Get current export feedback if still visible
    #[must_use]
    pub fn current_feedback(&self) -> Option<&ExportFeedback> {
        self.feedback.as_ref().filter(|f| f.is_visible())
    }
}

fn serialize_jobs_json(jobs: &[Job]) -> Result<String> {
    serde_json::to_string_pretty(jobs).context("failed to serialize jobs to JSON")
}

fn serialize_jobs_csv(jobs: &[Job]) -> String {
    let mut out = String::from(
        "job_id,name,account,state,reason,gpus,gpu_type,runtime,time_limit,priority\n",
    );
    for job in jobs {
        out.push_str(&csv_line(job));
        out.push('\n');
    }
    out
}

fn csv_line(job: &Job) -> String {
    [
        escape_csv(&job.job_id),
        escape_csv(&job.name),
        escape_csv(&job.account),
        escape_csv(&job.state_label),
        escape_csv(&job.reason),
        job.gpu_count.to_string(),
        escape_csv(job.gpu_type_display()),
        escape_csv(&job.runtime),
        escape_csv(&job.time_limit),
        job.priority.to_string(),
    ]
    .join(",")
}

/// Escape a string for CSV (handle commas, quotes, newlines)
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
