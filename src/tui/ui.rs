//! UI rendering for the TUI.
//!
//! Rendering is event-driven - a frame is drawn on input, resize, or after a
//! refresh, not at a fixed frame rate. Every table string is produced by the
//! layout engine; this module only decides colors and placement.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::models::{Job, QueueSnapshot};
use crate::tui::app::{App, View};
use crate::tui::layout::{
    self, ColumnSpec, PENDING_COLUMNS, RUNNING_COLUMNS,
};
use crate::tui::theme::Theme;

/// Render the entire TUI
pub fn render(app: &App, frame: &mut Frame) {
    let theme = Theme::from_name(&app.config.display.theme);
    let area = frame.area();

    // Fixed chrome: tab bar, controls bar, title, spacer, table header,
    // footer. The Min(0) slice in the middle holds exactly the rows that
    // App::visible_rows accounts for.
    let chunks = Layout::vertical([
        Constraint::Length(1), // Tab bar
        Constraint::Length(1), // Controls bar
        Constraint::Length(1), // Section title
        Constraint::Length(1), // Spacer
        Constraint::Length(1), // Table header
        Constraint::Min(0),    // Rows
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_tab_bar(app, frame, chunks[0], &theme);
    render_controls_bar(frame, chunks[1], &theme);
    render_title(app, frame, chunks[2], &theme);

    match app.view {
        View::Overview => render_overview(app, frame, chunks[5], &theme),
        View::Running => {
            let jobs = app.snapshot.running_jobs();
            render_table(app, frame, chunks[4], chunks[5], &theme, &jobs, false);
        }
        View::Pending => {
            let jobs = app.snapshot.pending_jobs();
            render_table(app, frame, chunks[4], chunks[5], &theme, &jobs, true);
        }
        View::All => {
            let jobs: Vec<&Job> = app.snapshot.jobs.iter().collect();
            render_table(app, frame, chunks[4], chunks[5], &theme, &jobs, false);
        }
    }

    render_footer(app, frame, chunks[6], &theme);
}

fn render_tab_bar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let mut spans = vec![Span::styled(
        format!(" qtop - user: {}  ", app.username),
        Style::default().bold(),
    )];

    for (i, view) in [View::Overview, View::Running, View::Pending, View::All]
        .iter()
        .enumerate()
    {
        let label = format!("[{}]{} ", i + 1, view.label());
        if *view == app.view {
            spans.push(Span::styled(label, Style::default().bold().underlined()));
        } else {
            spans.push(Span::raw(label));
        }
    }

    let bar = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(theme.header_fg).bg(theme.header_bg));
    frame.render_widget(bar, area);
}

fn render_controls_bar(frame: &mut Frame, area: Rect, theme: &Theme) {
    let controls = " Up/Down: Scroll  Left/Right: Focus Column  PgUp/PgDn: Page  \
                    r: Refresh  e/E: Export  q: Quit";
    let bar = Paragraph::new(controls)
        .style(Style::default().fg(theme.header_fg).bg(theme.header_bg));
    frame.render_widget(bar, area);
}

fn render_title(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let title = match app.view {
        View::Overview => " JOB OVERVIEW".to_string(),
        View::Running => format!(" RUNNING JOBS ({} jobs)", app.snapshot.running),
        View::Pending => format!(" PENDING JOBS ({} jobs)", app.snapshot.pending),
        View::All => format!(" ALL JOBS ({} jobs)", app.snapshot.total()),
    };
    let para = Paragraph::new(title).style(Style::default().fg(theme.title).bold());
    frame.render_widget(para, area);

    if let Some(refreshed) = app.last_refresh {
        let clock = Paragraph::new(format!("refreshed {} ", refreshed.format("%H:%M:%S")))
            .style(Style::default().fg(theme.border))
            .alignment(Alignment::Right);
        frame.render_widget(clock, area);
    }
}

fn render_overview(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let snapshot = &app.snapshot;
    let mut lines: Vec<Line> = vec![
        Line::raw(format!("  Total Jobs: {}", snapshot.total())),
        Line::styled(
            format!("  Running:    {}", snapshot.running),
            Style::default().fg(theme.running),
        ),
        Line::styled(
            format!("  Pending:    {}", snapshot.pending),
            Style::default().fg(theme.pending),
        ),
    ];

    if !snapshot.gpus_running.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            " RUNNING - GPU ALLOCATIONS",
            Style::default().fg(theme.title).bold(),
        ));
        for (gpu_type, count) in &snapshot.gpus_running {
            lines.push(Line::styled(
                format!("  {:<15}: {} GPUs", gpu_type, count),
                Style::default().fg(theme.running),
            ));
        }
        lines.push(Line::styled(
            format!("  Total Running:  {} GPUs", snapshot.total_gpus_running()),
            Style::default().fg(theme.emphasis).bold(),
        ));
    }

    if !snapshot.gpus_requested.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            " PENDING - GPU REQUESTS",
            Style::default().fg(theme.title).bold(),
        ));
        for (gpu_type, count) in &snapshot.gpus_requested {
            lines.push(Line::styled(
                format!("  {:<15}: {} GPUs", gpu_type, count),
                Style::default().fg(theme.pending),
            ));
        }
        lines.push(Line::styled(
            format!("  Total Requested: {} GPUs", snapshot.total_gpus_requested()),
            Style::default().fg(theme.emphasis).bold(),
        ));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_table(
    app: &App,
    frame: &mut Frame,
    header_area: Rect,
    rows_area: Rect,
    theme: &Theme,
    jobs: &[&Job],
    pending_view: bool,
) {
    let specs: &[ColumnSpec] = if pending_view {
        PENDING_COLUMNS
    } else {
        RUNNING_COLUMNS
    };
    let width = frame.area().width as usize;

    if jobs.is_empty() {
        let msg = if app.last_refresh.is_none() {
            "Loading jobs..."
        } else {
            "No jobs found"
        };
        let para = Paragraph::new(msg)
            .style(Style::default().fg(theme.border))
            .alignment(Alignment::Center);
        frame.render_widget(para, rows_area);
        return;
    }

    let cells: Vec<Vec<String>> = jobs
        .iter()
        .map(|job| {
            if pending_view {
                pending_cells(job, &app.snapshot)
            } else {
                running_cells(job)
            }
        })
        .collect();

    let required = layout::required_widths(specs, &cells);
    let widths = layout::compute_widths(width, specs, &required, app.focused_column);

    // Header line, focused column highlighted
    let mut header_spans: Vec<Span> = Vec::new();
    for (i, cell) in layout::header_cells(specs, &widths, app.focused_column)
        .into_iter()
        .enumerate()
    {
        if i > 0 {
            header_spans.push(Span::raw(" "));
        }
        let style = if app.focused_column == Some(i) {
            Style::default().fg(theme.focused).bold()
        } else {
            Style::default().bold()
        };
        header_spans.push(Span::styled(cell, style));
    }
    frame.render_widget(Paragraph::new(Line::from(header_spans)), header_area);

    // Data rows, one pre-formatted string each
    let lines: Vec<Line> = cells
        .iter()
        .zip(jobs)
        .skip(app.scroll_offset)
        .take(app.visible_rows)
        .map(|(row, job)| {
            let text = layout::format_row(width, specs, &widths, app.focused_column, row);
            let color = if pending_view {
                theme.pending
            } else {
                theme.job_state_color(job.state)
            };
            Line::styled(text, Style::default().fg(color))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), rows_area);
}

fn running_cells(job: &Job) -> Vec<String> {
    vec![
        job.job_id.clone(),
        job.name.clone(),
        job.account.clone(),
        job.runtime.clone(),
        job.time_limit.clone(),
        job.gpu_count.to_string(),
        job.gpu_type_display().to_string(),
        job.state_label.clone(),
    ]
}

fn pending_cells(job: &Job, snapshot: &QueueSnapshot) -> Vec<String> {
    vec![
        job.job_id.clone(),
        job.name.clone(),
        job.account.clone(),
        job.reason.clone(),
        job.time_limit.clone(),
        job.gpu_count.to_string(),
        job.gpu_type_display().to_string(),
        job.priority.to_string(),
        snapshot.rank(job).to_string(),
    ]
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    // Export feedback takes priority over the scroll indicator
    if let Some(feedback) = app.current_feedback() {
        let color = if feedback.success {
            theme.running
        } else {
            theme.emphasis
        };
        let para = Paragraph::new(format!(" {}", feedback.message))
            .style(Style::default().fg(color).bold());
        frame.render_widget(para, area);
        return;
    }

    let rows = app.row_count();
    if rows > app.visible_rows && app.visible_rows > 0 {
        let first = app.scroll_offset + 1;
        let last = (app.scroll_offset + app.visible_rows).min(rows);
        let span = rows.saturating_sub(app.visible_rows).max(1);
        let percent = app.scroll_offset * 100 / span;
        let para = Paragraph::new(format!(
            " Showing {}-{} of {} (Scroll: {}%)",
            first, last, rows, percent
        ))
        .style(Style::default().fg(theme.border));
        frame.render_widget(para, area);
    }
}
