//! Adaptive table layout.
//!
//! Fits N columns of widely varying content length into a bounded terminal
//! width. Two modes: unfocused (proportional distribution with a growth cap,
//! proportional shrink with per-column minimums on overflow) and focused (one
//! column expanded to its full content width, the rest sharing what is left).
//! For identical inputs the computed widths are identical on every call; the
//! only iteration order is column order.

use crate::formatting::{clamp_line, hard_truncate, truncate_string};

/// Hard cap on a column's required width, in characters.
pub const MAX_COLUMN_WIDTH: usize = 50;

/// Cap on proportional bonus growth per column in unfocused fit mode.
pub const GROWTH_CAP: usize = 20;

/// Right-edge margin reserved on every line.
const MARGIN: usize = 2;

/// How a column's overflowing content is cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// Cut to width-3 characters and append "..." (long free text).
    Ellipsis,
    /// Cut to width with no marker (ids, times, states, numbers).
    HardCut,
}

/// Static description of one table column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub header: &'static str,
    /// Floor applied when shrinking in overflow mode.
    pub min_width: usize,
    pub truncation: Truncation,
}

/// Columns of the Running and All views.
pub const RUNNING_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { header: "JobID", min_width: 8, truncation: Truncation::HardCut },
    ColumnSpec { header: "JobName", min_width: 8, truncation: Truncation::Ellipsis },
    ColumnSpec { header: "Account", min_width: 8, truncation: Truncation::Ellipsis },
    ColumnSpec { header: "Runtime", min_width: 8, truncation: Truncation::HardCut },
    ColumnSpec { header: "TimeLimit", min_width: 5, truncation: Truncation::HardCut },
    ColumnSpec { header: "GPUs", min_width: 5, truncation: Truncation::HardCut },
    ColumnSpec { header: "GPU Type", min_width: 8, truncation: Truncation::Ellipsis },
    ColumnSpec { header: "Status", min_width: 8, truncation: Truncation::HardCut },
];

/// Columns of the Pending view ("Higher" is the queue rank).
pub const PENDING_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { header: "JobID", min_width: 8, truncation: Truncation::HardCut },
    ColumnSpec { header: "JobName", min_width: 8, truncation: Truncation::Ellipsis },
    ColumnSpec { header: "Account", min_width: 8, truncation: Truncation::Ellipsis },
    ColumnSpec { header: "Reason", min_width: 8, truncation: Truncation::Ellipsis },
    ColumnSpec { header: "TimeLimit", min_width: 5, truncation: Truncation::HardCut },
    ColumnSpec { header: "GPUs", min_width: 5, truncation: Truncation::HardCut },
    ColumnSpec { header: "GPU Type", min_width: 8, truncation: Truncation::Ellipsis },
    ColumnSpec { header: "Priority", min_width: 8, truncation: Truncation::HardCut },
    ColumnSpec { header: "Higher", min_width: 8, truncation: Truncation::HardCut },
];

/// Width usable by column content: total minus one separator between each
/// pair of columns and the right margin.
#[must_use]
pub fn available_width(terminal_width: usize, column_count: usize) -> usize {
    terminal_width.saturating_sub(column_count.saturating_sub(1) + MARGIN)
}

/// Per-column required width: the larger of header and longest cell, capped
/// at [`MAX_COLUMN_WIDTH`].
#[must_use]
pub fn required_widths(specs: &[ColumnSpec], rows: &[Vec<String>]) -> Vec<usize> {
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let content = rows
                .iter()
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0);
            spec.header.chars().count().max(content).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Compute final column widths for the given terminal width and focus state.
///
/// Unfocused with room to spare: every column gets its required width plus a
/// proportional share of the slack, capped at [`GROWTH_CAP`] per column;
/// rounding remainder is handed out one unit per column in order. Unfocused
/// overflow: proportional shrink floored at each column's minimum (the floor
/// can overshoot the budget; the row clamp absorbs it). Focused: the focused
/// column gets its required width plus 2 for the bracket decoration (capped
/// at the full budget), the others an even split capped at their own
/// requirement, with leftover given back in column order.
#[must_use]
pub fn compute_widths(
    terminal_width: usize,
    specs: &[ColumnSpec],
    required: &[usize],
    focused: Option<usize>,
) -> Vec<usize> {
    let n = specs.len();
    let available = available_width(terminal_width, n);

    if let Some(f) = focused
        && f < n
    {
        return compute_focused(available, required, f);
    }
    compute_unfocused(available, specs, required)
}

fn compute_unfocused(available: usize, specs: &[ColumnSpec], required: &[usize]) -> Vec<usize> {
    let n = specs.len();
    let total_required: usize = required.iter().sum();

    if total_required <= available {
        let mut widths = required.to_vec();
        let slack = available - total_required;
        let mut remaining = slack;

        if total_required > 0 {
            for i in 0..n {
                let bonus = (required[i] * slack / total_required).min(GROWTH_CAP);
                widths[i] += bonus;
                remaining -= bonus;
            }
        }

        // Rounding remainder: one unit per column, in order
        for width in widths.iter_mut() {
            if remaining == 0 {
                break;
            }
            *width += 1;
            remaining -= 1;
        }

        widths
    } else {
        // Shrink proportionally, then floor at each column's minimum. The
        // floor can push the total past the budget; the per-line clamp at
        // render time absorbs the overshoot.
        required
            .iter()
            .zip(specs)
            .map(|(&req, spec)| (req * available / total_required).max(spec.min_width))
            .collect()
    }
}

fn compute_focused(available: usize, required: &[usize], f: usize) -> Vec<usize> {
    let n = required.len();
    let mut widths = vec![0; n];

    // +2 reserves room for the [bracketed] header
    let focused_width = (required[f] + 2).min(available);
    widths[f] = focused_width;

    let others = n - 1;
    if others == 0 {
        return widths;
    }

    let remaining = available - focused_width;
    let share = remaining / others;
    for i in 0..n {
        if i != f {
            widths[i] = required[i].min(share);
        }
    }

    let used: usize = (0..n).filter(|&i| i != f).map(|i| widths[i]).sum();
    let mut leftover = remaining - used;

    // First give capped columns back up to their requirement, in order
    for i in 0..n {
        if leftover == 0 {
            break;
        }
        if i != f {
            let growth = required[i].saturating_sub(widths[i]).min(leftover);
            widths[i] += growth;
            leftover -= growth;
        }
    }

    // Then spread what is still left, one unit per column, in order
    for i in 0..n {
        if leftover == 0 {
            break;
        }
        if i != f {
            widths[i] += 1;
            leftover -= 1;
        }
    }

    widths
}

/// Header cells padded to their column widths, the focused one wrapped in
/// brackets. Kept separate from [`format_header`] so the renderer can style
/// the focused cell on its own.
#[must_use]
pub fn header_cells(
    specs: &[ColumnSpec],
    widths: &[usize],
    focused: Option<usize>,
) -> Vec<String> {
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let text = if focused == Some(i) {
                format!("[{}]", spec.header)
            } else {
                spec.header.to_string()
            };
            pad(&hard_truncate(&text, widths[i]), widths[i])
        })
        .collect()
}

/// Format the header row, bracket-wrapping the focused column's title.
#[must_use]
pub fn format_header(
    terminal_width: usize,
    specs: &[ColumnSpec],
    widths: &[usize],
    focused: Option<usize>,
) -> String {
    let cells = header_cells(specs, widths, focused);
    clamp_line(&cells.join(" "), terminal_width.saturating_sub(MARGIN))
}

/// Format one data row into its final on-screen string.
///
/// The focused column keeps its full content; every other column truncates
/// per its policy. The assembled line is clamped to the terminal width.
#[must_use]
pub fn format_row(
    terminal_width: usize,
    specs: &[ColumnSpec],
    widths: &[usize],
    focused: Option<usize>,
    cells: &[String],
) -> String {
    let parts: Vec<String> = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let text = if focused == Some(i) {
                cells[i].clone()
            } else {
                match spec.truncation {
                    Truncation::Ellipsis => truncate_string(&cells[i], widths[i]),
                    Truncation::HardCut => hard_truncate(&cells[i], widths[i]),
                }
            };
            pad(&text, widths[i])
        })
        .collect();
    clamp_line(&parts.join(" "), terminal_width.saturating_sub(MARGIN))
}

/// Left-pad with spaces to `width` (never truncates).
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        let mut out = String::with_capacity(width);
        out.push_str(s);
        out.extend(std::iter::repeat_n(' ', width - len));
        out
    }
}
