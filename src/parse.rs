//! Parsing of `scontrol show job` detail blocks.
//!
//! Job records arrive as loosely structured `KEY=VALUE` text. Extraction is
//! tolerant by construction: a missing key yields an empty string, a
//! non-numeric number yields zero, and every extracted value is sanitized so
//! that stray control bytes cannot corrupt table rendering. The GPU
//! sub-parser handles the two `gres/gpu` spellings with typed-over-untyped
//! precedence.

use crate::models::{Job, JobState};

/// Length of the `gres/gpu:` / `gres/gpu=` prefixes.
const GRES_PREFIX_LEN: usize = 9;

/// Strip control characters from an extracted value.
///
/// Keeps printable ASCII (32-126), replaces tabs with a single space, and
/// drops everything else, including embedded newlines and carriage returns.
/// Sanitizing an already-sanitized string is a no-op.
#[must_use]
pub fn sanitize_field(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            ' '..='~' => Some(c),
            '\t' => Some(' '),
            _ => None,
        })
        .collect()
}

/// Extract the value of `field_name` from a `KEY=VALUE` detail block.
///
/// The value runs from just after `=` to the next space, or the next newline
/// if no space follows, or the end of the block. Returns an empty string when
/// the field marker is absent. The result is sanitized.
#[must_use]
pub fn extract_field(block: &str, field_name: &str) -> String {
    let marker = format!("{}=", field_name);
    let Some(pos) = block.find(&marker) else {
        return String::new();
    };

    let start = pos + marker.len();
    let rest = &block[start..];
    let end = rest
        .find(' ')
        .or_else(|| rest.find('\n'))
        .unwrap_or(rest.len());

    sanitize_field(&rest[..end])
}

/// GPU allocation or request derived from a TRES string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuResource {
    pub count: u32,
    pub kind: String,
}

impl GpuResource {
    /// No GPUs: count 0, placeholder type.
    #[must_use]
    pub fn none() -> Self {
        Self {
            count: 0,
            kind: "N/A".to_string(),
        }
    }
}

/// Parse the digits that follow a `gres/gpu` pattern, up to the next
/// space/comma/newline or end of input. Parse failure yields 0.
fn parse_gpu_count(s: &str) -> u32 {
    let end = s.find([' ', ',', '\n']).unwrap_or(s.len());
    s[..end].parse().unwrap_or(0)
}

/// Extract GPU count and type from `AllocTRES` or `ReqTRES`.
///
/// The typed pattern `gres/gpu:TYPE=COUNT` takes absolute precedence over
/// the untyped `gres/gpu=COUNT` (which reports type "generic"). Neither
/// pattern present, or the field marker itself missing, yields
/// [`GpuResource::none`].
///
/// The search starts at the field marker but is not bounded by the field's
/// own value span; a pattern belonging to a later field can match. This
/// mirrors scheduler output where the two TRES fields rarely disagree.
#[must_use]
pub fn extract_gpu(block: &str, field_name: &str) -> GpuResource {
    let marker = format!("{}=", field_name);
    let Some(field_pos) = block.find(&marker) else {
        return GpuResource::none();
    };

    let search = &block[field_pos..];

    // Typed pattern first: gres/gpu:TYPE=COUNT
    if let Some(typed_pos) = search.find("gres/gpu:") {
        let type_start = typed_pos + GRES_PREFIX_LEN;
        if let Some(eq_off) = search[type_start..].find('=') {
            let kind = sanitize_field(&search[type_start..type_start + eq_off]);
            let count = parse_gpu_count(&search[type_start + eq_off + 1..]);
            // Count parse failure still keeps the type
            return GpuResource { count, kind };
        }
        // No '=' after the type marker: fall through to the untyped pattern
    }

    // Untyped pattern: gres/gpu=COUNT
    if let Some(untyped_pos) = search.find("gres/gpu=") {
        let count = parse_gpu_count(&search[untyped_pos + GRES_PREFIX_LEN..]);
        return GpuResource {
            count,
            kind: "generic".to_string(),
        };
    }

    GpuResource::none()
}

/// Build a [`Job`] from its id and `scontrol show job` output.
///
/// Running jobs read GPUs from `AllocTRES`; everything else tries `ReqTRES`
/// first and falls back to `AllocTRES` only when the request yields count 0.
#[must_use]
pub fn parse_job(job_id: &str, block: &str) -> Job {
    let state_label = extract_field(block, "JobState");
    let state = JobState::from_label(&state_label);

    let priority = extract_field(block, "Priority").parse::<i64>().unwrap_or(0);

    let gpu = if state == JobState::Running {
        extract_gpu(block, "AllocTRES")
    } else {
        let requested = extract_gpu(block, "ReqTRES");
        if requested.count == 0 {
            extract_gpu(block, "AllocTRES")
        } else {
            requested
        }
    };

    Job {
        job_id: job_id.to_string(),
        name: extract_field(block, "JobName"),
        account: extract_field(block, "Account"),
        state,
        state_label,
        reason: extract_field(block, "Reason"),
        gpu_count: gpu.count,
        gpu_type: gpu.kind,
        runtime: extract_field(block, "RunTime"),
        time_limit: extract_field(block, "TimeLimit"),
        priority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_field_passthrough() {
        assert_eq!(sanitize_field("plain-value_123"), "plain-value_123");
    }

    #[test]
    fn test_sanitize_field_strips_control_bytes() {
        assert_eq!(sanitize_field("a\nb\rc\x07d"), "abcd");
        assert_eq!(sanitize_field("tab\there"), "tab here");
    }

    #[test]
    fn test_sanitize_field_idempotent() {
        let once = sanitize_field("a\tb\nc\u{1F600}");
        assert_eq!(sanitize_field(&once), once);
    }

    #[test]
    fn test_extract_field_basic() {
        let block = "JobId=42 JobName=train Account=bio";
        assert_eq!(extract_field(block, "JobName"), "train");
        assert_eq!(extract_field(block, "Account"), "bio");
    }

    #[test]
    fn test_extract_field_newline_terminator() {
        let block = "JobName=train\nAccount=bio";
        assert_eq!(extract_field(block, "JobName"), "train");
    }

    #[test]
    fn test_extract_field_end_of_block() {
        assert_eq!(extract_field("Account=bio", "Account"), "bio");
    }

    #[test]
    fn test_extract_field_missing() {
        assert_eq!(extract_field("JobName=train", "Reason"), "");
    }

    #[test]
    fn test_extract_gpu_typed() {
        let block = "JobId=1 AllocTRES=cpu=8,gres/gpu:a100=4,mem=32G";
        let gpu = extract_gpu(block, "AllocTRES");
        assert_eq!(gpu.count, 4);
        assert_eq!(gpu.kind, "a100");
    }

    #[test]
    fn test_extract_gpu_untyped() {
        let block = "JobId=1 AllocTRES=cpu=8,gres/gpu=2";
        let gpu = extract_gpu(block, "AllocTRES");
        assert_eq!(gpu.count, 2);
        assert_eq!(gpu.kind, "generic");
    }

    #[test]
    fn test_extract_gpu_no_gpus() {
        let block = "JobId=1 AllocTRES=cpu=4,mem=10G";
        assert_eq!(extract_gpu(block, "AllocTRES"), GpuResource::none());
    }

    #[test]
    fn test_extract_gpu_missing_field() {
        assert_eq!(extract_gpu("JobId=1 cpu=4", "AllocTRES"), GpuResource::none());
    }

    #[test]
    fn test_extract_gpu_typed_beats_untyped() {
        // Typed pattern wins even when the untyped spelling appears first
        let block = "ReqTRES=gres/gpu=1,gres/gpu:h100=8";
        let gpu = extract_gpu(block, "ReqTRES");
        assert_eq!(gpu.count, 8);
        assert_eq!(gpu.kind, "h100");
    }

    #[test]
    fn test_extract_gpu_bad_count_keeps_type() {
        let block = "AllocTRES=gres/gpu:a100=lots";
        let gpu = extract_gpu(block, "AllocTRES");
        assert_eq!(gpu.count, 0);
        assert_eq!(gpu.kind, "a100");
    }

    #[test]
    fn gpu_search_crosses_field_boundary() {
        // The search window is not bounded by the field's own value span:
        // AllocTRES has no GPU entry here, but ReqTRES later in the block
        // does, and the AllocTRES query picks it up.
        let block = "AllocTRES=cpu=4 ReqTRES=cpu=4,gres/gpu:v100=2";
        let gpu = extract_gpu(block, "AllocTRES");
        assert_eq!(gpu.count, 2);
        assert_eq!(gpu.kind, "v100");
    }

    const RUNNING_BLOCK: &str = "JobId=101 JobName=train-llm Account=nlp \
         JobState=RUNNING Reason=None RunTime=02:13:44 TimeLimit=1-00:00:00 \
         Priority=12500 AllocTRES=cpu=16,mem=64G,gres/gpu:a100=4 \
         ReqTRES=cpu=16,mem=64G,gres/gpu:a100=4";

    const PENDING_BLOCK: &str = "JobId=202 JobName=sweep Account=vision \
         JobState=PENDING Reason=Resources RunTime=00:00:00 TimeLimit=12:00:00 \
         Priority=8100 ReqTRES=cpu=8,gres/gpu=2";

    #[test]
    fn test_parse_job_running() {
        let job = parse_job("101", RUNNING_BLOCK);
        assert_eq!(job.job_id, "101");
        assert_eq!(job.name, "train-llm");
        assert_eq!(job.account, "nlp");
        assert_eq!(job.state, JobState::Running);
        assert_eq!(job.state_label, "RUNNING");
        assert_eq!(job.runtime, "02:13:44");
        assert_eq!(job.time_limit, "1-00:00:00");
        assert_eq!(job.priority, 12500);
        assert_eq!(job.gpu_count, 4);
        assert_eq!(job.gpu_type, "a100");
    }

    #[test]
    fn test_parse_job_pending_uses_req_tres() {
        let job = parse_job("202", PENDING_BLOCK);
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.reason, "Resources");
        assert_eq!(job.gpu_count, 2);
        assert_eq!(job.gpu_type, "generic");
    }

    #[test]
    fn test_parse_job_pending_falls_back_to_alloc_tres() {
        // ReqTRES carries no GPU entry (and nothing after it does either),
        // so the pending job falls back to AllocTRES.
        let block = "JobId=7 JobState=PENDING \
             AllocTRES=cpu=4,gres/gpu:l40s=1 Priority=10 ReqTRES=cpu=4";
        let job = parse_job("7", block);
        assert_eq!(job.gpu_count, 1);
        assert_eq!(job.gpu_type, "l40s");
    }

    #[test]
    fn test_parse_job_defaults_on_garbage() {
        let job = parse_job("9", "JobState=PENDING Priority=notanumber");
        assert_eq!(job.priority, 0);
        assert_eq!(job.name, "");
        assert_eq!(job.gpu_count, 0);
        assert_eq!(job.gpu_type, "N/A");
    }

    #[test]
    fn test_parse_job_other_state() {
        let job = parse_job("3", "JobState=COMPLETING Priority=5");
        assert_eq!(job.state, JobState::Other);
        assert_eq!(job.state_label, "COMPLETING");
    }
}
