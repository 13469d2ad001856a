//! Shared string formatting utilities used by both the TUI and the one-shot
//! report.
//!
//! Table cells go through one of two truncation policies: free-text columns
//! get an ellipsis, short/bounded columns are hard-cut. Assembled rows are
//! clamped once more against the terminal width as a final safety net.

/// Truncate a string to a maximum length (in characters), adding "..." at the
/// end if truncated.
///
/// This function is Unicode-safe and counts characters, not bytes.
///
/// # Examples
/// ```
/// use qtop::formatting::truncate_string;
/// assert_eq!(truncate_string("hello", 10), "hello");
/// assert_eq!(truncate_string("hello world", 8), "hello...");
/// assert_eq!(truncate_string("ab", 2), "ab");
/// ```
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        // Edge case: if max_len is very small, just truncate without ellipsis
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Hard-cut a string to a maximum length (in characters), no ellipsis.
///
/// Used for bounded fields (job ids, times, states, numbers) where a marker
/// would cost more width than it is worth.
#[must_use]
pub fn hard_truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Clamp a fully assembled row to the terminal width.
///
/// Column math can overshoot by a few cells in the minimum-width overflow
/// case; this is the last line of defense before the string hits the screen.
#[must_use]
pub fn clamp_line(line: &str, max_len: usize) -> String {
    hard_truncate(line, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 3), "abc");
        assert_eq!(truncate_string("abcd", 3), "abc"); // edge case: max_len <= 3
        assert_eq!(truncate_string("abcdefgh", 6), "abc...");
    }

    #[test]
    fn test_truncate_string_unicode() {
        // Multi-byte characters must be counted as characters, not bytes
        let chinese = "\u{4e2d}\u{6587}\u{6d4b}\u{8bd5}"; // 4 chars, 12 bytes
        assert_eq!(truncate_string(chinese, 10), chinese);
        assert_eq!(truncate_string(chinese, 4), chinese);
        assert_eq!(truncate_string(chinese, 3), "\u{4e2d}\u{6587}\u{6d4b}");

        let long_chinese = "\u{4e2d}\u{6587}\u{6d4b}\u{8bd5}\u{5b57}\u{7b26}"; // 6 chars
        assert_eq!(truncate_string(long_chinese, 5), "\u{4e2d}\u{6587}...");
    }

    #[test]
    fn test_hard_truncate() {
        assert_eq!(hard_truncate("hello", 10), "hello");
        assert_eq!(hard_truncate("hello", 5), "hello");
        assert_eq!(hard_truncate("hello world", 5), "hello");
        assert_eq!(hard_truncate("", 5), "");
        assert_eq!(hard_truncate("abc", 0), "");
    }

    #[test]
    fn test_hard_truncate_unicode() {
        let emoji = "\u{1F600}\u{1F601}\u{1F602}"; // 3 emoji, 12 bytes
        assert_eq!(hard_truncate(emoji, 3), emoji);
        assert_eq!(hard_truncate(emoji, 2), "\u{1F600}\u{1F601}");
    }

    #[test]
    fn test_clamp_line() {
        assert_eq!(clamp_line("short row", 80), "short row");
        let long = "x".repeat(100);
        assert_eq!(clamp_line(&long, 78).chars().count(), 78);
    }
}
