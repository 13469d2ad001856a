//! Theme definitions for the TUI
//!
//! Colorblind-safe themes for dark and light terminals. The default is
//! "dark"; users can configure "light" via config file or QTOP_THEME.

use ratatui::style::Color;

use crate::models::JobState;

/// Available theme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

impl ThemeName {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "light" => ThemeName::Light,
            _ => ThemeName::Dark,
        }
    }
}

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    #[allow(dead_code)]
    pub name: ThemeName,

    // Base colors
    pub fg: Color,
    pub border: Color,

    // Job state colors
    pub running: Color,
    pub pending: Color,
    pub other: Color,

    // UI elements
    pub header_bg: Color,
    pub header_fg: Color,
    pub title: Color,
    pub focused: Color,
    pub emphasis: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Create a dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: ThemeName::Dark,

            fg: Color::White,
            border: Color::DarkGray,

            // Orange rather than yellow for pending: better visibility
            running: Color::Rgb(0, 200, 0),
            pending: Color::Rgb(255, 180, 0),
            other: Color::Rgb(160, 160, 160),

            header_bg: Color::Rgb(40, 80, 120),
            header_fg: Color::White,
            title: Color::Cyan,
            focused: Color::Rgb(255, 80, 80),
            emphasis: Color::Rgb(255, 80, 80),
        }
    }

    /// Create a light theme
    /// Uses darker, more saturated colors for visibility on light backgrounds
    pub fn light() -> Self {
        Self {
            name: ThemeName::Light,

            fg: Color::Black,
            border: Color::Rgb(120, 120, 120),

            running: Color::Rgb(0, 140, 0),
            pending: Color::Rgb(200, 120, 0),
            other: Color::Rgb(100, 100, 100),

            header_bg: Color::Rgb(180, 200, 230),
            header_fg: Color::Black,
            title: Color::Rgb(0, 100, 180),
            focused: Color::Rgb(200, 0, 0),
            emphasis: Color::Rgb(200, 0, 0),
        }
    }

    /// Create theme from name string
    pub fn from_name(name: &str) -> Self {
        match ThemeName::from_str(name) {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    /// Get color for a job state
    pub fn job_state_color(&self, state: JobState) -> Color {
        match state {
            JobState::Running => self.running,
            JobState::Pending => self.pending,
            JobState::Other => self.other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_name() {
        assert_eq!(Theme::from_name("dark").name, ThemeName::Dark);
        assert_eq!(Theme::from_name("light").name, ThemeName::Light);
        // Unknown defaults to dark
        assert_eq!(Theme::from_name("solarized").name, ThemeName::Dark);
    }

    #[test]
    fn test_job_state_colors() {
        let theme = Theme::dark();
        assert_eq!(theme.job_state_color(JobState::Running), theme.running);
        assert_eq!(theme.job_state_color(JobState::Pending), theme.pending);
        assert_eq!(theme.job_state_color(JobState::Other), theme.other);
    }
}
