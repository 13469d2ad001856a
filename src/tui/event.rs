//! Input event mapping for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of processing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Continue running, UI needs redraw
    Continue,
    /// Continue running, no UI change needed
    Unchanged,
    /// Quit the application
    Quit,
}

/// Key action mappings for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // View switching
    SwitchToOverview,
    SwitchToRunning,
    SwitchToPending,
    SwitchToAll,

    // Navigation
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    FocusLeft,
    FocusRight,

    // Actions
    Refresh,
    ExportJson,
    ExportCsv,
    Quit,

    // Unknown/unhandled
    Unknown,
}

impl KeyAction {
    /// Map a key event to an action
    pub fn from_key_event(event: KeyEvent) -> Self {
        let KeyEvent {
            code, modifiers, ..
        } = event;

        match code {
            // Quit
            KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,

            // View switching
            KeyCode::Char('1') => KeyAction::SwitchToOverview,
            KeyCode::Char('2') => KeyAction::SwitchToRunning,
            KeyCode::Char('3') => KeyAction::SwitchToPending,
            KeyCode::Char('4') => KeyAction::SwitchToAll,

            // Navigation
            KeyCode::Up => KeyAction::ScrollUp,
            KeyCode::Down => KeyAction::ScrollDown,
            KeyCode::PageUp => KeyAction::PageUp,
            KeyCode::PageDown => KeyAction::PageDown,
            KeyCode::Left => KeyAction::FocusLeft,
            KeyCode::Right => KeyAction::FocusRight,

            // Actions
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Refresh,
            KeyCode::Char('e') => KeyAction::ExportJson,
            KeyCode::Char('E') => KeyAction::ExportCsv,

            _ => KeyAction::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_action_quit() {
        let event = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(KeyAction::from_key_event(event), KeyAction::Quit);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(KeyAction::from_key_event(ctrl_c), KeyAction::Quit);
    }

    #[test]
    fn test_key_action_view_switch() {
        let event = KeyEvent::new(KeyCode::Char('1'), KeyModifiers::NONE);
        assert_eq!(
            KeyAction::from_key_event(event),
            KeyAction::SwitchToOverview
        );

        let event = KeyEvent::new(KeyCode::Char('3'), KeyModifiers::NONE);
        assert_eq!(KeyAction::from_key_event(event), KeyAction::SwitchToPending);
    }

    #[test]
    fn test_key_action_navigation() {
        let event = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(KeyAction::from_key_event(event), KeyAction::ScrollUp);

        let event = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(KeyAction::from_key_event(event), KeyAction::FocusLeft);
    }

    #[test]
    fn test_key_action_export_case_sensitive() {
        let lower = KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE);
        assert_eq!(KeyAction::from_key_event(lower), KeyAction::ExportJson);

        let upper = KeyEvent::new(KeyCode::Char('E'), KeyModifiers::SHIFT);
        assert_eq!(KeyAction::from_key_event(upper), KeyAction::ExportCsv);
    }

    #[test]
    fn test_key_action_unknown() {
        let event = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE);
        assert_eq!(KeyAction::from_key_event(event), KeyAction::Unknown);
    }
}
