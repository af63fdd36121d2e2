// Key event handling: maps key presses to controller actions, plus the help
// tables rendered in the footer.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    TogglePlay,
    ToggleFullscreen,
    SeekForward,
    SeekBackward,
    FrameBack,
    FrameForward,
    ToggleHelp,
    ToggleDiagnostics,
    Quit,
}

impl KeyAction {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        use KeyCode::{Char, Down, Enter, Esc, Left, Right, Up};

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return matches!(key.code, Char('c')).then_some(KeyAction::Quit);
        }

        match key.code {
            Char(' ') | Enter => Some(KeyAction::TogglePlay),
            Char('f') | Char('F') => Some(KeyAction::ToggleFullscreen),
            Up | Char('k') => Some(KeyAction::SeekForward),
            Down | Char('j') => Some(KeyAction::SeekBackward),
            Left | Char('h') => Some(KeyAction::FrameBack),
            Right | Char('l') => Some(KeyAction::FrameForward),
            Char('?') => Some(KeyAction::ToggleHelp),
            Char('d') => Some(KeyAction::ToggleDiagnostics),
            Char('q') | Esc => Some(KeyAction::Quit),
            _ => None,
        }
    }
}

pub type HelpEntry = (&'static str, &'static str);

pub const SHORT_HELP: &[HelpEntry] = &[
    ("?", "toggle help"),
    ("q", "quit"),
    ("d", "toggle debug view"),
];

/// Expanded help, one slice per column.
pub const FULL_HELP: &[&[HelpEntry]] = &[
    &[
        ("↑/k", "forward 5 seconds"),
        ("↓/j", "back 5 seconds"),
        ("←/h", "back one frame"),
        ("→/l", "forward one frame"),
    ],
    &[
        ("?", "toggle help"),
        ("q/esc", "quit"),
        ("d", "toggle debug view"),
    ],
    &[("space/enter", "play/pause"), ("f", "fullscreen")],
];

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn ctrl_c_quits_but_plain_c_does_nothing() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(KeyAction::from_key(ctrl_c), Some(KeyAction::Quit));
        assert_eq!(KeyAction::from_key(key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn shifted_f_toggles_fullscreen() {
        let shift_f = KeyEvent::new(KeyCode::Char('F'), KeyModifiers::SHIFT);
        assert_eq!(
            KeyAction::from_key(shift_f),
            Some(KeyAction::ToggleFullscreen)
        );
    }

    #[test]
    fn vim_aliases_match_arrows() {
        assert_eq!(
            KeyAction::from_key(key(KeyCode::Char('k'))),
            KeyAction::from_key(key(KeyCode::Up))
        );
        assert_eq!(
            KeyAction::from_key(key(KeyCode::Char('h'))),
            KeyAction::from_key(key(KeyCode::Left))
        );
    }
}
