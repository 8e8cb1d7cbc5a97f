use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::nav::FrameKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Select,
    Back,
    ToggleRead,
    Quit,
    ToggleHelp,
}

pub struct Binding {
    pub action: Action,
    pub keys: &'static str,
    pub description: &'static str,
}

const fn bind(action: Action, keys: &'static str, description: &'static str) -> Binding {
    Binding {
        action,
        keys,
        description,
    }
}

const LIST_BINDINGS: &[Binding] = &[
    bind(Action::MoveLeft, "← / h", "previous"),
    bind(Action::MoveRight, "→ / l", "next"),
    bind(Action::Select, "enter / space", "open"),
    bind(Action::ToggleHelp, "?", "toggle help"),
    bind(Action::Quit, "q / ctrl+c", "quit"),
];

const POST_BINDINGS: &[Binding] = &[
    bind(Action::MoveLeft, "← / h", "previous"),
    bind(Action::MoveRight, "→ / l", "next"),
    bind(Action::MoveUp, "↑ / k", "scroll up"),
    bind(Action::MoveDown, "↓ / j", "scroll down"),
    bind(Action::Select, "enter / space", "mark as read"),
    bind(Action::ToggleRead, "r", "toggle read"),
    bind(Action::Back, "backspace / esc", "previous view"),
    bind(Action::ToggleHelp, "?", "toggle help"),
    bind(Action::Quit, "q / ctrl+c", "quit"),
];

pub fn action_for(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Left | KeyCode::Char('h') => Some(Action::MoveLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::MoveRight),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Select),
        KeyCode::Backspace | KeyCode::Esc => Some(Action::Back),
        KeyCode::Char('r') => Some(Action::ToggleRead),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

pub fn bindings(kind: FrameKind) -> &'static [Binding] {
    match kind {
        FrameKind::List => LIST_BINDINGS,
        FrameKind::Post => POST_BINDINGS,
    }
}

/// Help text for the footer: a single line with the essentials, or every
/// binding one per line.
pub fn help_lines(kind: FrameKind, show_all: bool) -> Vec<String> {
    let all = bindings(kind);
    if show_all {
        return all
            .iter()
            .map(|binding| format!("{:<16} {}", binding.keys, binding.description))
            .collect();
    }

    let short = all
        .iter()
        .filter(|binding| {
            matches!(
                binding.action,
                Action::ToggleHelp | Action::Back | Action::Quit
            )
        })
        .map(|binding| format!("{} {}", binding.keys, binding.description))
        .collect::<Vec<_>>()
        .join(" · ");
    vec![short]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_vim_keys_move() {
        assert_eq!(action_for(key(KeyCode::Left)), Some(Action::MoveLeft));
        assert_eq!(action_for(key(KeyCode::Char('l'))), Some(Action::MoveRight));
        assert_eq!(action_for(key(KeyCode::Char('j'))), Some(Action::MoveDown));
        assert_eq!(action_for(key(KeyCode::Up)), Some(Action::MoveUp));
    }

    #[test]
    fn ctrl_c_quits_but_plain_c_does_nothing() {
        assert_eq!(
            action_for(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(action_for(key(KeyCode::Char('c'))), None);
        assert_eq!(
            action_for(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn short_help_is_one_line() {
        let lines = help_lines(FrameKind::Post, false);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("previous view"));
        assert!(!help_lines(FrameKind::List, false)[0].contains("previous view"));
    }

    #[test]
    fn full_help_lists_every_binding() {
        assert_eq!(help_lines(FrameKind::List, true).len(), LIST_BINDINGS.len());
        let post = help_lines(FrameKind::Post, true);
        assert_eq!(post.len(), POST_BINDINGS.len());
        assert!(post.iter().any(|line| line.contains("mark as read")));
    }
}
