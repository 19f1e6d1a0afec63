//! Shell key bindings

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions handled by the shell rather than the input area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    /// Submit; for terminals that cannot report Ctrl+Enter
    Optimize,
    Copy,
    ToggleAutoClear,
    ClearInput,
    Help,
    Quit,
}

/// Map a key press to a shell command.
/// Returns None for keys meant for the input area.
pub fn parse_key(key: &KeyEvent) -> Option<ShellCommand> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => Some(ShellCommand::Quit),
        KeyCode::F(1) => Some(ShellCommand::Help),
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'c' | 'd' => Some(ShellCommand::Quit),
            's' => Some(ShellCommand::Optimize),
            'y' => Some(ShellCommand::Copy),
            't' => Some(ShellCommand::ToggleAutoClear),
            'l' => Some(ShellCommand::ClearInput),
            _ => None,
        },
        _ => None,
    }
}

/// Key bindings in display order
pub const HELP: [(&str, &str); 8] = [
    ("Ctrl/Cmd+Enter", "Optimize the prompt"),
    ("Ctrl+S", "Optimize (terminals without Ctrl+Enter)"),
    ("Enter", "New line"),
    ("Ctrl+Y", "Copy the optimized prompt"),
    ("Ctrl+T", "Toggle auto clear"),
    ("Ctrl+L", "Clear the input"),
    ("F1", "Show or hide this help"),
    ("Esc / Ctrl+D", "Quit"),
];
