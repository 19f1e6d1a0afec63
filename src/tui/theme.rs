//! Terminal theme and color definitions

use crossterm::style::Color;

/// Theme colors for the interactive shell
pub struct Theme {
    /// Color for panel headings
    pub heading: Color,
    /// Color for prompt text
    pub text: Color,
    /// Color for error notices
    pub error: Color,
    /// Color for dim/secondary info
    pub dim: Color,
    /// Color for success notices and the reduction figure
    pub success: Color,
    /// Color for the banner/title
    pub title: Color,
    /// Color for the pending spinner
    pub spinner: Color,
    /// Color for key names in help
    pub command: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            heading: Color::Cyan,
            text: Color::White,
            error: Color::Red,
            dim: Color::DarkGrey,
            success: Color::Green,
            title: Color::Magenta,
            spinner: Color::Blue,
            command: Color::Yellow,
        }
    }
}
