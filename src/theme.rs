// Color theme for the player view. Selected by name from the config file.

use ratatui::style::Color;

pub const THEME_DARK: &str = "dark";
pub const THEME_LIGHT: &str = "light";

/// Named color slots used by the view.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Title badge foreground and background.
    pub title_fg: Color,
    pub title_bg: Color,
    /// Status field labels.
    pub label: Color,
    /// Status field values.
    pub text: Color,
    pub text_dim: Color,
    /// Liveness spinner.
    pub spinner: Color,
    /// Diagnostics panel border.
    pub border: Color,
    /// Progress gauge fill.
    pub gauge: Color,
    /// Key names in the help footer.
    pub key: Color,
    pub error: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            title_fg: Color::Rgb(0xFF, 0xFD, 0xF5),
            title_bg: Color::Rgb(0x25, 0xA0, 0x65),
            label: Color::Rgb(0xFF, 0x75, 0xB7),
            text: Color::White,
            text_dim: Color::DarkGray,
            spinner: Color::Indexed(69),
            border: Color::Indexed(63),
            gauge: Color::Rgb(0xFF, 0x7C, 0xCB),
            key: Color::Gray,
            error: Color::Red,
        }
    }

    pub fn light() -> Self {
        Self {
            title_fg: Color::Rgb(0xFF, 0xFD, 0xF5),
            title_bg: Color::Rgb(0x1C, 0x7A, 0x4D),
            label: Color::Rgb(0xB0, 0x2E, 0x6E),
            text: Color::Black,
            text_dim: Color::DarkGray,
            spinner: Color::Blue,
            border: Color::Rgb(180, 180, 180),
            gauge: Color::Rgb(0xC2, 0x3B, 0x8A),
            key: Color::Black,
            error: Color::Red,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            THEME_LIGHT => Self::light(),
            _ => Self::dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
