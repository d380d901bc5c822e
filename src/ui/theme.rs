//! Colors shared by every widget.

use std::sync::OnceLock;

use ratatui::style::Color;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Color palette.
#[derive(Debug, Clone)]
pub struct Theme {
    pub fg: Color,
    pub bg: Color,
    /// Keys, links and the active tab.
    pub accent: Color,
    /// Secondary text and disabled controls.
    pub muted: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    /// Table header cells.
    pub header: Color,
    /// Background of the cursor row.
    pub selection: Color,
    pub border: Color,
    pub border_focused: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            bg: Color::Reset,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            header: Color::LightBlue,
            selection: Color::Rgb(40, 44, 52),
            border: Color::DarkGray,
            border_focused: Color::Cyan,
        }
    }

    pub fn light() -> Self {
        Self {
            fg: Color::Black,
            bg: Color::Reset,
            accent: Color::Blue,
            muted: Color::Gray,
            success: Color::Green,
            warning: Color::Rgb(180, 120, 0),
            error: Color::Red,
            header: Color::Blue,
            selection: Color::Rgb(225, 228, 235),
            border: Color::Gray,
            border_focused: Color::Blue,
        }
    }

    /// Palette by name. Unknown names fall back to dark.
    pub fn named(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Install the palette. Only the first call has an effect.
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

/// The active palette, dark unless [`init_theme`] ran first.
pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_palettes() {
        assert_eq!(Theme::named("LIGHT").accent, Color::Blue);
        assert_eq!(Theme::named("dark").accent, Color::Cyan);
        assert_eq!(Theme::named("solarized").accent, Color::Cyan);
    }
}
