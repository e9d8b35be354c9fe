//! Terminal color table
//!
//! Maps the symbolic color names accepted in settings to ANSI SGR attribute
//! strings. Bold variants append `;1`, bright variants append `;2`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::settings::{Role, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Reset,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BoldBlack,
    BoldRed,
    BoldGreen,
    BoldYellow,
    BoldBlue,
    BoldMagenta,
    BoldCyan,
    BoldWhite,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Color {
    pub const ALL: [Color; 25] = [
        Color::Reset,
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
        Color::BoldBlack,
        Color::BoldRed,
        Color::BoldGreen,
        Color::BoldYellow,
        Color::BoldBlue,
        Color::BoldMagenta,
        Color::BoldCyan,
        Color::BoldWhite,
        Color::BrightBlack,
        Color::BrightRed,
        Color::BrightGreen,
        Color::BrightYellow,
        Color::BrightBlue,
        Color::BrightMagenta,
        Color::BrightCyan,
        Color::BrightWhite,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Color::Reset => "reset",
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Magenta => "magenta",
            Color::Cyan => "cyan",
            Color::White => "white",
            Color::BoldBlack => "bold_black",
            Color::BoldRed => "bold_red",
            Color::BoldGreen => "bold_green",
            Color::BoldYellow => "bold_yellow",
            Color::BoldBlue => "bold_blue",
            Color::BoldMagenta => "bold_magenta",
            Color::BoldCyan => "bold_cyan",
            Color::BoldWhite => "bold_white",
            Color::BrightBlack => "bright_black",
            Color::BrightRed => "bright_red",
            Color::BrightGreen => "bright_green",
            Color::BrightYellow => "bright_yellow",
            Color::BrightBlue => "bright_blue",
            Color::BrightMagenta => "bright_magenta",
            Color::BrightCyan => "bright_cyan",
            Color::BrightWhite => "bright_white",
        }
    }

    /// SGR attribute string, without the `ESC[` prefix and `m` suffix.
    pub fn code(self) -> &'static str {
        match self {
            Color::Reset => "0",
            Color::Black => "30",
            Color::Red => "31",
            Color::Green => "32",
            Color::Yellow => "33",
            Color::Blue => "34",
            Color::Magenta => "35",
            Color::Cyan => "36",
            Color::White => "37",
            Color::BoldBlack => "30;1",
            Color::BoldRed => "31;1",
            Color::BoldGreen => "32;1",
            Color::BoldYellow => "33;1",
            Color::BoldBlue => "34;1",
            Color::BoldMagenta => "35;1",
            Color::BoldCyan => "36;1",
            Color::BoldWhite => "37;1",
            Color::BrightBlack => "30;2",
            Color::BrightRed => "31;2",
            Color::BrightGreen => "32;2",
            Color::BrightYellow => "33;2",
            Color::BrightBlue => "34;2",
            Color::BrightMagenta => "35;2",
            Color::BrightCyan => "36;2",
            Color::BrightWhite => "37;2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|color| color.name() == name)
    }
}

/// Resolve a color name to its escape code. Unknown names resolve to `""`.
pub fn resolve_color_name(name: &str) -> &'static str {
    Color::from_name(name).map(Color::code).unwrap_or("")
}

/// Escape codes for every role, resolved once from the settings.
///
/// A role whose configured color name is unknown or empty gets an empty code
/// and is printed uncolored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePalette {
    enabled: bool,
    codes: HashMap<Role, &'static str>,
}

impl RolePalette {
    pub fn from_settings(settings: &Settings) -> Self {
        let codes = Role::ALL
            .into_iter()
            .map(|role| {
                let name = settings.role_color(role);
                let code = resolve_color_name(name);
                if code.is_empty() && !name.is_empty() {
                    tracing::warn!("Unknown color `{}` for {} output", name, role);
                }
                (role, code)
            })
            .collect();

        Self {
            enabled: settings.colors_enabled(),
            codes,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn code(&self, role: Role) -> &'static str {
        self.codes.get(&role).copied().unwrap_or("")
    }

    pub fn paint(&self, role: Role, text: &str) -> String {
        let code = self.code(role);
        if !self.enabled || code.is_empty() {
            return text.to_string();
        }
        format!("\x1b[{}m{}\x1b[{}m", code, text, Color::Reset.code())
    }
}
