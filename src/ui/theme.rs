//! Theme presets and hex colour parsing

use ratatui::style::Color;
use thiserror::Error;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Main background color
    pub background: Color,
    /// Primary text color
    pub foreground: Color,
    /// Background for the selected row
    pub selection_bg: Color,
    /// Text color for the selected row
    pub selection_fg: Color,
    /// Borders, active tab, card frame
    pub accent: Color,
    /// Secondary text (hints, status bar)
    pub dimmed: Color,
    /// Category labels in the order list
    pub tag: Color,
    /// Input line while typing a new order
    pub input_highlight: Color,
    /// Drawn order card background
    pub card_bg: Color,
    /// Drawn order card text
    pub card_fg: Color,
    /// Empty deck / delete confirmation
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::ink()
    }
}

impl Theme {
    /// Default theme. Black card with a white frame.
    pub fn ink() -> Self {
        Self {
            background: Color::Rgb(13, 17, 22),       // #0d1116
            foreground: Color::Rgb(229, 234, 241),    // #e5eaf1
            selection_bg: Color::Rgb(20, 28, 42),     // #141c2a
            selection_fg: Color::Rgb(229, 234, 241),  // #e5eaf1
            accent: Color::Rgb(180, 83, 9),           // #b45309 (amber)
            dimmed: Color::Rgb(156, 163, 175),        // #9ca3af
            tag: Color::Rgb(107, 114, 128),           // #6b7280
            input_highlight: Color::Rgb(180, 83, 9),  // #b45309
            card_bg: Color::Rgb(0, 0, 0),             // #000000
            card_fg: Color::Rgb(255, 255, 255),       // #ffffff
            warning: Color::Rgb(239, 68, 68),         // #ef4444
        }
    }

    /// Catppuccin Mocha theme
    pub fn catppuccin_mocha() -> Self {
        Self {
            background: Color::Rgb(30, 30, 46),        // #1e1e2e (base)
            foreground: Color::Rgb(205, 214, 244),     // #cdd6f4 (text)
            selection_bg: Color::Rgb(49, 50, 68),      // #313244 (surface0)
            selection_fg: Color::Rgb(205, 214, 244),   // #cdd6f4 (text)
            accent: Color::Rgb(137, 180, 250),         // #89b4fa (blue)
            dimmed: Color::Rgb(166, 173, 200),         // #a6adc8 (subtext0)
            tag: Color::Rgb(203, 166, 247),            // #cba6f7 (mauve)
            input_highlight: Color::Rgb(249, 226, 175), // #f9e2af (yellow)
            card_bg: Color::Rgb(17, 17, 27),           // #11111b (crust)
            card_fg: Color::Rgb(205, 214, 244),        // #cdd6f4 (text)
            warning: Color::Rgb(243, 139, 168),        // #f38ba8 (red)
        }
    }

    /// Catppuccin Latte theme (light)
    pub fn catppuccin_latte() -> Self {
        Self {
            background: Color::Rgb(239, 241, 245),    // #eff1f5 (base)
            foreground: Color::Rgb(76, 79, 105),      // #4c4f69 (text)
            selection_bg: Color::Rgb(204, 208, 218),  // #ccd0da (surface0)
            selection_fg: Color::Rgb(76, 79, 105),    // #4c4f69 (text)
            accent: Color::Rgb(30, 102, 245),         // #1e66f5 (blue)
            dimmed: Color::Rgb(108, 111, 133),        // #6c6f85 (subtext0)
            tag: Color::Rgb(136, 57, 239),            // #8839ef (mauve)
            input_highlight: Color::Rgb(223, 142, 29), // #df8e1d (yellow)
            card_bg: Color::Rgb(220, 224, 232),       // #dce0e8 (crust)
            card_fg: Color::Rgb(76, 79, 105),         // #4c4f69 (text)
            warning: Color::Rgb(210, 15, 57),         // #d20f39 (red)
        }
    }

    /// Nord theme
    pub fn nord() -> Self {
        Self {
            background: Color::Rgb(46, 52, 64),       // #2e3440 (nord0)
            foreground: Color::Rgb(236, 239, 244),    // #eceff4 (nord6)
            selection_bg: Color::Rgb(67, 76, 94),     // #434c5e (nord2)
            selection_fg: Color::Rgb(236, 239, 244),  // #eceff4 (nord6)
            accent: Color::Rgb(136, 192, 208),        // #88c0d0 (nord8)
            dimmed: Color::Rgb(216, 222, 233),        // #d8dee9 (nord4)
            tag: Color::Rgb(180, 142, 173),           // #b48ead (nord15)
            input_highlight: Color::Rgb(235, 203, 139), // #ebcb8b (nord13)
            card_bg: Color::Rgb(59, 66, 82),          // #3b4252 (nord1)
            card_fg: Color::Rgb(236, 239, 244),       // #eceff4 (nord6)
            warning: Color::Rgb(191, 97, 106),        // #bf616a (nord11)
        }
    }

    /// Gruvbox dark theme
    pub fn gruvbox() -> Self {
        Self {
            background: Color::Rgb(40, 40, 40),       // #282828 (bg)
            foreground: Color::Rgb(235, 219, 178),    // #ebdbb2 (fg)
            selection_bg: Color::Rgb(60, 56, 54),     // #3c3836 (bg1)
            selection_fg: Color::Rgb(235, 219, 178),  // #ebdbb2 (fg)
            accent: Color::Rgb(215, 153, 33),         // #d79921 (yellow)
            dimmed: Color::Rgb(168, 153, 132),        // #a89984 (gray)
            tag: Color::Rgb(104, 157, 106),           // #689d6a (aqua)
            input_highlight: Color::Rgb(250, 189, 47), // #fabd2f (bright yellow)
            card_bg: Color::Rgb(29, 32, 33),          // #1d2021 (bg0_h)
            card_fg: Color::Rgb(251, 241, 199),       // #fbf1c7 (fg0)
            warning: Color::Rgb(204, 36, 29),         // #cc241d (red)
        }
    }

    /// Load theme from preset name
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "ink" | "default" => Some(Self::ink()),
            "catppuccin-mocha" | "catppuccin_mocha" | "catppuccin" => Some(Self::catppuccin_mocha()),
            "catppuccin-latte" | "catppuccin_latte" => Some(Self::catppuccin_latte()),
            "nord" => Some(Self::nord()),
            "gruvbox" | "gruvbox-dark" | "gruvbox_dark" => Some(Self::gruvbox()),
            _ => None,
        }
    }
}

/// Color parsing error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorError {
    #[error("invalid color length (expected 3 or 6 hex chars)")]
    InvalidLength,
    #[error("invalid hex character")]
    InvalidHex,
}

/// Parse hex color string to Color.
/// Supports: #rrggbb, #rgb, rrggbb, rgb
pub fn parse_hex_color(s: &str) -> Result<Color, ColorError> {
    let s = s.trim().trim_start_matches('#');
    if !s.is_ascii() {
        return Err(ColorError::InvalidHex);
    }
    let channel = |part: &str| u8::from_str_radix(part, 16).map_err(|_| ColorError::InvalidHex);

    match s.len() {
        3 => {
            let r = channel(&s[0..1])?;
            let g = channel(&s[1..2])?;
            let b = channel(&s[2..3])?;
            Ok(Color::Rgb(r * 17, g * 17, b * 17))
        }
        6 => Ok(Color::Rgb(
            channel(&s[0..2])?,
            channel(&s[2..4])?,
            channel(&s[4..6])?,
        )),
        _ => Err(ColorError::InvalidLength),
    }
}
