use crate::mood::mood_color;
use crossterm::style::Color;

/// Fill used for countries before any mood expression is applied
pub const UNPAINTED_FILL: &str = "#1e1e2e";

/// Country border line color
pub const BORDER_LINE: &str = "#2a2a3a";

// UI text colors
pub const TEXT: Color = Color::White;
pub const MUTED: Color = Color::DarkGrey;
pub const SUBTLE: Color = Color::Grey;
pub const FRAME: Color = Color::Rgb { r: 0x3a, g: 0x3a, b: 0x4e };
pub const ALERT: Color = Color::Rgb { r: 0xf8, g: 0x71, b: 0x71 };
pub const INSIGHT: Color = Color::Rgb { r: 0xc0, g: 0x84, b: 0xfc };
pub const CURSOR: Color = Color::Yellow;

/// Parse `#rrggbb` (or `rrggbb`) into a terminal color
pub fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some(Color::Rgb { r, g, b })
}

/// Parse a hex color, using grey for anything malformed
pub fn hex_or_grey(hex: &str) -> Color {
    parse_hex(hex).unwrap_or(Color::Grey)
}

/// Terminal color of a mood label
pub fn mood_fg(label: &str) -> Color {
    hex_or_grey(mood_color(label))
}

/// Scale an RGB color towards black; named colors are returned unchanged
pub fn dim(color: Color, factor: f32) -> Color {
    match color {
        Color::Rgb { r, g, b } => {
            let f = factor.clamp(0.0, 1.0);
            Color::Rgb {
                r: (r as f32 * f) as u8,
                g: (g as f32 * f) as u8,
                b: (b as f32 * f) as u8,
            }
        }
        other => other,
    }
}
