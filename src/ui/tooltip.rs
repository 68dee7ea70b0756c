//! Hover tooltip

use super::{put_emoji, Frame};
use crate::api::types::{signed, CountryMood};
use crate::colors::{mood_fg, parse_hex, MUTED, TEXT};
use crate::mood::mood_emoji;
use crate::terminal::Terminal;
use crossterm::style::Color;

pub const WIDTH: u16 = 32;

/// Accent color: the API's color code, or the label's color if malformed
fn accent(country: &CountryMood) -> Color {
    parse_hex(&country.color_code).unwrap_or_else(|| mood_fg(&country.mood_label))
}

/// Detail lines below the name row
pub fn detail_lines(country: &CountryMood) -> Vec<String> {
    let mut lines = Vec::new();
    let features: Vec<String> = [("Valence", country.valence), ("Energy", country.energy)]
        .into_iter()
        .filter_map(|(name, v)| v.map(|v| format!("{} {:.2}", name, v)))
        .collect();
    if !features.is_empty() {
        lines.push(features.join("  "));
    }
    if let Some(genre) = country.top_genre.as_deref() {
        lines.push(format!("♪ {}", genre));
    }
    lines
}

pub fn height(country: &CountryMood) -> u16 {
    4 + detail_lines(country).len() as u16
}

/// Top-left corner: right of the pointer, pulled back inside the screen
pub fn position(pointer: (u16, u16), height: u16, screen: (u16, u16)) -> (i32, i32) {
    let (px, py) = (pointer.0 as i32, pointer.1 as i32);
    let (sw, sh) = (screen.0 as i32, screen.1 as i32);
    let x = (px + 2).min(sw - WIDTH as i32).max(0);
    let y = (py - 1).min(sh - height as i32).max(0);
    (x, y)
}

pub fn draw(term: &mut Terminal, country: &CountryMood, pointer: (u16, u16)) {
    let h = height(country);
    let (x, y) = position(pointer, h, term.size());
    let color = accent(country);
    let frame = Frame::new(x, y, WIDTH, h, "").border_color(color);
    frame.draw(term);

    let ix = frame.inner_x();
    let iw = frame.inner_width();
    let mut row = frame.inner_y();

    let score = signed(country.mood_score, 1);
    let nx = put_emoji(term, ix, row, mood_emoji(&country.mood_label)) + 1;
    let name_w = iw.saturating_sub(3 + score.len() + 1);
    term.set_str_clipped(nx, row, &country.country_name, name_w, Some(TEXT), true);
    term.set_str(ix + iw as i32 - score.len() as i32, row, &score, Some(color), true);
    row += 1;

    term.set(nx, row, '●', Some(color), false);
    term.set_str(nx + 2, row, &country.mood_label, Some(color), true);

    for line in detail_lines(country) {
        row += 1;
        term.set_str_clipped(ix, row, &line, iw, Some(MUTED), false);
    }
}
