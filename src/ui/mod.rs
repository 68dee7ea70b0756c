//! Dashboard overlays
//!
//! Each component draws into the frame buffer from plain data plus its own
//! local toggles. Only the composition root fetches.

pub mod header;
pub mod help;
pub mod legend;
pub mod panel;
pub mod spikes;
pub mod stats;
pub mod tooltip;

use crate::colors::{FRAME, MUTED, TEXT};
use crate::terminal::Terminal;
use crossterm::style::Color;

// Box drawing characters (rounded)
pub const BOX_TL: char = '╭';
pub const BOX_TR: char = '╮';
pub const BOX_BL: char = '╰';
pub const BOX_BR: char = '╯';
pub const BOX_H: char = '─';
pub const BOX_V: char = '│';
pub const BOX_TITLE_L: char = '┤';
pub const BOX_TITLE_R: char = '├';

// Partial block characters for smooth meters (1/8 increments)
pub const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

const METER_CHAR: char = '■';

/// A bordered box with a title, blanking whatever is underneath
pub struct Frame {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
    pub title: String,
    pub title_color: Color,
    pub border_color: Color,
}

impl Frame {
    pub fn new(x: i32, y: i32, width: u16, height: u16, title: &str) -> Self {
        Self {
            x,
            y,
            width,
            height,
            title: title.to_string(),
            title_color: TEXT,
            border_color: FRAME,
        }
    }

    pub fn title_color(mut self, color: Color) -> Self {
        self.title_color = color;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }

    /// Inner content area (excluding borders)
    pub fn inner_x(&self) -> i32 {
        self.x + 2
    }
    pub fn inner_y(&self) -> i32 {
        self.y + 1
    }
    pub fn inner_width(&self) -> usize {
        self.width.saturating_sub(4) as usize
    }

    /// Draw the border and title over a cleared rectangle
    pub fn draw(&self, term: &mut Terminal) {
        if self.width < 2 || self.height < 2 {
            return;
        }
        term.fill_rect(self.x, self.y, self.width, self.height);

        let w = self.width as i32;
        let h = self.height as i32;
        let bc = Some(self.border_color);

        term.set(self.x, self.y, BOX_TL, bc, false);
        let title_len = self.title.chars().count() as i32;
        let title_end = if title_len > 0 && title_len + 6 <= w {
            // "─┤ title ├" left aligned
            term.set(self.x + 1, self.y, BOX_H, bc, false);
            term.set(self.x + 2, self.y, BOX_TITLE_L, bc, false);
            term.set_str(self.x + 4, self.y, &self.title, Some(self.title_color), true);
            term.set(self.x + 5 + title_len, self.y, BOX_TITLE_R, bc, false);
            self.x + 6 + title_len
        } else {
            self.x + 1
        };
        for i in title_end..(self.x + w - 1) {
            term.set(i, self.y, BOX_H, bc, false);
        }
        term.set(self.x + w - 1, self.y, BOX_TR, bc, false);

        for i in 1..(h - 1) {
            term.set(self.x, self.y + i, BOX_V, bc, false);
            term.set(self.x + w - 1, self.y + i, BOX_V, bc, false);
        }

        term.set(self.x, self.y + h - 1, BOX_BL, bc, false);
        for i in 1..(w - 1) {
            term.set(self.x + i, self.y + h - 1, BOX_H, bc, false);
        }
        term.set(self.x + w - 1, self.y + h - 1, BOX_BR, bc, false);
    }
}

/// Smooth horizontal bar using partial block characters; `fraction` is 0..1
pub fn draw_bar(term: &mut Terminal, x: i32, y: i32, width: usize, fraction: f64, color: Color) {
    if width == 0 {
        return;
    }
    let fill = fraction.clamp(0.0, 1.0) * width as f64;
    let full = fill as usize;
    let partial = ((fill - full as f64) * 8.0) as usize;

    for i in 0..width {
        let (ch, c) = if i < full {
            ('█', color)
        } else if i == full && partial > 0 {
            (BLOCKS[partial], color)
        } else {
            ('░', MUTED)
        };
        term.set(x + i as i32, y, ch, Some(c), false);
    }
}

/// btop-style meter: `■` for both parts, told apart by color
pub fn draw_meter(term: &mut Terminal, x: i32, y: i32, width: usize, fraction: f64, color: Color) {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    for i in 0..width {
        let c = if i < filled { color } else { MUTED };
        term.set(x + i as i32, y, METER_CHAR, Some(c), false);
    }
}

/// Draw an emoji (two columns); returns the column after it
pub fn put_emoji(term: &mut Terminal, x: i32, y: i32, emoji: &str) -> i32 {
    if let Some(ch) = emoji.chars().next() {
        term.set_wide(x, y, ch, None, false);
    }
    x + 2
}

/// Greedy word wrap to `width` columns
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let len = line.chars().count();
        if len > 0 && len + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_draws_title_and_corners() {
        let mut term = Terminal::offscreen(20, 3);
        Frame::new(0, 0, 20, 3, "Mood").draw(&mut term);
        assert_eq!(term.row_text(0), "╭─┤ Mood ├─────────╮");
        assert_eq!(term.row_text(1), "│                  │");
        assert_eq!(term.row_text(2), "╰──────────────────╯");
    }

    #[test]
    fn bar_fills_proportionally() {
        let mut term = Terminal::offscreen(8, 1);
        draw_bar(&mut term, 0, 0, 8, 0.5, Color::Green);
        assert_eq!(term.row_text(0), "████░░░░");
        draw_bar(&mut term, 0, 0, 8, 2.0, Color::Green);
        assert_eq!(term.row_text(0), "████████");
    }

    #[test]
    fn meter_colors_filled_part() {
        let mut term = Terminal::offscreen(4, 1);
        draw_meter(&mut term, 0, 0, 4, 0.75, Color::Green);
        assert_eq!(term.cell(2, 0).and_then(|c| c.fg), Some(Color::Green));
        assert_eq!(term.cell(3, 0).and_then(|c| c.fg), Some(MUTED));
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(wrap("music is calmer this week", 10), ["music is", "calmer", "this week"]);
        assert!(wrap("   ", 10).is_empty());
    }
}
