use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, DisableMouseCapture, EnableMouseCapture, Event},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Second column of a double-width glyph; never printed
const WIDE_TAIL: char = '\0';

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bold: false,
        }
    }
}

impl Terminal {
    /// Initialize the terminal for drawing. The interactive mode also
    /// enables mouse capture so the map receives pointer events.
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide, EnableMouseCapture)?;
        }

        Ok(Self::with_buffer(width, height, alternate_screen))
    }

    /// A buffer-only terminal of a fixed size (print mode and tests)
    pub fn offscreen(width: u16, height: u16) -> Self {
        Self::with_buffer(width, height, false)
    }

    /// `alternate_screen` records whether `Drop` must undo raw mode, the
    /// alternate screen and mouse capture
    fn with_buffer(width: u16, height: u16, alternate_screen: bool) -> Self {
        let buffer = vec![vec![Cell::default(); width as usize]; height as usize];
        Self {
            width,
            height,
            buffer,
            alternate_screen,
        }
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Resize the back buffer, discarding its contents
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Pick up a changed terminal size; returns true if the buffer was resized
    pub fn sync_size(&mut self) -> io::Result<bool> {
        let (w, h) = size()?;
        if (w, h) != (self.width, self.height) {
            self.resize(w, h);
            self.clear_screen()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            for cell in row {
                *cell = Cell::default();
            }
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bold };
        }
    }

    /// Set a double-width glyph (emoji) occupying two columns
    pub fn set_wide(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        self.set(x, y, ch, fg, bold);
        self.set(x + 1, y, WIDE_TAIL, fg, bold);
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    /// Set a string, cutting it off after `max` characters
    pub fn set_str_clipped(&mut self, x: i32, y: i32, s: &str, max: usize, fg: Option<Color>, bold: bool) {
        let count = s.chars().count();
        if count <= max {
            self.set_str(x, y, s, fg, bold);
        } else if max > 0 {
            let cut: String = s.chars().take(max - 1).collect();
            self.set_str(x, y, &cut, fg, bold);
            self.set(x + max as i32 - 1, y, '…', fg, bold);
        }
    }

    /// Blank a rectangle so an overlay hides whatever was drawn below it
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u16, h: u16) {
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                self.set(x + dx, y + dy, ' ', None, false);
            }
        }
    }

    /// Cell at a position, if on screen
    #[cfg(test)]
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.buffer.get(y as usize).and_then(|row| row.get(x as usize))
    }

    /// Characters of one buffer row, without colors
    #[cfg(test)]
    pub fn row_text(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().map(|c| c.ch).filter(|&ch| ch != WIDE_TAIL).collect())
            .unwrap_or_default()
    }

    /// Whole buffer as plain text, one line per row
    #[cfg(test)]
    pub fn text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the entire buffer to screen
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout();
        queue!(out, MoveTo(0, 0))?;

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.ch == WIDE_TAIL {
                    continue;
                }
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }

                if let Some(color) = cell.fg {
                    queue!(out, SetForegroundColor(color), Print(cell.ch), ResetColor)?;
                } else {
                    queue!(out, Print(cell.ch))?;
                }

                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Reset))?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Next input event (key, mouse, resize) if one arrives within the timeout
    pub fn poll_event(&self, timeout_ms: u64) -> io::Result<Option<Event>> {
        if poll(Duration::from_millis(timeout_ms))? {
            return Ok(Some(read()?));
        }
        Ok(None)
    }

    /// Print buffer to stdout with ANSI colors (for print mode)
    pub fn print_to_stdout(&self) {
        for row in &self.buffer {
            let mut line = String::new();
            for cell in row {
                if cell.ch == WIDE_TAIL {
                    continue;
                }
                if cell.ch == ' ' {
                    line.push(' ');
                    continue;
                }

                if cell.bold {
                    line.push_str("\x1b[1m");
                }

                if let Some(color) = cell.fg {
                    line.push_str(&ansi_fg(color));
                }

                line.push(cell.ch);
                line.push_str("\x1b[0m");
            }
            println!("{}", line.trim_end());
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), DisableMouseCapture, Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

/// ANSI escape that selects a foreground color
fn ansi_fg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("\x1b[38;2;{};{};{}m", r, g, b),
        Color::AnsiValue(v) => format!("\x1b[38;5;{}m", v),
        // Standard colors (0-7)
        Color::Black => "\x1b[30m".into(),
        Color::DarkRed => "\x1b[31m".into(),
        Color::DarkGreen => "\x1b[32m".into(),
        Color::DarkYellow => "\x1b[33m".into(),
        Color::DarkBlue => "\x1b[34m".into(),
        Color::DarkMagenta => "\x1b[35m".into(),
        Color::DarkCyan => "\x1b[36m".into(),
        Color::Grey => "\x1b[37m".into(),
        // Bright colors (8-15)
        Color::DarkGrey => "\x1b[90m".into(),
        Color::Red => "\x1b[91m".into(),
        Color::Green => "\x1b[92m".into(),
        Color::Yellow => "\x1b[93m".into(),
        Color::Blue => "\x1b[94m".into(),
        Color::Magenta => "\x1b[95m".into(),
        Color::Cyan => "\x1b[96m".into(),
        Color::White => "\x1b[97m".into(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_ignores_out_of_bounds() {
        let mut term = Terminal::offscreen(4, 2);
        term.set(-1, 0, 'x', None, false);
        term.set(4, 0, 'x', None, false);
        term.set(0, 2, 'x', None, false);
        assert_eq!(term.text(), "    \n    ");
    }

    #[test]
    fn clipped_string_ends_with_ellipsis() {
        let mut term = Terminal::offscreen(10, 1);
        term.set_str_clipped(0, 0, "United Kingdom", 6, None, false);
        assert_eq!(term.row_text(0), "Unite…    ");
    }

    #[test]
    fn resize_discards_contents() {
        let mut term = Terminal::offscreen(3, 1);
        term.set_str(0, 0, "abc", None, false);
        term.resize(2, 2);
        assert_eq!(term.size(), (2, 2));
        assert_eq!(term.text(), "  \n  ");
    }

    #[test]
    fn wide_glyph_takes_two_cells() {
        let mut term = Terminal::offscreen(5, 1);
        term.set_wide(0, 0, '😊', None, false);
        term.set_str(2, 0, "ok", None, false);
        assert_eq!(term.row_text(0), "😊ok ");
        assert_eq!(term.cell(1, 0).map(|c| c.ch), Some(WIDE_TAIL));
    }

    #[test]
    fn interactive_buffer_restores_terminal_on_drop() {
        let mut term = Terminal::with_buffer(4, 2, true);
        assert!(term.alternate_screen);
        assert_eq!(term.size(), (4, 2));
        // nothing was entered here, so skip the teardown
        term.alternate_screen = false;

        assert!(!Terminal::offscreen(4, 2).alternate_screen);
    }

    #[test]
    fn ansi_for_rgb() {
        assert_eq!(ansi_fg(Color::Rgb { r: 1, g: 2, b: 3 }), "\x1b[38;2;1;2;3m");
    }
}
