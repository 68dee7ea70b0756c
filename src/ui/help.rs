use crate::colors::{FRAME, SUBTLE};
use crate::terminal::Terminal;

/// Key reference shown by `?`
pub const KEYS: &str = "\
MoodAtlas keys

h j k l     pan the map
+ - 0       zoom in, out, reset
arrows      move the pointer
Enter/Space open the country under the pointer
s           expand or collapse spike alerts
g           expand or collapse global stats
r           refresh mood data
Esc/x       close the country panel
?           toggle this help
q           quit

Mouse: hover for a tooltip, click to open, scroll to zoom";

/// One-line hint for the status bar
pub const HINTS: &str = "hjkl pan  +/- zoom  arrows+Enter select  s spikes  g stats  r refresh  ? help  q quit";

/// Centered box with the given text, drawn over whatever is below it
pub fn render_help_overlay(term: &mut Terminal, help_text: &str) {
    if help_text.is_empty() {
        return;
    }
    let (width, height) = term.size();

    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4;
    let box_height = lines.len() + 2;

    let start_x = ((width as usize).saturating_sub(box_width) / 2) as i32;
    let start_y = ((height as usize).saturating_sub(box_height) / 2) as i32;
    let right = start_x + box_width as i32 - 1;
    let bottom = start_y + box_height as i32 - 1;

    term.set(start_x, start_y, '┌', Some(FRAME), false);
    term.set(right, start_y, '┐', Some(FRAME), false);
    term.set(start_x, bottom, '└', Some(FRAME), false);
    term.set(right, bottom, '┘', Some(FRAME), false);
    for x in start_x + 1..right {
        term.set(x, start_y, '─', Some(FRAME), false);
        term.set(x, bottom, '─', Some(FRAME), false);
    }

    for (i, line) in lines.iter().enumerate() {
        let y = start_y + 1 + i as i32;
        term.set(start_x, y, '│', Some(FRAME), false);
        let padding = max_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));
        // first line is the heading
        term.set_str(start_x + 1, y, &padded, Some(SUBTLE), i == 0);
        term.set(right, y, '│', Some(FRAME), false);
    }
}
