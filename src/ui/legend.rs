use super::put_emoji;
use crate::colors::{mood_fg, FRAME, MUTED, SUBTLE};
use crate::mood::LEGEND_ORDER;
use crate::terminal::Terminal;

/// Columns the single-row legend takes
pub fn width() -> u16 {
    // "Mood" + per entry: space, swatch, space, emoji(2), space, label
    let labels: usize = LEGEND_ORDER.iter().map(|m| m.as_str().len() + 6).sum();
    (4 + labels + 4) as u16
}

/// `│ Mood ● 😊 Happy ● 😌 Calm … │` on one row
pub fn draw(term: &mut Terminal, x: i32, y: i32) {
    let w = width() as i32;
    term.fill_rect(x, y, w as u16, 1);
    term.set(x, y, '│', Some(FRAME), false);
    term.set_str(x + 2, y, "Mood", Some(MUTED), true);

    let mut cx = x + 6;
    for mood in LEGEND_ORDER {
        term.set(cx + 1, y, '●', Some(mood_fg(mood.as_str())), false);
        cx = put_emoji(term, cx + 3, y, mood.meta().emoji);
        term.set_str(cx + 1, y, mood.as_str(), Some(SUBTLE), false);
        cx += 1 + mood.as_str().len() as i32;
    }
    term.set(x + w - 1, y, '│', Some(FRAME), false);
}
