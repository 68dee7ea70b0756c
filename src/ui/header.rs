//! Title bar, loading notice and key hints

use crate::api::types::format_time;
use crate::colors::{mood_fg, MUTED, SUBTLE, TEXT};
use crate::terminal::Terminal;

pub const TITLE: &str = "MoodAtlas";
pub const SUBTITLE: &str = "Global Mood Map";
pub const LOADING: &str = "Loading global mood data...";

/// Top row: title on the left, live badge and update time on the right
pub fn draw(term: &mut Terminal, updated_at: Option<&str>) {
    let (w, _) = term.size();
    term.fill_rect(0, 0, w, 1);
    term.set_str(1, 0, TITLE, Some(TEXT), true);
    let sub_x = 1 + TITLE.len() as i32 + 2;
    term.set_str(sub_x, 0, SUBTITLE, Some(MUTED), false);

    let live = mood_fg("Happy");
    let mut right = String::new();
    if let Some(ts) = updated_at {
        right = format!("Updated {}", format_time(ts));
    }
    let right_x = w as i32 - 1 - right.chars().count() as i32;
    term.set_str(right_x, 0, &right, Some(MUTED), false);

    let badge_x = right_x - if right.is_empty() { 6 } else { 9 };
    term.set(badge_x, 0, '●', Some(live), false);
    term.set_str(badge_x + 2, 0, "LIVE", Some(live), true);
}

/// Centered notice shown while the first global fetch is running
pub fn draw_loading(term: &mut Terminal) {
    let (w, h) = term.size();
    let x = (w as i32 - LOADING.len() as i32) / 2;
    term.set_str(x.max(0), h as i32 / 2, LOADING, Some(SUBTLE), false);
}

/// Bottom row key hints
pub fn draw_status(term: &mut Terminal, hints: &str) {
    let (w, h) = term.size();
    let y = h as i32 - 1;
    term.fill_rect(0, y, w, 1);
    term.set_str_clipped(1, y, hints, (w as usize).saturating_sub(2), Some(MUTED), false);
}
