//! Spike alert feed

use super::{put_emoji, Frame};
use crate::api::types::{format_date, signed, Spike};
use crate::colors::{mood_fg, ALERT, MUTED, SUBTLE, TEXT};
use crate::mood::mood_emoji;
use crate::terminal::Terminal;

/// Alerts shown at most
pub const MAX_SPIKES: usize = 5;
pub const WIDTH: u16 = 40;

#[derive(Debug, Default)]
pub struct SpikeFeed {
    spikes: Vec<Spike>,
    expanded: bool,
}

impl SpikeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the first few spikes of a fetch result
    pub fn set(&mut self, mut spikes: Vec<Spike>) {
        spikes.truncate(MAX_SPIKES);
        self.spikes = spikes;
    }

    pub fn spikes(&self) -> &[Spike] {
        &self.spikes
    }

    pub fn is_visible(&self) -> bool {
        !self.spikes.is_empty()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn header(&self) -> String {
        let n = self.spikes.len();
        format!("{} Mood Spike{} Detected", n, if n > 1 { "s" } else { "" })
    }

    /// Rows the feed needs; 0 when hidden
    pub fn height(&self) -> u16 {
        match (self.is_visible(), self.is_expanded()) {
            (false, _) => 0,
            (true, false) => 3,
            (true, true) => 3 + self.spikes.iter().map(|s| spike_rows(s) as u16).sum::<u16>(),
        }
    }

    pub fn draw(&self, term: &mut Terminal, x: i32, y: i32) {
        if !self.is_visible() {
            return;
        }
        let frame = Frame::new(x, y, WIDTH, self.height(), "Alerts")
            .title_color(ALERT)
            .border_color(ALERT);
        frame.draw(term);

        let ix = frame.inner_x();
        let iw = frame.inner_width();
        let mut row = frame.inner_y();
        let marker = if self.is_expanded() { "▴" } else { "▾" };
        term.set_str(ix, row, "⚠ ", Some(ALERT), false);
        term.set_str_clipped(ix + 2, row, &self.header(), iw - 4, Some(ALERT), true);
        term.set_str(ix + iw as i32 - 1, row, marker, Some(ALERT), false);
        if !self.is_expanded() {
            return;
        }

        for spike in &self.spikes {
            row += 1;
            term.set_str(ix, row, &spike.country_code, Some(TEXT), true);
            let date = format_date(&spike.detected_at);
            term.set_str(ix + iw as i32 - date.chars().count() as i32, row, &date, Some(MUTED), false);

            row += 1;
            let prev = format!("{} → ", spike.previous_label);
            term.set_str(ix, row, &prev, Some(SUBTLE), false);
            let mut cx = ix + prev.chars().count() as i32;
            term.set_str(cx, row, &spike.new_label, Some(mood_fg(&spike.new_label)), true);
            cx += spike.new_label.chars().count() as i32 + 1;
            cx = put_emoji(term, cx, row, mood_emoji(&spike.new_label));
            term.set_str(cx + 1, row, &delta(spike.delta), Some(MUTED), false);

            if let Some(reason) = spike.reason.as_deref().filter(|r| !r.is_empty()) {
                row += 1;
                term.set_str_clipped(ix, row, reason, iw, Some(MUTED), false);
            }
        }
    }

    /// Plain-text rendering for print mode
    pub fn report(&self) -> String {
        if !self.is_visible() {
            return "No mood spikes detected\n".to_string();
        }
        let mut out = format!("{}\n", self.header());
        for s in self.spikes() {
            out.push_str(&format!(
                "  {}  {}  {} → {} {}  {}\n",
                s.country_code,
                format_date(&s.detected_at),
                s.previous_label,
                s.new_label,
                mood_emoji(&s.new_label),
                delta(s.delta)
            ));
            if let Some(reason) = s.reason.as_deref().filter(|r| !r.is_empty()) {
                out.push_str(&format!("      {}\n", reason));
            }
        }
        out
    }
}

fn spike_rows(spike: &Spike) -> usize {
    if spike.reason.as_deref().is_some_and(|r| !r.is_empty()) {
        3
    } else {
        2
    }
}

/// `Δ+0.350`
pub fn delta(value: f64) -> String {
    format!("Δ{}", signed(value, 3))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike(id: i64, code: &str, delta: f64, reason: Option<&str>) -> Spike {
        Spike {
            id,
            country_code: code.into(),
            detected_at: "2025-06-01T08:00:00".into(),
            previous_label: "Calm".into(),
            new_label: "Happy".into(),
            delta,
            reason: reason.map(str::to_string),
        }
    }

    #[test]
    fn hidden_when_empty() {
        let feed = SpikeFeed::new();
        assert!(!feed.is_visible());
        assert_eq!(feed.height(), 0);
        let mut term = Terminal::offscreen(50, 5);
        feed.draw(&mut term, 0, 0);
        assert!(term.text().trim().is_empty());
    }

    #[test]
    fn keeps_first_five() {
        let mut feed = SpikeFeed::new();
        feed.set((1..=8).map(|i| spike(i, "US", 0.1, None)).collect());
        assert_eq!(feed.spikes().len(), 5);
        assert_eq!(feed.spikes()[4].id, 5);
        assert_eq!(feed.header(), "5 Mood Spikes Detected");
    }

    #[test]
    fn singular_header() {
        let mut feed = SpikeFeed::new();
        feed.set(vec![spike(1, "UA", -0.25, None)]);
        assert_eq!(feed.header(), "1 Mood Spike Detected");
    }

    #[test]
    fn collapsed_by_default_and_toggles() {
        let mut feed = SpikeFeed::new();
        feed.set(vec![spike(1, "BR", 0.35, Some("Carnival")), spike(2, "AR", -0.22, None)]);
        assert!(!feed.is_expanded());
        assert_eq!(feed.height(), 3);
        feed.toggle();
        assert_eq!(feed.height(), 3 + 3 + 2);

        let mut term = Terminal::offscreen(50, 12);
        feed.draw(&mut term, 0, 0);
        let text = term.text();
        assert!(text.contains("2 Mood Spikes Detected"));
        assert!(text.contains("Calm → Happy 😊 Δ+0.350"));
        assert!(text.contains("Δ-0.220"));
        assert!(text.contains("Carnival"));
    }

    #[test]
    fn delta_formatting() {
        assert_eq!(delta(0.35), "Δ+0.350");
        assert_eq!(delta(-0.25), "Δ-0.250");
        assert_eq!(delta(0.0), "Δ0.000");
    }
}
