//! Country detail side panel

use super::{draw_bar, put_emoji, wrap, Frame};
use crate::api::types::{format_day_short, signed, CountryDetail, TrendPoint};
use crate::colors::{mood_fg, ALERT, INSIGHT, MUTED, SUBTLE, TEXT};
use crate::mood::mood_meta;
use crate::terminal::Terminal;

pub const WIDTH: u16 = 44;

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Which country is selected and what is known about it
#[derive(Debug, Default)]
pub struct PanelState {
    code: Option<String>,
    // outline name, for countries the API has nothing on
    name: Option<String>,
    loading: bool,
    data: Option<CountryDetail>,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a country; its detail is loading until [`finish`](Self::finish)
    pub fn open(&mut self, code: &str, name: Option<&str>) {
        self.code = Some(code.to_string());
        self.name = name.filter(|n| !n.is_empty()).map(str::to_string);
        self.loading = true;
        self.data = None;
    }

    /// Store a fetch result. Results for a country that is no longer
    /// selected are dropped.
    pub fn finish(&mut self, code: &str, data: Option<CountryDetail>) {
        if self.code.as_deref() != Some(code) {
            return;
        }
        self.loading = false;
        self.data = data;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        self.code.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn data(&self) -> Option<&CountryDetail> {
        self.data.as_ref()
    }

    /// Name from the data, else the outline name, else the raw code
    pub fn title(&self) -> &str {
        match (&self.data, &self.name, &self.code) {
            (Some(d), _, _) if !d.mood.country_name.is_empty() => &d.mood.country_name,
            (_, Some(name), _) => name,
            (_, _, Some(code)) => code,
            _ => "",
        }
    }

    /// Draw against the right edge of the screen
    pub fn draw(&self, term: &mut Terminal, top: i32) {
        let Some(code) = self.code() else {
            return;
        };
        let (sw, sh) = term.size();
        let width = WIDTH.min(sw);
        let height = sh.saturating_sub(top.max(0) as u16);
        let x = sw as i32 - width as i32;
        let frame = Frame::new(x, top, width, height, self.title());
        frame.draw(term);

        let ix = frame.inner_x();
        let iw = frame.inner_width();
        let bottom = top + height as i32 - 1;
        term.set_str(x + width as i32 - 8, top, " Esc ✕ ", Some(MUTED), false);

        let mut row = frame.inner_y() + 1;
        if self.is_loading() {
            term.set_str(ix + (iw as i32 - 10) / 2, row + 2, "Loading...", Some(MUTED), false);
            return;
        }
        let Some(detail) = self.data() else {
            term.set_str(ix, row, code, Some(SUBTLE), true);
            term.set_str(ix, row + 2, "No data available", Some(MUTED), false);
            return;
        };

        let mood = &detail.mood;
        let meta = mood_meta(&mood.mood_label);
        let color = mood_fg(&mood.mood_label);

        // mood badge
        let lx = put_emoji(term, ix, row, meta.emoji) + 1;
        term.set_str(lx, row, &mood.mood_label, Some(color), true);
        if detail.spike_active {
            term.set_str(ix + iw as i32 - 7, row, "⚠ Spike", Some(ALERT), true);
        }
        row += 1;
        let score = format!("Score: {}", signed(mood.mood_score, 3));
        term.set_str(lx, row, &score, Some(SUBTLE), false);
        row += 2;

        // audio features, two per row
        let features = mood.audio_features();
        let col_w = iw.saturating_sub(2) / 2;
        for pair in features.chunks(2) {
            if row + 1 >= bottom {
                return;
            }
            for (i, (name, value)) in pair.iter().enumerate() {
                let cx = ix + (i * (col_w + 2)) as i32;
                term.set_str(cx, row, name, Some(MUTED), false);
                let v = format!("{:.2}", value);
                term.set_str(cx + col_w as i32 - v.len() as i32, row, &v, Some(TEXT), true);
                draw_bar(term, cx, row + 1, col_w, *value, color);
            }
            row += 3;
        }

        // top track / genre
        if mood.top_track.is_some() || mood.top_genre.is_some() {
            if let Some(track) = &mood.top_track {
                term.set_str(ix, row, "♪", Some(MUTED), false);
                term.set_str_clipped(ix + 2, row, track, iw.saturating_sub(2), Some(TEXT), false);
                row += 1;
            }
            if let Some(genre) = &mood.top_genre {
                term.set_str_clipped(ix + 2, row, genre, iw.saturating_sub(2), Some(MUTED), false);
                row += 1;
            }
            row += 1;
        }

        if let Some(summary) = mood.news_summary.as_deref().filter(|s| !s.is_empty()) {
            let tx = put_emoji(term, ix, row, "✨") + 1;
            term.set_str(tx, row, "AI Mood Insight", Some(INSIGHT), true);
            row += 1;
            for line in wrap(&format!("\"{}\"", summary), iw) {
                if row >= bottom {
                    return;
                }
                term.set_str(ix, row, &line, Some(SUBTLE), false);
                row += 1;
            }
            row += 1;
        }

        if let Some(headlines) = mood.news_headlines.as_ref().filter(|h| !h.is_empty()) {
            term.set_str(ix, row, "Headlines", Some(MUTED), true);
            row += 1;
            for headline in headlines {
                if row >= bottom {
                    return;
                }
                term.set_str(ix, row, "•", Some(MUTED), false);
                term.set_str_clipped(ix + 2, row, headline, iw.saturating_sub(2), Some(SUBTLE), false);
                row += 1;
            }
            row += 1;
        }

        if detail.trend.len() > 1 && row + 3 < bottom {
            term.set_str(ix, row, "7-Day Mood Trend", Some(MUTED), true);
            draw_trend(term, ix, row + 1, iw, &detail.trend);
        }
    }
}

/// Glyph for a score in -1..1
fn spark(score: f64) -> char {
    let level = ((score.clamp(-1.0, 1.0) + 1.0) / 2.0 * 7.0).round() as usize;
    SPARK[level.min(7)]
}

/// Sparkline of the trend with first and last dates underneath
fn draw_trend(term: &mut Terminal, x: i32, y: i32, width: usize, trend: &[TrendPoint]) {
    let seg = (width / trend.len()).max(1);
    for (i, point) in trend.iter().enumerate() {
        let glyph = spark(point.mood_score);
        let color = Some(mood_fg(&point.mood_label));
        for dx in 0..seg.saturating_sub(1).max(1) {
            term.set(x + (i * seg + dx) as i32, y, glyph, color, false);
        }
    }
    if let (Some(first), Some(last)) = (trend.first(), trend.last()) {
        let end = format_day_short(&last.date);
        let span = (seg * trend.len()) as i32;
        term.set_str(x, y + 1, &format_day_short(&first.date), Some(MUTED), false);
        term.set_str(x + span - end.chars().count() as i32, y + 1, &end, Some(MUTED), false);
    }
}

/// Plain-text rendering for print mode
pub fn report(detail: &CountryDetail) -> String {
    let mood = &detail.mood;
    let meta = mood_meta(&mood.mood_label);
    let mut out = format!(
        "{} {} ({})\n{} · Score: {}{}\n",
        meta.emoji,
        mood.country_name,
        mood.country_code,
        mood.mood_label,
        signed(mood.mood_score, 3),
        if detail.spike_active { " · Spike" } else { "" }
    );
    for (name, value) in mood.audio_features() {
        out.push_str(&format!("  {:<13}{:.2}\n", name, value));
    }
    if let Some(track) = &mood.top_track {
        out.push_str(&format!("Top track: {}\n", track));
    }
    if let Some(genre) = &mood.top_genre {
        out.push_str(&format!("Top genre: {}\n", genre));
    }
    if let Some(summary) = &mood.news_summary {
        out.push_str(&format!("AI Mood Insight: \"{}\"\n", summary));
    }
    for headline in mood.news_headlines.iter().flatten() {
        out.push_str(&format!("  • {}\n", headline));
    }
    if detail.trend.len() > 1 {
        let line: String = detail.trend.iter().map(|p| spark(p.mood_score)).collect();
        out.push_str(&format!("Trend: {}\n", line));
        for p in &detail.trend {
            out.push_str(&format!("  {}  {}  {}\n", p.date, signed(p.mood_score, 3), p.mood_label));
        }
    }
    out
}
