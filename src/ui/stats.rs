//! Aggregate statistics over the current countries

use super::{draw_meter, put_emoji, Frame};
use crate::api::types::CountryMood;
use crate::colors::{mood_fg, MUTED, SUBTLE, TEXT};
use crate::mood::mood_emoji;
use crate::terminal::Terminal;

pub const WIDTH: u16 = 32;

/// One row of the mood distribution
#[derive(Clone, Debug, PartialEq)]
pub struct MoodShare {
    pub mood: String,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GlobalStats {
    pub total_countries: usize,
    /// Moods by count, descending; ties stay in first-seen order
    pub distribution: Vec<MoodShare>,
    pub dominant: MoodShare,
    pub avg_valence: f64,
    pub avg_energy: f64,
}

impl GlobalStats {
    /// `None` for an empty list
    pub fn compute(countries: &[CountryMood]) -> Option<Self> {
        if countries.is_empty() {
            return None;
        }
        let total = countries.len();

        let mut counts: Vec<(&str, usize)> = Vec::new();
        for c in countries {
            match counts.iter().position(|(label, _)| *label == c.mood_label) {
                Some(i) => counts[i].1 += 1,
                None => counts.push((c.mood_label.as_str(), 1)),
            }
        }

        let mut distribution: Vec<MoodShare> = counts
            .into_iter()
            .map(|(mood, count)| MoodShare {
                mood: mood.to_string(),
                count,
                percentage: (count as f64 / total as f64 * 100.0).round() as u32,
            })
            .collect();
        // sort_by is stable
        distribution.sort_by(|a, b| b.count.cmp(&a.count));

        let dominant = distribution.first()?.clone();

        Some(Self {
            total_countries: total,
            distribution,
            dominant,
            avg_valence: mean(countries.iter().filter_map(|c| c.valence)),
            avg_energy: mean(countries.iter().filter_map(|c| c.energy)),
        })
    }

    /// Plain-text rendering for print mode
    pub fn report(&self) -> String {
        let mut out = format!(
            "Global Stats: {} countries\nDominant: {} {} ({}%)\n",
            self.total_countries,
            mood_emoji(&self.dominant.mood),
            self.dominant.mood,
            self.dominant.percentage
        );
        for share in &self.distribution {
            out.push_str(&format!(
                "  {:<8} {:>3} {:>4}%\n",
                share.mood, share.count, share.percentage
            ));
        }
        out.push_str(&format!(
            "Avg valence: {:.2}  Avg energy: {:.2}\n",
            self.avg_valence, self.avg_energy
        ));
        out
    }
}

/// Mean of the values, 0 when there are none
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Rows the panel needs
pub fn height(stats: &GlobalStats, expanded: bool) -> u16 {
    if expanded {
        // count, dominant, heading, rows, averages, borders
        3 + stats.distribution.len() as u16 + 1 + 2
    } else {
        3
    }
}

/// Draw the stats box with its bottom edge on row `bottom`
pub fn draw(term: &mut Terminal, stats: &GlobalStats, expanded: bool, x: i32, bottom: i32) {
    let h = height(stats, expanded);
    let y = bottom - h as i32 + 1;
    let marker = if expanded { "▾" } else { "▸" };
    let frame = Frame::new(x, y, WIDTH, h, &format!("Global Stats {}", marker));
    frame.draw(term);

    let ix = frame.inner_x();
    let iw = frame.inner_width();
    let mut row = frame.inner_y();
    term.set_str(ix, row, &format!("{} countries", stats.total_countries), Some(MUTED), false);
    if !expanded {
        return;
    }
    row += 1;

    let dom = &stats.dominant;
    let color = mood_fg(&dom.mood);
    let cx = put_emoji(term, ix, row, mood_emoji(&dom.mood));
    term.set_str(cx + 1, row, "Dominant", Some(SUBTLE), false);
    term.set_str(cx + 10, row, &dom.mood, Some(color), true);
    let pct = format!("{}%", dom.percentage);
    term.set_str(ix + iw as i32 - pct.len() as i32, row, &pct, Some(TEXT), true);
    row += 1;

    term.set_str(ix, row, "DISTRIBUTION", Some(MUTED), false);
    row += 1;
    for share in &stats.distribution {
        let bx = put_emoji(term, ix, row, mood_emoji(&share.mood)) + 1;
        let meter_w = iw.saturating_sub(3 + 5);
        draw_meter(term, bx, row, meter_w, share.percentage as f64 / 100.0, mood_fg(&share.mood));
        term.set_str(bx + meter_w as i32, row, &format!("{:>4}%", share.percentage), Some(SUBTLE), false);
        row += 1;
    }

    let averages = format!("Valence {:.2}  Energy {:.2}", stats.avg_valence, stats.avg_energy);
    term.set_str_clipped(ix, row, &averages, iw, Some(TEXT), false);
}
