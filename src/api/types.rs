//! Response shapes of the mood API

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Latest mood observation for one country
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryMood {
    pub country_code: String,
    pub country_name: String,
    pub mood_score: f64,
    pub mood_label: String,
    pub color_code: String,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub danceability: Option<f64>,
    #[serde(default)]
    pub acousticness: Option<f64>,
    #[serde(default)]
    pub top_genre: Option<String>,
    #[serde(default)]
    pub top_track: Option<String>,
    #[serde(default)]
    pub news_sentiment: Option<f64>,
    #[serde(default)]
    pub news_headlines: Option<Vec<String>>,
    #[serde(default)]
    pub news_summary: Option<String>,
    #[serde(default)]
    pub date: String,
}

/// `GET /mood/global`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalMood {
    pub updated_at: String,
    pub countries: Vec<CountryMood>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub mood_score: f64,
    pub mood_label: String,
}

/// `GET /mood/country/{code}`: the latest mood plus a week of history
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryDetail {
    #[serde(flatten)]
    pub mood: CountryMood,
    #[serde(default)]
    pub trend: Vec<TrendPoint>,
    #[serde(default)]
    pub spike_active: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub id: i64,
    pub country_code: String,
    pub detected_at: String,
    pub previous_label: String,
    pub new_label: String,
    pub delta: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// `GET /spikes`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpikeList {
    pub spikes: Vec<Spike>,
}

impl CountryMood {
    /// Audio features that are present, with display names
    pub fn audio_features(&self) -> Vec<(&'static str, f64)> {
        [
            ("Valence", self.valence),
            ("Energy", self.energy),
            ("Danceability", self.danceability),
            ("Acousticness", self.acousticness),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

enum Stamp {
    Instant(DateTime<Local>),
    Naive(NaiveDateTime),
    Day(NaiveDate),
}

fn parse_stamp(raw: &str) -> Option<Stamp> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(Stamp::Instant(dt.with_timezone(&Local)));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Stamp::Naive(dt));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(Stamp::Day)
}

/// Wall-clock time of an API timestamp (`HH:MM:SS`), or the raw text
pub fn format_time(raw: &str) -> String {
    match parse_stamp(raw) {
        Some(Stamp::Instant(dt)) => dt.format("%H:%M:%S").to_string(),
        Some(Stamp::Naive(dt)) => dt.format("%H:%M:%S").to_string(),
        Some(Stamp::Day(_)) | None => raw.to_string(),
    }
}

/// Calendar date of an API timestamp (`YYYY-MM-DD`), or the raw text
pub fn format_date(raw: &str) -> String {
    match parse_stamp(raw) {
        Some(Stamp::Instant(dt)) => dt.format("%Y-%m-%d").to_string(),
        Some(Stamp::Naive(dt)) => dt.format("%Y-%m-%d").to_string(),
        Some(Stamp::Day(d)) => d.format("%Y-%m-%d").to_string(),
        None => raw.to_string(),
    }
}

/// Short `Mon D` axis label for trend points
pub fn format_day_short(raw: &str) -> String {
    match parse_stamp(raw) {
        Some(Stamp::Instant(dt)) => dt.format("%b %-d").to_string(),
        Some(Stamp::Naive(dt)) => dt.format("%b %-d").to_string(),
        Some(Stamp::Day(d)) => d.format("%b %-d").to_string(),
        None => raw.to_string(),
    }
}

/// `+0.450` style signed number
pub fn signed(value: f64, decimals: usize) -> String {
    if value > 0.0 {
        format!("+{:.*}", decimals, value)
    } else {
        format!("{:.*}", decimals, value)
    }
}
