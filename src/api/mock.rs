//! Offline data set for working without the backend

use super::types::{CountryDetail, CountryMood, GlobalMood, Spike, SpikeList, TrendPoint};
use super::{ApiError, MoodApi};
use crate::mood::{label_for_score, mood_color};
use chrono::{Duration, Utc};
use rand::prelude::*;
use std::cell::RefCell;

// code, name, score, label, valence, energy, danceability, acousticness, genre, track, news sentiment
type Sample = (&'static str, &'static str, f64, &'static str, f64, f64, f64, f64, &'static str, &'static str, f64);

const SAMPLES: [Sample; 30] = [
    ("US", "United States", 0.45, "Happy", 0.72, 0.68, 0.75, 0.15, "Pop", "Good Feeling - Flo Rida", 0.3),
    ("GB", "United Kingdom", 0.12, "Calm", 0.55, 0.42, 0.48, 0.55, "Indie", "Lost in Yesterday - Tame Impala", 0.1),
    ("DE", "Germany", 0.28, "Happy", 0.65, 0.55, 0.62, 0.25, "Electronic", "Levels - Avicii", 0.2),
    ("FR", "France", 0.05, "Calm", 0.52, 0.38, 0.45, 0.65, "French Pop", "Dernière Danse - Indila", 0.0),
    ("JP", "Japan", 0.18, "Calm", 0.58, 0.45, 0.52, 0.42, "J-Pop", "Lemon - Kenshi Yonezu", 0.15),
    ("BR", "Brazil", 0.62, "Happy", 0.82, 0.78, 0.88, 0.12, "Funk Carioca", "Vai Malandra - Anitta", 0.4),
    ("AU", "Australia", 0.35, "Happy", 0.68, 0.62, 0.65, 0.22, "Indie Rock", "Electric Feel - MGMT", 0.25),
    ("CA", "Canada", 0.22, "Calm", 0.58, 0.48, 0.55, 0.35, "Alternative", "Blinding Lights - The Weeknd", 0.18),
    ("MX", "Mexico", 0.48, "Happy", 0.75, 0.72, 0.78, 0.18, "Reggaeton", "La Bicicleta - Shakira", 0.35),
    ("ES", "Spain", 0.42, "Happy", 0.70, 0.65, 0.72, 0.20, "Latin Pop", "Despacito - Luis Fonsi", 0.3),
    ("IT", "Italy", 0.15, "Calm", 0.55, 0.45, 0.50, 0.45, "Italian Pop", "Soldi - Mahmood", 0.1),
    ("RU", "Russia", -0.25, "Sad", 0.35, 0.42, 0.38, 0.55, "Russian Pop", "Mood - Rauf & Faik", -0.2),
    ("CN", "China", 0.08, "Calm", 0.52, 0.48, 0.45, 0.42, "Mandopop", "Love Scenario - iKON", 0.05),
    ("IN", "India", 0.38, "Happy", 0.68, 0.65, 0.70, 0.25, "Bollywood", "Jai Ho - A.R. Rahman", 0.28),
    ("KR", "South Korea", 0.52, "Happy", 0.75, 0.72, 0.82, 0.15, "K-Pop", "Dynamite - BTS", 0.4),
    ("ZA", "South Africa", 0.32, "Happy", 0.65, 0.60, 0.68, 0.28, "Afrobeats", "Jerusalema - Master KG", 0.22),
    ("AR", "Argentina", -0.15, "Anxious", 0.42, 0.58, 0.55, 0.32, "Cumbia", "Tutu - Camilo", -0.1),
    ("EG", "Egypt", -0.08, "Anxious", 0.45, 0.52, 0.48, 0.38, "Arabic Pop", "Bahebak - Amr Diab", -0.05),
    ("NG", "Nigeria", 0.58, "Happy", 0.78, 0.75, 0.85, 0.12, "Afrobeats", "Essence - Wizkid", 0.42),
    ("SE", "Sweden", 0.25, "Calm", 0.58, 0.50, 0.55, 0.40, "Pop", "Dancing Queen - ABBA", 0.2),
    ("NO", "Norway", 0.20, "Calm", 0.55, 0.48, 0.52, 0.45, "Electronic", "Take On Me - a-ha", 0.15),
    ("PL", "Poland", -0.35, "Sad", 0.38, 0.45, 0.42, 0.48, "Pop", "Nieznajomy - Dawid Podsiadło", -0.3),
    ("TR", "Turkey", -0.12, "Anxious", 0.45, 0.55, 0.50, 0.35, "Turkish Pop", "Yalnızlık - Tarkan", -0.08),
    ("SA", "Saudi Arabia", 0.10, "Calm", 0.52, 0.45, 0.48, 0.42, "Arabic Pop", "3 Daqat - Abu", 0.08),
    ("AE", "United Arab Emirates", 0.30, "Happy", 0.62, 0.58, 0.60, 0.28, "International Pop", "Habibi - DJ Snake", 0.25),
    ("TH", "Thailand", 0.42, "Happy", 0.68, 0.62, 0.65, 0.25, "T-Pop", "How You Like That - BLACKPINK", 0.32),
    ("ID", "Indonesia", 0.35, "Happy", 0.65, 0.58, 0.62, 0.30, "Pop", "Ojo Dibandingke - Denny Caknan", 0.28),
    ("PH", "Philippines", 0.48, "Happy", 0.72, 0.65, 0.70, 0.22, "OPM", "Tahanan - Adie", 0.35),
    ("VN", "Vietnam", 0.28, "Calm", 0.58, 0.52, 0.55, 0.38, "V-Pop", "See Tình - Hoàng Thùy Linh", 0.22),
    ("UA", "Ukraine", -0.55, "Angry", 0.25, 0.65, 0.35, 0.42, "Ukrainian Pop", "Stefania - Kalush Orchestra", -0.6),
];

/// Sample countries stamped with the current time
pub fn sample_countries() -> Vec<CountryMood> {
    let now = Utc::now().to_rfc3339();
    SAMPLES
        .iter()
        .map(|&(code, name, score, label, valence, energy, dance, acoustic, genre, track, news)| CountryMood {
            country_code: code.to_string(),
            country_name: name.to_string(),
            mood_score: score,
            mood_label: label.to_string(),
            color_code: mood_color(label).to_string(),
            valence: Some(valence),
            energy: Some(energy),
            danceability: Some(dance),
            acousticness: Some(acoustic),
            top_genre: Some(genre.to_string()),
            top_track: Some(track.to_string()),
            news_sentiment: Some(news),
            news_headlines: None,
            news_summary: None,
            date: now.clone(),
        })
        .collect()
}

/// Mood API stand-in with the sample data and randomized trends
pub struct MockSource {
    rng: RefCell<StdRng>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            rng: RefCell::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic trends and spike flags
    #[cfg(test)]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seven daily points ending today, jittered around the base score
    fn trend(&self, base_score: f64) -> Vec<TrendPoint> {
        let mut rng = self.rng.borrow_mut();
        let today = Utc::now().date_naive();
        (0..7)
            .rev()
            .map(|days_ago| {
                let variance = (rng.gen::<f64>() - 0.5) * 0.3;
                let score = (base_score + variance).clamp(-1.0, 1.0);
                TrendPoint {
                    date: (today - Duration::days(days_ago)).format("%Y-%m-%d").to_string(),
                    mood_score: score,
                    mood_label: label_for_score(score).to_string(),
                }
            })
            .collect()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MoodApi for MockSource {
    fn fetch_global_mood(&self) -> Result<GlobalMood, ApiError> {
        Ok(GlobalMood {
            updated_at: Utc::now().to_rfc3339(),
            countries: sample_countries(),
        })
    }

    fn fetch_country_detail(&self, country_code: &str) -> Result<CountryDetail, ApiError> {
        let code = country_code.trim().to_uppercase();
        let mood = sample_countries()
            .into_iter()
            .find(|c| c.country_code == code)
            .ok_or_else(|| ApiError::NotFound(code.clone()))?;

        let trend = self.trend(mood.mood_score);
        let spike_active = mood.mood_score < -0.4 || self.rng.borrow_mut().gen::<f64>() > 0.85;

        Ok(CountryDetail {
            mood,
            trend,
            spike_active,
        })
    }

    fn fetch_spikes(&self) -> Result<SpikeList, ApiError> {
        let now = Utc::now();
        let spike = |id, code: &str, days_ago, prev: &str, new: &str, delta, reason: &str| Spike {
            id,
            country_code: code.to_string(),
            detected_at: (now - Duration::days(days_ago)).to_rfc3339(),
            previous_label: prev.to_string(),
            new_label: new.to_string(),
            delta,
            reason: Some(reason.to_string()),
        };

        Ok(SpikeList {
            spikes: vec![
                spike(1, "UA", 0, "Sad", "Angry", -0.25, "Ongoing regional tensions"),
                spike(2, "AR", 1, "Calm", "Anxious", -0.22, "Economic uncertainty"),
                spike(3, "BR", 2, "Calm", "Happy", 0.35, "Carnival season celebrations"),
            ],
        })
    }
}
