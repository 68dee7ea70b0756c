//! Mood labels and their display metadata

use std::fmt;

/// The closed set of categorical moods the backend assigns
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoodLabel {
    Happy,
    Calm,
    Sad,
    Angry,
    Anxious,
}

impl MoodLabel {
    #[cfg(test)]
    pub const ALL: [MoodLabel; 5] = [
        MoodLabel::Happy,
        MoodLabel::Calm,
        MoodLabel::Sad,
        MoodLabel::Angry,
        MoodLabel::Anxious,
    ];

    /// Exact, case-sensitive match against the label names the API sends
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Happy" => Some(MoodLabel::Happy),
            "Calm" => Some(MoodLabel::Calm),
            "Sad" => Some(MoodLabel::Sad),
            "Angry" => Some(MoodLabel::Angry),
            "Anxious" => Some(MoodLabel::Anxious),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLabel::Happy => "Happy",
            MoodLabel::Calm => "Calm",
            MoodLabel::Sad => "Sad",
            MoodLabel::Angry => "Angry",
            MoodLabel::Anxious => "Anxious",
        }
    }

    pub fn meta(&self) -> &'static MoodMeta {
        match self {
            MoodLabel::Happy => &HAPPY,
            MoodLabel::Calm => &CALM,
            MoodLabel::Sad => &SAD,
            MoodLabel::Angry => &ANGRY,
            MoodLabel::Anxious => &ANXIOUS,
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display attributes of a mood
#[derive(Debug, PartialEq, Eq)]
pub struct MoodMeta {
    pub color: &'static str,
    pub emoji: &'static str,
    // style classes for web clients; the terminal draws with color and emoji
    #[allow(dead_code)]
    pub bg_class: &'static str,
    #[allow(dead_code)]
    pub text_class: &'static str,
}

const HAPPY: MoodMeta = MoodMeta {
    color: "#22c55e",
    emoji: "😊",
    bg_class: "bg-mood-happy",
    text_class: "text-mood-happy",
};

const CALM: MoodMeta = MoodMeta {
    color: "#38bdf8",
    emoji: "😌",
    bg_class: "bg-mood-calm",
    text_class: "text-mood-calm",
};

const SAD: MoodMeta = MoodMeta {
    color: "#8b5cf6",
    emoji: "😢",
    bg_class: "bg-mood-sad",
    text_class: "text-mood-sad",
};

const ANGRY: MoodMeta = MoodMeta {
    color: "#ef4444",
    emoji: "😠",
    bg_class: "bg-mood-angry",
    text_class: "text-mood-angry",
};

const ANXIOUS: MoodMeta = MoodMeta {
    color: "#f97316",
    emoji: "😰",
    bg_class: "bg-mood-anxious",
    text_class: "text-mood-anxious",
};

/// Label used when the API sends something outside the known set
pub const DEFAULT_MOOD: MoodLabel = MoodLabel::Calm;

/// Order in which the legend lists moods
pub const LEGEND_ORDER: [MoodLabel; 5] = [
    MoodLabel::Happy,
    MoodLabel::Calm,
    MoodLabel::Anxious,
    MoodLabel::Sad,
    MoodLabel::Angry,
];

/// Metadata for any label string; unknown labels get the Calm entry
pub fn mood_meta(label: &str) -> &'static MoodMeta {
    MoodLabel::parse(label).unwrap_or(DEFAULT_MOOD).meta()
}

pub fn mood_color(label: &str) -> &'static str {
    mood_meta(label).color
}

pub fn mood_emoji(label: &str) -> &'static str {
    mood_meta(label).emoji
}

/// Bucket a score into a label (same cut points the backend uses for trends)
pub fn label_for_score(score: f64) -> MoodLabel {
    if score >= 0.3 {
        MoodLabel::Happy
    } else if score >= 0.0 {
        MoodLabel::Calm
    } else if score >= -0.3 {
        MoodLabel::Anxious
    } else if score >= -0.6 {
        MoodLabel::Sad
    } else {
        MoodLabel::Angry
    }
}
