//! Lexicon sentiment scoring.
//!
//! Two fixed word lists are used: one for per-message scores over exported
//! chats (raw sum, no normalization), and a screenshot lexicon that also
//! recognizes a few emoji and averages over matched words.

use crate::model::{ChatMessage, SentimentPoint};
use serde::{Deserialize, Serialize};

/// Polarity per word for exported chat messages.
const MESSAGE_LEXICON: &[(&str, i32)] = &[
    ("happy", 1),
    ("glad", 1),
    ("joyful", 1),
    ("delighted", 1),
    ("good", 1),
    ("great", 1),
    ("excellent", 1),
    ("amazing", 1),
    ("love", 1),
    ("wonderful", 1),
    ("sad", -1),
    ("unhappy", -1),
    ("depressed", -1),
    ("terrible", -1),
    ("awful", -1),
    ("horrible", -1),
    ("bad", -1),
    ("worst", -1),
    ("hate", -1),
    ("dislike", -1),
];

const SCREENSHOT_POSITIVE: &[&str] = &[
    "love", "happy", "great", "awesome", "excellent", "😊", "❤️", "😍", "thanks", "good", "nice",
];

const SCREENSHOT_NEGATIVE: &[&str] = &[
    "sad", "bad", "hate", "awful", "terrible", "😢", "😠", "😡", "sorry", "wrong", "never",
];

/// Mood threshold on either side of zero.
const MOOD_THRESHOLD: f64 = 0.3;

/// Polarity of a single lowercased word (0 when unlisted).
#[must_use]
pub fn word_polarity(word: &str) -> i32 {
    MESSAGE_LEXICON
        .iter()
        .find(|(entry, _)| *entry == word)
        .map_or(0, |(_, score)| *score)
}

/// Sum of word polarities for one piece of text.
#[must_use]
pub fn score_text(text: &str) -> i32 {
    text.to_lowercase().split_whitespace().map(word_polarity).sum()
}

/// One sentiment point per message, in input order.
#[must_use]
pub fn analyze_sentiment<'a>(
    messages: impl IntoIterator<Item = &'a ChatMessage>,
) -> Vec<SentimentPoint> {
    messages
        .into_iter()
        .map(|message| SentimentPoint {
            timestamp: message.timestamp_ms,
            sentiment: f64::from(score_text(message.text())),
        })
        .collect()
}

/// Arithmetic mean of the series, 0 when empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn overall_mood(series: &[SentimentPoint]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().map(|p| p.sentiment).sum::<f64>() / series.len() as f64
}

/// Score a free-text blob in `[-1, 1]`: (positive − negative) / matched words.
#[must_use]
pub fn blob_sentiment(text: &str) -> f64 {
    let mut score = 0i32;
    let mut matched = 0i32;

    for word in text.to_lowercase().split_whitespace() {
        if SCREENSHOT_POSITIVE.contains(&word) {
            score += 1;
            matched += 1;
        }
        if SCREENSHOT_NEGATIVE.contains(&word) {
            score -= 1;
            matched += 1;
        }
    }

    if matched == 0 {
        0.0
    } else {
        f64::from(score) / f64::from(matched)
    }
}

/// Coarse label for an overall mood value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    Positive,
    Neutral,
    Negative,
}

impl MoodLabel {
    #[must_use]
    pub fn from_mood(mood: f64) -> Self {
        if mood > MOOD_THRESHOLD {
            Self::Positive
        } else if mood < -MOOD_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Negative => write!(f, "Negative"),
        }
    }
}
