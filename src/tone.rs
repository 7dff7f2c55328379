//! Weighted keyword tone classification.
//!
//! Each category has a word list and a weight. Every exact word match adds
//! the category weight to its score; scores become percentages of their
//! sum, and confidence measures how far the winner sits above the 25%
//! four-way baseline.

use crate::error::{ChatlensError, Result};
use crate::model::{ToneAnalysis, ToneCategory, ToneIndicators};

struct ToneLexicon {
    category: ToneCategory,
    weight: f64,
    words: &'static [&'static str],
}

const LEXICONS: [ToneLexicon; 4] = [
    ToneLexicon {
        category: ToneCategory::Formal,
        weight: 1.5,
        words: &[
            "would", "could", "should", "please", "thank", "appreciate", "regards", "sincerely",
            "certainly", "indeed", "perhaps", "nevertheless", "furthermore", "additionally",
            "however", "therefore", "consequently", "moreover", "regarding", "concerning",
            "respectfully", "kindly",
        ],
    },
    ToneLexicon {
        category: ToneCategory::Casual,
        weight: 1.2,
        words: &[
            "hey", "yeah", "cool", "ok", "okay", "lol", "haha", "sup", "gonna", "wanna", "kinda",
            "sorta", "dunno", "tbh", "tho", "rn", "idk", "nvm", "btw", "omg", "like", "literally",
            "basically", "actually",
        ],
    },
    ToneLexicon {
        category: ToneCategory::Friendly,
        weight: 1.0,
        words: &[
            "thanks", "welcome", "happy", "glad", "great", "nice", "love", "care", "sweet",
            "wonderful", "amazing", "awesome", "fantastic", "beautiful", "lovely", "dear",
            "friend", "miss", "hope", "enjoy", "please", "kind",
        ],
    },
    ToneLexicon {
        category: ToneCategory::Professional,
        weight: 1.3,
        words: &[
            "meeting", "discuss", "project", "deadline", "report", "review", "schedule",
            "confirm", "update", "status", "priority", "urgent", "important", "follow-up", "task",
            "objective", "goal", "timeline", "budget", "client",
        ],
    },
];

/// Random-chance share for one of four categories.
const BASELINE_PERCENT: f64 = 25.0;

/// Classify the register of `text`.
///
/// Text with no matches at all yields 0% everywhere; `overall` then falls
/// back to the first category (formal). Equal maxima also resolve to the
/// earliest category in [`ToneCategory::ALL`].
#[must_use]
pub fn analyze_tone(text: &str) -> ToneAnalysis {
    let lowered = text.to_lowercase();
    let mut scores = [0.0f64; 4];
    let mut indicators = ToneIndicators::default();

    for word in lowered.split_whitespace() {
        for (slot, lexicon) in LEXICONS.iter().enumerate() {
            if lexicon.words.contains(&word) {
                scores[slot] += lexicon.weight;
                let found = indicators.get_mut(lexicon.category);
                if !found.iter().any(|w| w == word) {
                    found.push(word.to_string());
                }
            }
        }
    }

    let sum: f64 = scores.iter().sum();
    let total = if sum == 0.0 { 1.0 } else { sum };
    let percentages = scores.map(|score| score / total * 100.0);

    let mut best = 0;
    for slot in 1..percentages.len() {
        if percentages[slot] > percentages[best] {
            best = slot;
        }
    }

    let confidence = ((percentages[best] - BASELINE_PERCENT) / (100.0 - BASELINE_PERCENT) * 100.0)
        .clamp(0.0, 100.0);

    ToneAnalysis {
        formal: percentages[0],
        casual: percentages[1],
        friendly: percentages[2],
        professional: percentages[3],
        overall: LEXICONS[best].category,
        confidence,
        indicators,
    }
}

/// Tone analysis that reports when there is nothing to classify.
///
/// # Errors
///
/// Returns [`ChatlensError::ToneUnavailable`] when `text` contains no
/// alphabetic word at all.
pub fn try_analyze_tone(text: &str) -> Result<ToneAnalysis> {
    let has_word = text
        .split_whitespace()
        .any(|word| word.chars().any(char::is_alphabetic));
    if !has_word {
        return Err(ChatlensError::tone_unavailable("no words to classify"));
    }
    Ok(analyze_tone(text))
}
