//! Heuristic advice and comparisons derived from finished analyses.

use crate::analysis::parse_response_time;
use crate::model::{AnalysisResult, PerSide};
use crate::sentiment::MoodLabel;
use serde::{Deserialize, Serialize};

/// Minimum number of tips returned by [`chat_tips`].
pub const MIN_TIPS: usize = 3;

const INTEREST_GAP: f64 = 30.0;

/// What kind of nudge a tip is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Improvement,
    Caution,
    Balance,
    Engagement,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTip {
    #[serde(rename = "type")]
    pub kind: TipKind,
    pub title: String,
    pub description: String,
}

impl ChatTip {
    fn new(kind: TipKind, title: &str, description: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

const GENERAL_TIPS: [(&str, &str); 3] = [
    (
        "Conversation Flow",
        "Ask open-ended questions to keep the conversation engaging",
    ),
    (
        "Show Interest",
        "Reference previous conversations to show you're paying attention",
    ),
    (
        "Be Authentic",
        "Share your genuine thoughts and feelings to deepen the connection",
    ),
];

/// Mood label for an overall mood value.
#[must_use]
pub fn mood_label(overall_mood: f64) -> MoodLabel {
    MoodLabel::from_mood(overall_mood)
}

/// Advice for the "You" side of an analyzed chat.
///
/// Specific tips come first (response time, message balance, interest,
/// emoji use). The list is then padded with general tips, in fixed order,
/// until it has at least [`MIN_TIPS`] entries. Ratios against a zero
/// denominator follow float semantics, so a silent side never triggers the
/// "too few" branch.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn chat_tips(analysis: &AnalysisResult) -> Vec<ChatTip> {
    let mut tips = Vec::new();

    let you_ms = parse_response_time(&analysis.response_time.you);
    let them_ms = parse_response_time(&analysis.response_time.them);
    if you_ms > them_ms * 2 {
        tips.push(ChatTip::new(
            TipKind::Improvement,
            "Response Time",
            "Try to respond more quickly to keep the conversation flowing",
        ));
    } else if (you_ms as f64) < them_ms as f64 / 2.0 {
        tips.push(ChatTip::new(
            TipKind::Caution,
            "Response Time",
            "You might be responding too quickly. Give them time to process and respond.",
        ));
    }

    let counts = &analysis.message_count;
    let message_ratio = counts.you as f64 / counts.them as f64;
    if message_ratio > 1.5 {
        tips.push(ChatTip::new(
            TipKind::Balance,
            "Message Balance",
            "Consider giving them more space to engage in the conversation",
        ));
    } else if message_ratio < 0.6 {
        tips.push(ChatTip::new(
            TipKind::Engagement,
            "Engagement",
            "Try to contribute more to the conversation to show interest",
        ));
    }

    let interest = &analysis.interest_level;
    if interest.you > interest.them + INTEREST_GAP {
        tips.push(ChatTip::new(
            TipKind::Caution,
            "Interest Mismatch",
            "There seems to be an imbalance in engagement levels. Consider matching their energy.",
        ));
    } else if interest.them > interest.you + INTEREST_GAP {
        tips.push(ChatTip::new(
            TipKind::Engagement,
            "Interest Opportunity",
            "They seem very interested. This might be a good time to deepen the connection.",
        ));
    }

    let emoji_total: u64 = analysis.top_emojis.iter().map(|e| e.count).sum();
    let emoji_ratio = emoji_total as f64 / counts.you as f64;
    if emoji_ratio > 0.5 {
        tips.push(ChatTip::new(
            TipKind::Balance,
            "Emoji Usage",
            "You use a lot of emojis. While expressive, consider balancing with more text.",
        ));
    } else if emoji_ratio < 0.1 {
        tips.push(ChatTip::new(
            TipKind::Engagement,
            "Emoji Usage",
            "Consider using more emojis to add emotional context to your messages.",
        ));
    }

    for (title, description) in GENERAL_TIPS {
        if tips.len() >= MIN_TIPS {
            break;
        }
        if !tips.iter().any(|t| t.title == title) {
            tips.push(ChatTip::new(TipKind::General, title, description));
        }
    }

    tips
}

/// Headline numbers for one side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    pub total_messages: u64,
    pub message_count: PerSide<u64>,
    pub interest_level: PerSide<f64>,
    pub overall_mood: f64,
    pub mood: MoodLabel,
    pub longest_streak_days: u32,
}

impl From<&AnalysisResult> for ComparisonEntry {
    fn from(analysis: &AnalysisResult) -> Self {
        Self {
            total_messages: analysis.total_messages(),
            message_count: analysis.message_count,
            interest_level: analysis.interest_level,
            overall_mood: analysis.overall_mood,
            mood: mood_label(analysis.overall_mood),
            longest_streak_days: analysis.longest_streak_days,
        }
    }
}

/// Two analyses side by side; deltas are `second - first`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatComparison {
    pub first: ComparisonEntry,
    pub second: ComparisonEntry,
    pub total_messages_delta: i64,
    pub interest_delta: PerSide<f64>,
    pub mood_delta: f64,
}

#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn compare(first: &AnalysisResult, second: &AnalysisResult) -> ChatComparison {
    let a = ComparisonEntry::from(first);
    let b = ComparisonEntry::from(second);
    ChatComparison {
        total_messages_delta: b.total_messages as i64 - a.total_messages as i64,
        interest_delta: PerSide::new(
            b.interest_level.you - a.interest_level.you,
            b.interest_level.them - a.interest_level.them,
        ),
        mood_delta: b.overall_mood - a.overall_mood,
        first: a,
        second: b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmojiCount;

    fn analysis(you: u64, them: u64, rt_you: &str, rt_them: &str) -> AnalysisResult {
        let mut result = AnalysisResult::default();
        result.message_count = PerSide::new(you, them);
        result.response_time = PerSide::new(rt_you.to_string(), rt_them.to_string());
        result
    }

    #[test]
    fn slow_responder_gets_improvement_tip() {
        let tips = chat_tips(&analysis(10, 10, "10m", "1m"));
        assert_eq!(tips[0].kind, TipKind::Improvement);
        assert_eq!(tips[0].title, "Response Time");
    }

    #[test]
    fn fast_responder_gets_caution_tip() {
        let tips = chat_tips(&analysis(10, 10, "10s", "1m"));
        assert_eq!(tips[0].kind, TipKind::Caution);
    }

    #[test]
    fn compares_in_milliseconds_not_leading_digits() {
        // "2d 5h" vs "30m": leading numbers would say 2 < 30
        let tips = chat_tips(&analysis(10, 10, "2d 5h", "30m"));
        assert_eq!(tips[0].kind, TipKind::Improvement);
    }

    #[test]
    fn message_balance_and_emoji_tips() {
        let mut result = analysis(20, 10, "0s", "0s");
        result.top_emojis = vec![EmojiCount {
            emoji: "😂".into(),
            count: 15,
        }];
        let tips = chat_tips(&result);
        let titles: Vec<&str> = tips.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Message Balance", "Emoji Usage", "Conversation Flow"]);
    }

    #[test]
    fn interest_mismatch() {
        let mut result = analysis(10, 10, "0s", "0s");
        result.interest_level = PerSide::new(20.0, 80.0);
        let tips = chat_tips(&result);
        assert!(tips.iter().any(|t| t.title == "Interest Opportunity"));
    }

    #[test]
    fn padding_is_deterministic() {
        let result = analysis(0, 0, "0s", "0s");
        let first = chat_tips(&result);
        assert_eq!(first, chat_tips(&result));
        assert_eq!(first.len(), MIN_TIPS);
        assert!(first.iter().all(|t| t.kind == TipKind::General));
        assert_eq!(first[0].title, "Conversation Flow");
    }

    #[test]
    fn mood_label_thresholds() {
        assert_eq!(mood_label(0.31), MoodLabel::Positive);
        assert_eq!(mood_label(0.0), MoodLabel::Neutral);
        assert_eq!(mood_label(-0.5), MoodLabel::Negative);
    }

    #[test]
    fn compare_reports_deltas() {
        let mut a = analysis(5, 5, "0s", "0s");
        a.overall_mood = 0.5;
        let mut b = analysis(20, 10, "0s", "0s");
        b.overall_mood = -0.5;
        b.interest_level = PerSide::new(60.0, 40.0);

        let cmp = compare(&a, &b);
        assert_eq!(cmp.total_messages_delta, 20);
        assert!((cmp.mood_delta + 1.0).abs() < f64::EPSILON);
        assert_eq!(cmp.first.mood, MoodLabel::Positive);
        assert_eq!(cmp.second.mood, MoodLabel::Negative);
        assert!((cmp.interest_delta.you - 60.0).abs() < f64::EPSILON);
    }
}
