//! Chat analysis engine.
//!
//! [`analyze_chat`] turns a parsed [`ChatExport`] into an [`AnalysisResult`].
//! It is a pure function of its input: messages are sorted by timestamp,
//! walked once to accumulate per-side tallies, then the derived sections
//! (streaks, response times, interest, rankings, highlights, topics) are
//! computed from those tallies. Sparse inputs degrade to zero values rather
//! than failing.
//!
//! All calendar bucketing is done in UTC.

use crate::model::{
    AnalysisResult, BusiestDay, ChatExport, ChatMessage, EmojiCount, Highlight, HighlightKind,
    LongestMessage, MonthlyActivity, MonthlyTopics, Participant, PerSide, Side, WordCount,
};
use crate::perf::{ANALYZE_CHAT, Timer};
use crate::sentiment::{analyze_sentiment, overall_mood};
use crate::topics::extract_topics;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

/// One emoji: a pictographic code point plus an optional variation selector.
pub static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Emoji_Presentation}\p{Extended_Pictographic}]\x{FE0F}?")
        .expect("valid regex")
});

static HEX_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9a-f]{8,}").expect("valid regex"));

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const THOUSANDTH_INDEX: usize = 999;
const TOP_WORDS: usize = 10;
const TOP_EMOJIS: usize = 5;
const TOPICS_PER_MONTH: usize = 5;
const SENTIMENT_CHANGE_THRESHOLD: f64 = 0.5;

/// Excluded from the top-words ranking.
const TOP_WORD_EXCLUSIONS: &[&str] = &[
    "the", "and", "for", "that", "have", "this", "with", "you", "was", "they",
];

/// Counter that remembers first-insertion order, so stable sorts break ties
/// by first appearance.
#[derive(Debug, Default)]
struct OrderedTally<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V: Default> OrderedTally<V> {
    fn entry(&mut self, key: &str) -> &mut V {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(key.to_string(), slot);
                self.entries.push((key.to_string(), V::default()));
                slot
            }
        };
        &mut self.entries[slot].1
    }

    fn into_entries(self) -> Vec<(String, V)> {
        self.entries
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct WordTally {
    total: u64,
    you: u64,
    them: u64,
}

/// Resolves which sender name is "You".
///
/// With two participants, the first is "You" when its name contains an
/// 8+ character lowercase hex run, otherwise the second is. A single
/// participant is always "You". With no participants nobody is.
#[derive(Debug, Clone)]
pub struct SideResolver {
    you: Option<String>,
}

impl SideResolver {
    #[must_use]
    pub fn from_participants(participants: &[Participant]) -> Self {
        let you = match participants {
            [first, second] => {
                if HEX_ID.is_match(&first.name) {
                    Some(first.name.clone())
                } else {
                    Some(second.name.clone())
                }
            }
            [first, ..] => Some(first.name.clone()),
            [] => None,
        };
        Self { you }
    }

    #[must_use]
    pub fn side_of(&self, name: &str) -> Side {
        match &self.you {
            Some(you) if you == name => Side::You,
            _ => Side::Them,
        }
    }

    #[must_use]
    pub fn you_name(&self) -> Option<&str> {
        self.you.as_deref()
    }
}

/// Analyze an export. Never fails; an empty export yields the default record.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze_chat(export: &ChatExport) -> AnalysisResult {
    let timer = Timer::start(ANALYZE_CHAT);

    let mut sorted: Vec<&ChatMessage> = export.messages.iter().collect();
    sorted.sort_by_key(|m| m.timestamp_ms);

    if sorted.is_empty() {
        debug!("Export has no messages");
        timer.stop();
        return AnalysisResult::default();
    }

    let sides = SideResolver::from_participants(&export.participants);
    let mut result = AnalysisResult {
        first_message_date: sorted[0].timestamp_ms,
        ..AnalysisResult::default()
    };

    let mut response_totals = PerSide::new(0i64, 0i64);
    let mut response_counts = PerSide::new(0u64, 0u64);
    let mut emoji_counts: OrderedTally<u64> = OrderedTally::default();
    let mut day_counts: OrderedTally<u64> = OrderedTally::default();
    let mut word_counts: OrderedTally<WordTally> = OrderedTally::default();
    let mut topic_records: Vec<(i64, Vec<String>)> = Vec::new();
    let mut last_timestamp: Option<i64> = None;

    for (position, message) in sorted.iter().enumerate() {
        let side = sides.side_of(&message.sender_name);
        *result.message_count.get_mut(side) += 1;
        *day_counts.entry(&iso_date(message.timestamp_ms)) += 1;

        if let Some(previous) = last_timestamp {
            let gap = message.timestamp_ms.checked_sub(previous).unwrap_or(0);
            if gap > 0 && gap < DAY_MS {
                *response_totals.get_mut(side) += gap;
                *response_counts.get_mut(side) += 1;
            }
        }
        last_timestamp = Some(message.timestamp_ms);

        if let Some(content) = message.content.as_deref() {
            for emoji in message_emojis(content) {
                *emoji_counts.entry(emoji) += 1;
            }

            let words: Vec<&str> = content.split_whitespace().collect();
            *result.word_count.get_mut(side) += words.len() as u64;

            let length = content.chars().count() as u64;
            if length > result.longest_message.length {
                result.longest_message = LongestMessage {
                    length,
                    date: message.timestamp_ms,
                };
            }

            for word in words {
                let lowered = word.to_lowercase();
                let clean = lowered
                    .strip_suffix(['.', ',', '!', '?'])
                    .unwrap_or(&lowered);
                if clean.chars().count() > 3 {
                    let tally = word_counts.entry(clean);
                    tally.total += 1;
                    match side {
                        Side::You => tally.you += 1,
                        Side::Them => tally.them += 1,
                    }
                }
            }
        }

        for reaction in message.reactions.iter().flatten() {
            if !reaction.reaction.is_empty() && reaction.reaction != "0" {
                *emoji_counts.entry(&reaction.reaction) += 1;
            }
            *result.reaction_count.get_mut(sides.side_of(&reaction.actor)) += 1;
        }

        if position == THOUSANDTH_INDEX {
            result.thousandth_message_date = Some(message.timestamp_ms);
        }

        if message.share.is_some() {
            result.shared_links += 1;
        }
        if message.photos.is_some() {
            result.media_shared.images += 1;
        }
        if message.videos.is_some() {
            result.media_shared.videos += 1;
        }

        let topics = extract_topics(message.text());
        if !topics.is_empty() {
            topic_records.push((message.timestamp_ms, topics));
        }
    }

    result.longest_streak_days = longest_streak(sorted.iter().map(|m| m.timestamp_ms));

    for side in [Side::You, Side::Them] {
        let count = *response_counts.get(side);
        if count > 0 {
            let average = *response_totals.get(side) as f64 / count as f64;
            *result.response_time.get_mut(side) = format_response_time(average);
        }
    }

    result.interest_level = interest_levels(&result.message_count, &result.reaction_count);

    result.day_with_most_messages = busiest_day(day_counts.into_entries());

    for side in [Side::You, Side::Them] {
        let messages = *result.message_count.get(side);
        if messages > 0 {
            *result.average_message_length.get_mut(side) =
                *result.word_count.get(side) as f64 / messages as f64;
        }
    }

    result.top_words = top_words(word_counts.into_entries());

    let emoji_entries = emoji_counts.into_entries();
    result.top_emojis = top_emojis(&emoji_entries);

    result.monthly_activity = monthly_activity(&sorted);

    result.sentiment_over_time = analyze_sentiment(sorted.iter().copied());
    result.overall_mood = overall_mood(&result.sentiment_over_time);

    result.highlights = build_highlights(&result, &emoji_entries);
    result.topics_over_time = topics_by_month(&topic_records);

    let elapsed = timer.stop();
    info!(
        messages = sorted.len(),
        you = result.message_count.you,
        them = result.message_count.them,
        duration_ms = elapsed.as_millis(),
        "Analyzed chat export"
    );

    result
}

/// Distinct emojis in one message, in order of first appearance.
fn message_emojis(content: &str) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for m in EMOJI.find_iter(content) {
        let emoji = m.as_str();
        if emoji != "0" && !seen.contains(&emoji) {
            seen.push(emoji);
        }
    }
    seen
}

fn utc(timestamp_ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp_ms).unwrap_or_default()
}

/// `YYYY-MM-DD` in UTC.
#[must_use]
pub fn iso_date(timestamp_ms: i64) -> String {
    utc(timestamp_ms).format("%Y-%m-%d").to_string()
}

/// `YYYY-MM` in UTC.
#[must_use]
pub fn month_key(timestamp_ms: i64) -> String {
    utc(timestamp_ms).format("%Y-%m").to_string()
}

/// Longest run of consecutive UTC calendar days with at least one message.
#[must_use]
pub fn longest_streak(timestamps: impl IntoIterator<Item = i64>) -> u32 {
    let dates: BTreeSet<NaiveDate> = timestamps
        .into_iter()
        .map(|ts| utc(ts).date_naive())
        .collect();

    let mut best = 0u32;
    let mut current = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for date in dates {
        current = match previous {
            Some(prev) if (date - prev).num_days() == 1 => current + 1,
            _ => 1,
        };
        best = best.max(current);
        previous = Some(date);
    }

    best
}

/// Compact duration: the two largest non-zero units of d/h/m/s, or `"0s"`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_response_time(ms: f64) -> String {
    let total_seconds = (ms.abs() / 1000.0).floor() as u64;
    let minutes = total_seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let units = [
        (days, 'd'),
        (hours % 24, 'h'),
        (minutes % 60, 'm'),
        (total_seconds % 60, 's'),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(value, _)| *value > 0)
        .take(2)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// Parse a compact duration back into milliseconds.
///
/// Accepts the output of [`format_response_time`]; unknown units are
/// ignored.
#[must_use]
pub fn parse_response_time(formatted: &str) -> u64 {
    formatted
        .split_whitespace()
        .filter_map(|part| {
            let unit = part.chars().last()?;
            let value: u64 = part[..part.len() - unit.len_utf8()].parse().ok()?;
            let scale = match unit {
                'd' => 86_400_000,
                'h' => 3_600_000,
                'm' => 60_000,
                's' => 1_000,
                _ => return None,
            };
            Some(value * scale)
        })
        .sum()
}

#[allow(clippy::cast_precision_loss)]
fn interest_levels(messages: &PerSide<u64>, reactions: &PerSide<u64>) -> PerSide<f64> {
    let total_messages = messages.you + messages.them;
    let total_reactions = reactions.you + reactions.them;

    let share = |part: u64, total: u64| {
        if total > 0 {
            part as f64 / total as f64
        } else {
            0.0
        }
    };
    let level = |side: Side| {
        let blended = share(*messages.get(side), total_messages) * 0.7
            + share(*reactions.get(side), total_reactions) * 0.3;
        (blended * 100.0).min(100.0)
    };

    PerSide::new(level(Side::You), level(Side::Them))
}

fn busiest_day(days: Vec<(String, u64)>) -> BusiestDay {
    let mut best = BusiestDay::default();
    for (date, count) in days {
        if count > best.count {
            best = BusiestDay { date, count };
        }
    }
    best
}

fn top_words(words: Vec<(String, WordTally)>) -> Vec<WordCount> {
    let mut ranked: Vec<(String, WordTally)> = words
        .into_iter()
        .filter(|(word, _)| !TOP_WORD_EXCLUSIONS.contains(&word.as_str()))
        .collect();
    ranked.sort_by(|a, b| b.1.total.cmp(&a.1.total));
    ranked
        .into_iter()
        .take(TOP_WORDS)
        .map(|(word, tally)| WordCount {
            word,
            count: tally.total,
            you_count: tally.you,
            them_count: tally.them,
        })
        .collect()
}

fn top_emojis(emojis: &[(String, u64)]) -> Vec<EmojiCount> {
    let mut ranked: Vec<&(String, u64)> = emojis.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(TOP_EMOJIS)
        .map(|(emoji, count)| EmojiCount {
            emoji: emoji.clone(),
            count: *count,
        })
        .collect()
}

fn monthly_activity(sorted: &[&ChatMessage]) -> Vec<MonthlyActivity> {
    let mut months: BTreeMap<String, u64> = BTreeMap::new();
    for message in sorted {
        *months.entry(month_key(message.timestamp_ms)).or_default() += 1;
    }
    months
        .into_iter()
        .map(|(month, messages)| MonthlyActivity { month, messages })
        .collect()
}

fn build_highlights(result: &AnalysisResult, emojis: &[(String, u64)]) -> Vec<Highlight> {
    let mut highlights = Vec::new();

    if result.longest_streak_days > 1 {
        highlights.push(Highlight {
            kind: HighlightKind::Streak,
            description: format!(
                "Longest conversation streak: {} days",
                result.longest_streak_days
            ),
        });
    }

    let busiest = &result.day_with_most_messages;
    if busiest.count > 0 {
        highlights.push(Highlight {
            kind: HighlightKind::ActiveDay,
            description: format!(
                "Most active day: {} with {} messages",
                busiest.date, busiest.count
            ),
        });
    }

    if let Some((emoji, count)) = top_valid_emoji(emojis) {
        highlights.push(Highlight {
            kind: HighlightKind::TopEmoji,
            description: format!("Most used emoji: {emoji} ({count} times)"),
        });
    }

    if let Some(timestamp) = largest_sentiment_swing(result) {
        highlights.push(Highlight {
            kind: HighlightKind::SentimentChange,
            description: format!("Significant mood change detected on {}", iso_date(timestamp)),
        });
    }

    highlights
}

/// Highest-count emoji that still looks like an emoji; ties go to the
/// first one seen.
fn top_valid_emoji(emojis: &[(String, u64)]) -> Option<(&str, u64)> {
    let mut best: Option<(&str, u64)> = None;
    for (emoji, count) in emojis {
        let valid = *count > 0
            && emoji != "0"
            && !emoji.trim().is_empty()
            && EMOJI.is_match(emoji);
        if valid && best.is_none_or(|(_, top)| *count > top) {
            best = Some((emoji.as_str(), *count));
        }
    }
    best
}

/// Timestamp of the largest step-to-step sentiment change, if above 0.5.
fn largest_sentiment_swing(result: &AnalysisResult) -> Option<i64> {
    let series = &result.sentiment_over_time;
    let changes: Vec<f64> = std::iter::once(0.0)
        .chain(series.windows(2).map(|w| (w[1].sentiment - w[0].sentiment).abs()))
        .collect();

    let max = changes.iter().copied().fold(0.0f64, f64::max);
    if max <= SENTIMENT_CHANGE_THRESHOLD {
        return None;
    }

    // the change at index i belongs to the step arriving at entry i
    let index = changes.iter().position(|c| *c == max)?;
    series.get(index).map(|p| p.timestamp)
}

fn topics_by_month(records: &[(i64, Vec<String>)]) -> Vec<MonthlyTopics> {
    let mut months: OrderedTally<OrderedTally<u64>> = OrderedTally::default();
    for (timestamp, topics) in records {
        let month = months.entry(&month_key(*timestamp));
        for topic in topics {
            *month.entry(topic) += 1;
        }
    }

    months
        .into_entries()
        .into_iter()
        .map(|(month, tally)| {
            let mut ranked = tally.into_entries();
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            MonthlyTopics {
                month,
                topics: ranked
                    .into_iter()
                    .take(TOPICS_PER_MONTH)
                    .map(|(topic, _)| topic)
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MediaRef, MediaShared, Reaction, SharedLink};

    const BASE: i64 = 1_700_000_000_000; // 2023-11-14T22:13:20Z

    fn participants(a: &str, b: &str) -> Vec<Participant> {
        vec![
            Participant { name: a.to_string() },
            Participant { name: b.to_string() },
        ]
    }

    fn msg(sender: &str, ts: i64, content: &str) -> ChatMessage {
        ChatMessage {
            sender_name: sender.to_string(),
            timestamp_ms: ts,
            content: Some(content.to_string()),
            share: None,
            reactions: None,
            photos: None,
            videos: None,
        }
    }

    fn export(messages: Vec<ChatMessage>) -> ChatExport {
        // "alice" is not hex-like, so "bob" (index 1) becomes You
        ChatExport {
            participants: participants("alice", "bob"),
            messages,
            ..ChatExport::default()
        }
    }

    #[test]
    fn empty_export_is_zeroed() {
        let result = analyze_chat(&export(Vec::new()));
        assert_eq!(result.message_count, PerSide::new(0, 0));
        assert_eq!(result.response_time.you, "0s");
        assert_eq!(result.response_time.them, "0s");
        assert!(result.highlights.is_empty());
        assert!(result.thousandth_message_date.is_none());
    }

    #[test]
    fn single_thirty_second_reply() {
        let result = analyze_chat(&export(vec![
            msg("alice", BASE, "hi"),
            msg("bob", BASE + 30_000, "hello"),
        ]));
        assert_eq!(result.response_time.you, "30s");
        assert_eq!(result.response_time.them, "0s");
        assert_eq!(result.message_count, PerSide::new(1, 1));
    }

    #[test]
    fn heart_message_counts_emoji_words_and_sentiment() {
        let result = analyze_chat(&export(vec![msg("alice", BASE, "I love this ❤️ so much!!")]));
        assert_eq!(
            result.top_emojis,
            vec![EmojiCount { emoji: "❤️".to_string(), count: 1 }]
        );
        // whitespace tokens: I, love, this, ❤️, so, much!!
        assert_eq!(result.word_count.them, 6);
        assert_eq!(result.sentiment_over_time[0].sentiment, 1.0);
    }

    #[test]
    fn thousandth_message_is_recorded() {
        let messages: Vec<ChatMessage> = (0..1000)
            .map(|i| msg(if i % 2 == 0 { "alice" } else { "bob" }, BASE + i * 1000, "ok"))
            .rev()
            .collect();
        let result = analyze_chat(&export(messages));
        assert_eq!(result.thousandth_message_date, Some(BASE + 999 * 1000));

        let short = analyze_chat(&export(vec![msg("alice", BASE, "ok")]));
        assert!(short.thousandth_message_date.is_none());
    }

    #[test]
    fn streak_reports_longest_run() {
        let day = DAY_MS;
        let mut messages: Vec<ChatMessage> =
            (0..5).map(|i| msg("alice", BASE + i * day, "hey")).collect();
        // gap of two days, then a run of two
        messages.push(msg("bob", BASE + 7 * day, "back"));
        messages.push(msg("bob", BASE + 8 * day, "again"));

        let result = analyze_chat(&export(messages));
        assert_eq!(result.longest_streak_days, 5);
        assert_eq!(
            result.highlights[0].description,
            "Longest conversation streak: 5 days"
        );
    }

    #[test]
    fn side_resolution_tie_break() {
        let hex_first = SideResolver::from_participants(&participants("a1b2c3d4e5", "carol"));
        assert_eq!(hex_first.side_of("a1b2c3d4e5"), Side::You);
        assert_eq!(hex_first.side_of("carol"), Side::Them);

        let plain = SideResolver::from_participants(&participants("alice", "bob"));
        assert_eq!(plain.side_of("bob"), Side::You);
        assert_eq!(plain.side_of("alice"), Side::Them);

        let solo = SideResolver::from_participants(&[Participant { name: "solo".into() }]);
        assert_eq!(solo.side_of("solo"), Side::You);
        assert_eq!(solo.side_of("anyone"), Side::Them);

        let none = SideResolver::from_participants(&[]);
        assert_eq!(none.side_of("x"), Side::Them);
        assert!(none.you_name().is_none());
    }

    #[test]
    fn response_time_ignores_out_of_window_gaps() {
        let result = analyze_chat(&export(vec![
            msg("alice", BASE, "a"),
            msg("bob", BASE, "same instant"),
            msg("alice", BASE + DAY_MS, "a day later"),
        ]));
        assert_eq!(result.response_time.you, "0s");
        assert_eq!(result.response_time.them, "0s");
    }

    #[test]
    fn format_response_time_keeps_two_largest_units() {
        assert_eq!(format_response_time(0.0), "0s");
        assert_eq!(format_response_time(45_000.0), "45s");
        assert_eq!(format_response_time(90_500.0), "1m 30s");
        assert_eq!(format_response_time((2 * DAY_MS + 5 * 3_600_000 + 61_000) as f64), "2d 5h");
        assert_eq!(format_response_time(3_600_000.0 + 5_000.0), "1h 5s");
        assert_eq!(format_response_time(999.0), "0s");
    }

    #[test]
    fn parse_response_time_inverts_format() {
        assert_eq!(parse_response_time("0s"), 0);
        assert_eq!(parse_response_time("1m 30s"), 90_000);
        assert_eq!(parse_response_time("2d 5h"), 2 * 86_400_000 + 5 * 3_600_000);
        assert_eq!(parse_response_time("garbage"), 0);
    }

    #[test]
    fn interest_blends_messages_and_reactions() {
        let mut first = msg("alice", BASE, "hi");
        first.reactions = Some(vec![Reaction {
            reaction: "😂".to_string(),
            actor: "bob".to_string(),
            timestamp: None,
        }]);
        let result = analyze_chat(&export(vec![
            first,
            msg("bob", BASE + 1000, "yo"),
            msg("bob", BASE + 2000, "sup"),
        ]));
        // You: 2/3 messages, 1/1 reactions
        let expected_you = (2.0 / 3.0 * 0.7 + 0.3) * 100.0;
        assert!((result.interest_level.you - expected_you).abs() < 1e-9);
        assert!((result.interest_level.them - (1.0 / 3.0 * 0.7) * 100.0).abs() < 1e-9);
        assert_eq!(result.reaction_count, PerSide::new(1, 0));
        assert_eq!(result.top_emojis[0].emoji, "😂");
    }

    #[test]
    fn reaction_zero_is_not_an_emoji() {
        let mut message = msg("alice", BASE, "text");
        message.reactions = Some(vec![Reaction {
            reaction: "0".to_string(),
            actor: "alice".to_string(),
            timestamp: None,
        }]);
        let result = analyze_chat(&export(vec![message]));
        assert!(result.top_emojis.is_empty());
        assert_eq!(result.reaction_count.them, 1);
    }

    #[test]
    fn emojis_are_deduplicated_per_message() {
        let result = analyze_chat(&export(vec![
            msg("alice", BASE, "😂😂😂"),
            msg("bob", BASE + 1000, "😂 👍"),
        ]));
        assert_eq!(result.top_emojis[0], EmojiCount { emoji: "😂".into(), count: 2 });
        assert_eq!(result.top_emojis[1], EmojiCount { emoji: "👍".into(), count: 1 });
        assert!(result
            .highlights
            .iter()
            .any(|h| h.description == "Most used emoji: 😂 (2 times)"));
    }

    #[test]
    fn top_words_strip_punctuation_and_exclusions() {
        let result = analyze_chat(&export(vec![
            msg("alice", BASE, "pizza, pizza! that that that with with"),
            msg("bob", BASE + 1000, "Pizza tonight?"),
        ]));
        let pizza = &result.top_words[0];
        assert_eq!(pizza.word, "pizza");
        assert_eq!(pizza.count, 3);
        assert_eq!(pizza.you_count, 1);
        assert_eq!(pizza.them_count, 2);
        assert!(result.top_words.iter().all(|w| w.word != "that" && w.word != "with"));
        assert_eq!(result.top_words[1].word, "tonight");
    }

    #[test]
    fn media_links_and_longest_message() {
        let mut shared = msg("alice", BASE, "look");
        shared.share = Some(SharedLink {
            link: Some("https://example.com".into()),
            share_text: None,
        });
        let mut photo = msg("bob", BASE + 1000, "a much longer message here");
        photo.photos = Some(vec![MediaRef::default()]);
        let mut video = msg("bob", BASE + 2000, "a much longer message also");
        video.videos = Some(vec![MediaRef::default()]);

        let result = analyze_chat(&export(vec![shared, photo, video]));
        assert_eq!(result.shared_links, 1);
        assert_eq!(result.media_shared, MediaShared { images: 1, videos: 1 });
        // equal lengths keep the first
        assert_eq!(result.longest_message.length, 26);
        assert_eq!(result.longest_message.date, BASE + 1000);
    }

    #[test]
    fn busiest_day_and_months_use_utc() {
        let result = analyze_chat(&export(vec![
            msg("alice", BASE, "a"),
            msg("bob", BASE + 1000, "b"),
            msg("alice", BASE + 40 * DAY_MS, "c"),
        ]));
        assert_eq!(result.day_with_most_messages.date, "2023-11-14");
        assert_eq!(result.day_with_most_messages.count, 2);
        let months: Vec<&str> = result.monthly_activity.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2023-11", "2023-12"]);
    }

    #[test]
    fn sentiment_change_highlight() {
        let result = analyze_chat(&export(vec![
            msg("alice", BASE, "fine"),
            msg("bob", BASE + DAY_MS, "happy great love"),
        ]));
        let expected = format!("Significant mood change detected on {}", iso_date(BASE + DAY_MS));
        assert!(result.highlights.iter().any(|h| h.description == expected));

        let calm = analyze_chat(&export(vec![msg("alice", BASE, "good")]));
        assert!(calm
            .highlights
            .iter()
            .all(|h| h.kind != HighlightKind::SentimentChange));
    }

    #[test]
    fn topics_are_bucketed_by_month() {
        let result = analyze_chat(&export(vec![
            msg("alice", BASE, "pizza pizza movie"),
            msg("bob", BASE + 1000, "pizza tonight"),
            msg("alice", BASE + 40 * DAY_MS, "holiday plans"),
        ]));
        assert_eq!(result.topics_over_time.len(), 2);
        assert_eq!(result.topics_over_time[0].month, "2023-11");
        assert_eq!(result.topics_over_time[0].topics[0], "pizza");
        assert_eq!(result.topics_over_time[1].topics, vec!["holiday", "plans"]);
    }

    #[test]
    fn extreme_timestamps_are_response_outliers() {
        let result = analyze_chat(&export(vec![
            msg("alice", i64::MIN, "first"),
            msg("bob", i64::MAX, "last"),
        ]));
        assert_eq!(result.total_messages(), 2);
        assert_eq!(result.response_time.you, "0s");
        assert_eq!(result.response_time.them, "0s");
    }

    #[test]
    fn invariants_hold_on_mixed_export() {
        let messages: Vec<ChatMessage> = (0..50)
            .map(|i| {
                let sender = if i % 3 == 0 { "alice" } else { "bob" };
                msg(sender, BASE + (50 - i) * 3_600_000, "love this amazing chat 😀 🎉 lol")
            })
            .collect();
        let data = export(messages);
        let first = analyze_chat(&data);
        let second = analyze_chat(&data);

        assert_eq!(first, second);
        assert_eq!(first.sentiment_over_time.len(), 50);
        assert_eq!(first.total_messages(), 50);
        assert!((0.0..=100.0).contains(&first.interest_level.you));
        assert!((0.0..=100.0).contains(&first.interest_level.them));
        assert!(first.top_emojis.len() <= 5);
        assert!(first.top_words.len() <= 10);
        assert!(first.monthly_activity.windows(2).all(|w| w[0].month <= w[1].month));
        assert!(first
            .sentiment_over_time
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
