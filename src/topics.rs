//! Per-message keyword extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Runs of non-word characters (ASCII word definition).
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid regex"));

/// Words too common to count as topics.
const COMMON_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
    "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
    "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me",
];

/// Maximum topics returned per message.
pub const TOPICS_PER_MESSAGE: usize = 3;

/// Top keywords of a message by frequency.
///
/// Keeps lowercased tokens longer than 3 characters that are not common
/// words. Ties keep first-occurrence order.
#[must_use]
pub fn extract_topics(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut order: Vec<(&str, u32)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for word in NON_WORD.split(&lowered) {
        if word.len() <= 3 || COMMON_WORDS.contains(&word) {
            continue;
        }
        if let Some(&slot) = index.get(word) {
            order[slot].1 += 1;
        } else {
            index.insert(word, order.len());
            order.push((word, 1));
        }
    }

    // sort_by is stable, so equal counts stay in first-seen order
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
        .into_iter()
        .take(TOPICS_PER_MESSAGE)
        .map(|(word, _)| word.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_most_frequent_long_words() {
        let topics = extract_topics("Pizza tonight? pizza is the best, PIZZA forever. Movie tonight");
        assert_eq!(topics, vec!["pizza", "tonight", "best"]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        assert_eq!(
            extract_topics("zebra apple mango kiwis"),
            vec!["zebra", "apple", "mango"]
        );
    }

    #[test]
    fn short_and_common_words_are_dropped() {
        assert!(extract_topics("the cat and a dog ran").is_empty());
        assert!(extract_topics("").is_empty());
        assert!(extract_topics("about which their there would").is_empty());
    }

    #[test]
    fn splits_on_punctuation_and_emoji() {
        assert_eq!(extract_topics("coffee❤️coffee...later"), vec!["coffee", "later"]);
    }
}
