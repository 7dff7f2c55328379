//! Text normalization primitives shared by the pattern, topic and tone
//! analyzers.
//!
//! All functions here are total: any input string produces an output.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Characters outside ASCII word characters, whitespace and `. , ! ? @ # $ % & * ( ) -`.
static DISALLOWED_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s.,!?@#$%&*()\-]").expect("valid regex"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// English function words dropped before phrase mining.
pub const STOP_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
    "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
    "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "when", "make",
    "can", "like", "time", "no", "just", "him", "know", "take", "people", "into", "year", "your",
    "good", "some", "could", "them", "see", "other", "than", "then", "now", "look", "only",
    "come", "its", "over", "think", "also", "back", "after", "use", "two", "how", "our", "work",
    "first", "well", "way", "even", "new", "want", "because", "any", "these", "give", "day",
    "most",
];

static STOP_WORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Replace disallowed characters with spaces, collapse whitespace, trim.
///
/// Idempotent: `clean_text(&clean_text(s)) == clean_text(s)`.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let replaced = DISALLOWED_CHARS.replace_all(text, " ");
    let collapsed = WHITESPACE_RUN.replace_all(&replaced, " ");
    collapsed.trim().to_string()
}

/// Lowercase and split on whitespace, dropping empty tokens.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Drop stop words, preserving order.
#[must_use]
pub fn remove_stop_words(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .filter(|token| !is_stop_word(token))
        .cloned()
        .collect()
}

/// Whether `word` (already lowercased) is a stop word.
#[must_use]
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORD_SET.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_and_collapses() {
        assert_eq!(clean_text("  hello   world  "), "hello world");
        assert_eq!(clean_text("hi ❤️ there"), "hi there");
        assert_eq!(clean_text("a+b=c"), "a b c");
        assert_eq!(clean_text("wow!! (really?) #tag @me"), "wow!! (really?) #tag @me");
    }

    #[test]
    fn clean_text_keeps_newlines_out() {
        assert_eq!(clean_text("line one\nline two"), "line one line two");
    }

    #[test]
    fn clean_text_is_idempotent() {
        let samples = [
            "",
            "   ",
            "I love this ❤️ so much!!",
            "tabs\tand\nnewlines\r\nmixed",
            "émoji café — naïve «quotes» 12:30pm",
            "$100 & 50% off*",
        ];
        for sample in samples {
            let once = clean_text(sample);
            assert_eq!(clean_text(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn tokenize_lowercases_and_drops_empty() {
        assert_eq!(tokenize("  Hello   WORLD "), vec!["hello", "world"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn remove_stop_words_preserves_order() {
        let tokens = tokenize("the cat sat on the mat with you");
        assert_eq!(remove_stop_words(&tokens), vec!["cat", "sat", "mat"]);
    }
}
