//! Repeated-phrase mining and per-line structure classification for OCR text.

use crate::model::{MessageStructure, PhrasePattern};
use crate::text::{clean_text, remove_stop_words, tokenize};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static PHRASE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9\s]+$").expect("valid regex"));

static GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(hi|hey|hello|good (morning|afternoon|evening)|yo|sup)").expect("valid regex")
});

static FAREWELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(bye|goodbye|see you|talk|later|good night)").expect("valid regex")
});

const WINDOW_SIZES: std::ops::RangeInclusive<usize> = 3..=5;
const MIN_PHRASE_LEN: usize = 5;
const CONTEXT_RADIUS: usize = 3;
const MAX_PATTERNS: usize = 10;

/// Phrases of 3 to 5 significant words that occur more than once.
///
/// Windows slide over the stop-word-filtered tokens; the final window
/// position of each size is not visited. Context snippets are cut from the
/// unfiltered token list at the same index, so they are approximate when
/// stop words were removed. Results are sorted by count (stable) and capped
/// at 10.
#[must_use]
pub fn find_patterns(text: &str) -> Vec<PhrasePattern> {
    let words = tokenize(&clean_text(text));
    let significant = remove_stop_words(&words);

    let mut patterns: Vec<PhrasePattern> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for size in WINDOW_SIZES {
        for start in 0..significant.len().saturating_sub(size) {
            let phrase = significant[start..start + size].join(" ");
            if phrase.len() < MIN_PHRASE_LEN || !PHRASE_CHARS.is_match(&phrase) {
                continue;
            }

            let context = context_window(&words, start, size);
            if let Some(&slot) = index.get(&phrase) {
                let pattern = &mut patterns[slot];
                pattern.count += 1;
                if !pattern.context.contains(&context) {
                    pattern.context.push(context);
                }
            } else {
                index.insert(phrase.clone(), patterns.len());
                patterns.push(PhrasePattern {
                    phrase,
                    count: 1,
                    context: vec![context],
                });
            }
        }
    }

    patterns.retain(|p| p.count > 1);
    patterns.sort_by(|a, b| b.count.cmp(&a.count));
    patterns.truncate(MAX_PATTERNS);
    patterns
}

fn context_window(words: &[String], start: usize, size: usize) -> String {
    let from = start.saturating_sub(CONTEXT_RADIUS).min(words.len());
    let to = (start + size + CONTEXT_RADIUS).min(words.len());
    words[from..to].join(" ")
}

/// Classify each non-blank line as question, exclamation or statement and
/// flag greeting/farewell openers independently.
#[must_use]
pub fn analyze_message_structure(text: &str) -> MessageStructure {
    let mut structure = MessageStructure::default();

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        if line.contains('?') {
            structure.questions += 1;
        } else if line.contains('!') {
            structure.exclamations += 1;
        } else {
            structure.statements += 1;
        }

        let trimmed = line.trim();
        if GREETING.is_match(trimmed) {
            structure.greetings += 1;
        }
        if FAREWELL.is_match(trimmed) {
            structure.farewells += 1;
        }
    }

    structure
}
