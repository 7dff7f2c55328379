//! Terminal rendering for analyses, screenshots and comparisons.
//!
//! Every function returns a `String` so the CLI decides where output goes
//! and tests can assert on content. Colors come from `colored`; `main`
//! turns them off when `output.colors` is false.

use crate::analysis::iso_date;
use crate::insights::{ChatComparison, ChatTip, mood_label};
use crate::model::{
    AnalysisResult, PerSide, ScreenshotAnalysis, StoredAnalysisSummary, ToneCategory,
};
use crate::{format_number_u64, format_relative_date};
use colored::Colorize;
use itertools::Itertools;
use std::fmt::Write as _;

/// Width of wrapped prose.
const WRAP_WIDTH: usize = 76;

/// Width of horizontal bars.
const BAR_WIDTH: usize = 20;

/// Width of sparklines.
const SPARK_WIDTH: usize = 48;

const PREMIUM_NOTICE: &str = "Highlight, topic and tip sections are premium features. \
                              Enable them with 'chatlens config --set features.premium=true'.";

/// What to include in a rendered report.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub premium: bool,
    pub top_words: usize,
    pub top_emojis: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            premium: true,
            top_words: 10,
            top_emojis: 5,
        }
    }
}

impl From<&crate::config::Config> for ReportOptions {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            premium: config.features.premium,
            top_words: config.analysis.top_words,
            top_emojis: config.analysis.top_emojis,
        }
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title.bold().cyan());
}

fn row(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {label:<18} {value}");
}

fn per_side(values: &PerSide<u64>) -> String {
    format!(
        "You {}  Them {}",
        format_number_u64(values.you).cyan(),
        format_number_u64(values.them).cyan()
    )
}

/// Full report for one chat.
#[must_use]
pub fn render_analysis(analysis: &AnalysisResult, options: &ReportOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Chat Analysis".bold().cyan());

    let total = analysis.total_messages();
    row(
        &mut out,
        "Messages:",
        format!("{}  (total {})", per_side(&analysis.message_count), format_number_u64(total)),
    );
    if total == 0 {
        let _ = writeln!(out, "\n  {}", "No messages to analyze.".dimmed());
        return out;
    }

    row(
        &mut out,
        "Response time:",
        format!(
            "You {}  Them {}",
            analysis.response_time.you.cyan(),
            analysis.response_time.them.cyan()
        ),
    );
    row(&mut out, "Words:", per_side(&analysis.word_count));
    row(
        &mut out,
        "Avg length:",
        format!(
            "You {:.1}  Them {:.1} words",
            analysis.average_message_length.you, analysis.average_message_length.them
        ),
    );
    row(&mut out, "Reactions:", per_side(&analysis.reaction_count));
    row(
        &mut out,
        "Shared:",
        format!(
            "{} links, {} images, {} videos",
            analysis.shared_links, analysis.media_shared.images, analysis.media_shared.videos
        ),
    );

    heading(&mut out, "Timeline");
    row(&mut out, "First message:", iso_date(analysis.first_message_date));
    row(
        &mut out,
        "Busiest day:",
        format!(
            "{} ({} messages)",
            analysis.day_with_most_messages.date, analysis.day_with_most_messages.count
        ),
    );
    row(
        &mut out,
        "Longest streak:",
        format!("{} days", analysis.longest_streak_days),
    );
    row(
        &mut out,
        "Longest message:",
        format!(
            "{} chars on {}",
            analysis.longest_message.length,
            iso_date(analysis.longest_message.date)
        ),
    );
    if let Some(date) = analysis.thousandth_message_date {
        row(&mut out, "1000th message:", iso_date(date));
    }
    if let (Some(first), Some(last)) = (
        analysis.monthly_activity.first(),
        analysis.monthly_activity.last(),
    ) {
        let counts: Vec<u64> = analysis.monthly_activity.iter().map(|m| m.messages).collect();
        let _ = writeln!(
            out,
            "  {:<18} {} {} .. {}",
            "Monthly:",
            sparkline(&counts, SPARK_WIDTH).green(),
            first.month,
            last.month
        );
    }

    heading(&mut out, "Interest & Mood");
    out.push_str(&interest_bars(&analysis.interest_level));
    let mood = mood_label(analysis.overall_mood);
    row(
        &mut out,
        "Overall mood:",
        format!("{:.2} ({mood})", analysis.overall_mood),
    );
    if !analysis.sentiment_over_time.is_empty() {
        let values: Vec<f64> = analysis
            .sentiment_over_time
            .iter()
            .map(|p| p.sentiment)
            .collect();
        row(&mut out, "Sentiment:", sparkline_signed(&values, SPARK_WIDTH).yellow());
    }

    if !analysis.top_words.is_empty() && options.top_words > 0 {
        heading(&mut out, "Top Words");
        for word in analysis.top_words.iter().take(options.top_words) {
            let _ = writeln!(
                out,
                "  {:<16} {:>6}  (you {}, them {})",
                word.word,
                word.count,
                word.you_count,
                word.them_count
            );
        }
    }

    if !analysis.top_emojis.is_empty() && options.top_emojis > 0 {
        heading(&mut out, "Top Emojis");
        let line = analysis
            .top_emojis
            .iter()
            .take(options.top_emojis)
            .map(|e| format!("{} {}", e.emoji, e.count))
            .join("   ");
        let _ = writeln!(out, "  {line}");
    }

    if options.premium {
        if !analysis.highlights.is_empty() {
            heading(&mut out, "Highlights");
            for highlight in &analysis.highlights {
                out.push_str(&bullet(&highlight.description));
            }
        }
        if !analysis.topics_over_time.is_empty() {
            heading(&mut out, "Topics Over Time");
            for month in &analysis.topics_over_time {
                let _ = writeln!(out, "  {:<8} {}", month.month, month.topics.join(", "));
            }
        }
    } else {
        let _ = writeln!(out, "\n{}", textwrap::fill(PREMIUM_NOTICE, WRAP_WIDTH).dimmed());
    }

    out
}

/// Tips section; a notice instead when premium features are off.
#[must_use]
pub fn render_tips(tips: &[ChatTip], options: &ReportOptions) -> String {
    let mut out = String::new();
    heading(&mut out, "Tips");
    if !options.premium {
        let _ = writeln!(out, "{}", textwrap::fill(PREMIUM_NOTICE, WRAP_WIDTH).dimmed());
        return out;
    }
    for tip in tips {
        let _ = writeln!(out, "  {}", tip.title.bold());
        let body = textwrap::Options::new(WRAP_WIDTH)
            .initial_indent("    ")
            .subsequent_indent("    ");
        let _ = writeln!(out, "{}", textwrap::fill(&tip.description, body));
    }
    out
}

/// Report for one analyzed screenshot.
#[must_use]
pub fn render_screenshot(analysis: &ScreenshotAnalysis, options: &ReportOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Screenshot Analysis".bold().cyan());
    let preview = textwrap::Options::new(WRAP_WIDTH)
        .initial_indent("  | ")
        .subsequent_indent("  | ");
    let _ = writeln!(out, "{}", textwrap::fill(&analysis.text, preview).dimmed());

    let m = &analysis.metrics;
    heading(&mut out, "Metrics");
    row(&mut out, "Lines:", m.message_count);
    row(&mut out, "Words per line:", format!("{:.1}", m.average_length));
    row(&mut out, "Sentiment:", format!("{:+.2}", m.sentiment));
    row(&mut out, "Emojis:", m.emojis);
    row(&mut out, "Questions:", m.questions);
    row(&mut out, "Exclamations:", m.exclamations);
    row(&mut out, "Links:", m.links);
    let t = &m.time_of_day;
    row(
        &mut out,
        "Time of day:",
        format!(
            "morning {}, afternoon {}, evening {}, night {}",
            t.morning, t.afternoon, t.evening, t.night
        ),
    );

    let s = &analysis.patterns.message_structure;
    heading(&mut out, "Structure");
    row(
        &mut out,
        "Lines:",
        format!(
            "{} questions, {} exclamations, {} statements",
            s.questions, s.exclamations, s.statements
        ),
    );
    row(
        &mut out,
        "Openers/closers:",
        format!("{} greetings, {} farewells", s.greetings, s.farewells),
    );

    if !analysis.patterns.common.is_empty() {
        heading(&mut out, "Repeated Phrases");
        for pattern in &analysis.patterns.common {
            let _ = writeln!(out, "  {:<32} x{}", pattern.phrase, pattern.count);
        }
    }

    heading(&mut out, "Tone");
    match &analysis.tone {
        Some(tone) => {
            row(
                &mut out,
                "Overall:",
                format!("{} ({:.0}% confidence)", tone.overall.as_str().bold(), tone.confidence),
            );
            for category in ToneCategory::ALL {
                let pct = tone.percentage(category);
                let _ = writeln!(
                    out,
                    "  {:<18} {} {pct:>5.1}%",
                    format!("{category}:"),
                    bar(pct, 100.0, BAR_WIDTH)
                );
            }
        }
        None => {
            let _ = writeln!(out, "  {}", "Not enough words to classify tone.".dimmed());
        }
    }

    heading(&mut out, "Tips");
    if options.premium {
        for tip in &analysis.ai_tips {
            out.push_str(&bullet(tip));
        }
    } else {
        let _ = writeln!(out, "{}", textwrap::fill(PREMIUM_NOTICE, WRAP_WIDTH).dimmed());
    }

    out
}

/// Two analyses side by side.
#[must_use]
pub fn render_comparison(comparison: &ChatComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Chat Comparison".bold().cyan());
    let _ = writeln!(out, "  {:<18} {:>12} {:>12} {:>10}", "", "first", "second", "change");

    let (a, b) = (&comparison.first, &comparison.second);
    let _ = writeln!(
        out,
        "  {:<18} {:>12} {:>12} {:>+10}",
        "Messages:",
        format_number_u64(a.total_messages),
        format_number_u64(b.total_messages),
        comparison.total_messages_delta
    );
    let _ = writeln!(
        out,
        "  {:<18} {:>12.1} {:>12.1} {:>+10.1}",
        "Interest (you):", a.interest_level.you, b.interest_level.you, comparison.interest_delta.you
    );
    let _ = writeln!(
        out,
        "  {:<18} {:>12.1} {:>12.1} {:>+10.1}",
        "Interest (them):",
        a.interest_level.them,
        b.interest_level.them,
        comparison.interest_delta.them
    );
    let _ = writeln!(
        out,
        "  {:<18} {:>12.2} {:>12.2} {:>+10.2}",
        "Mood:", a.overall_mood, b.overall_mood, comparison.mood_delta
    );
    let _ = writeln!(
        out,
        "  {:<18} {:>12} {:>12}",
        "Mood label:",
        a.mood.to_string(),
        b.mood.to_string()
    );
    let _ = writeln!(
        out,
        "  {:<18} {:>12} {:>12}",
        "Longest streak:", a.longest_streak_days, b.longest_streak_days
    );
    out
}

/// Table of stored analyses.
#[must_use]
pub fn render_saved_list(summaries: &[StoredAnalysisSummary]) -> String {
    if summaries.is_empty() {
        return format!(
            "{}\nRun {} to store one.\n",
            "No saved analyses.".yellow(),
            "chatlens analyze <export> --save".bold()
        );
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", "Saved Analyses".bold().cyan());
    for summary in summaries {
        let _ = writeln!(
            out,
            "  {}  {:>10} messages  {}",
            summary.id.cyan(),
            format_number_u64(summary.total_messages),
            format_relative_date(summary.stored_at).dimmed()
        );
    }
    out
}

fn bullet(text: &str) -> String {
    let options = textwrap::Options::new(WRAP_WIDTH)
        .initial_indent("  - ")
        .subsequent_indent("    ");
    format!("{}\n", textwrap::fill(text, options))
}

fn interest_bars(levels: &PerSide<f64>) -> String {
    format!(
        "  {:<18} {} {:>5.1}\n  {:<18} {} {:>5.1}\n",
        "Interest (you):",
        bar(levels.you, 100.0, BAR_WIDTH).green(),
        levels.you,
        "Interest (them):",
        bar(levels.them, 100.0, BAR_WIDTH).magenta(),
        levels.them
    )
}

/// Horizontal bar of `value / max` scaled to `width` cells.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn bar(value: f64, max: f64, width: usize) -> String {
    let filled = if max > 0.0 && value > 0.0 {
        ((value / max).min(1.0) * width as f64).round() as usize
    } else {
        0
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Generate an ASCII sparkline from a slice of values.
///
/// Uses Unicode block characters `▁▂▃▄▅▆▇█`. When there are more values than
/// `width`, consecutive values are averaged into buckets.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn sparkline(values: &[u64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let blocks = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    let bucketed: Vec<u64> = if values.len() <= width {
        values.to_vec()
    } else {
        let bucket_size = values.len().div_ceil(width);
        values
            .chunks(bucket_size)
            .map(|chunk| chunk.iter().sum::<u64>() / chunk.len() as u64)
            .collect()
    };

    let max = bucketed.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return "▁".repeat(bucketed.len().min(width));
    }

    bucketed
        .iter()
        .take(width)
        .map(|&v| {
            let idx = ((v as f64 / max as f64) * 7.0) as usize;
            blocks[idx.min(7)]
        })
        .collect()
}

/// Sparkline for values that may be negative; the lowest value maps to `▁`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sparkline_signed(values: &[f64], width: usize) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if !min.is_finite() {
        return String::new();
    }
    let shifted: Vec<u64> = values
        .iter()
        .map(|v| ((v - min) * 1000.0).round() as u64)
        .collect();
    sparkline(&shifted, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{chat_tips, compare};
    use crate::model::{Highlight, HighlightKind, MonthlyTopics};
    use crate::screenshot::analyze_screenshot_text;

    fn plain() {
        colored::control::set_override(false);
    }

    fn sample() -> AnalysisResult {
        AnalysisResult {
            message_count: PerSide::new(12, 8),
            highlights: vec![Highlight {
                kind: HighlightKind::Streak,
                description: "You chatted 4 days in a row!".to_string(),
            }],
            topics_over_time: vec![MonthlyTopics {
                month: "2024-01".to_string(),
                topics: vec!["pizza".to_string()],
            }],
            ..AnalysisResult::default()
        }
    }

    #[test]
    fn test_sparkline_empty() {
        assert_eq!(sparkline(&[], 10), "");
    }

    #[test]
    fn test_sparkline_values() {
        let result = sparkline(&[1, 5, 10, 8, 3, 1], 6);
        assert_eq!(result.chars().count(), 6);
        assert!(result.contains('█'));
        assert!(result.contains('▁'));
    }

    #[test]
    fn test_sparkline_all_zeros() {
        assert_eq!(sparkline(&[0, 0, 0, 0], 4), "▁▁▁▁");
    }

    #[test]
    fn test_sparkline_bucketing() {
        let values: Vec<u64> = (1..=12).collect();
        assert_eq!(sparkline(&values, 6).chars().count(), 6);
    }

    #[test]
    fn test_sparkline_signed_handles_negatives() {
        let line = sparkline_signed(&[-3.0, 0.0, 2.0], 3);
        assert_eq!(line, "▁▅█");
        assert_eq!(sparkline_signed(&[], 3), "");
    }

    #[test]
    fn test_bar_clamps() {
        assert_eq!(bar(50.0, 100.0, 4), "██░░");
        assert_eq!(bar(250.0, 100.0, 4), "████");
        assert_eq!(bar(-1.0, 100.0, 4), "░░░░");
        assert_eq!(bar(1.0, 0.0, 2), "░░");
    }

    #[test]
    fn test_premium_sections_shown() {
        plain();
        let text = render_analysis(&sample(), &ReportOptions::default());
        assert!(text.contains("Highlights"));
        assert!(text.contains("You chatted 4 days in a row!"));
        assert!(text.contains("2024-01"));
        assert!(!text.contains("premium features"));
    }

    #[test]
    fn test_non_premium_hides_sections() {
        plain();
        let options = ReportOptions {
            premium: false,
            ..ReportOptions::default()
        };
        let analysis = sample();
        let text = render_analysis(&analysis, &options);
        assert!(!text.contains("Highlights"));
        assert!(!text.contains("days in a row"));
        assert!(!text.contains("Topics Over Time"));
        assert!(text.contains("premium features"));

        let tips = render_tips(&chat_tips(&analysis), &options);
        assert!(tips.contains("premium features"));
        assert!(!tips.contains("Conversation Flow"));
    }

    #[test]
    fn test_empty_analysis_renders_notice() {
        plain();
        let text = render_analysis(&AnalysisResult::default(), &ReportOptions::default());
        assert!(text.contains("No messages to analyze."));
    }

    #[test]
    fn test_render_tips_lists_titles() {
        plain();
        let tips = chat_tips(&AnalysisResult::default());
        let text = render_tips(&tips, &ReportOptions::default());
        assert!(text.contains("Conversation Flow"));
    }

    #[test]
    fn test_render_screenshot_sections() {
        plain();
        let analysis = analyze_screenshot_text("Hello there!\nhow are you?\nbye").unwrap();
        let text = render_screenshot(&analysis, &ReportOptions::default());
        for section in ["Metrics", "Structure", "Tone", "Tips"] {
            assert!(text.contains(section), "missing {section}");
        }
    }

    #[test]
    fn test_render_comparison() {
        plain();
        let a = sample();
        let mut b = sample();
        b.message_count = PerSide::new(30, 20);
        let text = render_comparison(&compare(&a, &b));
        assert!(text.contains("+30"));
        assert!(text.contains("Mood label:"));
    }

    #[test]
    fn test_render_empty_saved_list() {
        plain();
        assert!(render_saved_list(&[]).contains("No saved analyses."));
    }
}
