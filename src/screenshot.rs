//! Screenshot analysis pipeline.
//!
//! Image bytes are validated (JPEG, PNG or WebP under a size cap), handed
//! to an [`OcrEngine`], and the extracted text is analyzed for metrics,
//! repeated phrases, per-line structure and tone. Counts that depend on
//! characters the cleaner strips (emoji, links, sentiment emoji) are taken
//! from the NFC-normalized text; everything line- or word-based uses the
//! cleaned lines.

use crate::analysis::EMOJI;
use crate::error::{ChatlensError, Result};
use crate::model::{
    PatternSummary, ScreenshotAnalysis, ScreenshotMetrics, TimeOfDay, ToneAnalysis,
};
use crate::ocr::OcrEngine;
use crate::patterns::{analyze_message_structure, find_patterns};
use crate::perf::{ANALYZE_SCREENSHOT, Timer};
use crate::sentiment::blob_sentiment;
use crate::text::clean_text;
use crate::tone::try_analyze_tone;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("valid regex"));

static MORNING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([6-9]|1[0-1])\s*(am|AM)\b").expect("valid regex"));
static AFTERNOON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(1[2-5])\s*(pm|PM)\b").expect("valid regex"));
static EVENING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([6-9])\s*(pm|PM)\b").expect("valid regex"));
static NIGHT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(1[0-1])\s*(pm|PM)|1[2-5]\s*(am|AM)\b").expect("valid regex")
});

/// Default image size cap.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

const PREVIEW_CHARS: usize = 200;
const MAX_TIPS: usize = 5;

/// Image containers accepted for OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    /// Detect the container from its magic bytes.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }
}

/// Check type and size before spending time on OCR.
///
/// # Errors
///
/// [`ChatlensError::ImageTooLarge`] above `max_bytes`,
/// [`ChatlensError::UnsupportedImage`] for anything but JPEG/PNG/WebP.
pub fn validate_image(bytes: &[u8], max_bytes: u64) -> Result<ImageKind> {
    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(ChatlensError::ImageTooLarge {
            size,
            limit: max_bytes,
        });
    }
    ImageKind::detect(bytes).ok_or_else(|| ChatlensError::UnsupportedImage {
        detected: describe_unknown(bytes),
    })
}

/// Read an image file, checking its size on disk before loading it.
///
/// # Errors
///
/// IO errors, or [`ChatlensError::ImageTooLarge`] when the file exceeds
/// `max_bytes`.
pub fn read_image(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let size = std::fs::metadata(path)
        .map_err(|e| ChatlensError::path_error("read", path, e))?
        .len();
    if size > max_bytes {
        return Err(ChatlensError::ImageTooLarge {
            size,
            limit: max_bytes,
        });
    }
    std::fs::read(path).map_err(|e| ChatlensError::path_error("read", path, e))
}

fn describe_unknown(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "empty file".to_string();
    }
    let head: Vec<String> = bytes.iter().take(4).map(|b| format!("{b:02x}")).collect();
    format!("magic bytes {}", head.join(" "))
}

/// Validate, OCR and analyze a screenshot.
///
/// # Errors
///
/// Validation errors, OCR failures, or [`ChatlensError::NoTextExtracted`]
/// when OCR produced only whitespace.
pub fn analyze_screenshot(
    image: &[u8],
    engine: &dyn OcrEngine,
    language: &str,
    max_bytes: u64,
    progress: &mut dyn FnMut(u8),
) -> Result<ScreenshotAnalysis> {
    let kind = validate_image(image, max_bytes)?;
    debug!(mime = kind.mime_type(), bytes = image.len(), "Screenshot accepted");

    let text = engine.recognize(image, language, progress)?;
    analyze_screenshot_text(&text)
}

/// Analyze text already extracted from a screenshot.
///
/// # Errors
///
/// Returns [`ChatlensError::NoTextExtracted`] for empty or whitespace-only
/// input.
#[allow(clippy::cast_precision_loss)]
pub fn analyze_screenshot_text(raw: &str) -> Result<ScreenshotAnalysis> {
    if raw.trim().is_empty() {
        return Err(ChatlensError::NoTextExtracted);
    }
    let timer = Timer::start(ANALYZE_SCREENSHOT);

    let normalized: String = raw.nfc().collect();
    let lines: Vec<String> = normalized
        .lines()
        .map(clean_text)
        .filter(|line| !line.is_empty())
        .collect();
    let cleaned = lines.join("\n");

    let word_count = cleaned.split_whitespace().count();
    let message_count = lines.len() as u64;
    let average_length = if lines.is_empty() {
        0.0
    } else {
        word_count as f64 / lines.len() as f64
    };

    let metrics = ScreenshotMetrics {
        message_count,
        average_length,
        sentiment: blob_sentiment(&normalized),
        emojis: EMOJI.find_iter(&normalized).count() as u64,
        questions: normalized.matches('?').count() as u64,
        exclamations: normalized.matches('!').count() as u64,
        links: LINK.find_iter(&normalized).count() as u64,
        time_of_day: TimeOfDay {
            morning: MORNING.find_iter(&normalized).count() as u64,
            afternoon: AFTERNOON.find_iter(&normalized).count() as u64,
            evening: EVENING.find_iter(&normalized).count() as u64,
            night: NIGHT.find_iter(&normalized).count() as u64,
        },
    };

    let patterns = PatternSummary {
        common: find_patterns(&cleaned),
        message_structure: analyze_message_structure(&cleaned),
    };

    let tone = match try_analyze_tone(&cleaned) {
        Ok(tone) => Some(tone),
        Err(e) => {
            warn!(error = %e, "Tone analysis skipped");
            None
        }
    };

    let ai_tips = screenshot_tips(&metrics, tone.as_ref());

    let elapsed = timer.stop();
    info!(
        lines = message_count,
        patterns = patterns.common.len(),
        tips = ai_tips.len(),
        duration_ms = elapsed.as_millis(),
        "Analyzed screenshot text"
    );

    Ok(ScreenshotAnalysis {
        text: preview(&cleaned),
        metrics,
        patterns,
        tone,
        ai_tips,
    })
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// Threshold-driven advice, at most five entries.
///
/// Ratio tips are skipped when no text lines survived cleaning.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn screenshot_tips(metrics: &ScreenshotMetrics, tone: Option<&ToneAnalysis>) -> Vec<String> {
    let mut tips: Vec<&str> = Vec::new();

    if metrics.average_length < 5.0 {
        tips.push(
            "Your messages tend to be very short. Consider being more descriptive to better convey your thoughts.",
        );
    } else if metrics.average_length > 50.0 {
        tips.push(
            "Your messages are quite long. Consider breaking them into smaller chunks for better readability.",
        );
    }

    if metrics.message_count > 0 {
        let lines = metrics.message_count as f64;

        let question_ratio = metrics.questions as f64 / lines;
        if question_ratio < 0.1 {
            tips.push("Try asking more questions to keep the conversation engaging and show interest.");
        } else if question_ratio > 0.5 {
            tips.push(
                "You ask a lot of questions. Try balancing with more statements and sharing your own thoughts.",
            );
        }

        let emoji_ratio = metrics.emojis as f64 / lines;
        if metrics.emojis == 0 {
            tips.push("Consider using some emojis to add emotional context to your messages.");
        } else if emoji_ratio > 3.0 {
            tips.push(
                "You use many emojis. While expressive, consider using them more sparingly for clarity.",
            );
        }
    }

    if let Some(tone) = tone {
        if tone.formal > 70.0 {
            tips.push(
                "Your tone is very formal. Consider being more casual if this is a friendly conversation.",
            );
        } else if tone.casual > 80.0 {
            tips.push(
                "Your tone is very casual. Consider being slightly more formal in certain contexts.",
            );
        }
    }

    if metrics.time_of_day.night as f64 > metrics.message_count as f64 * 0.3 {
        tips.push(
            "You send many late-night messages. Consider maintaining better chat boundaries for work-life balance.",
        );
    }

    if metrics.sentiment < -0.3 {
        tips.push(
            "The conversation has a negative tone. Try to maintain a more positive or neutral approach.",
        );
    }

    tips.into_iter().take(MAX_TIPS).map(str::to_string).collect()
}
