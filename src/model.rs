//! Data models for chat exports and the analysis records derived from them.
//!
//! Input types mirror the JSON export layout (`participants`, `messages`
//! with `sender_name`/`timestamp_ms`). Output types are plain values: they
//! are built once by the engine and never updated in place.

use serde::{Deserialize, Serialize};

// =============================================================================
// Export (input)
// =============================================================================

/// A structured chat export for a single two-person conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatExport {
    pub participants: Vec<Participant>,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thread_path: Option<String>,
    #[serde(default)]
    pub is_still_participant: Option<bool>,
}

/// A conversation participant as listed in the export header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
}

/// A single exported message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender_name: String,
    pub timestamp_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<SharedLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<Reaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<MediaRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<MediaRef>>,
}

impl ChatMessage {
    /// Message text, treating a missing body as empty.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// A shared link attached to a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharedLink {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_text: Option<String>,
}

/// An emoji reaction left on a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub reaction: String,
    pub actor: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// A photo or video attachment marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaRef {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub creation_timestamp: Option<i64>,
}

// =============================================================================
// Sides
// =============================================================================

/// Which side of the conversation something belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    You,
    Them,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::You => write!(f, "You"),
            Self::Them => write!(f, "Them"),
        }
    }
}

/// A value tracked separately for each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerSide<T> {
    #[serde(rename = "You")]
    pub you: T,
    #[serde(rename = "Them")]
    pub them: T,
}

impl<T> PerSide<T> {
    pub const fn new(you: T, them: T) -> Self {
        Self { you, them }
    }

    pub const fn get(&self, side: Side) -> &T {
        match side {
            Side::You => &self.you,
            Side::Them => &self.them,
        }
    }

    pub const fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::You => &mut self.you,
            Side::Them => &mut self.them,
        }
    }
}

// =============================================================================
// Analysis (output)
// =============================================================================

/// Full analysis of one chat export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub message_count: PerSide<u64>,
    pub response_time: PerSide<String>,
    pub interest_level: PerSide<f64>,
    pub top_emojis: Vec<EmojiCount>,
    pub monthly_activity: Vec<MonthlyActivity>,
    pub reaction_count: PerSide<u64>,
    pub shared_links: u64,
    pub word_count: PerSide<u64>,
    pub average_message_length: PerSide<f64>,
    pub top_words: Vec<WordCount>,
    pub media_shared: MediaShared,
    pub longest_streak_days: u32,
    pub sentiment_over_time: Vec<SentimentPoint>,
    pub overall_mood: f64,
    pub first_message_date: i64,
    pub day_with_most_messages: BusiestDay,
    pub longest_message: LongestMessage,
    pub thousandth_message_date: Option<i64>,
    pub highlights: Vec<Highlight>,
    pub topics_over_time: Vec<MonthlyTopics>,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            message_count: PerSide::default(),
            response_time: PerSide::new("0s".to_string(), "0s".to_string()),
            interest_level: PerSide::default(),
            top_emojis: Vec::new(),
            monthly_activity: Vec::new(),
            reaction_count: PerSide::default(),
            shared_links: 0,
            word_count: PerSide::default(),
            average_message_length: PerSide::default(),
            top_words: Vec::new(),
            media_shared: MediaShared::default(),
            longest_streak_days: 0,
            sentiment_over_time: Vec::new(),
            overall_mood: 0.0,
            first_message_date: 0,
            day_with_most_messages: BusiestDay::default(),
            longest_message: LongestMessage::default(),
            thousandth_message_date: None,
            highlights: Vec::new(),
            topics_over_time: Vec::new(),
        }
    }
}

impl AnalysisResult {
    /// Total messages across both sides.
    #[must_use]
    pub const fn total_messages(&self) -> u64 {
        self.message_count.you + self.message_count.them
    }
}

/// Emoji with its usage count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiCount {
    pub emoji: String,
    pub count: u64,
}

/// Messages sent during one `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyActivity {
    pub month: String,
    pub messages: u64,
}

/// A frequent word with per-side sub-counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCount {
    pub word: String,
    pub count: u64,
    pub you_count: u64,
    pub them_count: u64,
}

/// Attachment counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaShared {
    pub images: u64,
    pub videos: u64,
}

/// Lexicon sentiment for one message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub timestamp: i64,
    pub sentiment: f64,
}

/// The calendar day (UTC, `YYYY-MM-DD`) with the most messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusiestDay {
    pub date: String,
    pub count: u64,
}

/// Length in characters of the longest message and when it was sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestMessage {
    pub length: u64,
    pub date: i64,
}

/// Kind of qualitative observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightKind {
    Streak,
    ActiveDay,
    TopEmoji,
    SentimentChange,
}

/// A short qualitative observation about the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(rename = "type")]
    pub kind: HighlightKind,
    pub description: String,
}

/// Top topics for one `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTopics {
    pub month: String,
    pub topics: Vec<String>,
}

// =============================================================================
// Screenshot analysis (output)
// =============================================================================

/// Analysis of OCR-extracted screenshot text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotAnalysis {
    /// Leading slice of the cleaned text, for display.
    pub text: String,
    pub metrics: ScreenshotMetrics,
    pub patterns: PatternSummary,
    pub tone: Option<ToneAnalysis>,
    pub ai_tips: Vec<String>,
}

/// Raw counts over the extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotMetrics {
    pub message_count: u64,
    pub average_length: f64,
    pub sentiment: f64,
    pub emojis: u64,
    pub questions: u64,
    pub exclamations: u64,
    pub links: u64,
    pub time_of_day: TimeOfDay,
}

/// Coarse histogram of "h am/pm" mentions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub morning: u64,
    pub afternoon: u64,
    pub evening: u64,
    pub night: u64,
}

/// Repeated phrases plus the per-line structure breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSummary {
    pub common: Vec<PhrasePattern>,
    pub message_structure: MessageStructure,
}

/// A phrase that occurs more than once, with example contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhrasePattern {
    pub phrase: String,
    pub count: u64,
    pub context: Vec<String>,
}

/// Per-line classification counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStructure {
    pub questions: u64,
    pub statements: u64,
    pub exclamations: u64,
    pub greetings: u64,
    pub farewells: u64,
}

/// Register categories for tone classification, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneCategory {
    Formal,
    Casual,
    Friendly,
    Professional,
}

impl ToneCategory {
    pub const ALL: [Self; 4] = [Self::Formal, Self::Casual, Self::Friendly, Self::Professional];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Casual => "casual",
            Self::Friendly => "friendly",
            Self::Professional => "professional",
        }
    }
}

impl std::fmt::Display for ToneCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone percentages, winner and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneAnalysis {
    pub formal: f64,
    pub casual: f64,
    pub friendly: f64,
    pub professional: f64,
    pub overall: ToneCategory,
    pub confidence: f64,
    pub indicators: ToneIndicators,
}

impl ToneAnalysis {
    /// Percentage for one category.
    #[must_use]
    pub const fn percentage(&self, category: ToneCategory) -> f64 {
        match category {
            ToneCategory::Formal => self.formal,
            ToneCategory::Casual => self.casual,
            ToneCategory::Friendly => self.friendly,
            ToneCategory::Professional => self.professional,
        }
    }
}

/// Matched indicator words per category, deduplicated, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneIndicators {
    pub formal: Vec<String>,
    pub casual: Vec<String>,
    pub friendly: Vec<String>,
    pub professional: Vec<String>,
}

impl ToneIndicators {
    pub fn get_mut(&mut self, category: ToneCategory) -> &mut Vec<String> {
        match category {
            ToneCategory::Formal => &mut self.formal,
            ToneCategory::Casual => &mut self.casual,
            ToneCategory::Friendly => &mut self.friendly,
            ToneCategory::Professional => &mut self.professional,
        }
    }

    #[must_use]
    pub fn get(&self, category: ToneCategory) -> &[String] {
        match category {
            ToneCategory::Formal => &self.formal,
            ToneCategory::Casual => &self.casual,
            ToneCategory::Friendly => &self.friendly,
            ToneCategory::Professional => &self.professional,
        }
    }
}

// =============================================================================
// Storage
// =============================================================================

/// Summary row for a persisted analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysisSummary {
    pub id: String,
    pub stored_at: chrono::DateTime<chrono::Utc>,
    pub total_messages: u64,
}
