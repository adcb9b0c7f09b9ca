use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single chat message read from a conversation export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Display name of the participant who sent the message.
    pub sender_name: String,
    /// Message text. Absent for photos, stickers and unsent messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Epoch-millisecond send time, when the export carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<i64>,
}

/// The shape of one `message_1.json` conversation export.
///
/// Exports carry many more fields (participants, reactions, media); only the
/// message list is read, everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Conversation {
    /// The conversation's message list. Absent lists contribute nothing.
    #[serde(default)]
    pub messages: Option<Vec<Message>>,
}

/// Fixed set of participant names whose messages are retained by the
/// collect stage.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    names: HashSet<String>,
}

impl AllowList {
    /// Build an allow-list from any iterable of names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `name` is a retained participant.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// `true` when no participant is retained at all.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of distinct retained names.
    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Per-sender running accumulator of counts before percentages are derived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationBucket {
    /// Messages seen for this sender so far.
    pub message_count: u64,
    /// Words seen for this sender so far.
    pub word_count: u64,
}

impl AggregationBucket {
    /// Account one message carrying `words` words.
    pub fn add_message(&mut self, words: u64) {
        self.message_count += 1;
        self.word_count += words;
    }
}

/// Finalized per-participant statistics, derived read-only from a bucket and
/// the run-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Participant display name.
    pub name: String,
    /// Share of all retained messages, in percent, rounded to 2 decimals.
    pub message_percentage: f64,
    /// Share of all counted words, in percent, rounded to 2 decimals.
    pub word_percentage: f64,
    /// Messages sent by this participant.
    pub message_count: u64,
    /// Words sent by this participant.
    pub word_count: u64,
    /// `word_count / message_count`, rounded to 2 decimals.
    pub avg_words_per_message: f64,
}

/// The analyze stage's output artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// One record per distinct sender, in first-appearance order.
    pub analysis_results: Vec<AnalysisRecord>,
    /// Total retained messages across all participants.
    #[serde(default)]
    pub total_message_count: u64,
    /// Total counted words across all participants.
    #[serde(default)]
    pub total_word_count: u64,
}
