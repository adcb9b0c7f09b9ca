//! Conversational insights over the filtered message sequence.
//!
//! Derives chat initiators, night-owl counts, monologue lengths, question
//! counts and word frequencies from the interchange artifact. Reaction
//! notifications and empty messages are excluded from every metric.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, TimeDelta, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use stats_core::models::Message;
use tracing::debug;

/// How many of a participant's most frequent words are reported.
const TOP_WORDS: usize = 5;

/// Inactivity gap after which the next message starts a new conversation.
const INITIATOR_GAP_HOURS: i64 = 6;

/// Night window: 22:00 (inclusive) to 06:00 (exclusive), UTC.
const NIGHT_START_HOUR: u32 = 22;
const NIGHT_END_HOUR: u32 = 6;

/// Filler tokens excluded from word-frequency counts.
const INTERJECTIONS: &[&str] = &["uh", "um", "er", "ah", "oh", "wow", "hmm", "huh"];

/// Common English words excluded from word-frequency counts.
const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "before", "but", "by", "can", "could", "did", "do", "does", "dont", "for",
    "from", "get", "got", "had", "has", "have", "he", "her", "here", "him", "his", "how", "i",
    "if", "im", "in", "into", "is", "it", "its", "just", "like", "me", "my", "na", "no", "not",
    "now", "of", "on", "or", "our", "out", "she", "so", "some", "than", "that", "the", "their",
    "them", "then", "there", "they", "this", "to", "too", "up", "us", "was", "we", "were", "what",
    "when", "where", "which", "who", "will", "with", "would", "you", "your",
];

// ── Report types ──────────────────────────────────────────────────────────────

/// One word and how often a participant used it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: u64,
}

/// How many conversations a participant started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiatorCount {
    pub name: String,
    pub count: u64,
}

/// Per-participant conversational metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantInsights {
    /// Participant display name.
    pub name: String,
    /// Text messages sent between 22:00 and 06:00 UTC.
    pub night_messages: u64,
    /// Longest run of consecutive text messages by this participant.
    pub longest_monologue: u64,
    /// Text messages containing a question mark.
    pub question_messages: u64,
    /// The participant's most frequent words, stop words excluded.
    pub top_words: Vec<WordFrequency>,
    /// Counts for the explicitly tracked words, keyed by word.
    #[serde(default)]
    pub tracked_word_counts: BTreeMap<String, u64>,
}

/// The insights stage's output artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport {
    /// All participants seen in the text-message sequence, sorted by name.
    pub participants: Vec<String>,
    /// Number of messages surviving the text-message filter.
    pub text_message_count: u64,
    /// Conversation starters, most frequent first.
    pub chat_initiators: Vec<InitiatorCount>,
    /// One entry per participant, in `participants` order.
    pub by_participant: Vec<ParticipantInsights>,
}

// ── InsightsAnalyzer ──────────────────────────────────────────────────────────

/// Derives the [`InsightsReport`] from a filtered message sequence.
pub struct InsightsAnalyzer {
    initiator_gap: TimeDelta,
    track_words: Vec<String>,
}

impl InsightsAnalyzer {
    /// Create an analyzer tracking the given extra words (case-insensitive).
    pub fn new(track_words: &[String]) -> Self {
        Self {
            initiator_gap: TimeDelta::hours(INITIATOR_GAP_HOURS),
            track_words: track_words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Compute every insight over `messages`.
    ///
    /// Zero surviving text messages is not an error; the report is returned
    /// with empty collections.
    pub fn analyze(&self, messages: &[Message]) -> InsightsReport {
        let reaction = Regex::new(r"(?i)reacted .* to a message").expect("regex is valid");
        let token = Regex::new(r"\b\w+\b").expect("regex is valid");

        let text: Vec<&Message> = messages
            .iter()
            .filter(|message| is_text_message(message, &reaction))
            .collect();

        let mut participants: Vec<String> = text
            .iter()
            .map(|m| m.sender_name.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        participants.sort();

        debug!(
            "Insights over {} text messages from {} participants",
            text.len(),
            participants.len()
        );

        let name_words = participant_name_words(&participants);
        let monologues = longest_monologues(&text);
        let chat_initiators = self.chat_initiators(&text);

        let by_participant = participants
            .iter()
            .map(|name| {
                self.participant_insights(name, &text, &name_words, &monologues, &token)
            })
            .collect();

        InsightsReport {
            participants,
            text_message_count: text.len() as u64,
            chat_initiators,
            by_participant,
        }
    }

    // ── Per-participant metrics ───────────────────────────────────────────────

    fn participant_insights(
        &self,
        name: &str,
        text: &[&Message],
        name_words: &HashSet<String>,
        monologues: &HashMap<String, u64>,
        token: &Regex,
    ) -> ParticipantInsights {
        let own: Vec<&&Message> = text.iter().filter(|m| m.sender_name == name).collect();

        let night_messages = own
            .iter()
            .filter_map(|m| m.timestamp_ms)
            .filter_map(DateTime::from_timestamp_millis)
            .filter(|ts| {
                let hour = ts.hour();
                hour >= NIGHT_START_HOUR || hour < NIGHT_END_HOUR
            })
            .count() as u64;

        let question_messages = own
            .iter()
            .filter(|m| m.content.as_deref().is_some_and(|c| c.contains('?')))
            .count() as u64;

        let counts = self.token_counts(&own, name_words, token);
        let top_words = top_words(&counts);
        let tracked_word_counts = self
            .track_words
            .iter()
            .map(|word| (word.clone(), counts.get(word).copied().unwrap_or(0)))
            .collect();

        ParticipantInsights {
            name: name.to_string(),
            night_messages,
            longest_monologue: monologues.get(name).copied().unwrap_or(0),
            question_messages,
            top_words,
            tracked_word_counts,
        }
    }

    /// Count lowercased tokens across all of a participant's messages,
    /// dropping stop words, interjections, digit runs and tokens that are
    /// part of any participant's name. Tracked words are never dropped.
    fn token_counts(
        &self,
        own: &[&&Message],
        name_words: &HashSet<String>,
        token: &Regex,
    ) -> HashMap<String, u64> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for message in own {
            let Some(content) = message.content.as_deref() else {
                continue;
            };
            let lowered = content.to_lowercase();
            for m in token.find_iter(&lowered) {
                let word = m.as_str();
                if !self.track_words.iter().any(|t| t == word) && is_excluded_token(word, name_words)
                {
                    continue;
                }
                *counts.entry(word.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }

    // ── Initiators ────────────────────────────────────────────────────────────

    /// Credit the sender of the first message, and of every message following
    /// an inactivity gap longer than the threshold. Messages without a
    /// timestamp are excluded.
    fn chat_initiators(&self, text: &[&Message]) -> Vec<InitiatorCount> {
        let mut timestamped: Vec<(i64, &str)> = text
            .iter()
            .filter_map(|m| m.timestamp_ms.map(|ts| (ts, m.sender_name.as_str())))
            .collect();
        timestamped.sort_by_key(|(ts, _)| *ts);

        let mut counts: HashMap<&str, u64> = HashMap::new();
        let mut last: Option<i64> = None;
        for &(ts, sender) in &timestamped {
            let starts_conversation = match last {
                None => true,
                Some(prev) => TimeDelta::milliseconds(ts - prev) > self.initiator_gap,
            };
            if starts_conversation {
                *counts.entry(sender).or_insert(0) += 1;
            }
            last = Some(ts);
        }

        let mut initiators: Vec<InitiatorCount> = counts
            .into_iter()
            .map(|(name, count)| InitiatorCount {
                name: name.to_string(),
                count,
            })
            .collect();
        initiators.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        initiators
    }
}

// ── Free helpers ──────────────────────────────────────────────────────────────

/// A message counts as text when it has non-empty content that is not a
/// reaction notification.
fn is_text_message(message: &Message, reaction: &Regex) -> bool {
    match message.content.as_deref() {
        Some(content) if !content.is_empty() => !reaction.is_match(content),
        _ => false,
    }
}

/// Longest run of consecutive messages per sender over the text sequence.
fn longest_monologues(text: &[&Message]) -> HashMap<String, u64> {
    let mut longest: HashMap<String, u64> = HashMap::new();
    let mut current: Option<(&str, u64)> = None;

    for message in text {
        current = match current {
            Some((sender, run)) if sender == message.sender_name => Some((sender, run + 1)),
            _ => Some((message.sender_name.as_str(), 1)),
        };
        if let Some((sender, run)) = current {
            let best = longest.entry(sender.to_string()).or_insert(0);
            if run > *best {
                *best = run;
            }
        }
    }

    longest
}

/// Lowercased words making up any participant's display name.
fn participant_name_words(participants: &[String]) -> HashSet<String> {
    participants
        .iter()
        .flat_map(|name| name.to_lowercase().split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .collect()
}

fn is_excluded_token(word: &str, name_words: &HashSet<String>) -> bool {
    STOP_WORDS.contains(&word)
        || INTERJECTIONS.contains(&word)
        || word.chars().all(|c| c.is_ascii_digit())
        || name_words.contains(word)
}

/// The `TOP_WORDS` most frequent tokens, ties broken alphabetically.
fn top_words(counts: &HashMap<String, u64>) -> Vec<WordFrequency> {
    let mut frequencies: Vec<WordFrequency> = counts
        .iter()
        .map(|(word, count)| WordFrequency {
            word: word.clone(),
            count: *count,
        })
        .collect();
    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    frequencies.truncate(TOP_WORDS);
    frequencies
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn message(sender: &str, content: &str, ts: Option<i64>) -> Message {
        Message {
            sender_name: sender.to_string(),
            content: Some(content.to_string()),
            timestamp_ms: ts,
        }
    }

    fn at_hour(hour: u32) -> i64 {
        Utc.with_ymd_and_hms(2023, 12, 20, hour, 15, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn insights_for<'a>(report: &'a InsightsReport, name: &str) -> &'a ParticipantInsights {
        report
            .by_participant
            .iter()
            .find(|p| p.name == name)
            .expect("participant present")
    }

    // ── Text-message filter ───────────────────────────────────────────────────

    #[test]
    fn test_reactions_and_empty_messages_excluded() {
        let messages = vec![
            message("Ana", "real text", None),
            message("Ben", "Ben reacted \u{2764} to a message", None),
            message("Ana", "", None),
            Message {
                sender_name: "Ana".to_string(),
                content: None,
                timestamp_ms: None,
            },
        ];
        let report = InsightsAnalyzer::new(&[]).analyze(&messages);
        assert_eq!(report.text_message_count, 1);
        assert_eq!(report.participants, vec!["Ana"]);
    }

    #[test]
    fn test_empty_input_produces_empty_report() {
        let report = InsightsAnalyzer::new(&[]).analyze(&[]);
        assert_eq!(report.text_message_count, 0);
        assert!(report.participants.is_empty());
        assert!(report.chat_initiators.is_empty());
        assert!(report.by_participant.is_empty());
    }

    // ── Chat initiators ───────────────────────────────────────────────────────

    #[test]
    fn test_first_message_credits_initiator() {
        let messages = vec![
            message("Ana", "hello", Some(at_hour(10))),
            message("Ben", "hi", Some(at_hour(10) + 60_000)),
        ];
        let report = InsightsAnalyzer::new(&[]).analyze(&messages);
        assert_eq!(report.chat_initiators.len(), 1);
        assert_eq!(report.chat_initiators[0].name, "Ana");
        assert_eq!(report.chat_initiators[0].count, 1);
    }

    #[test]
    fn test_gap_longer_than_six_hours_starts_new_conversation() {
        let seven_hours = 7 * 3600 * 1000;
        let messages = vec![
            message("Ana", "morning", Some(at_hour(8))),
            message("Ben", "evening", Some(at_hour(8) + seven_hours)),
        ];
        let report = InsightsAnalyzer::new(&[]).analyze(&messages);
        let counts: Vec<(&str, u64)> = report
            .chat_initiators
            .iter()
            .map(|i| (i.name.as_str(), i.count))
            .collect();
        assert_eq!(counts, vec![("Ana", 1), ("Ben", 1)]);
    }

    #[test]
    fn test_gap_within_six_hours_does_not_credit() {
        let two_hours = 2 * 3600 * 1000;
        let messages = vec![
            message("Ana", "morning", Some(at_hour(8))),
            message("Ben", "noonish", Some(at_hour(8) + two_hours)),
        ];
        let report = InsightsAnalyzer::new(&[]).analyze(&messages);
        assert_eq!(report.chat_initiators.len(), 1);
        assert_eq!(report.chat_initiators[0].name, "Ana");
    }

    #[test]
    fn test_untimestamped_messages_ignored_for_initiators() {
        let messages = vec![
            message("Ana", "no clock", None),
            message("Ben", "timed", Some(at_hour(9))),
        ];
        let report = InsightsAnalyzer::new(&[]).analyze(&messages);
        assert_eq!(report.chat_initiators.len(), 1);
        assert_eq!(report.chat_initiators[0].name, "Ben");
    }

    // ── Night owl ─────────────────────────────────────────────────────────────

    #[test]
    fn test_night_messages_counted() {
        let messages = vec![
            message("Ana", "late one", Some(at_hour(23))),
            message("Ana", "early one", Some(at_hour(5))),
            message("Ana", "daytime", Some(at_hour(12))),
        ];
        let report = InsightsAnalyzer::new(&[]).analyze(&messages);
        assert_eq!(insights_for(&report, "Ana").night_messages, 2);
    }

    #[test]
    fn test_night_boundary_hours() {
        let messages = vec![
            message("Ana", "at ten pm", Some(at_hour(22))),
            message("Ana", "at six am", Some(at_hour(6))),
        ];
        let report = InsightsAnalyzer::new(&[]).analyze(&messages);
        // 22:00 is night, 06:00 is not.
        assert_eq!(insights_for(&report, "Ana").night_messages, 1);
    }

    // ── Monologues ────────────────────────────────────────────────────────────

    #[test]
    fn test_longest_monologue_counts_consecutive_runs() {
        let messages = vec![
            message("Ana", "one", None),
            message("Ana", "two", None),
            message("Ana", "three", None),
            message("Ben", "break", None),
            message("Ana", "four", None),
        ];
        let report = InsightsAnalyzer::new(&[]).analyze(&messages);
        assert_eq!(insights_for(&report, "Ana").longest_monologue, 3);
        assert_eq!(insights_for(&report, "Ben").longest_monologue, 1);
    }

    // ── Questions ─────────────────────────────────────────────────────────────

    #[test]
    fn test_question_messages_counted() {
        let messages = vec![
            message("Ana", "where are you?", None),
            message("Ana", "statement", None),
            message("Ana", "really??", None),
        ];
        let report = InsightsAnalyzer::new(&[]).analyze(&messages);
        assert_eq!(insights_for(&report, "Ana").question_messages, 2);
    }

    // ── Word frequency ────────────────────────────────────────────────────────

    #[test]
    fn test_top_words_exclude_stop_words_and_digits() {
        let messages = vec![
            message("Ana", "the pizza was great pizza", None),
            message("Ana", "pizza again and again 123", None),
        ];
        let report = InsightsAnalyzer::new(&[]).analyze(&messages);
        let words: Vec<&str> = insights_for(&report, "Ana")
            .top_words
            .iter()
            .map(|w| w.word.as_str())
            .collect();
        assert_eq!(words[0], "pizza");
        assert!(!words.contains(&"the"));
        assert!(!words.contains(&"123"));
    }

    #[test]
    fn test_top_words_exclude_participant_name_words() {
        let messages = vec![
            message("Ana Santos", "santos calling santos pizza", None),
            message("Ben Reyes", "pizza pizza", None),
        ];
        let report = InsightsAnalyzer::new(&[]).analyze(&messages);
        let words: Vec<&str> = insights_for(&report, "Ana Santos")
            .top_words
            .iter()
            .map(|w| w.word.as_str())
            .collect();
        assert!(!words.contains(&"santos"));
        assert!(words.contains(&"pizza"));
    }

    #[test]
    fn test_top_words_capped_at_five() {
        let messages = vec![message(
            "Ana",
            "alpha bravo charlie delta echo foxtrot golf",
            None,
        )];
        let report = InsightsAnalyzer::new(&[]).analyze(&messages);
        assert_eq!(insights_for(&report, "Ana").top_words.len(), 5);
    }

    // ── Tracked words ─────────────────────────────────────────────────────────

    #[test]
    fn test_tracked_words_counted_case_insensitive() {
        let messages = vec![
            message("Ana", "Sorry I was late", None),
            message("Ana", "sorry again", None),
        ];
        let analyzer = InsightsAnalyzer::new(&["sorry".to_string(), "busy".to_string()]);
        let report = analyzer.analyze(&messages);
        let tracked = &insights_for(&report, "Ana").tracked_word_counts;
        assert_eq!(tracked.get("sorry"), Some(&2));
        assert_eq!(tracked.get("busy"), Some(&0));
    }

    #[test]
    fn test_tracked_word_survives_stop_word_list() {
        // "me" is a stop word, but tracking it explicitly must still count it.
        let messages = vec![message("Ana", "me me me", None)];
        let analyzer = InsightsAnalyzer::new(&["me".to_string()]);
        let report = analyzer.analyze(&messages);
        assert_eq!(
            insights_for(&report, "Ana").tracked_word_counts.get("me"),
            Some(&3)
        );
    }

    // ── Report serde ──────────────────────────────────────────────────────────

    #[test]
    fn test_insights_report_round_trip() {
        let messages = vec![
            message("Ana", "where is the pizza?", Some(at_hour(23))),
            message("Ben", "coming soon", Some(at_hour(23) + 60_000)),
        ];
        let report = InsightsAnalyzer::new(&["pizza".to_string()]).analyze(&messages);
        let json = serde_json::to_string_pretty(&report).unwrap();
        let back: InsightsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
