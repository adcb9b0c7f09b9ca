//! Per-participant aggregation over the filtered message sequence.
//!
//! A single pass buckets message and word counts by sender, then derives
//! percentages and averages against the run-wide totals.

use std::collections::HashMap;

use stats_core::calculations::{percentage, round2, word_count};
use stats_core::error::{Result, StatsError};
use stats_core::models::{AggregationBucket, AnalysisRecord, AnalysisReport, Message};
use tracing::debug;

/// Stateless helper that reduces a message sequence to per-sender statistics.
pub struct ParticipantAggregator;

impl ParticipantAggregator {
    /// Aggregate `messages` into one [`AnalysisRecord`] per distinct sender.
    ///
    /// Buckets are created lazily on the first message seen for a sender and
    /// the output records follow first-appearance order. A message without
    /// content counts zero words.
    ///
    /// Fails with [`StatsError::EmptyInput`] when the sequence holds no
    /// messages, or no words at all, rather than emitting NaN percentages.
    pub fn aggregate(messages: &[Message]) -> Result<AnalysisReport> {
        // First-appearance order is tracked separately; the map alone would
        // lose it.
        let mut order: Vec<String> = Vec::new();
        let mut buckets: HashMap<String, AggregationBucket> = HashMap::new();
        let mut total_message_count: u64 = 0;
        let mut total_word_count: u64 = 0;

        for message in messages {
            let words = message.content.as_deref().map(word_count).unwrap_or(0);

            if !buckets.contains_key(&message.sender_name) {
                order.push(message.sender_name.clone());
            }
            buckets
                .entry(message.sender_name.clone())
                .or_default()
                .add_message(words);

            total_message_count += 1;
            total_word_count += words;
        }

        if total_message_count == 0 {
            return Err(StatsError::EmptyInput(
                "the filtered message sequence is empty".to_string(),
            ));
        }
        if total_word_count == 0 {
            return Err(StatsError::EmptyInput(
                "no message in the sequence contains any words".to_string(),
            ));
        }

        let analysis_results: Vec<AnalysisRecord> = order
            .iter()
            .map(|name| {
                let bucket = &buckets[name];
                AnalysisRecord {
                    name: name.clone(),
                    message_percentage: percentage(bucket.message_count, total_message_count),
                    word_percentage: percentage(bucket.word_count, total_word_count),
                    message_count: bucket.message_count,
                    word_count: bucket.word_count,
                    avg_words_per_message: round2(
                        bucket.word_count as f64 / bucket.message_count as f64,
                    ),
                }
            })
            .collect();

        debug!(
            "Aggregated {} messages ({} words) into {} participant records",
            total_message_count,
            total_word_count,
            analysis_results.len()
        );

        Ok(AnalysisReport {
            analysis_results,
            total_message_count,
            total_word_count,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
