//! Stage orchestration for the chat-stats pipeline.
//!
//! Each stage is a one-shot batch job: load its input, transform it, write a
//! single artifact. Failures surface before any output is written, so a
//! failed stage never leaves a partial artifact behind.

use std::path::Path;

use stats_core::error::{Result, StatsError};
use stats_core::models::{AllowList, AnalysisReport};
use tracing::info;

use crate::aggregator::ParticipantAggregator;
use crate::collector::{collect_messages, read_filtered_messages, write_filtered_messages};
use crate::insights::{InsightsAnalyzer, InsightsReport};

// ── Stage summaries ───────────────────────────────────────────────────────────

/// Counts and timing reported by one collect run.
#[derive(Debug, Clone)]
pub struct CollectSummary {
    /// Messages surviving the allow-list filter.
    pub messages_collected: usize,
    /// Wall-clock seconds spent scanning and writing.
    pub elapsed_seconds: f64,
}

/// Counts and timing reported by one analyze run.
#[derive(Debug, Clone)]
pub struct AnalyzeSummary {
    /// Distinct senders in the aggregated report.
    pub participants: usize,
    /// Total messages aggregated.
    pub total_message_count: u64,
    /// Total words aggregated.
    pub total_word_count: u64,
    /// Wall-clock seconds spent loading, aggregating and writing.
    pub elapsed_seconds: f64,
}

/// Counts and timing reported by one insights run.
#[derive(Debug, Clone)]
pub struct InsightsSummary {
    /// Distinct senders in the text-message sequence.
    pub participants: usize,
    /// Messages surviving the text-message filter.
    pub text_messages: u64,
    /// Wall-clock seconds spent loading, analyzing and writing.
    pub elapsed_seconds: f64,
}

// ── Stages ────────────────────────────────────────────────────────────────────

/// Collect stage: scan `data_dir`, filter against `allow_list`, write the
/// interchange artifact to `messages_file`.
pub fn run_collect(
    data_dir: &Path,
    allow_list: &AllowList,
    messages_file: &Path,
) -> Result<CollectSummary> {
    let start = std::time::Instant::now();

    let messages = collect_messages(data_dir, allow_list)?;
    write_filtered_messages(&messages, messages_file)?;

    info!("Filtered messages saved to {}", messages_file.display());
    Ok(CollectSummary {
        messages_collected: messages.len(),
        elapsed_seconds: start.elapsed().as_secs_f64(),
    })
}

/// Analyze stage: read the interchange artifact, aggregate per-participant
/// statistics, write the report to `report_file`.
pub fn run_analyze(messages_file: &Path, report_file: &Path) -> Result<AnalyzeSummary> {
    let start = std::time::Instant::now();

    let messages = read_filtered_messages(messages_file)?;
    let report = ParticipantAggregator::aggregate(&messages)?;
    write_report(&report, report_file)?;

    info!("Analysis results saved to {}", report_file.display());
    Ok(AnalyzeSummary {
        participants: report.analysis_results.len(),
        total_message_count: report.total_message_count,
        total_word_count: report.total_word_count,
        elapsed_seconds: start.elapsed().as_secs_f64(),
    })
}

/// Insights stage: read the interchange artifact, derive conversational
/// insights, write the report to `insights_file`.
pub fn run_insights(
    messages_file: &Path,
    insights_file: &Path,
    track_words: &[String],
) -> Result<InsightsSummary> {
    let start = std::time::Instant::now();

    let messages = read_filtered_messages(messages_file)?;
    let report = InsightsAnalyzer::new(track_words).analyze(&messages);
    write_insights(&report, insights_file)?;

    info!("Insights saved to {}", insights_file.display());
    Ok(InsightsSummary {
        participants: report.participants.len(),
        text_messages: report.text_message_count,
        elapsed_seconds: start.elapsed().as_secs_f64(),
    })
}

// ── Artifact helpers ──────────────────────────────────────────────────────────

/// Write the analysis report artifact.
pub fn write_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read an analysis report artifact back.
pub fn read_report(path: &Path) -> Result<AnalysisReport> {
    let raw = std::fs::read_to_string(path).map_err(|source| StatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Write the insights report artifact.
pub fn write_insights(report: &InsightsReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
