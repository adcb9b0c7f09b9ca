//! Conversation discovery and message collection.
//!
//! Scans a directory of per-conversation export folders, reads each
//! conversation's `message_1.json`, and keeps only messages whose sender is
//! in the participant allow-list. The result is one flat ordered sequence,
//! persisted as the interchange artifact consumed by the later stages.

use std::path::{Path, PathBuf};

use stats_core::error::{Result, StatsError};
use stats_core::models::{AllowList, Conversation, Message};
use tracing::{debug, warn};

/// File name of the export document inside each conversation directory.
pub const CONVERSATION_FILE: &str = "message_1.json";

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all conversation export files under `data_dir`, sorted by path.
///
/// Only `message_1.json` files exactly one directory below `data_dir` are
/// considered. Conversation directories without the export file contribute
/// nothing; anything else in the tree is ignored.
pub fn find_conversation_files(data_dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(data_dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == CONVERSATION_FILE)
        .map(|entry| entry.into_path())
        .collect()
}

/// Parse one conversation export document.
pub fn parse_conversation(raw: &str) -> Result<Conversation> {
    Ok(serde_json::from_str(raw)?)
}

/// Keep only messages whose sender is in `allow_list`, preserving order.
pub fn filter_messages(messages: Vec<Message>, allow_list: &AllowList) -> Vec<Message> {
    messages
        .into_iter()
        .filter(|message| allow_list.contains(&message.sender_name))
        .collect()
}

/// Collect every allow-listed message under `data_dir` into one flat ordered
/// sequence.
///
/// Conversations contribute in sorted-path order and messages keep their
/// in-file order. A conversation file that cannot be read or parsed is
/// logged with its path and skipped; it never aborts the run. A missing
/// `data_dir` is fatal and reported before any file is touched.
pub fn collect_messages(data_dir: &Path, allow_list: &AllowList) -> Result<Vec<Message>> {
    if !data_dir.is_dir() {
        return Err(StatsError::DataDirNotFound(data_dir.to_path_buf()));
    }

    let files = find_conversation_files(data_dir);
    if files.is_empty() {
        warn!("No conversation exports found in {}", data_dir.display());
    }

    let mut collected: Vec<Message> = Vec::new();
    for path in &files {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read conversation {}: {}", path.display(), e);
                continue;
            }
        };

        let conversation = match parse_conversation(&raw) {
            Ok(conversation) => conversation,
            Err(e) => {
                warn!("Failed to parse conversation {}: {}", path.display(), e);
                continue;
            }
        };

        let messages = conversation.messages.unwrap_or_default();
        let read = messages.len();
        let kept = filter_messages(messages, allow_list);
        debug!(
            "Conversation {}: {} messages read, {} kept",
            path.display(),
            read,
            kept.len()
        );
        collected.extend(kept);
    }

    debug!(
        "Collected {} messages from {} conversations",
        collected.len(),
        files.len()
    );

    Ok(collected)
}

// ── Interchange artifact ──────────────────────────────────────────────────────

/// Write the filtered-messages interchange artifact.
pub fn write_filtered_messages(messages: &[Message], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(messages)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read the interchange artifact back.
///
/// Fails with [`StatsError::InterchangeNotFound`] when the file is absent,
/// so the caller is told to run the collect stage first.
pub fn read_filtered_messages(path: &Path) -> Result<Vec<Message>> {
    if !path.is_file() {
        return Err(StatsError::InterchangeNotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path).map_err(|source| StatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
