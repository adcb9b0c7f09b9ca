//! Core domain types and helpers for the chat-stats pipeline.
//!
//! Holds the message and report models shared by every stage, the error
//! taxonomy, the counting/rounding primitives and the CLI settings layer.

pub mod calculations;
pub mod error;
pub mod models;
pub mod settings;
