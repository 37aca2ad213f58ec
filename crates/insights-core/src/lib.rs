//! Shared domain layer for Agent Insights.
//!
//! Holds the export column catalogue, the cleaned record types, label
//! translation tables, timestamp parsing, display formatting, CLI settings and
//! the common error type used by every other crate in the workspace.

pub mod columns;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
pub mod translations;

pub use error::{InsightsError, Result};
