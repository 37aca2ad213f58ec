//! Data pipeline for Agent Insights.
//!
//! Discovers and parses the two platform exports, validates their columns,
//! cleans and joins them, and aggregates the merged rows into the figures the
//! dashboard shows.

pub mod aggregator;
pub mod analysis;
pub mod cleaner;
pub mod export;
pub mod filter;
pub mod joiner;
pub mod reader;
pub mod validator;

pub use insights_core as core;
