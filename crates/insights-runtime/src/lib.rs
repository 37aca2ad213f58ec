//! Runtime layer for Agent Insights.
//!
//! Owns the analysis cache and the dashboard session state shared between the
//! data pipeline and the presentation layer.

pub mod cache;
pub mod session;

pub use insights_core as core;
pub use insights_data as data;
