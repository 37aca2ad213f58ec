//! Terminal presentation for Agent Insights: the ratatui dashboard and the
//! plain-text summary.

pub mod app;
pub mod components;
pub mod overview_view;
pub mod summary;
pub mod table_view;
pub mod themes;

pub use insights_core as core;
