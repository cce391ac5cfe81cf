//! # Monthly Reports & Behavior Summary
//!
//! Turns persisted score history and windowed activity into a monthly
//! report (averages, letter grade, best/worst trade, narrative summary with
//! deterministic fallback) and an all-time behavior summary (window
//! comparison, trend labels, good-day streaks).

pub mod behavior;
pub mod error;
pub mod report;

pub use behavior::{compute_behavior_summary, BehaviorSummary, ImprovementTrend};
pub use error::ReportError;
pub use report::{average_scores, checklist_stats, ReportBuilder, ReportInputs};
