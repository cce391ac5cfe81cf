//! # Behavioral Score Computers
//!
//! This crate derives the five 0-100 behavioral scores (risk, discipline,
//! strategy, psychology, consistency) from a snapshot of trading activity.
//!
//! ## Architectural Principles
//!
//! - **Pure logic crate:** every computation takes an immutable fact snapshot
//!   and returns a value. No storage, no clocks, no side effects, so the five
//!   computers can run in parallel and be tested in isolation.
//! - **Scores never fail:** thin or dirty activity history produces neutral
//!   defaults plus advisory sufficiency flags, never errors.

pub mod engine;
pub mod scorecard;

pub use engine::ScoringEngine;
pub use scorecard::{ScoreCard, ScoreInputs, SufficiencyFlags};
