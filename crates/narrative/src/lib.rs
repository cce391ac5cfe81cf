//! # Narrative Collaborator Contract
//!
//! The evaluation core hands structured facts to a black-box text generator
//! and receives prose back. The generator is always optional and never
//! authoritative: every caller has a deterministic fallback, so narrative
//! failure can never fail a score, badge, report, or challenge computation.

pub mod error;

pub use error::NarrativeError;

use async_trait::async_trait;
use core_types::{EscalatedAlert, Grade, PatternType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-dimension score averages over a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionAverages {
    pub risk: f64,
    pub discipline: f64,
    pub strategy: f64,
    pub psychology: f64,
    pub consistency: f64,
}

impl DimensionAverages {
    /// Mean of the five dimensions.
    pub fn overall(&self) -> f64 {
        (self.risk + self.discipline + self.strategy + self.psychology + self.consistency) / 5.0
    }
}

/// Current versus previous 30-day averages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendFacts {
    pub current: DimensionAverages,
    pub previous: DimensionAverages,
}

/// Aggregated checklist statistics over the reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistStats {
    pub total_checklists: usize,
    pub completion_rate: f64,
    pub skip_rate: f64,
    pub average_items_checked: f64,
}

/// Trade counts over the reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStats {
    pub total: usize,
    pub buys: usize,
    pub sells: usize,
}

/// Everything a monthly-report summary is generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFacts {
    pub averages: DimensionAverages,
    pub grade: Grade,
    pub patterns: Vec<PatternType>,
    pub best_trade_symbol: Option<String>,
    pub worst_trade_symbol: Option<String>,
    pub trend: TrendFacts,
    pub pattern_frequency: BTreeMap<PatternType, u32>,
    pub checklist_stats: ChecklistStats,
    pub trade_stats: TradeStats,
    pub sentiment_context: Option<String>,
}

/// Everything mentor feedback is generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorFacts {
    pub alerts: Vec<EscalatedAlert>,
    pub history_context: Option<String>,
    pub sentiment_context: Option<String>,
}

/// The text-generation collaborator.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// A short educational summary for a monthly report.
    async fn report_summary(&self, facts: &ReportFacts) -> Result<String, NarrativeError>;

    /// Per-pattern educational feedback for freshly detected alerts.
    async fn mentor_feedback(
        &self,
        facts: &MentorFacts,
    ) -> Result<BTreeMap<PatternType, String>, NarrativeError>;
}

/// A generator that is never available. Callers fall back to their
/// deterministic templates.
#[derive(Debug, Default)]
pub struct DisabledNarrator;

#[async_trait]
impl NarrativeGenerator for DisabledNarrator {
    async fn report_summary(&self, _facts: &ReportFacts) -> Result<String, NarrativeError> {
        Err(NarrativeError::Disabled)
    }

    async fn mentor_feedback(
        &self,
        _facts: &MentorFacts,
    ) -> Result<BTreeMap<PatternType, String>, NarrativeError> {
        Err(NarrativeError::Disabled)
    }
}

/// The deterministic report summary used whenever the generator fails.
pub fn fallback_summary(grade: Grade) -> String {
    format!("Overall grade: {grade}. Keep practicing to improve your trading skills.")
}
