use crate::enums::{
    AssetType, BadgeChange, BadgeType, ChallengeStatus, ChallengeType, EscalationLevel, Grade,
    Mood, PatternType, ScoreDimension, Severity, TradeAction,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single executed paper trade. Append-only; ordering by timestamp drives
/// every rolling-window calculation.
///
/// The timestamp is kept as the raw string the platform recorded. History can
/// be dirty, so parsing is deferred to the window utilities, which silently
/// exclude anything unparseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub action: TradeAction,
    pub quantity: Decimal,
    pub price: Decimal,
    pub total: Decimal,
    pub timestamp: String,
}

/// A currently open position. Mutated by trade execution (external to this
/// system); a quantity of zero removes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub name: String,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub current_price: Option<Decimal>,
}

impl Holding {
    /// The price used for valuation: last known market price, falling back to
    /// the average entry price when no quote has been seen.
    pub fn market_price(&self) -> Decimal {
        self.current_price.unwrap_or(self.average_price)
    }

    pub fn market_value(&self) -> Decimal {
        self.quantity * self.market_price()
    }
}

/// The pre-trade checklist a user fills out (or skips) for one trade attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeChecklist {
    pub id: String,
    pub transaction_id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub action: TradeAction,
    pub item_company_understood: bool,
    pub item_chart_reviewed: bool,
    pub item_position_size: bool,
    pub item_exit_plan: bool,
    pub item_risk_acceptable: bool,
    pub skipped: bool,
    pub completed_count: u32,
    pub created_at: String,
}

impl TradeChecklist {
    /// All five items checked and the checklist was not skipped.
    pub fn is_full_completion(&self) -> bool {
        self.completed_count == 5 && !self.skipped
    }
}

/// A persisted mentor alert. Append-only; only `dismissed` ever mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorTrigger {
    pub id: String,
    pub pattern_type: PatternType,
    pub severity: Severity,
    pub symbol: Option<String>,
    pub message: String,
    /// Educational feedback from the narrative collaborator, when available.
    pub feedback: Option<String>,
    pub dismissed: bool,
    pub created_at: String,
}

/// A freshly detected behavior pattern, before escalation and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAlert {
    pub pattern_type: PatternType,
    pub severity: Severity,
    pub symbol: Option<String>,
    pub message: String,
}

/// A detected alert enriched with its 30-day recurrence history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalatedAlert {
    #[serde(flatten)]
    pub alert: PatternAlert,
    pub escalation_level: EscalationLevel,
    pub prior_count: u32,
    pub escalation_note: String,
}

/// One row of the daily score history. `date` is the unique key; recomputing
/// a day overwrites the row in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyScore {
    pub id: String,
    pub date: NaiveDate,
    pub risk_score: f64,
    pub discipline_score: f64,
    pub strategy_score: f64,
    pub psychology_score: f64,
    pub consistency_score: f64,
    pub trade_count: u32,
    pub active_day: bool,
    pub computed_at: DateTime<Utc>,
}

impl DailyScore {
    pub fn score(&self, dimension: ScoreDimension) -> f64 {
        match dimension {
            ScoreDimension::Risk => self.risk_score,
            ScoreDimension::Discipline => self.discipline_score,
            ScoreDimension::Strategy => self.strategy_score,
            ScoreDimension::Psychology => self.psychology_score,
            ScoreDimension::Consistency => self.consistency_score,
        }
    }
}

/// The persisted state of one badge.
///
/// `first_earned_at` is set exactly once and never cleared; `last_active_at`
/// is stamped only while the badge is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub badge_type: BadgeType,
    pub earned: bool,
    pub active: bool,
    pub qualifying_days: u32,
    pub first_earned_at: Option<DateTime<Utc>>,
    pub last_active_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// The outcome of evaluating one badge definition against the 30-day score
/// history. Merging into the persisted `Badge` happens at the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeAssessment {
    pub badge_type: BadgeType,
    pub earned: bool,
    pub active: bool,
    pub qualifying_days: u32,
    pub required_days: u32,
}

/// How one badge moved, recorded on a monthly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeUpdate {
    pub badge_type: BadgeType,
    pub change: BadgeChange,
}

/// One instance of a challenge from the fixed catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub challenge_type: ChallengeType,
    pub title: String,
    pub description: String,
    pub target_value: f64,
    pub current_value: f64,
    pub status: ChallengeStatus,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A generated monthly performance report. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub risk_avg: f64,
    pub discipline_avg: f64,
    pub strategy_avg: f64,
    pub psychology_avg: f64,
    pub consistency_avg: f64,
    pub overall_grade: Grade,
    pub best_trade_id: Option<String>,
    pub worst_trade_id: Option<String>,
    pub patterns_detected: Vec<PatternType>,
    pub summary: String,
    pub badge_updates: Vec<BadgeUpdate>,
    pub created_at: DateTime<Utc>,
}

/// Cached news sentiment for a symbol, served by the sentiment collaborator.
/// Absence of a snapshot means "no signal", never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentSnapshot {
    pub mood: Mood,
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub summary: String,
}
