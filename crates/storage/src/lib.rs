//! Collaborator contracts for persistence and cached sentiment.
//!
//! The evaluation core never talks to a database directly; it goes through
//! the `EvaluationStore` trait, which any backend can implement. The crate
//! ships an in-memory implementation used by tests and the CLI.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{
    Badge, BadgeAssessment, Challenge, ChallengeStatus, DailyScore, Holding, MentorTrigger,
    MonthlyReport, PatternType, SentimentSnapshot, TradeChecklist, Transaction,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub mod error;
pub mod memory;

pub use error::StorageError;
pub use memory::{ActivitySeed, InMemoryStore};

/// The persistence collaborator: window-scoped reads and key-scoped upserts.
///
/// Ordering contracts the evaluators rely on:
/// - `transactions` is the full history, oldest first;
/// - `daily_scores_within` and `checklists_within` are newest first;
/// - `all_daily_scores` is oldest first.
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    async fn transactions(&self) -> Result<Vec<Transaction>, StorageError>;

    async fn holdings(&self) -> Result<Vec<Holding>, StorageError>;

    async fn cash_balance(&self) -> Result<Decimal, StorageError>;

    async fn checklists_within(
        &self,
        now: DateTime<Utc>,
        days: i64,
    ) -> Result<Vec<TradeChecklist>, StorageError>;

    async fn triggers_within(
        &self,
        now: DateTime<Utc>,
        days: i64,
    ) -> Result<Vec<MentorTrigger>, StorageError>;

    async fn record_trigger(&self, trigger: MentorTrigger) -> Result<(), StorageError>;

    async fn dismiss_trigger(&self, trigger_id: &str) -> Result<(), StorageError>;

    /// All-time trigger totals by pattern type.
    async fn trigger_counts(&self) -> Result<BTreeMap<PatternType, u32>, StorageError>;

    async fn daily_scores_within(
        &self,
        now: DateTime<Utc>,
        days: i64,
    ) -> Result<Vec<DailyScore>, StorageError>;

    async fn all_daily_scores(&self) -> Result<Vec<DailyScore>, StorageError>;

    /// Atomic per-date upsert; recomputing a day overwrites the row.
    async fn upsert_daily_score(&self, score: DailyScore) -> Result<(), StorageError>;

    async fn badges(&self) -> Result<Vec<Badge>, StorageError>;

    /// Atomic per-badge-type upsert. `first_earned_at` is set only on the
    /// first earned transition and never cleared; `last_active_at` advances
    /// only while the badge is active.
    async fn upsert_badge(
        &self,
        assessment: &BadgeAssessment,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    async fn active_challenges(&self) -> Result<Vec<Challenge>, StorageError>;

    /// Every challenge instance ever created, terminal ones included.
    async fn challenge_history(&self) -> Result<Vec<Challenge>, StorageError>;

    async fn insert_challenge(&self, challenge: Challenge) -> Result<(), StorageError>;

    async fn update_challenge(
        &self,
        challenge_id: &str,
        current_value: f64,
        status: ChallengeStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError>;

    async fn record_report(&self, report: MonthlyReport) -> Result<(), StorageError>;

    async fn latest_report(&self) -> Result<Option<MonthlyReport>, StorageError>;
}

/// The sentiment collaborator: cached lookups only. Absence means the symbol
/// has no signal; it is never an error.
#[async_trait]
pub trait SentimentSource: Send + Sync {
    async fn cached_sentiment(&self, symbol: &str) -> Option<SentimentSnapshot>;
}
