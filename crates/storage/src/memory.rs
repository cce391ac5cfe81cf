//! An in-memory `EvaluationStore`, used by the CLI snapshot runner and tests.

use crate::error::StorageError;
use crate::{EvaluationStore, SentimentSource};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::time;
use core_types::{
    Badge, BadgeAssessment, Challenge, ChallengeStatus, DailyScore, Holding, MentorTrigger,
    MonthlyReport, PatternType, SentimentSnapshot, TradeChecklist, Transaction,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// A full activity snapshot, loadable from a JSON file.
#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivitySeed {
    pub balance: Decimal,
    pub transactions: Vec<Transaction>,
    pub holdings: Vec<Holding>,
    pub checklists: Vec<TradeChecklist>,
    pub triggers: Vec<MentorTrigger>,
    pub daily_scores: Vec<DailyScore>,
    pub challenges: Vec<Challenge>,
    /// Cached sentiment by symbol, standing in for the sentiment collaborator.
    pub sentiment: BTreeMap<String, SentimentSnapshot>,
}

impl Default for ActivitySeed {
    fn default() -> Self {
        Self {
            // The platform's starting paper balance.
            balance: dec!(100000),
            transactions: Vec::new(),
            holdings: Vec::new(),
            checklists: Vec::new(),
            triggers: Vec::new(),
            daily_scores: Vec::new(),
            challenges: Vec::new(),
            sentiment: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    balance: Decimal,
    transactions: Vec<Transaction>,
    holdings: Vec<Holding>,
    checklists: Vec<TradeChecklist>,
    triggers: Vec<MentorTrigger>,
    daily_scores: BTreeMap<NaiveDate, DailyScore>,
    badges: BTreeMap<core_types::BadgeType, Badge>,
    challenges: Vec<Challenge>,
    reports: Vec<MonthlyReport>,
    sentiment: BTreeMap<String, SentimentSnapshot>,
}

#[derive(Debug)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::from_seed(ActivitySeed::default())
    }

    pub fn from_seed(seed: ActivitySeed) -> Self {
        let mut daily_scores = BTreeMap::new();
        for score in seed.daily_scores {
            daily_scores.insert(score.date, score);
        }
        Self {
            state: RwLock::new(State {
                balance: seed.balance,
                transactions: seed.transactions,
                holdings: seed.holdings,
                checklists: seed.checklists,
                triggers: seed.triggers,
                daily_scores,
                badges: BTreeMap::new(),
                challenges: seed.challenges,
                reports: Vec::new(),
                sentiment: seed.sentiment,
            }),
        }
    }
}

#[async_trait]
impl EvaluationStore for InMemoryStore {
    async fn transactions(&self) -> Result<Vec<Transaction>, StorageError> {
        let state = self.state.read().await;
        let mut txns = state.transactions.clone();
        // Oldest first; rows without a parseable timestamp sort to the front.
        txns.sort_by_key(|t| time::parse_timestamp(&t.timestamp));
        Ok(txns)
    }

    async fn holdings(&self) -> Result<Vec<Holding>, StorageError> {
        Ok(self.state.read().await.holdings.clone())
    }

    async fn cash_balance(&self) -> Result<Decimal, StorageError> {
        Ok(self.state.read().await.balance)
    }

    async fn checklists_within(
        &self,
        now: DateTime<Utc>,
        days: i64,
    ) -> Result<Vec<TradeChecklist>, StorageError> {
        let state = self.state.read().await;
        let mut rows: Vec<TradeChecklist> = state
            .checklists
            .iter()
            .filter(|c| time::within_days(&c.created_at, now, days))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn triggers_within(
        &self,
        now: DateTime<Utc>,
        days: i64,
    ) -> Result<Vec<MentorTrigger>, StorageError> {
        let state = self.state.read().await;
        let mut rows: Vec<MentorTrigger> = state
            .triggers
            .iter()
            .filter(|t| time::within_days(&t.created_at, now, days))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn record_trigger(&self, trigger: MentorTrigger) -> Result<(), StorageError> {
        self.state.write().await.triggers.push(trigger);
        Ok(())
    }

    async fn dismiss_trigger(&self, trigger_id: &str) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        match state.triggers.iter_mut().find(|t| t.id == trigger_id) {
            Some(trigger) => {
                trigger.dismissed = true;
                Ok(())
            }
            None => Err(StorageError::NotFound(format!(
                "mentor trigger '{trigger_id}'"
            ))),
        }
    }

    async fn trigger_counts(&self) -> Result<BTreeMap<PatternType, u32>, StorageError> {
        let state = self.state.read().await;
        let mut counts = BTreeMap::new();
        for trigger in &state.triggers {
            *counts.entry(trigger.pattern_type).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn daily_scores_within(
        &self,
        now: DateTime<Utc>,
        days: i64,
    ) -> Result<Vec<DailyScore>, StorageError> {
        let cutoff = time::days_ago(now, days).date_naive();
        let state = self.state.read().await;
        // Newest first.
        Ok(state
            .daily_scores
            .range(cutoff..)
            .rev()
            .map(|(_, score)| score.clone())
            .collect())
    }

    async fn all_daily_scores(&self) -> Result<Vec<DailyScore>, StorageError> {
        let state = self.state.read().await;
        Ok(state.daily_scores.values().cloned().collect())
    }

    async fn upsert_daily_score(&self, score: DailyScore) -> Result<(), StorageError> {
        self.state
            .write()
            .await
            .daily_scores
            .insert(score.date, score);
        Ok(())
    }

    async fn badges(&self) -> Result<Vec<Badge>, StorageError> {
        Ok(self.state.read().await.badges.values().cloned().collect())
    }

    async fn upsert_badge(
        &self,
        assessment: &BadgeAssessment,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        match state.badges.get_mut(&assessment.badge_type) {
            Some(badge) => {
                badge.earned = assessment.earned;
                badge.active = assessment.active;
                badge.qualifying_days = assessment.qualifying_days;
                if badge.first_earned_at.is_none() && assessment.earned {
                    badge.first_earned_at = Some(at);
                }
                if assessment.active {
                    badge.last_active_at = Some(at);
                }
                badge.updated_at = at;
            }
            None => {
                state.badges.insert(
                    assessment.badge_type,
                    Badge {
                        id: format!("badge-{}", assessment.badge_type),
                        badge_type: assessment.badge_type,
                        earned: assessment.earned,
                        active: assessment.active,
                        qualifying_days: assessment.qualifying_days,
                        first_earned_at: assessment.earned.then_some(at),
                        last_active_at: assessment.active.then_some(at),
                        updated_at: at,
                    },
                );
            }
        }
        Ok(())
    }

    async fn active_challenges(&self) -> Result<Vec<Challenge>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .challenges
            .iter()
            .filter(|c| c.status == ChallengeStatus::Active)
            .cloned()
            .collect())
    }

    async fn challenge_history(&self) -> Result<Vec<Challenge>, StorageError> {
        Ok(self.state.read().await.challenges.clone())
    }

    async fn insert_challenge(&self, challenge: Challenge) -> Result<(), StorageError> {
        self.state.write().await.challenges.push(challenge);
        Ok(())
    }

    async fn update_challenge(
        &self,
        challenge_id: &str,
        current_value: f64,
        status: ChallengeStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        match state.challenges.iter_mut().find(|c| c.id == challenge_id) {
            Some(challenge) => {
                challenge.current_value = current_value;
                challenge.status = status;
                if completed_at.is_some() {
                    challenge.completed_at = completed_at;
                }
                Ok(())
            }
            None => Err(StorageError::NotFound(format!(
                "challenge '{challenge_id}'"
            ))),
        }
    }

    async fn record_report(&self, report: MonthlyReport) -> Result<(), StorageError> {
        self.state.write().await.reports.push(report);
        Ok(())
    }

    async fn latest_report(&self) -> Result<Option<MonthlyReport>, StorageError> {
        Ok(self.state.read().await.reports.last().cloned())
    }
}

#[async_trait]
impl SentimentSource for InMemoryStore {
    async fn cached_sentiment(&self, symbol: &str) -> Option<SentimentSnapshot> {
        self.state.read().await.sentiment.get(symbol).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::BadgeType;

    fn assessment(earned: bool, qualifying_days: u32) -> BadgeAssessment {
        BadgeAssessment {
            badge_type: BadgeType::RiskGuardian,
            earned,
            active: earned,
            qualifying_days,
            required_days: 21,
        }
    }

    #[tokio::test]
    async fn first_earned_at_is_sticky_across_non_earning_evaluations() {
        let store = InMemoryStore::new();
        let t1 = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();

        store.upsert_badge(&assessment(true, 22), t1).await.unwrap();
        store.upsert_badge(&assessment(false, 10), t2).await.unwrap();

        let badge = &store.badges().await.unwrap()[0];
        assert!(!badge.earned);
        assert_eq!(badge.first_earned_at, Some(t1));
        // last_active_at does not advance while the badge is inactive.
        assert_eq!(badge.last_active_at, Some(t1));
        assert_eq!(badge.updated_at, t2);
    }

    #[tokio::test]
    async fn daily_score_upsert_is_keyed_by_date() {
        let store = InMemoryStore::new();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut score = DailyScore {
            id: "ds-2026-03-01".to_string(),
            date: now.date_naive(),
            risk_score: 50.0,
            discipline_score: 50.0,
            strategy_score: 40.0,
            psychology_score: 100.0,
            consistency_score: 50.0,
            trade_count: 0,
            active_day: false,
            computed_at: now,
        };
        store.upsert_daily_score(score.clone()).await.unwrap();
        score.risk_score = 60.0;
        store.upsert_daily_score(score).await.unwrap();

        let rows = store.all_daily_scores().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].risk_score, 60.0);
    }

    #[tokio::test]
    async fn updating_an_unknown_challenge_is_an_error() {
        let store = InMemoryStore::new();
        let err = store
            .update_challenge("missing", 1.0, ChallengeStatus::Active, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
