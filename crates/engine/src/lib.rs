//! # Evaluation Engine
//!
//! The orchestrator that wires the pure computers (scoring, mentor, badges,
//! challenges, reporting) to the persistence, sentiment, and narrative
//! collaborators. Every operation reads a snapshot, computes, and writes
//! back through key-scoped upserts, so repeated invocation for the same day
//! is idempotent and concurrent recomputation resolves last-writer-wins.

use crate::error::EngineError;
use badges::BadgeEvaluator;
use challenges::{ChallengeInputs, display_progress, next_status, progress_for, seed_challenge};
use chrono::{DateTime, Utc};
use configuration::Config;
use core_types::time;
use core_types::{
    BadgeAssessment, Challenge, ChallengeType, DailyScore, EscalationLevel, Holding,
    MentorTrigger, Mood, MonthlyReport, TradeChecklist, Transaction,
};
use mentor::{escalate_alerts, MentorEngine};
use narrative::{MentorFacts, NarrativeGenerator};
use reporting::{compute_behavior_summary, BehaviorSummary, ReportBuilder, ReportInputs};
use rust_decimal::Decimal;
use scoring::{ScoreCard, ScoreInputs, ScoringEngine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use storage::{EvaluationStore, SentimentSource};
use tracing::{info, warn};
use uuid::Uuid;

pub mod error;

/// The result of one daily aggregation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEvaluation {
    pub scores: ScoreCard,
    pub record: DailyScore,
    pub badges: Vec<BadgeAssessment>,
}

/// One persisted alert with its escalation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub trigger: MentorTrigger,
    pub escalation_level: EscalationLevel,
    pub prior_count: u32,
    pub escalation_note: String,
}

/// The result of an analyze-now run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorAnalysis {
    pub alerts: Vec<AlertRecord>,
    pub improvement_notes: Vec<String>,
}

/// An active challenge with its freshly computed display progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeView {
    pub challenge: Challenge,
    pub progress_pct: f64,
}

/// The central orchestrator for the evaluation subsystem.
pub struct EvaluationEngine {
    config: Config,
    store: Arc<dyn EvaluationStore>,
    sentiment: Arc<dyn SentimentSource>,
    narrator: Arc<dyn NarrativeGenerator>,
    scoring: ScoringEngine,
    badge_evaluator: BadgeEvaluator,
    mentor: MentorEngine,
    report_builder: ReportBuilder,
}

impl EvaluationEngine {
    pub fn new(
        config: Config,
        store: Arc<dyn EvaluationStore>,
        sentiment: Arc<dyn SentimentSource>,
        narrator: Arc<dyn NarrativeGenerator>,
    ) -> Self {
        let scoring = ScoringEngine::new(config.evaluation.clone());
        let badge_evaluator = BadgeEvaluator::new(config.badges.clone());
        Self {
            config,
            store,
            sentiment,
            narrator,
            scoring,
            badge_evaluator,
            mentor: MentorEngine::new(),
            report_builder: ReportBuilder::new(),
        }
    }

    /// Computes and persists today's score row, then re-evaluates badges
    /// against the extended history. Idempotent per date: invoking this any
    /// number of times with unchanged inputs leaves one identical row.
    pub async fn compute_daily_scores(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DailyEvaluation, EngineError> {
        let window_days = i64::from(self.config.evaluation.window_days);

        let transactions = self.store.transactions().await?;
        let holdings = self.store.holdings().await?;
        let balance = self.store.cash_balance().await?;
        let checklists = self.store.checklists_within(now, window_days).await?;
        let triggers = self.store.triggers_within(now, window_days).await?;
        let history = self.store.daily_scores_within(now, window_days).await?;

        let recent: Vec<Transaction> = transactions
            .into_iter()
            .filter(|t| time::within_days(&t.timestamp, now, window_days))
            .collect();
        let trade_count = recent.len() as u32;
        let active_days = recent
            .iter()
            .filter_map(|t| time::parse_day(&t.timestamp))
            .collect::<BTreeSet<_>>()
            .len() as u32;

        let scores = self.scoring.compute_all(&ScoreInputs {
            holdings: &holdings,
            balance,
            checklists: &checklists,
            transactions: &recent,
            triggers: &triggers,
            history: &history,
            active_days,
            trade_count,
        });

        let date = now.date_naive();
        let record = DailyScore {
            id: format!("ds-{date}"),
            date,
            risk_score: scores.risk,
            discipline_score: scores.discipline,
            strategy_score: scores.strategy,
            psychology_score: scores.psychology,
            consistency_score: scores.consistency,
            trade_count,
            active_day: active_days > 0,
            computed_at: now,
        };
        self.store.upsert_daily_score(record.clone()).await?;

        // Badges see the history including today's row.
        let updated_history = self.store.daily_scores_within(now, window_days).await?;
        let assessments = self.badge_evaluator.evaluate(&updated_history, &triggers);
        for assessment in &assessments {
            self.store.upsert_badge(assessment, now).await?;
        }

        info!(%date, trade_count, active_days, "daily scores persisted");
        Ok(DailyEvaluation {
            scores,
            record,
            badges: assessments,
        })
    }

    /// Runs all pattern checks over live state, escalates against the 30-day
    /// trigger history, asks the narrative collaborator for feedback, and
    /// persists one trigger per alert.
    pub async fn analyze(&self, now: DateTime<Utc>) -> Result<MentorAnalysis, EngineError> {
        let transactions = self.store.transactions().await?;
        let holdings = self.store.holdings().await?;
        let balance = self.store.cash_balance().await?;

        let alerts = self
            .mentor
            .run_all_checks(now, &transactions, &holdings, balance, self.sentiment.as_ref())
            .await;

        let trigger_history = self.store.triggers_within(now, 30).await?;
        let (enriched, improvement_notes) = escalate_alerts(alerts, &trigger_history);

        let history_context = self.history_context(&enriched, &improvement_notes, &trigger_history);
        let sentiment_context = self.mentor_sentiment_context(&holdings, &enriched).await;

        let facts = MentorFacts {
            alerts: enriched.clone(),
            history_context,
            sentiment_context,
        };
        let feedback = match self.narrator.mentor_feedback(&facts).await {
            Ok(map) => Some(map),
            Err(err) => {
                warn!(error = %err, "mentor narrative unavailable, persisting alerts without feedback");
                None
            }
        };

        let mut records = Vec::with_capacity(enriched.len());
        for alert in enriched {
            let trigger = MentorTrigger {
                id: trigger_id(now),
                pattern_type: alert.alert.pattern_type,
                severity: alert.alert.severity,
                symbol: alert.alert.symbol.clone(),
                message: alert.alert.message.clone(),
                feedback: feedback
                    .as_ref()
                    .and_then(|map| map.get(&alert.alert.pattern_type).cloned()),
                dismissed: false,
                created_at: now.to_rfc3339(),
            };
            self.store.record_trigger(trigger.clone()).await?;
            records.push(AlertRecord {
                trigger,
                escalation_level: alert.escalation_level,
                prior_count: alert.prior_count,
                escalation_note: alert.escalation_note,
            });
        }

        info!(
            alerts = records.len(),
            improvements = improvement_notes.len(),
            "mentor analysis complete"
        );
        Ok(MentorAnalysis {
            alerts: records,
            improvement_notes,
        })
    }

    /// Marks a persisted trigger as dismissed.
    pub async fn dismiss_alert(&self, trigger_id: &str) -> Result<(), EngineError> {
        self.store.dismiss_trigger(trigger_id).await?;
        Ok(())
    }

    /// Builds and persists a monthly report over the trailing 30 days.
    pub async fn generate_report(&self, now: DateTime<Utc>) -> Result<MonthlyReport, EngineError> {
        let daily_scores = self.store.daily_scores_within(now, 30).await?;
        let extended_scores = self.store.daily_scores_within(now, 60).await?;
        let transactions = self.store.transactions().await?;
        let recent: Vec<Transaction> = transactions
            .into_iter()
            .filter(|t| time::within_days(&t.timestamp, now, 30))
            .collect();
        let triggers = self.store.triggers_within(now, 30).await?;
        let checklists = self.store.checklists_within(now, 30).await?;
        let badges = self.store.badges().await?;
        let sentiment_context = self.report_sentiment_context(&recent).await;

        let report = self
            .report_builder
            .build(
                ReportInputs {
                    now,
                    daily_scores: &daily_scores,
                    extended_scores: &extended_scores,
                    transactions: &recent,
                    triggers: &triggers,
                    checklists: &checklists,
                    badges: &badges,
                    sentiment_context,
                },
                self.narrator.as_ref(),
            )
            .await?;

        self.store.record_report(report.clone()).await?;
        info!(grade = %report.overall_grade, "monthly report persisted");
        Ok(report)
    }

    /// The active challenge set with fresh display progress, seeding the
    /// full catalog on first contact.
    pub async fn active_challenges(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChallengeView>, EngineError> {
        let mut active = self.store.active_challenges().await?;
        if active.is_empty() {
            for template in &self.config.challenges {
                self.store
                    .insert_challenge(seed_challenge(template, now))
                    .await?;
            }
            active = self.store.active_challenges().await?;
        }
        self.challenge_views(active, now).await
    }

    /// Re-scores every active challenge, applies terminal transitions, and
    /// re-seeds any challenge type missing from the active set, guaranteeing
    /// exactly one active instance per type.
    pub async fn refresh_challenges(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChallengeView>, EngineError> {
        let active = self.store.active_challenges().await?;
        let inputs_data = self.challenge_snapshot(now).await?;
        let inputs = inputs_data.as_inputs();

        for challenge in &active {
            let progress =
                progress_for(challenge.challenge_type, &inputs, self.sentiment.as_ref(), now)
                    .await;
            let (status, completed_at) = next_status(challenge, progress, now);
            if status.is_terminal() {
                info!(challenge = %challenge.challenge_type, ?status, "challenge closed");
            }
            self.store
                .update_challenge(&challenge.id, progress, status, completed_at)
                .await?;
        }

        let remaining = self.store.active_challenges().await?;
        let active_types: BTreeSet<ChallengeType> =
            remaining.iter().map(|c| c.challenge_type).collect();
        for template in &self.config.challenges {
            if !active_types.contains(&template.challenge_type) {
                self.store
                    .insert_challenge(seed_challenge(template, now))
                    .await?;
            }
        }

        let refreshed = self.store.active_challenges().await?;
        self.challenge_views(refreshed, now).await
    }

    /// Long-term behavior summary over the full score history.
    pub async fn behavior_summary(&self, now: DateTime<Utc>) -> Result<BehaviorSummary, EngineError> {
        let all_scores = self.store.all_daily_scores().await?;
        let trigger_totals = self.store.trigger_counts().await?;
        Ok(compute_behavior_summary(&all_scores, trigger_totals, now))
    }

    async fn challenge_views(
        &self,
        challenges: Vec<Challenge>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChallengeView>, EngineError> {
        let inputs_data = self.challenge_snapshot(now).await?;
        let inputs = inputs_data.as_inputs();

        let mut views = Vec::with_capacity(challenges.len());
        for mut challenge in challenges {
            let progress =
                progress_for(challenge.challenge_type, &inputs, self.sentiment.as_ref(), now)
                    .await;
            challenge.current_value = progress;
            let progress_pct = display_progress(progress, challenge.target_value);
            views.push(ChallengeView {
                challenge,
                progress_pct,
            });
        }
        Ok(views)
    }

    async fn challenge_snapshot(&self, now: DateTime<Utc>) -> Result<ChallengeSnapshot, EngineError> {
        Ok(ChallengeSnapshot {
            holdings: self.store.holdings().await?,
            balance: self.store.cash_balance().await?,
            transactions: self.store.transactions().await?,
            checklists: self.store.checklists_within(now, 30).await?,
        })
    }

    /// Escalation and improvement lines for the narrative collaborator.
    fn history_context(
        &self,
        enriched: &[core_types::EscalatedAlert],
        improvement_notes: &[String],
        trigger_history: &[MentorTrigger],
    ) -> Option<String> {
        if trigger_history.is_empty() {
            return None;
        }
        let mut lines: Vec<String> = enriched
            .iter()
            .filter(|a| a.escalation_level != EscalationLevel::First)
            .map(|a| format!("- {}: {}", a.alert.pattern_type, a.escalation_note))
            .collect();
        lines.extend(improvement_notes.iter().cloned());
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    /// Non-neutral sentiment lines for up to five held or alerted symbols.
    async fn mentor_sentiment_context(
        &self,
        holdings: &[Holding],
        enriched: &[core_types::EscalatedAlert],
    ) -> Option<String> {
        let mut symbols: BTreeSet<&str> =
            holdings.iter().map(|h| h.symbol.as_str()).collect();
        for alert in enriched {
            if let Some(symbol) = alert.alert.symbol.as_deref() {
                symbols.insert(symbol);
            }
        }

        let mut lines = Vec::new();
        for symbol in symbols.into_iter().take(5) {
            if let Some(snapshot) = self.sentiment.cached_sentiment(symbol).await {
                if snapshot.mood != Mood::Neutral {
                    lines.push(format!(
                        "- {symbol}: mood={}, {}",
                        snapshot.mood, snapshot.summary
                    ));
                }
            }
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    /// Sentiment lines for up to five symbols traded in the window.
    async fn report_sentiment_context(&self, recent: &[Transaction]) -> Option<String> {
        let symbols: BTreeSet<&str> = recent
            .iter()
            .filter(|t| !t.symbol.is_empty())
            .map(|t| t.symbol.as_str())
            .collect();

        let mut lines = Vec::new();
        for symbol in symbols.into_iter().take(5) {
            if let Some(snapshot) = self.sentiment.cached_sentiment(symbol).await {
                lines.push(format!(
                    "  {symbol}: {} - {}",
                    snapshot.mood, snapshot.summary
                ));
            }
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

/// Owned copy of the store reads one challenge pass needs.
struct ChallengeSnapshot {
    holdings: Vec<Holding>,
    balance: Decimal,
    transactions: Vec<Transaction>,
    checklists: Vec<TradeChecklist>,
}

impl ChallengeSnapshot {
    fn as_inputs(&self) -> ChallengeInputs<'_> {
        ChallengeInputs {
            holdings: &self.holdings,
            balance: self.balance,
            transactions: &self.transactions,
            checklists: &self.checklists,
        }
    }
}

fn trigger_id(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!("mt-{}-{suffix}", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use core_types::{AssetType, ChallengeStatus, PatternType, Severity, TradeAction};
    use narrative::DisabledNarrator;
    use rust_decimal_macros::dec;
    use storage::{ActivitySeed, InMemoryStore};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn engine_with(seed: ActivitySeed) -> (EvaluationEngine, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::from_seed(seed));
        let engine = EvaluationEngine::new(
            Config::default(),
            store.clone(),
            store.clone(),
            Arc::new(DisabledNarrator),
        );
        (engine, store)
    }

    fn txn(symbol: &str, action: TradeAction, price: Decimal, ts: &str) -> Transaction {
        Transaction {
            id: format!("tx-{symbol}-{ts}"),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            asset_type: AssetType::Stock,
            action,
            quantity: dec!(1),
            price,
            total: price,
            timestamp: ts.to_string(),
        }
    }

    fn holding(symbol: &str, asset_type: AssetType, quantity: Decimal, price: Decimal) -> Holding {
        Holding {
            symbol: symbol.to_string(),
            asset_type,
            name: symbol.to_string(),
            quantity,
            average_price: price,
            current_price: None,
        }
    }

    fn trigger_row(pattern_type: PatternType, created_at: &str) -> MentorTrigger {
        MentorTrigger {
            id: format!("mt-{pattern_type}-{created_at}"),
            pattern_type,
            severity: Severity::Warning,
            symbol: None,
            message: String::new(),
            feedback: None,
            dismissed: false,
            created_at: created_at.to_string(),
        }
    }

    fn history_rows(days: u32, value: f64) -> Vec<DailyScore> {
        (1..=days)
            .map(|i| {
                let date = now().date_naive() - Duration::days(i64::from(i));
                DailyScore {
                    id: format!("ds-{date}"),
                    date,
                    risk_score: value,
                    discipline_score: value,
                    strategy_score: value,
                    psychology_score: value,
                    consistency_score: value,
                    trade_count: 1,
                    active_day: true,
                    computed_at: now(),
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn aggregator_is_idempotent_per_date() {
        let seed = ActivitySeed {
            transactions: vec![
                txn("AAPL", TradeAction::Buy, dec!(100), "2026-03-08T10:00:00Z"),
                txn("AAPL", TradeAction::Sell, dec!(110), "2026-03-09T10:00:00Z"),
            ],
            ..ActivitySeed::default()
        };
        let (engine, store) = engine_with(seed);

        let first = engine.compute_daily_scores(now()).await.unwrap();
        let second = engine.compute_daily_scores(now()).await.unwrap();

        let rows = store.all_daily_scores().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(first.record, second.record);
        assert_eq!(rows[0], first.record);
        assert_eq!(rows[0].date, now().date_naive());
    }

    #[tokio::test]
    async fn badges_are_evaluated_against_the_extended_history() {
        let seed = ActivitySeed {
            daily_scores: history_rows(29, 80.0),
            ..ActivitySeed::default()
        };
        let (engine, store) = engine_with(seed);

        let outcome = engine.compute_daily_scores(now()).await.unwrap();
        let risk_guardian = outcome
            .badges
            .iter()
            .find(|b| b.badge_type == core_types::BadgeType::RiskGuardian)
            .unwrap();
        assert!(risk_guardian.earned);
        assert!(risk_guardian.qualifying_days >= 21);

        let persisted = store.badges().await.unwrap();
        let row = persisted
            .iter()
            .find(|b| b.badge_type == core_types::BadgeType::RiskGuardian)
            .unwrap();
        assert!(row.earned);
        assert_eq!(row.first_earned_at, Some(now()));
    }

    #[tokio::test]
    async fn analyze_persists_escalated_triggers() {
        // Six buys inside 24h trip overtrading; four prior overtrading
        // triggers in the window make it persistent.
        let transactions: Vec<Transaction> = (0..6)
            .map(|i| {
                txn(
                    "AAPL",
                    TradeAction::Buy,
                    dec!(100),
                    &format!("2026-03-10T0{i}:00:00Z"),
                )
            })
            .collect();
        let triggers = (0..4)
            .map(|i| trigger_row(PatternType::Overtrading, &format!("2026-03-0{}T00:00:00Z", i + 1)))
            .collect();
        let seed = ActivitySeed {
            transactions,
            triggers,
            ..ActivitySeed::default()
        };
        let (engine, store) = engine_with(seed);

        let analysis = engine.analyze(now()).await.unwrap();
        assert_eq!(analysis.alerts.len(), 1);
        let alert = &analysis.alerts[0];
        assert_eq!(alert.trigger.pattern_type, PatternType::Overtrading);
        assert_eq!(alert.escalation_level, EscalationLevel::Persistent);
        assert_eq!(alert.prior_count, 4);
        // The narrator is disabled, so no feedback is attached.
        assert_eq!(alert.trigger.feedback, None);

        // The fresh trigger joined the history.
        let counts = store.trigger_counts().await.unwrap();
        assert_eq!(counts.get(&PatternType::Overtrading), Some(&5));
    }

    #[tokio::test]
    async fn analyze_reports_improvements_for_absent_patterns() {
        let triggers = (0..3)
            .map(|i| trigger_row(PatternType::PanicSell, &format!("2026-03-0{}T00:00:00Z", i + 1)))
            .collect();
        let seed = ActivitySeed {
            triggers,
            ..ActivitySeed::default()
        };
        let (engine, _) = engine_with(seed);

        let analysis = engine.analyze(now()).await.unwrap();
        assert!(analysis.alerts.is_empty());
        assert_eq!(analysis.improvement_notes.len(), 1);
        assert!(analysis.improvement_notes[0].contains("'panic_sell'"));
    }

    #[tokio::test]
    async fn dismissing_an_alert_only_flips_its_flag() {
        let transactions: Vec<Transaction> = (0..6)
            .map(|i| {
                txn(
                    "AAPL",
                    TradeAction::Buy,
                    dec!(100),
                    &format!("2026-03-10T0{i}:00:00Z"),
                )
            })
            .collect();
        let seed = ActivitySeed {
            transactions,
            ..ActivitySeed::default()
        };
        let (engine, store) = engine_with(seed);

        let analysis = engine.analyze(now()).await.unwrap();
        let id = analysis.alerts[0].trigger.id.clone();
        engine.dismiss_alert(&id).await.unwrap();

        let triggers = store.triggers_within(now(), 30).await.unwrap();
        let row = triggers.iter().find(|t| t.id == id).unwrap();
        assert!(row.dismissed);
        assert_eq!(row.pattern_type, PatternType::Overtrading);
    }

    #[tokio::test]
    async fn first_contact_seeds_one_active_challenge_per_type() {
        let (engine, _) = engine_with(ActivitySeed::default());
        let views = engine.active_challenges(now()).await.unwrap();
        assert_eq!(views.len(), 7);
        let types: BTreeSet<ChallengeType> =
            views.iter().map(|v| v.challenge.challenge_type).collect();
        assert_eq!(types.len(), 7);
        assert!(views
            .iter()
            .all(|v| v.challenge.status == ChallengeStatus::Active));
    }

    #[tokio::test]
    async fn refresh_completes_challenges_and_reseeds_their_type() {
        // Three distinct holdings complete diversify_sectors; a quiet, cash
        // heavy portfolio also completes cash_reserve and hype_resistant.
        let seed = ActivitySeed {
            holdings: vec![
                holding("AAPL", AssetType::Stock, dec!(10), dec!(100)),
                holding("MSFT", AssetType::Stock, dec!(10), dec!(100)),
                holding("BTC", AssetType::Crypto, dec!(1), dec!(500)),
            ],
            ..ActivitySeed::default()
        };
        let (engine, store) = engine_with(seed);

        engine.active_challenges(now()).await.unwrap();
        let views = engine.refresh_challenges(now()).await.unwrap();

        // The active set is whole again: exactly one instance per type.
        assert_eq!(views.len(), 7);
        let types: BTreeSet<ChallengeType> =
            views.iter().map(|v| v.challenge.challenge_type).collect();
        assert_eq!(types.len(), 7);

        let history = store.challenge_history().await.unwrap();
        let completed: Vec<&Challenge> = history
            .iter()
            .filter(|c| c.status == ChallengeStatus::Completed)
            .collect();
        assert_eq!(completed.len(), 3);
        assert!(completed.iter().all(|c| c.completed_at == Some(now())));

        // Terminal instances stay terminal across another refresh.
        let completed_ids: Vec<String> = completed.iter().map(|c| c.id.clone()).collect();
        let later = now() + Duration::seconds(1);
        engine.refresh_challenges(later).await.unwrap();
        let history = store.challenge_history().await.unwrap();
        for id in completed_ids {
            let row = history.iter().find(|c| c.id == id).unwrap();
            assert_eq!(row.status, ChallengeStatus::Completed);
            assert_eq!(row.completed_at, Some(now()));
        }
    }

    #[tokio::test]
    async fn expired_challenges_rotate_out_on_refresh() {
        let (engine, store) = engine_with(ActivitySeed::default());
        engine.active_challenges(now()).await.unwrap();

        // Far enough out that every deadline has passed.
        let later = now() + Duration::days(60);
        let views = engine.refresh_challenges(later).await.unwrap();

        assert_eq!(views.len(), 7);
        let history = store.challenge_history().await.unwrap();
        // cash_reserve and hype_resistant complete instead of expiring (a
        // quiet portfolio reaches their targets); the other five expire.
        let expired = history
            .iter()
            .filter(|c| c.status == ChallengeStatus::Expired)
            .count();
        assert_eq!(expired, 5);
    }

    #[tokio::test]
    async fn report_generation_persists_the_report() {
        let seed = ActivitySeed {
            daily_scores: history_rows(10, 85.0),
            ..ActivitySeed::default()
        };
        let (engine, store) = engine_with(seed);

        let report = engine.generate_report(now()).await.unwrap();
        assert_eq!(report.overall_grade, core_types::Grade::A);
        assert_eq!(
            report.summary,
            "Overall grade: A. Keep practicing to improve your trading skills."
        );

        let latest = store.latest_report().await.unwrap().unwrap();
        assert_eq!(latest.id, report.id);
    }

    #[tokio::test]
    async fn report_needs_score_history() {
        let (engine, _) = engine_with(ActivitySeed::default());
        let result = engine.generate_report(now()).await;
        assert!(matches!(result, Err(EngineError::Report(_))));
    }

    #[tokio::test]
    async fn behavior_summary_walks_all_history() {
        let seed = ActivitySeed {
            daily_scores: history_rows(5, 70.0),
            triggers: vec![trigger_row(PatternType::FomoBuy, "2026-03-01T00:00:00Z")],
            ..ActivitySeed::default()
        };
        let (engine, _) = engine_with(seed);

        let summary = engine.behavior_summary(now()).await.unwrap();
        assert_eq!(summary.total_scored_days, 5);
        assert_eq!(summary.longest_streak, 5);
        assert_eq!(summary.current_streak, 5);
        assert_eq!(summary.trigger_totals.get(&PatternType::FomoBuy), Some(&1));
    }
}
