//! # Mentor Pattern Detection
//!
//! Scans live portfolio state and transaction history for behavioral
//! patterns (FOMO buys, panic sells, overtrading, concentration, stale
//! losers, sentiment-chasing) and enriches fresh alerts with their 30-day
//! recurrence history.
//!
//! All detection is stateless: snapshots in, alerts out. Persisting the
//! resulting triggers and generating narrative feedback belong to the
//! orchestration layer.

pub mod detectors;
pub mod escalation;

pub use escalation::escalate_alerts;

use chrono::{DateTime, Utc};
use core_types::{Holding, PatternAlert, Transaction};
use rust_decimal::Decimal;
use storage::SentimentSource;
use tracing::debug;

/// Runs every pattern detector and returns the combined alerts.
#[derive(Debug, Default)]
pub struct MentorEngine {}

impl MentorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run_all_checks(
        &self,
        now: DateTime<Utc>,
        transactions: &[Transaction],
        holdings: &[Holding],
        balance: Decimal,
        sentiment: &dyn SentimentSource,
    ) -> Vec<PatternAlert> {
        let mut alerts = Vec::new();
        alerts.extend(detectors::detect_fomo_buy(now, transactions));
        alerts.extend(detectors::detect_panic_sell(now, transactions));
        alerts.extend(detectors::detect_overtrading(now, transactions));
        alerts.extend(detectors::detect_over_concentration(holdings, balance));
        alerts.extend(detectors::detect_holding_losers(now, holdings, transactions));
        alerts.extend(detectors::detect_high_risk_position(holdings, balance));
        alerts.extend(detectors::detect_sentiment_fomo(now, transactions, sentiment).await);
        debug!(count = alerts.len(), "pattern detection complete");
        alerts
    }
}
