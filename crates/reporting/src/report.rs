use crate::error::ReportError;
use chrono::{DateTime, Utc};
use core_types::time;
use core_types::{
    Badge, BadgeChange, BadgeUpdate, DailyScore, Grade, MentorTrigger, MonthlyReport, PatternType,
    ScoreDimension, TradeAction, TradeChecklist, Transaction,
};
use narrative::{
    fallback_summary, ChecklistStats, DimensionAverages, NarrativeGenerator, ReportFacts,
    TradeStats, TrendFacts,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// The facts one monthly report is built from. Score slices come from the
/// persistence collaborator: `daily_scores` covers the reporting window,
/// `extended_scores` twice that (for the trend comparison).
#[derive(Debug, Clone)]
pub struct ReportInputs<'a> {
    pub now: DateTime<Utc>,
    pub daily_scores: &'a [DailyScore],
    pub extended_scores: &'a [DailyScore],
    pub transactions: &'a [Transaction],
    pub triggers: &'a [MentorTrigger],
    pub checklists: &'a [TradeChecklist],
    pub badges: &'a [Badge],
    pub sentiment_context: Option<String>,
}

/// Builds monthly reports: averaged scores, a letter grade, best/worst trade,
/// detected patterns, and a narrative summary with a deterministic fallback.
#[derive(Debug, Default)]
pub struct ReportBuilder {}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn build(
        &self,
        inputs: ReportInputs<'_>,
        narrator: &dyn NarrativeGenerator,
    ) -> Result<MonthlyReport, ReportError> {
        if inputs.daily_scores.is_empty() {
            return Err(ReportError::NoScores);
        }
        let now = inputs.now;

        let rows: Vec<&DailyScore> = inputs.daily_scores.iter().collect();
        let averages = average_scores(&rows);
        let grade = Grade::from_average(averages.overall());

        // Best/worst trade by raw sell total, not profit/loss. Preserved
        // platform behavior; see the open-question test below.
        let (worst_trade, best_trade) = worst_and_best_sell(inputs.transactions);

        let patterns: Vec<PatternType> = inputs
            .triggers
            .iter()
            .map(|t| t.pattern_type)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut pattern_frequency: BTreeMap<PatternType, u32> = BTreeMap::new();
        for trigger in inputs.triggers {
            *pattern_frequency.entry(trigger.pattern_type).or_insert(0) += 1;
        }

        let cutoff = time::days_ago(now, 30).date_naive();
        let current: Vec<&DailyScore> = inputs
            .extended_scores
            .iter()
            .filter(|row| row.date >= cutoff)
            .collect();
        let previous: Vec<&DailyScore> = inputs
            .extended_scores
            .iter()
            .filter(|row| row.date < cutoff)
            .collect();
        let trend = TrendFacts {
            current: average_scores(&current),
            previous: average_scores(&previous),
        };

        let buys = inputs
            .transactions
            .iter()
            .filter(|t| t.action == TradeAction::Buy)
            .count();
        let sells = inputs
            .transactions
            .iter()
            .filter(|t| t.action == TradeAction::Sell)
            .count();
        let trade_stats = TradeStats {
            total: inputs.transactions.len(),
            buys,
            sells,
        };

        let facts = ReportFacts {
            averages,
            grade,
            patterns: patterns.clone(),
            best_trade_symbol: best_trade.map(|t| t.symbol.clone()),
            worst_trade_symbol: worst_trade.map(|t| t.symbol.clone()),
            trend,
            pattern_frequency,
            checklist_stats: checklist_stats(inputs.checklists),
            trade_stats,
            sentiment_context: inputs.sentiment_context.clone(),
        };

        let summary = match narrator.report_summary(&facts).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(error = %err, "narrative generation failed, using fallback summary");
                fallback_summary(grade)
            }
        };

        let badge_updates = inputs
            .badges
            .iter()
            .map(|badge| BadgeUpdate {
                badge_type: badge.badge_type,
                change: if badge.earned {
                    BadgeChange::Earned
                } else if badge.qualifying_days > 0 {
                    BadgeChange::Maintained
                } else {
                    BadgeChange::Lost
                },
            })
            .collect();

        Ok(MonthlyReport {
            id: format!("rpt-{}", now.timestamp_millis()),
            period_start: time::days_ago(now, 30).date_naive(),
            period_end: now.date_naive(),
            risk_avg: averages.risk,
            discipline_avg: averages.discipline,
            strategy_avg: averages.strategy,
            psychology_avg: averages.psychology,
            consistency_avg: averages.consistency,
            overall_grade: grade,
            best_trade_id: best_trade.map(|t| t.id.clone()),
            worst_trade_id: worst_trade.map(|t| t.id.clone()),
            patterns_detected: patterns,
            summary,
            badge_updates,
            created_at: now,
        })
    }
}

/// Per-dimension means over the rows, ignoring zero/missing values, rounded
/// to one decimal place. A dimension with no usable values averages to 0.
pub fn average_scores(rows: &[&DailyScore]) -> DimensionAverages {
    let mean_of = |dimension: ScoreDimension| {
        let values: Vec<f64> = rows
            .iter()
            .map(|row| row.score(dimension))
            .filter(|v| *v > 0.0)
            .collect();
        if values.is_empty() {
            0.0
        } else {
            round1(values.iter().sum::<f64>() / values.len() as f64)
        }
    };
    DimensionAverages {
        risk: mean_of(ScoreDimension::Risk),
        discipline: mean_of(ScoreDimension::Discipline),
        strategy: mean_of(ScoreDimension::Strategy),
        psychology: mean_of(ScoreDimension::Psychology),
        consistency: mean_of(ScoreDimension::Consistency),
    }
}

/// Aggregated checklist statistics over the reporting window.
pub fn checklist_stats(checklists: &[TradeChecklist]) -> ChecklistStats {
    let total = checklists.len();
    if total == 0 {
        return ChecklistStats::default();
    }
    let full = checklists.iter().filter(|c| c.is_full_completion()).count();
    let skips = checklists.iter().filter(|c| c.skipped).count();
    let avg_items = checklists
        .iter()
        .map(|c| c.completed_count as f64)
        .sum::<f64>()
        / total as f64;
    ChecklistStats {
        total_checklists: total,
        completion_rate: round1(full as f64 / total as f64 * 100.0),
        skip_rate: round1(skips as f64 / total as f64 * 100.0),
        average_items_checked: round1(avg_items),
    }
}

/// The sells with the lowest and highest raw `total` in the window.
fn worst_and_best_sell(transactions: &[Transaction]) -> (Option<&Transaction>, Option<&Transaction>) {
    let mut sells: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.action == TradeAction::Sell)
        .collect();
    if sells.is_empty() {
        return (None, None);
    }
    sells.sort_by(|a, b| a.total.cmp(&b.total));
    (sells.first().copied(), sells.last().copied())
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use core_types::{AssetType, BadgeType};
    use narrative::{DisabledNarrator, NarrativeError};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn score_row(date: chrono::NaiveDate, value: f64) -> DailyScore {
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
    }

    fn sell(id: &str, symbol: &str, total: rust_decimal::Decimal) -> Transaction {
        Transaction {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            asset_type: AssetType::Stock,
            action: TradeAction::Sell,
            quantity: dec!(1),
            price: total,
            total,
            timestamp: "2026-03-05T10:00:00Z".to_string(),
        }
    }

    fn badge(badge_type: BadgeType, earned: bool, qualifying_days: u32) -> Badge {
        Badge {
            id: format!("badge-{badge_type}"),
            badge_type,
            earned,
            active: earned,
            qualifying_days,
            first_earned_at: None,
            last_active_at: None,
            updated_at: now(),
        }
    }

    fn inputs<'a>(
        daily: &'a [DailyScore],
        extended: &'a [DailyScore],
        transactions: &'a [Transaction],
        badges: &'a [Badge],
    ) -> ReportInputs<'a> {
        ReportInputs {
            now: now(),
            daily_scores: daily,
            extended_scores: extended,
            transactions,
            triggers: &[],
            checklists: &[],
            badges,
            sentiment_context: None,
        }
    }

    #[test]
    fn averages_ignore_zero_rows() {
        let d1 = now().date_naive();
        let rows = [score_row(d1, 80.0), score_row(d1 - Duration::days(1), 0.0)];
        let refs: Vec<&DailyScore> = rows.iter().collect();
        let averages = average_scores(&refs);
        assert_eq!(averages.risk, 80.0);

        // A dimension with no usable values averages to zero, not NaN.
        let zeroes = [score_row(d1, 0.0)];
        let refs: Vec<&DailyScore> = zeroes.iter().collect();
        assert_eq!(average_scores(&refs).risk, 0.0);
    }

    #[tokio::test]
    async fn empty_history_cannot_be_reported() {
        let builder = ReportBuilder::new();
        let result = builder
            .build(inputs(&[], &[], &[], &[]), &DisabledNarrator)
            .await;
        assert!(matches!(result, Err(ReportError::NoScores)));
    }

    // Open question (preserved from the original): trade selection ranks by
    // raw sell total, so a small profitable exit can rank "worse" than a
    // large losing one. Kept as specified rather than switching to P/L.
    #[tokio::test]
    async fn best_and_worst_trades_rank_by_raw_sell_total() {
        let daily = [score_row(now().date_naive(), 70.0)];
        let txns = [
            sell("tx-small", "AAPL", dec!(500)),
            sell("tx-large", "MSFT", dec!(9000)),
            sell("tx-mid", "NVDA", dec!(2000)),
        ];
        let report = ReportBuilder::new()
            .build(inputs(&daily, &daily, &txns, &[]), &DisabledNarrator)
            .await
            .unwrap();
        assert_eq!(report.best_trade_id.as_deref(), Some("tx-large"));
        assert_eq!(report.worst_trade_id.as_deref(), Some("tx-small"));
    }

    #[tokio::test]
    async fn narrative_failure_degrades_to_the_templated_fallback() {
        let daily = [score_row(now().date_naive(), 85.0)];
        let report = ReportBuilder::new()
            .build(inputs(&daily, &daily, &[], &[]), &DisabledNarrator)
            .await
            .unwrap();
        assert_eq!(report.overall_grade, Grade::A);
        assert_eq!(
            report.summary,
            "Overall grade: A. Keep practicing to improve your trading skills."
        );
    }

    #[tokio::test]
    async fn a_succeeding_narrator_supplies_the_summary() {
        struct CannedNarrator;
        #[async_trait::async_trait]
        impl NarrativeGenerator for CannedNarrator {
            async fn report_summary(&self, facts: &ReportFacts) -> Result<String, NarrativeError> {
                Ok(format!("A solid {} month.", facts.grade))
            }
            async fn mentor_feedback(
                &self,
                _facts: &narrative::MentorFacts,
            ) -> Result<BTreeMap<PatternType, String>, NarrativeError> {
                Ok(BTreeMap::new())
            }
        }

        let daily = [score_row(now().date_naive(), 95.0)];
        let report = ReportBuilder::new()
            .build(inputs(&daily, &daily, &[], &[]), &CannedNarrator)
            .await
            .unwrap();
        assert_eq!(report.summary, "A solid A+ month.");
    }

    #[tokio::test]
    async fn badge_updates_classify_earned_maintained_lost() {
        let daily = [score_row(now().date_naive(), 70.0)];
        let badges = [
            badge(BadgeType::RiskGuardian, true, 25),
            badge(BadgeType::DisciplineMaster, false, 5),
            badge(BadgeType::StrategyBuilder, false, 0),
        ];
        let report = ReportBuilder::new()
            .build(inputs(&daily, &daily, &[], &badges), &DisabledNarrator)
            .await
            .unwrap();
        let changes: Vec<BadgeChange> = report.badge_updates.iter().map(|u| u.change).collect();
        assert_eq!(
            changes,
            vec![BadgeChange::Earned, BadgeChange::Maintained, BadgeChange::Lost]
        );
    }

    #[tokio::test]
    async fn trend_splits_the_extended_window_at_thirty_days() {
        let recent = score_row(now().date_naive() - Duration::days(5), 80.0);
        let old = score_row(now().date_naive() - Duration::days(45), 60.0);
        let daily = [recent.clone()];
        let extended = [recent, old];
        let report = ReportBuilder::new()
            .build(inputs(&daily, &extended, &[], &[]), &DisabledNarrator)
            .await
            .unwrap();
        // Period bounds come from the same 30-day cutoff.
        assert_eq!(report.period_end, now().date_naive());
        assert_eq!(
            report.period_start,
            now().date_naive() - Duration::days(30)
        );
    }

    #[test]
    fn checklist_stats_aggregate_the_window() {
        let make = |completed: u32, skipped: bool| TradeChecklist {
            id: "cl".to_string(),
            transaction_id: "tx".to_string(),
            symbol: "AAPL".to_string(),
            asset_type: AssetType::Stock,
            action: TradeAction::Buy,
            item_company_understood: true,
            item_chart_reviewed: true,
            item_position_size: true,
            item_exit_plan: true,
            item_risk_acceptable: true,
            skipped,
            completed_count: completed,
            created_at: "2026-03-01T10:00:00Z".to_string(),
        };
        let stats = checklist_stats(&[make(5, false), make(3, false), make(0, true)]);
        assert_eq!(stats.total_checklists, 3);
        assert_eq!(stats.completion_rate, 33.3);
        assert_eq!(stats.skip_rate, 33.3);
        assert_eq!(stats.average_items_checked, 2.7);

        assert_eq!(checklist_stats(&[]).total_checklists, 0);
    }
}
