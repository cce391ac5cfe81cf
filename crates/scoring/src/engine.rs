use crate::scorecard::{ScoreCard, ScoreInputs, SufficiencyFlags};
use configuration::EvaluationSettings;
use core_types::time;
use core_types::{DailyScore, Holding, MentorTrigger, PatternType, TradeAction, TradeChecklist, Transaction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

/// Neutral score used when a dimension has nothing to judge.
const NEUTRAL: f64 = 50.0;

/// A stateless calculator for the five behavioral score dimensions.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    settings: EvaluationSettings,
}

impl ScoringEngine {
    pub fn new(settings: EvaluationSettings) -> Self {
        Self { settings }
    }

    /// Computes all five scores, the eligibility gate, and the per-dimension
    /// sufficiency flags in one pass. Published scores are rounded to one
    /// decimal place.
    pub fn compute_all(&self, inputs: &ScoreInputs<'_>) -> ScoreCard {
        let eligible = self.check_eligibility(inputs.trade_count, inputs.active_days);

        let risk = self.compute_risk(inputs.holdings, inputs.balance);
        let discipline = self.compute_discipline(inputs.checklists, inputs.trade_count);
        let strategy = self.compute_strategy(inputs.transactions);
        let psychology = self.compute_psychology(inputs.triggers);
        let consistency = self.compute_consistency(inputs.history, inputs.active_days);

        debug!(
            risk,
            discipline, strategy, psychology, consistency, eligible, "computed daily scores"
        );

        ScoreCard {
            risk: round1(risk),
            discipline: round1(discipline),
            strategy: round1(strategy),
            psychology: round1(psychology),
            consistency: round1(consistency),
            eligible,
            trade_count: inputs.trade_count,
            active_days: inputs.active_days,
            insufficient_data: self.data_sufficiency(inputs),
        }
    }

    /// Position diversity + cash reserve + max single-position exposure.
    pub fn compute_risk(&self, holdings: &[Holding], balance: Decimal) -> f64 {
        let mut total_value = balance;
        let mut position_values = Vec::with_capacity(holdings.len());
        for holding in holdings {
            let value = holding.market_value();
            position_values.push(value);
            total_value += value;
        }

        if total_value <= Decimal::ZERO {
            return NEUTRAL; // Nothing to judge without a portfolio.
        }

        let mut score = 100.0;

        // Fewer than 3 holdings costs 15 points per missing position.
        let num_holdings = holdings.len();
        if num_holdings < 3 {
            score -= (3 - num_holdings) as f64 * 15.0;
        }

        // Cash reserve below 10% of total value.
        let cash_pct = to_f64(balance / total_value) * 100.0;
        if cash_pct < 10.0 {
            score -= (10.0 - cash_pct) * 2.0;
        }

        // Any single position above 25% of total value.
        for value in position_values {
            let pct = to_f64(value / total_value) * 100.0;
            if pct > 25.0 {
                score -= (pct - 25.0) * 1.5;
            }
        }

        clamp(score)
    }

    /// Checklist completion rate and average items checked, minus skips.
    pub fn compute_discipline(&self, checklists: &[TradeChecklist], trade_count: u32) -> f64 {
        if trade_count == 0 {
            return NEUTRAL;
        }

        let total = checklists.len();
        if total == 0 {
            return 20.0; // Trading without any checklists at all.
        }

        let full_completions = checklists.iter().filter(|c| c.is_full_completion()).count();
        let avg_items = checklists
            .iter()
            .map(|c| c.completed_count as f64)
            .sum::<f64>()
            / total as f64;
        let skips = checklists.iter().filter(|c| c.skipped).count();

        let completion_ratio = full_completions as f64 / total as f64;
        let mut score = completion_ratio * 60.0 + (avg_items / 5.0) * 40.0;

        let skip_ratio = skips as f64 / total as f64;
        score -= skip_ratio * 20.0;

        clamp(score)
    }

    /// Win rate, profit/loss ratio, and holding-duration distribution.
    ///
    /// Sells are classified against the flat mean of all buy prices seen for
    /// the symbol in the window, not inventory-matched lots.
    pub fn compute_strategy(&self, transactions: &[Transaction]) -> f64 {
        let sells: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.action == TradeAction::Sell)
            .collect();
        if sells.is_empty() {
            return 40.0; // Nothing closed out yet.
        }

        // Buys per symbol, preserving chronological order.
        let mut buy_map: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
        for txn in transactions.iter().filter(|t| t.action == TradeAction::Buy) {
            buy_map.entry(txn.symbol.as_str()).or_default().push(txn);
        }

        let mut wins = 0u32;
        let mut losses = 0u32;
        let mut total_profit = Decimal::ZERO;
        let mut total_loss = Decimal::ZERO;

        for sell in &sells {
            let Some(sym_buys) = buy_map.get(sell.symbol.as_str()) else {
                continue;
            };
            let avg_buy = sym_buys.iter().map(|b| b.price).sum::<Decimal>()
                / Decimal::from(sym_buys.len() as u64);

            if sell.price > avg_buy {
                wins += 1;
                total_profit += (sell.price - avg_buy) * sell.quantity;
            } else {
                losses += 1;
                total_loss += (avg_buy - sell.price) * sell.quantity;
            }
        }

        let total_trades = wins + losses;
        if total_trades == 0 {
            return 40.0;
        }

        let win_rate = wins as f64 / total_trades as f64;
        // No realized losses defaults the ratio to 2.0, below the 3.0 cap.
        let pl_ratio = if total_loss > Decimal::ZERO {
            (to_f64(total_profit) / to_f64(total_loss)).min(3.0)
        } else {
            2.0
        };

        // Duration between each sell and the first buy of its symbol.
        let mut durations = Vec::new();
        for sell in &sells {
            let Some(sell_ts) = time::parse_timestamp(&sell.timestamp) else {
                continue;
            };
            let Some(sym_buys) = buy_map.get(sell.symbol.as_str()) else {
                continue;
            };
            if let Some(buy_ts) = time::parse_timestamp(&sym_buys[0].timestamp) {
                durations.push((sell_ts - buy_ts).num_seconds() as f64 / 86_400.0);
            }
        }

        let duration_score = if durations.is_empty() {
            NEUTRAL
        } else {
            let avg_duration = durations.iter().sum::<f64>() / durations.len() as f64;
            if avg_duration >= 3.0 {
                80.0
            } else if avg_duration >= 1.0 {
                60.0
            } else {
                30.0
            }
        };

        let score = win_rate * 40.0 + (pl_ratio / 3.0) * 30.0 + (duration_score / 100.0) * 30.0;
        clamp(score)
    }

    /// Starts at 100 and subtracts a fixed cost per detected pattern. Every
    /// trigger instance counts; there is no deduplication.
    pub fn compute_psychology(&self, triggers: &[MentorTrigger]) -> f64 {
        let mut score = 100.0;
        for trigger in triggers {
            score -= match trigger.pattern_type {
                PatternType::FomoBuy => 10.0,
                PatternType::PanicSell => 15.0,
                PatternType::Overtrading => 10.0,
                _ => 5.0,
            };
        }
        clamp(score)
    }

    /// Active-day ratio, score stability, and drawdown-day avoidance.
    pub fn compute_consistency(&self, history: &[DailyScore], active_days: u32) -> f64 {
        let window_days = self.settings.window_days;
        if window_days == 0 {
            return NEUTRAL;
        }

        // Active days ratio (50% weight).
        let active_ratio = (active_days as f64 / window_days as f64).min(1.0);
        let active_component = active_ratio * 50.0;

        // Score stability across the four non-consistency dimensions,
        // pooled over usable (>0) values (30% weight).
        let mut stability_component = 30.0;
        if history.len() >= 3 {
            let pooled: Vec<f64> = history
                .iter()
                .flat_map(|row| {
                    [
                        row.risk_score,
                        row.discipline_score,
                        row.strategy_score,
                        row.psychology_score,
                    ]
                })
                .filter(|v| *v > 0.0)
                .collect();
            if pooled.len() >= 3 {
                let stability = (100.0 - sample_variance(&pooled) / 5.0).max(0.0);
                stability_component = (stability / 100.0) * 30.0;
            }
        }

        // Fraction of days whose four-dimension mean fell below 30 (20% weight).
        let drawdown_days = history
            .iter()
            .filter(|row| {
                let avg = (row.risk_score
                    + row.discipline_score
                    + row.strategy_score
                    + row.psychology_score)
                    / 4.0;
                avg < 30.0
            })
            .count();
        let drawdown_ratio = drawdown_days as f64 / history.len().max(1) as f64;
        let drawdown_component = (1.0 - drawdown_ratio) * 20.0;

        clamp(active_component + stability_component + drawdown_component)
    }

    /// Scores are meaningful once the window holds enough activity.
    pub fn check_eligibility(&self, trade_count: u32, active_days: u32) -> bool {
        trade_count >= self.settings.min_trades || active_days >= self.settings.min_active_days
    }

    /// Per-dimension sufficiency flags; `true` means insufficient data.
    pub fn data_sufficiency(&self, inputs: &ScoreInputs<'_>) -> SufficiencyFlags {
        let has_sells = inputs
            .transactions
            .iter()
            .any(|t| t.action == TradeAction::Sell);
        SufficiencyFlags {
            risk: inputs.holdings.is_empty(),
            discipline: inputs.trade_count == 0 || inputs.checklists.is_empty(),
            strategy: !has_sells,
            psychology: inputs.trade_count == 0,
            consistency: inputs.history.len() < 3,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(EvaluationSettings::default())
    }
}

fn clamp(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Sample variance (n - 1 denominator), matching `statistics.variance`.
fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{AssetType, Severity};
    use rust_decimal_macros::dec;

    fn holding(symbol: &str, quantity: Decimal, average: Decimal, current: Option<Decimal>) -> Holding {
        Holding {
            symbol: symbol.to_string(),
            asset_type: AssetType::Stock,
            name: symbol.to_string(),
            quantity,
            average_price: average,
            current_price: current,
        }
    }

    fn txn(symbol: &str, action: TradeAction, quantity: Decimal, price: Decimal, ts: &str) -> Transaction {
        Transaction {
            id: format!("tx-{symbol}-{ts}"),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            asset_type: AssetType::Stock,
            action,
            quantity,
            price,
            total: quantity * price,
            timestamp: ts.to_string(),
        }
    }

    fn checklist(completed_count: u32, skipped: bool) -> TradeChecklist {
        TradeChecklist {
            id: "cl-1".to_string(),
            transaction_id: "tx-1".to_string(),
            symbol: "AAPL".to_string(),
            asset_type: AssetType::Stock,
            action: TradeAction::Buy,
            item_company_understood: true,
            item_chart_reviewed: true,
            item_position_size: true,
            item_exit_plan: true,
            item_risk_acceptable: true,
            skipped,
            completed_count,
            created_at: "2026-03-01T10:00:00Z".to_string(),
        }
    }

    fn trigger(pattern_type: PatternType) -> MentorTrigger {
        MentorTrigger {
            id: "mt-1".to_string(),
            pattern_type,
            severity: Severity::Warning,
            symbol: None,
            message: String::new(),
            feedback: None,
            dismissed: false,
            created_at: "2026-03-01T10:00:00Z".to_string(),
        }
    }

    fn score_row(date: &str, risk: f64, discipline: f64, strategy: f64, psychology: f64) -> DailyScore {
        DailyScore {
            id: format!("ds-{date}"),
            date: date.parse().unwrap(),
            risk_score: risk,
            discipline_score: discipline,
            strategy_score: strategy,
            psychology_score: psychology,
            consistency_score: 50.0,
            trade_count: 1,
            active_day: true,
            computed_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    fn engine() -> ScoringEngine {
        ScoringEngine::default()
    }

    #[test]
    fn risk_with_cash_but_no_holdings_pays_the_diversity_penalty() {
        // total = 100000 > 0, so this is not the neutral shortcut.
        let score = engine().compute_risk(&[], dec!(100000));
        assert_eq!(score, 55.0);
    }

    #[test]
    fn risk_with_empty_portfolio_is_neutral() {
        assert_eq!(engine().compute_risk(&[], Decimal::ZERO), 50.0);
    }

    #[test]
    fn risk_penalizes_concentration_and_thin_cash() {
        // One holding worth 9500 against 500 cash: 2 missing holdings,
        // cash at 5%, position at 95%.
        let holdings = vec![holding("AAPL", dec!(100), dec!(95), None)];
        let score = engine().compute_risk(&holdings, dec!(500));
        // 100 - 30 - (10 - 5)*2 - (95 - 25)*1.5 = -45 -> clamped to 0.
        assert_eq!(score, 0.0);
    }

    #[test]
    fn discipline_without_trades_is_neutral() {
        assert_eq!(engine().compute_discipline(&[], 0), 50.0);
    }

    #[test]
    fn discipline_with_trades_but_no_checklists_is_poor() {
        assert_eq!(engine().compute_discipline(&[], 5), 20.0);
    }

    #[test]
    fn discipline_blends_completion_average_and_skips() {
        let checklists = vec![checklist(5, false), checklist(3, false), checklist(0, true)];
        // completion 1/3 * 60 + (8/3 / 5) * 40 - 1/3 * 20
        let expected = (1.0 / 3.0) * 60.0 + (8.0 / 3.0 / 5.0) * 40.0 - (1.0 / 3.0) * 20.0;
        let score = engine().compute_discipline(&checklists, 3);
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn strategy_without_sells_cannot_be_evaluated() {
        let txns = vec![txn("AAPL", TradeAction::Buy, dec!(1), dec!(100), "2026-03-01T10:00:00Z")];
        assert_eq!(engine().compute_strategy(&txns), 40.0);
    }

    #[test]
    fn strategy_defaults_profit_ratio_when_there_are_no_losses() {
        // One buy at 100, sold four days later at 120: win rate 1.0,
        // pl_ratio defaults to 2.0 (not the 3.0 cap), duration score 80.
        let txns = vec![
            txn("AAPL", TradeAction::Buy, dec!(1), dec!(100), "2026-03-01T10:00:00Z"),
            txn("AAPL", TradeAction::Sell, dec!(1), dec!(120), "2026-03-05T10:00:00Z"),
        ];
        let expected = 1.0 * 40.0 + (2.0 / 3.0) * 30.0 + 0.8 * 30.0;
        let score = engine().compute_strategy(&txns);
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn strategy_uses_flat_average_buy_price_not_lots() {
        // Buys at 100 and 200; the flat mean is 150, so a sell at 140 counts
        // as a loss even though it beats the first lot.
        let txns = vec![
            txn("AAPL", TradeAction::Buy, dec!(1), dec!(100), "2026-03-01T10:00:00Z"),
            txn("AAPL", TradeAction::Buy, dec!(1), dec!(200), "2026-03-02T10:00:00Z"),
            txn("AAPL", TradeAction::Sell, dec!(1), dec!(140), "2026-03-06T10:00:00Z"),
        ];
        // win_rate 0, pl_ratio 0 (profit 0 / loss 10), duration >= 3d -> 80.
        let expected = 0.0 * 40.0 + (0.0 / 3.0) * 30.0 + 0.8 * 30.0;
        let score = engine().compute_strategy(&txns);
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn psychology_subtracts_per_trigger_instance() {
        let triggers = vec![
            trigger(PatternType::FomoBuy),
            trigger(PatternType::FomoBuy),
            trigger(PatternType::PanicSell),
            trigger(PatternType::OverConcentration),
        ];
        // 100 - 10 - 10 - 15 - 5
        assert_eq!(engine().compute_psychology(&triggers), 60.0);
    }

    #[test]
    fn psychology_clamps_at_zero() {
        let triggers: Vec<MentorTrigger> =
            (0..10).map(|_| trigger(PatternType::PanicSell)).collect();
        assert_eq!(engine().compute_psychology(&triggers), 0.0);
    }

    #[test]
    fn consistency_defaults_on_empty_history() {
        // 0 active + 30 default stability + 20 (no drawdown rows) = 50.
        assert_eq!(engine().compute_consistency(&[], 0), 50.0);
    }

    #[test]
    fn consistency_rewards_stable_history() {
        let history = vec![
            score_row("2026-03-01", 70.0, 70.0, 70.0, 70.0),
            score_row("2026-03-02", 70.0, 70.0, 70.0, 70.0),
            score_row("2026-03-03", 70.0, 70.0, 70.0, 70.0),
        ];
        // 15 active days: 25 active + 30 stability (zero variance) + 20.
        assert_eq!(engine().compute_consistency(&history, 15), 75.0);
    }

    #[test]
    fn consistency_counts_drawdown_days() {
        let history = vec![
            score_row("2026-03-01", 10.0, 10.0, 10.0, 10.0),
            score_row("2026-03-02", 10.0, 10.0, 10.0, 10.0),
        ];
        // Below the 3-row minimum, stability stays at its default; both rows
        // are drawdown days so the drawdown component drops to 0.
        assert_eq!(engine().compute_consistency(&history, 0), 30.0);
    }

    #[test]
    fn eligibility_passes_on_either_threshold() {
        let eng = engine();
        assert!(eng.check_eligibility(25, 0));
        assert!(eng.check_eligibility(0, 15));
        assert!(!eng.check_eligibility(24, 14));
    }

    #[test]
    fn all_scores_stay_in_range_on_empty_inputs() {
        let inputs = ScoreInputs {
            holdings: &[],
            balance: Decimal::ZERO,
            checklists: &[],
            transactions: &[],
            triggers: &[],
            history: &[],
            active_days: 0,
            trade_count: 0,
        };
        let card = engine().compute_all(&inputs);
        for score in [card.risk, card.discipline, card.strategy, card.psychology, card.consistency] {
            assert!((0.0..=100.0).contains(&score));
        }
        assert!(!card.eligible);
        assert!(card.insufficient_data.risk);
        assert!(card.insufficient_data.discipline);
        assert!(card.insufficient_data.strategy);
        assert!(card.insufficient_data.psychology);
        assert!(card.insufficient_data.consistency);
    }

    #[test]
    fn published_scores_are_rounded_to_one_decimal() {
        let checklists = vec![checklist(5, false), checklist(3, false), checklist(0, true)];
        let inputs = ScoreInputs {
            holdings: &[],
            balance: dec!(100000),
            checklists: &checklists,
            transactions: &[],
            triggers: &[],
            history: &[],
            active_days: 1,
            trade_count: 3,
        };
        let card = engine().compute_all(&inputs);
        assert_eq!(card.discipline, 34.7);
    }

    #[test]
    fn sample_variance_uses_n_minus_one() {
        assert_eq!(sample_variance(&[1.0, 2.0, 3.0]), 1.0);
        assert_eq!(sample_variance(&[5.0]), 0.0);
    }
}
