//! The seven challenge progress computers.
//!
//! Each is a pure function over the activity snapshot; `progress_for`
//! dispatches on the challenge type with an exhaustive match, so adding a
//! catalog entry without a computer fails to compile.

use chrono::{DateTime, Utc};
use core_types::time;
use core_types::{
    AssetType, ChallengeType, Holding, Mood, TradeAction, TradeChecklist, Transaction,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;
use storage::SentimentSource;

/// The facts challenge progress is computed from. `transactions` is the full
/// history, oldest first; `checklists` covers the trailing 30 days.
#[derive(Debug, Clone, Copy)]
pub struct ChallengeInputs<'a> {
    pub holdings: &'a [Holding],
    pub balance: Decimal,
    pub transactions: &'a [Transaction],
    pub checklists: &'a [TradeChecklist],
}

/// Current progress for one challenge type.
pub async fn progress_for(
    challenge_type: ChallengeType,
    inputs: &ChallengeInputs<'_>,
    sentiment: &dyn SentimentSource,
    now: DateTime<Utc>,
) -> f64 {
    match challenge_type {
        ChallengeType::DiversifySectors => diversify_sectors(inputs.holdings),
        ChallengeType::CashReserve => {
            cash_reserve(inputs.balance, inputs.holdings, inputs.transactions, now)
        }
        ChallengeType::ChecklistStreak => checklist_streak(inputs.checklists),
        ChallengeType::HoldDuration => hold_duration(inputs.holdings, inputs.transactions, now),
        ChallengeType::TradeVariety => trade_variety(inputs.transactions),
        ChallengeType::NeutralTrader => neutral_trader(inputs.transactions, sentiment, now).await,
        ChallengeType::HypeResistant => hype_resistant(inputs.transactions, now),
    }
}

/// Distinct (asset type, symbol) pairs currently held.
pub fn diversify_sectors(holdings: &[Holding]) -> f64 {
    let held: BTreeSet<(AssetType, &str)> = holdings
        .iter()
        .filter(|h| !h.symbol.is_empty())
        .map(|h| (h.asset_type, h.symbol.as_str()))
        .collect();
    held.len() as f64
}

/// Consecutive no-buy days (scanning backward from today) while cash sits at
/// 25% or more of total portfolio value. Capped at 7.
pub fn cash_reserve(
    balance: Decimal,
    holdings: &[Holding],
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> f64 {
    let total_value =
        balance + holdings.iter().map(|h| h.market_value()).sum::<Decimal>();
    if total_value <= Decimal::ZERO {
        return 0.0;
    }

    let cash_pct = (balance / total_value) * dec!(100);
    if cash_pct < dec!(25) {
        return 0.0;
    }

    let buy_days: BTreeSet<_> = transactions
        .iter()
        .filter(|t| t.action == TradeAction::Buy)
        .filter_map(|t| time::parse_day(&t.timestamp))
        .collect();

    let mut consecutive = 0u32;
    for day_offset in 0..30 {
        let check_date = time::days_ago(now, day_offset).date_naive();
        if buy_days.contains(&check_date) {
            break;
        }
        consecutive += 1;
    }
    f64::from(consecutive.min(7))
}

/// Newest-first run of fully completed, unskipped checklists. Capped at 10.
pub fn checklist_streak(checklists: &[TradeChecklist]) -> f64 {
    let mut sorted: Vec<&TradeChecklist> = checklists.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let streak = sorted
        .iter()
        .take_while(|c| c.is_full_completion())
        .count() as u32;
    f64::from(streak.min(10))
}

/// Longest current holding duration in days, from the earliest buy of each
/// held symbol. Capped at 5.
pub fn hold_duration(
    holdings: &[Holding],
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> f64 {
    let mut max_days: f64 = 0.0;
    for holding in holdings {
        let earliest = transactions
            .iter()
            .filter(|t| t.symbol == holding.symbol && t.action == TradeAction::Buy)
            .filter_map(|t| time::parse_timestamp(&t.timestamp))
            .min();
        if let Some(earliest) = earliest {
            let days = (now - earliest).num_seconds() as f64 / 86_400.0;
            max_days = max_days.max(days);
        }
    }
    max_days.min(5.0)
}

/// Distinct asset types ever traded.
pub fn trade_variety(transactions: &[Transaction]) -> f64 {
    let types: BTreeSet<AssetType> = transactions.iter().map(|t| t.asset_type).collect();
    types.len() as f64
}

/// Distinct symbols bought in the trailing 30 days while their cached
/// sentiment mood was neutral. Capped at 3.
pub async fn neutral_trader(
    transactions: &[Transaction],
    sentiment: &dyn SentimentSource,
    now: DateTime<Utc>,
) -> f64 {
    let mut checked: BTreeSet<&str> = BTreeSet::new();
    let mut count = 0u32;

    for txn in transactions {
        if txn.action != TradeAction::Buy || !time::within_days(&txn.timestamp, now, 30) {
            continue;
        }
        if !checked.insert(txn.symbol.as_str()) {
            continue;
        }
        if let Some(snapshot) = sentiment.cached_sentiment(&txn.symbol).await {
            if snapshot.mood == Mood::Neutral {
                count += 1;
            }
        }
    }
    f64::from(count.min(3))
}

/// Consecutive days (scanning backward from today) without any buy in the
/// trailing 14 days; no buys at all is full credit. Capped at 7.
pub fn hype_resistant(transactions: &[Transaction], now: DateTime<Utc>) -> f64 {
    let buy_days: BTreeSet<_> = transactions
        .iter()
        .filter(|t| t.action == TradeAction::Buy)
        .filter(|t| time::within_days(&t.timestamp, now, 14))
        .filter_map(|t| time::parse_day(&t.timestamp))
        .collect();

    if buy_days.is_empty() {
        return 7.0;
    }

    let mut consecutive = 0u32;
    for day_offset in 0..14 {
        let check_date = time::days_ago(now, day_offset).date_naive();
        if buy_days.contains(&check_date) {
            break;
        }
        consecutive += 1;
    }
    f64::from(consecutive.min(7))
}
