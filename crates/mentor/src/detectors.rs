//! The seven stateless behavior-pattern scans.
//!
//! Each detector takes the evaluation time plus a snapshot slice and returns
//! zero or more alerts. None of them can fail: dirty timestamps are skipped
//! and a missing sentiment cache simply means no signal.

use chrono::{DateTime, Utc};
use core_types::time;
use core_types::{Holding, PatternAlert, PatternType, Severity, TradeAction, Transaction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeSet, HashMap};
use storage::SentimentSource;

/// Buys in the trailing 48h priced more than 15% above the symbol's 30-day
/// mean transaction price. Needs at least 3 priced transactions in the window;
/// at most one alert per symbol.
pub fn detect_fomo_buy(now: DateTime<Utc>, transactions: &[Transaction]) -> Vec<PatternAlert> {
    let mut alerts = Vec::new();
    let window_start = time::days_ago(now, 30);
    let recent_start = time::hours_ago(now, 48);

    for (symbol, txns) in group_by_symbol(transactions) {
        let mut prices_30d = Vec::new();
        let mut recent_buys = Vec::new();
        for txn in txns {
            let Some(ts) = time::parse_timestamp(&txn.timestamp) else {
                continue;
            };
            if ts >= window_start {
                prices_30d.push(txn.price);
            }
            if txn.action == TradeAction::Buy && ts >= recent_start {
                recent_buys.push(txn);
            }
        }

        if prices_30d.len() < 3 || recent_buys.is_empty() {
            continue;
        }

        let avg_price = prices_30d.iter().copied().sum::<Decimal>()
            / Decimal::from(prices_30d.len() as u64);
        for buy in recent_buys {
            if avg_price > Decimal::ZERO && buy.price > avg_price * dec!(1.15) {
                alerts.push(PatternAlert {
                    pattern_type: PatternType::FomoBuy,
                    severity: Severity::Warning,
                    symbol: Some(symbol.to_string()),
                    message: format!(
                        "Possible FOMO detected: You bought {symbol} when its price was \
                         significantly above its recent average. Consider reviewing \
                         historical price context before buying."
                    ),
                });
                break; // One alert per symbol.
            }
        }
    }

    alerts
}

/// Sells in the trailing 7 days at more than a 10% loss against any buy of
/// the same symbol within the preceding 48 hours.
///
/// Inherited behavior: the scan stops at the first qualifying sell/buy pair
/// across ALL symbols, so a run yields at most one alert. "One alert per
/// symbol" would be the more defensible cardinality; preserved as-is and
/// called out in the tests.
pub fn detect_panic_sell(now: DateTime<Utc>, transactions: &[Transaction]) -> Vec<PatternAlert> {
    let week_start = time::days_ago(now, 7);

    for (symbol, txns) in group_by_symbol(transactions) {
        let buys: Vec<&Transaction> = txns
            .iter()
            .filter(|t| t.action == TradeAction::Buy)
            .copied()
            .collect();

        for sell in txns.iter().filter(|t| t.action == TradeAction::Sell) {
            let Some(sell_ts) = time::parse_timestamp(&sell.timestamp) else {
                continue;
            };
            if sell_ts < week_start {
                continue;
            }

            for buy in &buys {
                let Some(buy_ts) = time::parse_timestamp(&buy.timestamp) else {
                    continue;
                };
                if buy.price <= Decimal::ZERO {
                    continue;
                }

                let hours_diff = (sell_ts - buy_ts).num_seconds() as f64 / 3600.0;
                if hours_diff > 0.0 && hours_diff <= 48.0 {
                    let loss_pct = to_f64((sell.price - buy.price) / buy.price) * 100.0;
                    if loss_pct < -10.0 {
                        return vec![PatternAlert {
                            pattern_type: PatternType::PanicSell,
                            severity: Severity::Critical,
                            symbol: Some(symbol.to_string()),
                            message: format!(
                                "Possible panic sell: You sold {symbol} at a {:.1}% loss \
                                 within {}h of buying. Quick exits from losses can lock in \
                                 avoidable losses.",
                                loss_pct.abs(),
                                hours_diff as i64
                            ),
                        }];
                    }
                }
            }
        }
    }

    Vec::new()
}

/// More than 5 transactions in the trailing 24 hours: one global alert.
pub fn detect_overtrading(now: DateTime<Utc>, transactions: &[Transaction]) -> Vec<PatternAlert> {
    let count = transactions
        .iter()
        .filter(|t| time::within_hours(&t.timestamp, now, 24))
        .count();

    if count > 5 {
        vec![PatternAlert {
            pattern_type: PatternType::Overtrading,
            severity: Severity::Warning,
            symbol: None,
            message: format!(
                "High trading frequency detected: {count} trades in the past 24 hours. \
                 Frequent trading can increase transaction costs and emotional \
                 decision-making."
            ),
        }]
    } else {
        Vec::new()
    }
}

/// Any holding above 30% of total portfolio value: one alert per holding.
pub fn detect_over_concentration(holdings: &[Holding], balance: Decimal) -> Vec<PatternAlert> {
    position_percentages(holdings, balance)
        .into_iter()
        .flatten()
        .filter(|(_, pct)| *pct > 30.0)
        .map(|(holding, pct)| PatternAlert {
            pattern_type: PatternType::OverConcentration,
            severity: Severity::Warning,
            symbol: Some(holding.symbol.clone()),
            message: format!(
                "Portfolio concentration alert: {} makes up {pct:.1}% of your portfolio. \
                 Diversification can help manage overall risk.",
                holding.symbol
            ),
        })
        .collect()
}

/// Holdings carrying more than a 20% unrealized loss for at least 14 days
/// since the earliest buy: one alert per holding.
pub fn detect_holding_losers(
    now: DateTime<Utc>,
    holdings: &[Holding],
    transactions: &[Transaction],
) -> Vec<PatternAlert> {
    let mut alerts = Vec::new();

    for holding in holdings {
        if holding.average_price <= Decimal::ZERO {
            continue;
        }
        let loss_pct = to_f64(
            (holding.market_price() - holding.average_price) / holding.average_price,
        ) * 100.0;
        if loss_pct >= -20.0 {
            continue;
        }

        let earliest_buy = transactions
            .iter()
            .filter(|t| t.symbol == holding.symbol && t.action == TradeAction::Buy)
            .filter_map(|t| time::parse_timestamp(&t.timestamp))
            .min();
        let Some(earliest_buy) = earliest_buy else {
            continue;
        };

        let days_held = (now - earliest_buy).num_days();
        if days_held >= 14 {
            alerts.push(PatternAlert {
                pattern_type: PatternType::HoldingLosers,
                severity: Severity::Info,
                symbol: Some(holding.symbol.clone()),
                message: format!(
                    "Extended unrealized loss: {} is down {:.1}% and has been held for \
                     {days_held} days. Consider reviewing your exit plan for this position.",
                    holding.symbol,
                    loss_pct.abs()
                ),
            });
        }
    }

    alerts
}

/// Any position above 25% of total portfolio value: one alert per holding.
/// Deliberately overlaps the 30% concentration rule.
pub fn detect_high_risk_position(holdings: &[Holding], balance: Decimal) -> Vec<PatternAlert> {
    position_percentages(holdings, balance)
        .into_iter()
        .flatten()
        .filter(|(_, pct)| *pct > 25.0)
        .map(|(holding, pct)| PatternAlert {
            pattern_type: PatternType::HighRiskPosition,
            severity: Severity::Warning,
            symbol: Some(holding.symbol.clone()),
            message: format!(
                "Large position size: {} represents {pct:.1}% of your total portfolio \
                 value. Large single positions increase portfolio risk.",
                holding.symbol
            ),
        })
        .collect()
}

/// Buys in the trailing 48 hours whose symbol shows more than 70% positive
/// cached sentiment: at most one alert per run.
pub async fn detect_sentiment_fomo(
    now: DateTime<Utc>,
    transactions: &[Transaction],
    sentiment: &dyn SentimentSource,
) -> Vec<PatternAlert> {
    let recent_start = time::hours_ago(now, 48);
    let mut checked: BTreeSet<&str> = BTreeSet::new();

    for txn in transactions {
        if txn.action != TradeAction::Buy {
            continue;
        }
        let Some(ts) = time::parse_timestamp(&txn.timestamp) else {
            continue;
        };
        if ts < recent_start {
            continue;
        }
        if !checked.insert(txn.symbol.as_str()) {
            continue;
        }

        if let Some(snapshot) = sentiment.cached_sentiment(&txn.symbol).await {
            if snapshot.positive_pct > 70.0 {
                return vec![PatternAlert {
                    pattern_type: PatternType::SentimentFomo,
                    severity: Severity::Warning,
                    symbol: Some(txn.symbol.clone()),
                    message: format!(
                        "You entered {} during a period of high news optimism ({:.0}% \
                         positive sentiment). Such periods can increase volatility and \
                         emotional trading.",
                        txn.symbol, snapshot.positive_pct
                    ),
                }];
            }
        }
    }

    Vec::new()
}

/// Groups transactions by symbol, preserving first-seen order.
fn group_by_symbol(transactions: &[Transaction]) -> Vec<(&str, Vec<&Transaction>)> {
    let mut groups: Vec<(&str, Vec<&Transaction>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for txn in transactions {
        let symbol = txn.symbol.as_str();
        let slot = *index.entry(symbol).or_insert_with(|| {
            groups.push((symbol, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(txn);
    }
    groups
}

/// Each holding with its share of total portfolio value, or `None` when the
/// portfolio has no value.
fn position_percentages(
    holdings: &[Holding],
    balance: Decimal,
) -> Option<Vec<(&Holding, f64)>> {
    let total_value = balance + holdings.iter().map(|h| h.market_value()).sum::<Decimal>();
    if total_value <= Decimal::ZERO {
        return None;
    }
    Some(
        holdings
            .iter()
            .map(|h| (h, to_f64(h.market_value() / total_value) * 100.0))
            .collect(),
    )
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
