use core_types::{DailyScore, Holding, MentorTrigger, TradeChecklist, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The facts one daily evaluation is computed from. All collections are
/// scoped to the rolling window by the caller; `transactions` is oldest first.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs<'a> {
    pub holdings: &'a [Holding],
    pub balance: Decimal,
    pub checklists: &'a [TradeChecklist],
    pub transactions: &'a [Transaction],
    pub triggers: &'a [MentorTrigger],
    pub history: &'a [DailyScore],
    pub active_days: u32,
    pub trade_count: u32,
}

/// Per-dimension data-sufficiency flags. `true` means the dimension's score
/// rests on too little activity to be meaningful. Advisory metadata only;
/// the scores themselves are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SufficiencyFlags {
    pub risk: bool,
    pub discipline: bool,
    pub strategy: bool,
    pub psychology: bool,
    pub consistency: bool,
}

/// The output of one full scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    pub risk: f64,
    pub discipline: f64,
    pub strategy: f64,
    pub psychology: f64,
    pub consistency: f64,
    pub eligible: bool,
    pub trade_count: u32,
    pub active_days: u32,
    pub insufficient_data: SufficiencyFlags,
}
