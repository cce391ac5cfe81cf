use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Stock,
    Crypto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

/// Severity attached to a mentor alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// The behavioral patterns the mentor engine scans for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    FomoBuy,
    PanicSell,
    Overtrading,
    OverConcentration,
    HoldingLosers,
    HighRiskPosition,
    SentimentFomo,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::FomoBuy => "fomo_buy",
            PatternType::PanicSell => "panic_sell",
            PatternType::Overtrading => "overtrading",
            PatternType::OverConcentration => "over_concentration",
            PatternType::HoldingLosers => "holding_losers",
            PatternType::HighRiskPosition => "high_risk_position",
            PatternType::SentimentFomo => "sentiment_fomo",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a pattern has recurred in the trailing 30 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationLevel {
    First,
    Recurring,
    Persistent,
}

/// The five dimensions a daily score is composed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreDimension {
    Risk,
    Discipline,
    Strategy,
    Psychology,
    Consistency,
}

impl ScoreDimension {
    pub const ALL: [ScoreDimension; 5] = [
        ScoreDimension::Risk,
        ScoreDimension::Discipline,
        ScoreDimension::Strategy,
        ScoreDimension::Psychology,
        ScoreDimension::Consistency,
    ];

    /// Human-readable label for UI surfaces.
    pub fn label(&self) -> &'static str {
        match self {
            ScoreDimension::Risk => "Risk Management",
            ScoreDimension::Discipline => "Discipline",
            ScoreDimension::Strategy => "Strategy",
            ScoreDimension::Psychology => "Psychology",
            ScoreDimension::Consistency => "Consistency",
        }
    }
}

impl fmt::Display for ScoreDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScoreDimension::Risk => "risk",
            ScoreDimension::Discipline => "discipline",
            ScoreDimension::Strategy => "strategy",
            ScoreDimension::Psychology => "psychology",
            ScoreDimension::Consistency => "consistency",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeType {
    RiskGuardian,
    DisciplineMaster,
    ConsistencyPro,
    StrategyBuilder,
    PsychologyChampion,
    MarketAware,
}

impl BadgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeType::RiskGuardian => "risk_guardian",
            BadgeType::DisciplineMaster => "discipline_master",
            BadgeType::ConsistencyPro => "consistency_pro",
            BadgeType::StrategyBuilder => "strategy_builder",
            BadgeType::PsychologyChampion => "psychology_champion",
            BadgeType::MarketAware => "market_aware",
        }
    }

    /// Human-readable label for UI surfaces.
    pub fn label(&self) -> &'static str {
        match self {
            BadgeType::RiskGuardian => "Risk Guardian",
            BadgeType::DisciplineMaster => "Discipline Master",
            BadgeType::ConsistencyPro => "Consistency Pro",
            BadgeType::StrategyBuilder => "Strategy Builder",
            BadgeType::PsychologyChampion => "Psychology Champion",
            BadgeType::MarketAware => "Market Aware",
        }
    }
}

impl fmt::Display for BadgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a badge moved in the latest reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeChange {
    Earned,
    Maintained,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    DiversifySectors,
    CashReserve,
    ChecklistStreak,
    HoldDuration,
    TradeVariety,
    NeutralTrader,
    HypeResistant,
}

impl ChallengeType {
    pub const ALL: [ChallengeType; 7] = [
        ChallengeType::DiversifySectors,
        ChallengeType::CashReserve,
        ChallengeType::ChecklistStreak,
        ChallengeType::HoldDuration,
        ChallengeType::TradeVariety,
        ChallengeType::NeutralTrader,
        ChallengeType::HypeResistant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::DiversifySectors => "diversify_sectors",
            ChallengeType::CashReserve => "cash_reserve",
            ChallengeType::ChecklistStreak => "checklist_streak",
            ChallengeType::HoldDuration => "hold_duration",
            ChallengeType::TradeVariety => "trade_variety",
            ChallengeType::NeutralTrader => "neutral_trader",
            ChallengeType::HypeResistant => "hype_resistant",
        }
    }
}

impl fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Challenge lifecycle. `Completed` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Active,
    Completed,
    Expired,
}

impl ChallengeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChallengeStatus::Completed | ChallengeStatus::Expired)
    }
}

/// Cached news-sentiment mood for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mood::Positive => "positive",
            Mood::Neutral => "neutral",
            Mood::Negative => "negative",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

/// Letter grade for a monthly report, derived from the five-dimension average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
    F,
}

impl Grade {
    /// Maps an average score to a letter grade. Cutoffs are inclusive on the
    /// higher grade: exactly 90 is an A+, exactly 80 is an A, and so on.
    pub fn from_average(avg: f64) -> Grade {
        if avg >= 90.0 {
            Grade::APlus
        } else if avg >= 80.0 {
            Grade::A
        } else if avg >= 70.0 {
            Grade::BPlus
        } else if avg >= 60.0 {
            Grade::B
        } else if avg >= 50.0 {
            Grade::CPlus
        } else if avg >= 40.0 {
            Grade::C
        } else if avg >= 30.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
