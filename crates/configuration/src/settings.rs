use core_types::{BadgeType, ChallengeType, ScoreDimension};
use serde::Deserialize;

/// The root configuration structure for the evaluation system.
///
/// Defaults reproduce the platform's built-in catalogs; a `tradewise.toml`
/// file can override any section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub evaluation: EvaluationSettings,
    pub badges: Vec<BadgeDefinition>,
    pub challenges: Vec<ChallengeTemplate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            evaluation: EvaluationSettings::default(),
            badges: default_badges(),
            challenges: default_challenges(),
        }
    }
}

/// Window and eligibility parameters for daily score computation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    /// The rolling window, in days, every score is computed over.
    pub window_days: u32,
    /// Minimum trades in the window for scores to be considered meaningful.
    pub min_trades: u32,
    /// Alternative eligibility path: minimum distinct trading days.
    pub min_active_days: u32,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            window_days: 30,
            min_trades: 25,
            min_active_days: 15,
        }
    }
}

/// One badge rule: a score dimension, a threshold, and how many qualifying
/// days out of the window are required. An optional veto predicate can force
/// a badge to not-earned even when the threshold rule passes.
#[derive(Debug, Clone, Deserialize)]
pub struct BadgeDefinition {
    pub badge_type: BadgeType,
    pub dimension: ScoreDimension,
    pub threshold: f64,
    pub required_days: u32,
    #[serde(default)]
    pub veto: Option<BadgeVeto>,
}

/// Veto predicates over the 30-day trigger window. New rules compose here
/// instead of branching inside the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVeto {
    /// Not earned if any sentiment_fomo trigger occurred in the window.
    NoSentimentFomo,
}

/// One entry of the fixed challenge catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeTemplate {
    pub challenge_type: ChallengeType,
    pub title: String,
    pub description: String,
    pub target_value: f64,
    pub duration_days: i64,
}

pub fn default_badges() -> Vec<BadgeDefinition> {
    vec![
        BadgeDefinition {
            badge_type: BadgeType::RiskGuardian,
            dimension: ScoreDimension::Risk,
            threshold: 75.0,
            required_days: 21,
            veto: None,
        },
        BadgeDefinition {
            badge_type: BadgeType::DisciplineMaster,
            dimension: ScoreDimension::Discipline,
            threshold: 80.0,
            required_days: 21,
            veto: None,
        },
        BadgeDefinition {
            badge_type: BadgeType::ConsistencyPro,
            dimension: ScoreDimension::Consistency,
            threshold: 70.0,
            required_days: 21,
            veto: None,
        },
        BadgeDefinition {
            badge_type: BadgeType::StrategyBuilder,
            dimension: ScoreDimension::Strategy,
            threshold: 70.0,
            required_days: 21,
            veto: None,
        },
        BadgeDefinition {
            badge_type: BadgeType::PsychologyChampion,
            dimension: ScoreDimension::Psychology,
            threshold: 75.0,
            required_days: 21,
            veto: None,
        },
        BadgeDefinition {
            badge_type: BadgeType::MarketAware,
            dimension: ScoreDimension::Psychology,
            threshold: 70.0,
            required_days: 21,
            veto: Some(BadgeVeto::NoSentimentFomo),
        },
    ]
}

pub fn default_challenges() -> Vec<ChallengeTemplate> {
    vec![
        ChallengeTemplate {
            challenge_type: ChallengeType::DiversifySectors,
            title: "Sector Explorer".to_string(),
            description: "Hold 3 or more unique asset types (stocks and crypto) at the same time."
                .to_string(),
            target_value: 3.0,
            duration_days: 30,
        },
        ChallengeTemplate {
            challenge_type: ChallengeType::CashReserve,
            title: "Cash Discipline".to_string(),
            description: "Keep at least 25% of your portfolio in cash for 7 consecutive days."
                .to_string(),
            target_value: 7.0,
            duration_days: 30,
        },
        ChallengeTemplate {
            challenge_type: ChallengeType::ChecklistStreak,
            title: "Mindful Trader".to_string(),
            description: "Complete 10 consecutive full trade checklists without skipping."
                .to_string(),
            target_value: 10.0,
            duration_days: 30,
        },
        ChallengeTemplate {
            challenge_type: ChallengeType::HoldDuration,
            title: "Patient Investor".to_string(),
            description: "Hold at least 1 position for 5 or more days.".to_string(),
            target_value: 5.0,
            duration_days: 30,
        },
        ChallengeTemplate {
            challenge_type: ChallengeType::TradeVariety,
            title: "Multi-Market Learner".to_string(),
            description: "Execute trades in both stocks and crypto markets.".to_string(),
            target_value: 2.0,
            duration_days: 30,
        },
        ChallengeTemplate {
            challenge_type: ChallengeType::NeutralTrader,
            title: "Calm Waters".to_string(),
            description: "Execute 3 trades when market sentiment for the asset is neutral."
                .to_string(),
            target_value: 3.0,
            duration_days: 30,
        },
        ChallengeTemplate {
            challenge_type: ChallengeType::HypeResistant,
            title: "Hype Resistant".to_string(),
            description: "Go 7 days without buying any asset with >70% positive sentiment."
                .to_string(),
            target_value: 7.0,
            duration_days: 14,
        },
    ]
}
