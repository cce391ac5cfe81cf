pub mod enums;
pub mod structs;
pub mod time;

// Re-export the core types to provide a clean public API.
pub use enums::{
    AssetType, BadgeChange, BadgeType, ChallengeStatus, ChallengeType, EscalationLevel, Grade,
    Mood, PatternType, ScoreDimension, Severity, TradeAction, TrendDirection,
};
pub use structs::{
    Badge, BadgeAssessment, BadgeUpdate, Challenge, DailyScore, EscalatedAlert, Holding,
    MentorTrigger, MonthlyReport, PatternAlert, SentimentSnapshot, TradeChecklist, Transaction,
};
