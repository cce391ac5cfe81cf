//! # Badge Evaluator
//!
//! Scans the 30-day score history against the badge catalog: a badge is
//! earned when enough days met its dimension threshold, unless a veto
//! predicate over the trigger window forces it off. Definitions are
//! configuration (tagged variants), so new veto rules compose without
//! touching the evaluator.
//!
//! This crate only assesses; the sticky `first_earned_at` / `last_active_at`
//! merge happens in the storage layer's badge upsert.

use configuration::{BadgeDefinition, BadgeVeto};
use core_types::{BadgeAssessment, DailyScore, MentorTrigger, PatternType};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct BadgeEvaluator {
    definitions: Vec<BadgeDefinition>,
}

impl BadgeEvaluator {
    pub fn new(definitions: Vec<BadgeDefinition>) -> Self {
        Self { definitions }
    }

    /// Evaluates every badge definition against the score history and the
    /// trigger window.
    pub fn evaluate(
        &self,
        history: &[DailyScore],
        triggers: &[MentorTrigger],
    ) -> Vec<BadgeAssessment> {
        self.definitions
            .iter()
            .map(|definition| {
                let qualifying_days = history
                    .iter()
                    .filter(|row| row.score(definition.dimension) >= definition.threshold)
                    .count() as u32;

                let mut earned = qualifying_days >= definition.required_days;
                if earned {
                    if let Some(veto) = definition.veto {
                        if veto_applies(veto, triggers) {
                            debug!(badge = %definition.badge_type, "badge vetoed");
                            earned = false;
                        }
                    }
                }

                BadgeAssessment {
                    badge_type: definition.badge_type,
                    earned,
                    // Mirrors earned at evaluation time; historical stickiness
                    // lives on the persisted Badge row.
                    active: earned,
                    qualifying_days,
                    required_days: definition.required_days,
                }
            })
            .collect()
    }
}

fn veto_applies(veto: BadgeVeto, triggers: &[MentorTrigger]) -> bool {
    match veto {
        BadgeVeto::NoSentimentFomo => triggers
            .iter()
            .any(|t| t.pattern_type == PatternType::SentimentFomo),
    }
}
