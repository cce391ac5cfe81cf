//! Escalation: folds the 30-day trigger history into freshly detected alerts.

use core_types::{EscalatedAlert, EscalationLevel, MentorTrigger, PatternAlert, PatternType};
use std::collections::{BTreeMap, BTreeSet};

/// Attaches an escalation level and note to every fresh alert based on how
/// often its pattern fired in the trailing window, and reports improvements:
/// patterns that were frequent (3+) in the history but are absent now.
pub fn escalate_alerts(
    alerts: Vec<PatternAlert>,
    trigger_history: &[MentorTrigger],
) -> (Vec<EscalatedAlert>, Vec<String>) {
    let mut pattern_counts: BTreeMap<PatternType, u32> = BTreeMap::new();
    for trigger in trigger_history {
        *pattern_counts.entry(trigger.pattern_type).or_insert(0) += 1;
    }

    let current_patterns: BTreeSet<PatternType> =
        alerts.iter().map(|a| a.pattern_type).collect();

    let enriched = alerts
        .into_iter()
        .map(|alert| {
            let prior = pattern_counts.get(&alert.pattern_type).copied().unwrap_or(0);
            let (level, note) = if prior == 0 {
                (
                    EscalationLevel::First,
                    "First time this pattern has been detected.".to_string(),
                )
            } else if prior <= 3 {
                (
                    EscalationLevel::Recurring,
                    format!(
                        "This pattern has occurred {prior} time(s) before in the last 30 days."
                    ),
                )
            } else {
                (
                    EscalationLevel::Persistent,
                    format!(
                        "This is a persistent pattern ({prior} prior occurrences). \
                         Consider focused practice on this area."
                    ),
                )
            };
            EscalatedAlert {
                alert,
                escalation_level: level,
                prior_count: prior,
                escalation_note: note,
            }
        })
        .collect();

    let improvement_notes = pattern_counts
        .iter()
        .filter(|(pattern, count)| **count >= 3 && !current_patterns.contains(*pattern))
        .map(|(pattern, count)| {
            format!(
                "Improvement: '{pattern}' was triggered {count} times recently but was \
                 not detected now."
            )
        })
        .collect();

    (enriched, improvement_notes)
}
