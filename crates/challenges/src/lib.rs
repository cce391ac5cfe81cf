//! # Challenge Progress & Lifecycle
//!
//! Progress functions for the fixed challenge catalog, plus the pure pieces
//! of the refresh cycle: seeding an instance from a template, and deciding
//! the next status for an active challenge. Completed and expired are
//! terminal; the orchestrator only ever re-assesses active instances.

pub mod progress;

pub use progress::{progress_for, ChallengeInputs};

use chrono::{DateTime, Duration, Utc};
use configuration::ChallengeTemplate;
use core_types::{Challenge, ChallengeStatus};
use uuid::Uuid;

/// Builds a fresh active challenge instance from a catalog template. The id
/// carries a random suffix so a refresh that closes an instance and re-seeds
/// its type within the same millisecond still yields distinct rows.
pub fn seed_challenge(template: &ChallengeTemplate, now: DateTime<Utc>) -> Challenge {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    Challenge {
        id: format!(
            "ch-{}-{}-{suffix}",
            template.challenge_type,
            now.timestamp_millis()
        ),
        challenge_type: template.challenge_type,
        title: template.title.clone(),
        description: template.description.clone(),
        target_value: template.target_value,
        current_value: 0.0,
        status: ChallengeStatus::Active,
        started_at: now,
        expires_at: now + Duration::days(template.duration_days),
        completed_at: None,
    }
}

/// Decides where an active challenge goes given its fresh progress. Hitting
/// the target wins even when the deadline has already passed.
pub fn next_status(
    challenge: &Challenge,
    progress: f64,
    now: DateTime<Utc>,
) -> (ChallengeStatus, Option<DateTime<Utc>>) {
    if progress >= challenge.target_value {
        (ChallengeStatus::Completed, Some(now))
    } else if now > challenge.expires_at {
        (ChallengeStatus::Expired, None)
    } else {
        (ChallengeStatus::Active, None)
    }
}

/// Display progress: min(current / target x 100, 100), one decimal place.
pub fn display_progress(current: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    let pct = (current / target * 100.0 * 10.0).round() / 10.0;
    pct.min(100.0)
}
