//! Long-term behavior tracking over the full score history.

use crate::report::average_scores;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::time;
use core_types::{DailyScore, PatternType, ScoreDimension, TrendDirection};
use narrative::DimensionAverages;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-dimension trend label between the previous and current 30-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementTrend {
    pub risk: TrendDirection,
    pub discipline: TrendDirection,
    pub strategy: TrendDirection,
    pub psychology: TrendDirection,
    pub consistency: TrendDirection,
}

/// All-time behavior summary: window comparison, trend labels, streaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorSummary {
    pub trigger_totals: BTreeMap<PatternType, u32>,
    pub current_avg: DimensionAverages,
    pub previous_avg: DimensionAverages,
    pub improvement_trend: ImprovementTrend,
    pub longest_streak: u32,
    pub current_streak: u32,
    pub total_scored_days: usize,
    pub first_score_date: Option<NaiveDate>,
}

/// Compares the current and previous 30-day windows and walks the whole
/// history (oldest first) for streaks of "good days": days whose
/// five-dimension mean is at least 60.
pub fn compute_behavior_summary(
    all_scores: &[DailyScore],
    trigger_totals: BTreeMap<PatternType, u32>,
    now: DateTime<Utc>,
) -> BehaviorSummary {
    let cutoff_current = time::days_ago(now, 30).date_naive();
    let cutoff_previous = time::days_ago(now, 60).date_naive();

    let current: Vec<&DailyScore> = all_scores
        .iter()
        .filter(|row| row.date >= cutoff_current)
        .collect();
    let previous: Vec<&DailyScore> = all_scores
        .iter()
        .filter(|row| row.date >= cutoff_previous && row.date < cutoff_current)
        .collect();

    let current_avg = average_scores(&current);
    let previous_avg = average_scores(&previous);

    let trend_for = |dimension: ScoreDimension| {
        let diff = pick(&current_avg, dimension) - pick(&previous_avg, dimension);
        if diff > 5.0 {
            TrendDirection::Improving
        } else if diff < -5.0 {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    };
    let improvement_trend = ImprovementTrend {
        risk: trend_for(ScoreDimension::Risk),
        discipline: trend_for(ScoreDimension::Discipline),
        strategy: trend_for(ScoreDimension::Strategy),
        psychology: trend_for(ScoreDimension::Psychology),
        consistency: trend_for(ScoreDimension::Consistency),
    };

    let mut longest_streak = 0u32;
    let mut current_streak = 0u32;
    for row in all_scores {
        let avg = (row.risk_score
            + row.discipline_score
            + row.strategy_score
            + row.psychology_score
            + row.consistency_score)
            / 5.0;
        if avg >= 60.0 {
            current_streak += 1;
            longest_streak = longest_streak.max(current_streak);
        } else {
            current_streak = 0;
        }
    }

    BehaviorSummary {
        trigger_totals,
        current_avg,
        previous_avg,
        improvement_trend,
        longest_streak,
        current_streak,
        total_scored_days: all_scores.len(),
        first_score_date: all_scores.first().map(|row| row.date),
    }
}

fn pick(averages: &DimensionAverages, dimension: ScoreDimension) -> f64 {
    match dimension {
        ScoreDimension::Risk => averages.risk,
        ScoreDimension::Discipline => averages.discipline,
        ScoreDimension::Strategy => averages.strategy,
        ScoreDimension::Psychology => averages.psychology,
        ScoreDimension::Consistency => averages.consistency,
    }
}
