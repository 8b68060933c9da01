//! Per-user day summaries over aggregated records

use crate::types::{DaySummary, LogValue, MergedLogRecord, UserId, UserProfile, UserSummary};

/// Folds a merged day into per-user totals
pub struct SummaryCalculator;

impl SummaryCalculator {
    /// Totals for `user` over `merged`. Only records tagged with `user` count,
    /// so the order of `merged` does not matter.
    pub fn summarize(merged: &[MergedLogRecord], user: &UserId) -> DaySummary {
        merged
            .iter()
            .filter(|m| &m.original_user == user)
            .fold(DaySummary::default(), |mut summary, m| {
                match &m.record.value {
                    LogValue::Water(ml) => summary.water_sum += ml,
                    value @ (LogValue::Food(_) | LogValue::Fitness(_)) => {
                        summary.calorie_sum += value.calories()
                    }
                    LogValue::Pee => summary.pee_count = summary.pee_count.saturating_add(1),
                    LogValue::Poop => summary.poop_count = summary.poop_count.saturating_add(1),
                    // Weight and sleep are shown on their own
                    LogValue::Weight(_) | LogValue::Sleep(_) => {}
                }
                summary
            })
    }

    /// One summary per roster member, in roster order
    pub fn summarize_roster(merged: &[MergedLogRecord], roster: &[UserProfile]) -> Vec<UserSummary> {
        roster
            .iter()
            .map(|profile| UserSummary {
                user: profile.id.clone(),
                label: profile.label.clone(),
                summary: Self::summarize(merged, &profile.id),
            })
            .collect()
    }
}
