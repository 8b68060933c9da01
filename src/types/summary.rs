//! Per-user day summaries

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Derived per-user totals for one day; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    /// Milliliters
    pub water_sum: f64,
    /// Food intake plus fitness entries' calories
    pub calorie_sum: f64,
    pub pee_count: u32,
    pub poop_count: u32,
    /// Part of the output shape only; the day fold never increments it.
    pub fitness_count: u32,
}

impl DaySummary {
    /// Percentage of the daily water goal, capped at 100
    pub fn water_progress(&self, goal_ml: f64) -> f64 {
        if goal_ml <= 0.0 {
            return 100.0;
        }
        (self.water_sum / goal_ml * 100.0).min(100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub user: UserId,
    pub label: String,
    pub summary: DaySummary,
}
