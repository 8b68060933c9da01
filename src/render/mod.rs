//! Presentation of aggregated days
//!
//! The core hands a merged feed and per-user summaries to a [`Presenter`];
//! ordering the feed is a presentation concern handled here.

mod json;
mod text;

pub use json::JsonPresenter;
pub use text::TextPresenter;

use crate::types::{LogValue, MealType, MergedLogRecord, Result, UserId, UserSummary};

/// Output target for a day view
pub trait Presenter {
    /// Render one day's feed followed by the per-user summaries
    fn render(&mut self, feed: &[MergedLogRecord], summaries: &[UserSummary]) -> Result<()>;

    /// Render today's summaries next to yesterday's
    fn render_comparison(&mut self, today: &[UserSummary], yesterday: &[UserSummary])
        -> Result<()>;
}

/// Feed ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortMode {
    /// Newest first
    #[default]
    Time,
    /// Fixed category order (weight, meals, fitness, water, bathroom, sleep)
    Category,
    /// Current user's records first, then by category
    UserCategory,
}

/// Rank used by the category orderings
pub fn category_rank(value: &LogValue) -> u8 {
    match value {
        LogValue::Weight(_) => 10,
        LogValue::Food(meal) => match meal.meal_type {
            MealType::Breakfast => 20,
            MealType::Lunch => 30,
            MealType::Dinner => 40,
        },
        LogValue::Fitness(_) => 50,
        LogValue::Water(_) => 60,
        LogValue::Pee => 70,
        LogValue::Poop => 71,
        LogValue::Sleep(_) => 80,
    }
}

/// Stable sort of a merged feed
pub fn sort_feed(feed: &mut [MergedLogRecord], mode: SortMode, current_user: &UserId) {
    match mode {
        SortMode::Time => feed.sort_by(|a, b| b.record.timestamp.cmp(&a.record.timestamp)),
        SortMode::Category => feed.sort_by_key(|m| category_rank(&m.record.value)),
        SortMode::UserCategory => feed.sort_by_key(|m| {
            (
                &m.original_user != current_user,
                category_rank(&m.record.value),
            )
        }),
    }
}
