//! Plain-text day view

use std::io::Write;

use crate::render::Presenter;
use crate::types::{
    local_datetime, DaySummary, MergedLogRecord, Result, UserId, UserProfile, UserSummary,
};

/// Writes a human-readable feed and summary table
pub struct TextPresenter<W> {
    out: W,
    roster: Vec<UserProfile>,
    water_goal_ml: f64,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W, roster: &[UserProfile], water_goal_ml: f64) -> Self {
        Self {
            out,
            roster: roster.to_vec(),
            water_goal_ml,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn label<'a>(&'a self, user: &'a UserId) -> &'a str {
        self.roster
            .iter()
            .find(|p| &p.id == user)
            .map(|p| p.label.as_str())
            .unwrap_or_else(|| user.as_str())
    }

    fn write_summary_line(&mut self, label: &str, s: &DaySummary) -> Result<()> {
        writeln!(
            self.out,
            "  {:<6} 喝水 {} ml ({:.0}%) | 热量 {} Kcal | 小便/大便 {} / {}",
            label,
            s.water_sum,
            s.water_progress(self.water_goal_ml),
            s.calorie_sum,
            s.pee_count,
            s.poop_count
        )?;
        Ok(())
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn render(&mut self, feed: &[MergedLogRecord], summaries: &[UserSummary]) -> Result<()> {
        if feed.is_empty() {
            writeln!(self.out, "No records for this day.")?;
        }

        for m in feed {
            let time = local_datetime(m.record.timestamp)
                .map(|dt| dt.format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string());
            let line = format!(
                "{}  [{}] {}  #{}",
                time,
                self.label(&m.original_user),
                m.record.value.describe(),
                m.record.timestamp
            );
            writeln!(self.out, "{}", line)?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "Summary")?;
        for s in summaries {
            self.write_summary_line(&s.label, &s.summary)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn render_comparison(
        &mut self,
        today: &[UserSummary],
        yesterday: &[UserSummary],
    ) -> Result<()> {
        for s in today {
            writeln!(self.out, "{}", s.label)?;
            self.write_summary_line("today", &s.summary)?;
            let previous = yesterday
                .iter()
                .find(|y| y.user == s.user)
                .map(|y| y.summary)
                .unwrap_or_default();
            self.write_summary_line("prev", &previous)?;
        }
        self.out.flush()?;
        Ok(())
    }
}
