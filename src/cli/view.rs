//! Read-only commands: day view, comparison and CSV export

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};

use crate::cli::Session;
use crate::render::{sort_feed, JsonPresenter, Presenter, SortMode, TextPresenter};
use crate::services::{export_csv, DailyAggregator, SummaryCalculator};
use crate::types::{MergedLogRecord, Result, UserSummary};

/// Aggregate one day for the whole roster, reporting unreadable partitions on stderr
fn collect_day(session: &Session, date: NaiveDate) -> (Vec<MergedLogRecord>, Vec<UserSummary>) {
    let (merged, warnings) =
        DailyAggregator::aggregate_for_date(&session.repo, date, &session.config.roster_ids());
    for w in &warnings {
        eprintln!("warning: {}", w);
    }
    let summaries = SummaryCalculator::summarize_roster(&merged, &session.config.users);
    (merged, summaries)
}

fn presenter(session: &Session, json: bool) -> Box<dyn Presenter> {
    if json {
        Box::new(JsonPresenter::new(io::stdout()))
    } else {
        Box::new(TextPresenter::new(
            io::stdout(),
            &session.config.users,
            session.config.water_goal_ml,
        ))
    }
}

pub(crate) fn today(session: &Session, sort: SortMode, json: bool) -> Result<()> {
    let (mut feed, summaries) = collect_day(session, Session::today());
    sort_feed(&mut feed, sort, &session.config.current_user);
    presenter(session, json).render(&feed, &summaries)
}

pub(crate) fn summary(session: &Session, json: bool) -> Result<()> {
    let (_, today) = collect_day(session, Session::today());
    let (_, yesterday) = collect_day(session, Session::yesterday());
    presenter(session, json).render_comparison(&today, &yesterday)
}

pub(crate) fn export(session: &Session, output: Option<PathBuf>) -> Result<()> {
    let roster = &session.config.users;

    match output {
        Some(path) if path.as_os_str() == "-" => {
            let mut out = io::stdout().lock();
            export_csv(&session.repo, roster, &mut out)?;
        }
        other => {
            let path = other.unwrap_or_else(|| {
                PathBuf::from(format!("health_logs_{}.csv", Utc::now().timestamp_millis()))
            });
            // an empty export must not create the file
            let mut buf = Vec::new();
            let rows = export_csv(&session.repo, roster, &mut buf)?;
            fs::write(&path, buf)?;
            println!("✓ Exported {} records to {}", rows, path.display());
        }
    }
    Ok(())
}
