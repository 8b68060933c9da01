mod record;
mod view;

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use regex::Regex;

use crate::config::Config;
use crate::render::SortMode;
use crate::services::{FileStore, LogRepository};
use crate::types::{HealthLogError, MealType, Result, UserId};

use record::RecordCommand;

/// Family health log: water, meals, weight, sleep, fitness and bathroom visits
#[derive(Parser)]
#[command(name = "healthlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// User to record for (defaults to the configured default user)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Data directory (defaults to ~/.healthlog)
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Record(RecordCommand),

    /// Show today's combined feed and summaries
    Today {
        /// Feed ordering
        #[arg(long, value_enum, default_value_t = SortMode::Time)]
        sort: SortMode,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare today's summaries with yesterday's
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the record with this timestamp (ms, shown as #… in `today`).
    /// Searches the current user's records; pass --user for someone else's.
    Delete {
        timestamp: i64,
    },

    /// Change the time of day of a record, keeping its date.
    /// Searches the current user's records; pass --user for someone else's.
    Retime {
        timestamp: i64,

        /// New time, HH:MM
        #[arg(value_name = "HH:MM")]
        time: String,
    },

    /// Remove today's entry for a meal so it can be recorded again
    EditMeal {
        #[arg(value_enum)]
        meal: MealType,
    },

    /// Delete all records of the current user
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Export every user's records as CSV
    Export {
        /// Output file ("-" for stdout); defaults to health_logs_<ms>.csv
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Resolved config plus the repository it points at
pub(crate) struct Session {
    pub config: Config,
    pub repo: LogRepository<FileStore>,
}

impl Session {
    fn open(data_dir: Option<PathBuf>, user: Option<String>) -> Result<Self> {
        let config = Config::load(data_dir, user)?;
        tracing::debug!(data_dir = %config.data_dir.display(), user = %config.current_user, "session opened");
        let repo = LogRepository::new(FileStore::new(config.data_dir.clone()));
        Ok(Self { config, repo })
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn yesterday() -> NaiveDate {
        Self::today() - Duration::days(1)
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let session = Session::open(self.data_dir, self.user)?;

        let outcome = match self.command {
            Commands::Record(cmd) => cmd.run(&session),
            Commands::Today { sort, json } => view::today(&session, sort, json),
            Commands::Summary { json } => view::summary(&session, json),
            Commands::Delete { timestamp } => delete(&session, timestamp),
            Commands::Retime { timestamp, time } => retime(&session, timestamp, &time),
            Commands::EditMeal { meal } => edit_meal(&session, meal),
            Commands::Clear { yes } => clear(&session, yes),
            Commands::Export { output } => view::export(&session, output),
        };

        match outcome {
            Err(e) if e.is_benign() => {
                println!("Nothing to do: {}", e);
                Ok(())
            }
            other => Ok(other?),
        }
    }
}

fn delete(session: &Session, timestamp: i64) -> Result<()> {
    let user = &session.config.current_user;
    if session.repo.delete_log(user, timestamp)? {
        println!("✓ 记录已删除");
    } else {
        println!("{}", no_record_message(user, timestamp));
    }
    Ok(())
}

fn retime(session: &Session, timestamp: i64, time: &str) -> Result<()> {
    let (hours, minutes) = parse_hh_mm(time)?;
    let user = &session.config.current_user;
    session
        .repo
        .modify_log_time(user, timestamp, hours, minutes)
        .map_err(|e| match e {
            HealthLogError::NotFound(_) => {
                HealthLogError::NotFound(no_record_message(user, timestamp))
            }
            other => other,
        })?;
    println!("✓ 时间已更新 → {:02}:{:02}", hours, minutes);
    Ok(())
}

fn edit_meal(session: &Session, meal: MealType) -> Result<()> {
    if session.repo.edit_meal(&session.config.current_user, meal)? {
        println!("✓ {} cleared; record it again with `healthlog meal`.", meal.label());
    } else {
        println!("No {} recorded today.", meal.label());
    }
    Ok(())
}

fn clear(session: &Session, yes: bool) -> Result<()> {
    let user = &session.config.current_user;
    if !yes {
        print!(
            "Delete ALL records of {}? This cannot be undone. (y/N): ",
            session.config.label_for(user)
        );
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }
    session.repo.clear(user)?;
    println!("✓ 数据已清空");
    Ok(())
}

/// `today` lists every user's records but edits only search one partition
fn no_record_message(user: &UserId, timestamp: i64) -> String {
    format!(
        "No record at {} for {}. If it belongs to someone else, pass --user <ID>.",
        timestamp, user
    )
}

/// Parse "HH:MM". Range checks are left to the edit operation.
pub fn parse_hh_mm(input: &str) -> Result<(u32, u32)> {
    let re = Regex::new(r"^\s*(\d{1,2}):(\d{1,2})\s*$").expect("valid regex");
    let invalid = || HealthLogError::Validation(format!("time must be HH:MM, got {:?}", input));
    let caps = re.captures(input).ok_or_else(invalid)?;
    let hours = caps[1].parse().map_err(|_| invalid())?;
    let minutes = caps[2].parse().map_err(|_| invalid())?;
    Ok((hours, minutes))
}
