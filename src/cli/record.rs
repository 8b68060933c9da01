//! Commands that append a new record for the current user

use clap::Subcommand;

use crate::cli::Session;
use crate::services::{DailyAggregator, SummaryCalculator};
use crate::types::{HealthLogError, LogValue, Meal, MealType, Result, WeightReading, Workout};

#[derive(Subcommand, Debug)]
pub enum RecordCommand {
    /// Record water intake
    Water {
        /// Milliliters
        ml: f64,
    },

    /// Record a meal (one per meal type per day)
    Meal {
        #[arg(value_enum)]
        meal: MealType,

        /// What was eaten
        description: String,

        /// Calories (Kcal)
        #[arg(short, long)]
        calories: Option<f64>,
    },

    /// Record body weight; BMI is computed from the configured height
    Weight {
        /// Kilograms
        kg: f64,

        /// Body fat percentage
        #[arg(short, long)]
        body_fat: Option<f64>,
    },

    /// Record last night's sleep, e.g. "23:30-07:00"
    Sleep {
        range: String,
    },

    /// Record a workout
    Fitness {
        /// Activity, e.g. 跑步
        activity: String,

        /// Minutes
        #[arg(short, long)]
        duration: u32,

        /// Calories burned (Kcal)
        #[arg(short, long)]
        calories: Option<f64>,
    },

    /// Record a pee
    Pee,

    /// Record a poop
    Poop,
}

impl RecordCommand {
    pub(crate) fn run(self, session: &Session) -> Result<()> {
        let user = &session.config.current_user;

        let value = match self {
            RecordCommand::Water { ml } => LogValue::Water(ml),
            RecordCommand::Meal {
                meal,
                description,
                calories,
            } => {
                if let Some(existing) = session.repo.find_meal(user, meal, Session::today()) {
                    return Err(HealthLogError::Validation(format!(
                        "{} already recorded today ({}); run `healthlog edit-meal {}` first",
                        meal.label(),
                        existing.value.describe(),
                        meal.as_str()
                    )));
                }
                LogValue::Food(Meal {
                    meal_type: meal,
                    description: description.trim().to_string(),
                    calories,
                })
            }
            RecordCommand::Weight { kg, body_fat } => {
                let reading = WeightReading::new(kg, body_fat, session.config.height_m);
                println!("BMI: {}", reading.bmi);
                LogValue::Weight(reading)
            }
            RecordCommand::Sleep { range } => LogValue::Sleep(range.trim().to_string()),
            RecordCommand::Fitness {
                activity,
                duration,
                calories,
            } => LogValue::Fitness(Workout {
                activity: activity.trim().to_string(),
                duration,
                calories,
            }),
            RecordCommand::Pee => LogValue::Pee,
            RecordCommand::Poop => LogValue::Poop,
        };

        let is_water = matches!(value, LogValue::Water(_));
        let label = value.label();
        session.repo.append(user, value)?;
        println!("✓ 已记录 {}", label);

        if is_water {
            print_water_progress(session)?;
        }
        Ok(())
    }
}

fn print_water_progress(session: &Session) -> Result<()> {
    let user = &session.config.current_user;
    let (merged, _) =
        DailyAggregator::aggregate_for_date(&session.repo, Session::today(), &[user.clone()]);
    let summary = SummaryCalculator::summarize(&merged, user);
    println!(
        "今日喝水 {} ml / {} ml ({:.0}%)",
        summary.water_sum,
        session.config.water_goal_ml,
        summary.water_progress(session.config.water_goal_ml)
    );
    Ok(())
}
