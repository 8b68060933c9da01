//! Log record types for health tracking

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::types::{HealthLogError, Result, UserId};

/// Record types for which only the latest same-day entry is shown
pub const DAILY_UNIQUE_TYPES: [LogKind; 2] = [LogKind::Weight, LogKind::Sleep];

/// Height used for BMI when none is configured (meters)
pub const DEFAULT_HEIGHT_M: f64 = 1.75;

/// Resolve a millisecond epoch timestamp in the local timezone.
/// Returns None for timestamps outside chrono's representable range.
pub fn local_datetime(timestamp_ms: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(timestamp_ms).single()
}

/// Local calendar date of a millisecond epoch timestamp
pub fn local_date(timestamp_ms: i64) -> Option<NaiveDate> {
    local_datetime(timestamp_ms).map(|dt| dt.date_naive())
}

/// Payload-free discriminant of a [`LogValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Water,
    Food,
    Fitness,
    Weight,
    Sleep,
    Pee,
    Poop,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Water => "water",
            LogKind::Food => "food",
            LogKind::Fitness => "fitness",
            LogKind::Weight => "weight",
            LogKind::Sleep => "sleep",
            LogKind::Pee => "pee",
            LogKind::Poop => "poop",
        }
    }

    /// Display name used in notifications and exports
    pub fn label(&self) -> &'static str {
        match self {
            LogKind::Water => "喝水记录",
            LogKind::Food => "饮食记录",
            LogKind::Fitness => "运动记录",
            LogKind::Weight => "体重记录",
            LogKind::Sleep => "睡眠记录",
            LogKind::Pee => "小便",
            LogKind::Poop => "大便",
        }
    }

    pub fn is_daily_unique(&self) -> bool {
        DAILY_UNIQUE_TYPES.contains(self)
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MealType::Breakfast => "早餐",
            MealType::Lunch => "午餐",
            MealType::Dinner => "晚餐",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub meal_type: MealType,
    pub description: String,
    #[serde(default)]
    pub calories: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Activity name, e.g. "跑步"
    #[serde(rename = "type")]
    pub activity: String,
    /// Minutes
    pub duration: u32,
    #[serde(default)]
    pub calories: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightReading {
    /// Kilograms
    pub weight: f64,
    #[serde(default)]
    pub body_fat: Option<f64>,
    #[serde(default = "not_available")]
    pub bmi: String,
}

fn not_available() -> String {
    "N/A".to_string()
}

impl WeightReading {
    pub fn new(weight: f64, body_fat: Option<f64>, height_m: f64) -> Self {
        Self {
            weight,
            body_fat,
            bmi: calculate_bmi(weight, height_m),
        }
    }
}

/// BMI with one decimal, or "N/A" when either input is not positive.
pub fn calculate_bmi(weight_kg: f64, height_m: f64) -> String {
    if !(weight_kg > 0.0) || !(height_m > 0.0) {
        return not_available();
    }
    format!("{:.1}", weight_kg / (height_m * height_m))
}

/// Type-dependent payload, stored as `"type": ..., "val": ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "val", rename_all = "lowercase")]
pub enum LogValue {
    /// Milliliters
    Water(f64),
    Food(Meal),
    Fitness(Workout),
    Weight(WeightReading),
    /// Free-text time range, e.g. "23:30-07:00"
    Sleep(String),
    Pee,
    Poop,
}

impl LogValue {
    pub fn kind(&self) -> LogKind {
        match self {
            LogValue::Water(_) => LogKind::Water,
            LogValue::Food(_) => LogKind::Food,
            LogValue::Fitness(_) => LogKind::Fitness,
            LogValue::Weight(_) => LogKind::Weight,
            LogValue::Sleep(_) => LogKind::Sleep,
            LogValue::Pee => LogKind::Pee,
            LogValue::Poop => LogKind::Poop,
        }
    }

    /// Calories carried by food and fitness entries (absent → 0)
    pub fn calories(&self) -> f64 {
        match self {
            LogValue::Food(meal) => meal.calories.unwrap_or(0.0),
            LogValue::Fitness(workout) => workout.calories.unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Display name; meals are named by meal type
    pub fn label(&self) -> &'static str {
        match self {
            LogValue::Food(meal) => meal.meal_type.label(),
            other => other.kind().label(),
        }
    }

    /// One-line human description for the activity feed
    pub fn describe(&self) -> String {
        match self {
            LogValue::Water(ml) => format!("喝水 {}ml", ml),
            LogValue::Food(meal) => format!(
                "{}: {} ({} Kcal)",
                meal.meal_type.label(),
                meal.description,
                meal.calories.unwrap_or(0.0)
            ),
            LogValue::Fitness(w) => format!(
                "{} {}分钟 ({} Kcal)",
                w.activity,
                w.duration,
                w.calories.unwrap_or(0.0)
            ),
            LogValue::Weight(w) => {
                let body_fat = w
                    .body_fat
                    .map(|bf| format!("{}%", bf))
                    .unwrap_or_else(|| "-".to_string());
                format!("体重: {}kg, 体脂: {}, BMI: {}", w.weight, body_fat, w.bmi)
            }
            LogValue::Sleep(range) => format!("睡眠: {}", range),
            LogValue::Pee => "记录小便".to_string(),
            LogValue::Poop => "记录大便".to_string(),
        }
    }

    /// Presence checks applied before a record is stored
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(HealthLogError::Validation(msg.to_string()));
        if let Some(field) = self.non_finite_field() {
            return Err(HealthLogError::Validation(format!(
                "{} must be a finite number",
                field
            )));
        }
        match self {
            LogValue::Water(ml) if !(*ml > 0.0) => invalid("water amount must be positive"),
            LogValue::Food(meal) if meal.description.trim().is_empty() => {
                invalid("meal description is required")
            }
            LogValue::Fitness(w) if w.activity.trim().is_empty() => {
                invalid("fitness type is required")
            }
            LogValue::Fitness(w) if w.duration == 0 => invalid("fitness duration is required"),
            LogValue::Weight(w) if !(w.weight > 0.0) => invalid("weight is required"),
            LogValue::Sleep(range) if range.trim().is_empty() => invalid("sleep time is required"),
            _ => Ok(()),
        }
    }

    /// First numeric field that JSON cannot represent (NaN or infinite).
    /// serde_json writes those as `null`, which would not load back.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        let bad = |v: f64| !v.is_finite();
        let bad_opt = |v: Option<f64>| v.is_some_and(bad);
        match self {
            LogValue::Water(ml) if bad(*ml) => Some("water amount"),
            LogValue::Food(meal) if bad_opt(meal.calories) => Some("calories"),
            LogValue::Fitness(w) if bad_opt(w.calories) => Some("calories"),
            LogValue::Weight(w) if bad(w.weight) => Some("weight"),
            LogValue::Weight(w) if bad_opt(w.body_fat) => Some("body fat"),
            _ => None,
        }
    }

    /// JSON of the payload alone (`null` for pee/poop)
    pub fn payload_json(&self) -> String {
        let payload = match self {
            LogValue::Water(ml) => serde_json::json!(ml),
            LogValue::Food(meal) => serde_json::json!(meal),
            LogValue::Fitness(w) => serde_json::json!(w),
            LogValue::Weight(w) => serde_json::json!(w),
            LogValue::Sleep(range) => serde_json::json!(range),
            LogValue::Pee | LogValue::Poop => serde_json::Value::Null,
        };
        integral_numbers(payload).to_string()
    }
}

/// Rewrite whole-number floats as integers so `250.0` prints as `250`
fn integral_numbers(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    // beyond 2^53 an f64 no longer maps onto a unique integer
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_EXACT => {
                Value::from(f as i64)
            }
            _ => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(integral_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, integral_numbers(v)))
                .collect(),
        ),
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    #[serde(flatten)]
    pub value: LogValue,
}

impl LogRecord {
    pub fn new(id: impl Into<String>, timestamp: i64, value: LogValue) -> Self {
        Self {
            id: id.into(),
            timestamp,
            value,
        }
    }

    pub fn kind(&self) -> LogKind {
        self.value.kind()
    }

    /// Calendar date of this record in the local timezone.
    /// Day views group by this, not by a rolling 24h window.
    pub fn local_date(&self) -> Option<NaiveDate> {
        local_date(self.timestamp)
    }

    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.local_date() == Some(date)
    }
}

/// A record tagged with the user it came from; produced by aggregation only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedLogRecord {
    #[serde(flatten)]
    pub record: LogRecord,
    pub original_user: UserId,
}

impl MergedLogRecord {
    pub fn kind(&self) -> LogKind {
        self.record.kind()
    }
}
