//! Per-user log partitions: load, save, append and edit operations
//!
//! Every mutation is a read-modify-write of one user's whole list with no
//! locking across the read and the write. Only one writer per partition is
//! expected at a time; two concurrent writers resolve as last write wins.

use chrono::{Local, LocalResult, NaiveDate, TimeZone, Timelike, Utc};

use crate::services::store::KeyValueStore;
use crate::types::{
    local_datetime, HealthLogError, LogRecord, LogValue, MealType, Result, UserId,
};

/// Loads and persists log lists through a [`KeyValueStore`]
pub struct LogRepository<S> {
    store: S,
}

impl<S: KeyValueStore> LogRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load a user's full list.
    /// Unreadable or corrupt data yields an empty list plus the read error.
    pub fn load(&self, user: &UserId) -> (Vec<LogRecord>, Option<HealthLogError>) {
        match self.try_load(user) {
            Ok(logs) => (logs, None),
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "failed to load logs, using empty list");
                (Vec::new(), Some(e))
            }
        }
    }

    /// Like [`load`](Self::load) but surfaces read errors.
    /// Mutations go through this so a corrupt partition is never overwritten.
    fn try_load(&self, user: &UserId) -> Result<Vec<LogRecord>> {
        let raw = match self.store.get(&user.storage_key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(e @ HealthLogError::StorageRead(_)) => return Err(e),
            Err(e) => return Err(HealthLogError::StorageRead(e.to_string())),
        };

        let logs: Vec<LogRecord> = serde_json::from_str(&raw).map_err(|e| {
            HealthLogError::StorageRead(format!("Corrupted log data for {}: {}", user, e))
        })?;
        tracing::debug!(user = %user, count = logs.len(), "loaded logs");
        Ok(logs)
    }

    /// Overwrite a user's whole list. On failure the stored list is unchanged.
    pub fn save(&self, user: &UserId, logs: &[LogRecord]) -> Result<()> {
        // serde_json writes NaN/inf as null, which would not load back
        if let Some((record, field)) = logs
            .iter()
            .find_map(|l| l.value.non_finite_field().map(|f| (l, f)))
        {
            return Err(HealthLogError::StorageWrite(format!(
                "record {} has a non-finite {}",
                record.id, field
            )));
        }

        let content = serde_json::to_string(logs)
            .map_err(|e| HealthLogError::StorageWrite(format!("Serialization failed: {}", e)))?;

        self.store
            .set(&user.storage_key(), &content)
            .map_err(|e| match e {
                HealthLogError::StorageWrite(_) => e,
                other => HealthLogError::StorageWrite(other.to_string()),
            })?;
        tracing::debug!(user = %user, count = logs.len(), "saved logs");
        Ok(())
    }

    /// Append a record stamped with the current time
    pub fn append(&self, user: &UserId, value: LogValue) -> Result<Vec<LogRecord>> {
        self.append_at(user, value, Utc::now().timestamp_millis())
    }

    /// Append a record with an explicit timestamp (ms since epoch)
    pub fn append_at(
        &self,
        user: &UserId,
        value: LogValue,
        timestamp: i64,
    ) -> Result<Vec<LogRecord>> {
        value.validate()?;

        let mut logs = self.try_load(user)?;
        let record = LogRecord::new(uuid::Uuid::new_v4().to_string(), timestamp, value);
        tracing::info!(user = %user, kind = %record.kind(), id = %record.id, "appending log");
        logs.push(record);
        self.save(user, &logs)?;
        Ok(logs)
    }

    /// Remove the first record with exactly this timestamp.
    /// Returns false (and writes nothing) when no record matches.
    pub fn delete_log(&self, user: &UserId, timestamp: i64) -> Result<bool> {
        let mut logs = self.try_load(user)?;
        let Some(index) = logs.iter().position(|l| l.timestamp == timestamp) else {
            tracing::debug!(user = %user, timestamp, "delete target not found");
            return Ok(false);
        };

        let removed = logs.remove(index);
        self.save(user, &logs)?;
        tracing::info!(user = %user, id = %removed.id, "deleted log");
        Ok(true)
    }

    /// Move a record to `hours:minutes` on its original local date.
    /// Seconds and milliseconds are kept. The list is re-sorted by timestamp.
    pub fn modify_log_time(
        &self,
        user: &UserId,
        timestamp: i64,
        hours: u32,
        minutes: u32,
    ) -> Result<Vec<LogRecord>> {
        if hours > 23 {
            return Err(HealthLogError::Validation(format!(
                "hours must be 0-23, got {}",
                hours
            )));
        }
        if minutes > 59 {
            return Err(HealthLogError::Validation(format!(
                "minutes must be 0-59, got {}",
                minutes
            )));
        }

        let mut logs = self.try_load(user)?;
        let record = logs
            .iter_mut()
            .find(|l| l.timestamp == timestamp)
            .ok_or_else(|| {
                HealthLogError::NotFound(format!("no log for {} at {}", user, timestamp))
            })?;

        record.timestamp = retime(record.timestamp, hours, minutes)?;
        tracing::info!(user = %user, id = %record.id, hours, minutes, "modified log time");

        logs.sort_by_key(|l| l.timestamp);
        self.save(user, &logs)?;
        Ok(logs)
    }

    /// Delete today's entry for a meal so it can be recorded again
    pub fn edit_meal(&self, user: &UserId, meal_type: MealType) -> Result<bool> {
        self.edit_meal_on(user, meal_type, Local::now().date_naive())
    }

    pub fn edit_meal_on(&self, user: &UserId, meal_type: MealType, date: NaiveDate) -> Result<bool> {
        let mut logs = self.try_load(user)?;
        let Some(index) = logs
            .iter()
            .position(|l| is_meal(l, meal_type) && l.is_on(date))
        else {
            return Ok(false);
        };

        logs.remove(index);
        self.save(user, &logs)?;
        tracing::info!(user = %user, meal = ?meal_type, %date, "cleared meal for re-entry");
        Ok(true)
    }

    /// First recorded entry for a meal on a given local date
    pub fn find_meal(&self, user: &UserId, meal_type: MealType, date: NaiveDate) -> Option<LogRecord> {
        let (logs, _) = self.load(user);
        logs.into_iter()
            .find(|l| is_meal(l, meal_type) && l.is_on(date))
    }

    /// Drop every record for a user. Also replaces corrupt data.
    pub fn clear(&self, user: &UserId) -> Result<()> {
        self.save(user, &[])?;
        tracing::info!(user = %user, "cleared all logs");
        Ok(())
    }
}

fn is_meal(record: &LogRecord, meal_type: MealType) -> bool {
    matches!(&record.value, LogValue::Food(meal) if meal.meal_type == meal_type)
}

/// Replace the local hour/minute of a timestamp, keeping its local date.
fn retime(timestamp: i64, hours: u32, minutes: u32) -> Result<i64> {
    let original = local_datetime(timestamp).ok_or_else(|| {
        HealthLogError::Validation(format!("timestamp {} is out of range", timestamp))
    })?;

    let shifted = original
        .naive_local()
        .with_hour(hours)
        .and_then(|dt| dt.with_minute(minutes))
        .ok_or_else(|| {
            HealthLogError::Validation(format!("invalid time {:02}:{:02}", hours, minutes))
        })?;

    let resolved = match Local.from_local_datetime(&shifted) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earlier, _) => earlier,
        // DST spring-forward gap
        LocalResult::None => {
            return Err(HealthLogError::Validation(format!(
                "{} does not exist in the local timezone",
                shifted
            )))
        }
    };
    Ok(resolved.timestamp_millis())
}
