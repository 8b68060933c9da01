//! Flat CSV export of every stored record across the roster

use std::io::Write;

use crate::services::repository::LogRepository;
use crate::services::store::KeyValueStore;
use crate::types::{local_datetime, HealthLogError, Result, UserProfile};

pub const CSV_HEADER: &str = "用户,日期,时间,类型,数值";

/// Write one row per stored record (roster order, then stored order).
/// Returns the number of rows written; nothing to export is a validation error.
pub fn export_csv<S: KeyValueStore, W: Write>(
    repo: &LogRepository<S>,
    roster: &[UserProfile],
    out: &mut W,
) -> Result<usize> {
    let mut rows = Vec::new();

    for profile in roster {
        let (logs, warning) = repo.load(&profile.id);
        if let Some(w) = warning {
            tracing::warn!(user = %profile.id, error = %w, "skipping unreadable partition in export");
        }

        for log in logs {
            let (date, time) = match local_datetime(log.timestamp) {
                Some(dt) => (
                    dt.format("%Y/%-m/%-d").to_string(),
                    dt.format("%H:%M:%S").to_string(),
                ),
                None => (String::new(), String::new()),
            };
            rows.push([
                profile.label.clone(),
                date,
                time,
                log.kind().label().to_string(),
                log.value.payload_json(),
            ]);
        }
    }

    if rows.is_empty() {
        return Err(HealthLogError::Validation("no data to export".into()));
    }

    writeln!(out, "{}", CSV_HEADER)?;
    for row in &rows {
        let line: Vec<String> = row.iter().map(|f| csv_field(f)).collect();
        writeln!(out, "{}", line.join(","))?;
    }
    out.flush()?;

    tracing::info!(rows = rows.len(), "exported csv");
    Ok(rows.len())
}

/// Quote a field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
