//! Cross-user daily aggregation
//!
//! Merges every roster user's records for one local calendar day. Weight and
//! sleep entries are collapsed to the latest one per user; everything else
//! is kept as-is.

use chrono::NaiveDate;

use crate::services::repository::LogRepository;
use crate::services::store::KeyValueStore;
use crate::types::{
    HealthLogError, LogRecord, MergedLogRecord, UserId, DAILY_UNIQUE_TYPES,
};

/// Daily merge over all users' partitions
pub struct DailyAggregator;

impl DailyAggregator {
    /// Merge all `users`' records for `date`, in roster order.
    ///
    /// Partitions are re-read on every call. A partition that cannot be read
    /// contributes nothing; its error is returned alongside the records.
    /// No sort is applied.
    pub fn aggregate_for_date<S: KeyValueStore>(
        repo: &LogRepository<S>,
        date: NaiveDate,
        users: &[UserId],
    ) -> (Vec<MergedLogRecord>, Vec<HealthLogError>) {
        let mut merged = Vec::new();
        let mut warnings = Vec::new();

        for user in users {
            let (logs, warning) = repo.load(user);
            if let Some(w) = warning {
                warnings.push(w);
            }

            merged.extend(
                Self::dedup_day(&logs, date)
                    .into_iter()
                    .map(|record| MergedLogRecord {
                        record,
                        original_user: user.clone(),
                    }),
            );
        }

        tracing::debug!(%date, users = users.len(), records = merged.len(), "aggregated day");
        (merged, warnings)
    }

    /// One user's visible records for `date`: accumulative records in stored
    /// order, then the latest weight and the latest sleep entry.
    pub fn dedup_day(logs: &[LogRecord], date: NaiveDate) -> Vec<LogRecord> {
        let day: Vec<&LogRecord> = logs.iter().filter(|l| l.is_on(date)).collect();

        let mut visible: Vec<LogRecord> = day
            .iter()
            .filter(|l| !l.kind().is_daily_unique())
            .map(|l| (*l).clone())
            .collect();

        for kind in DAILY_UNIQUE_TYPES {
            // Ties on timestamp go to the greater id
            let latest = day
                .iter()
                .filter(|l| l.kind() == kind)
                .max_by(|a, b| {
                    a.timestamp
                        .cmp(&b.timestamp)
                        .then_with(|| a.id.cmp(&b.id))
                });
            if let Some(latest) = latest {
                visible.push((*latest).clone());
            }
        }

        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryStore;
    use crate::types::{LogKind, LogValue, WeightReading};
    use assert_matches::assert_matches;
    use chrono::{Local, TimeZone};

    fn ts(day: u32, hour: u32, minute: u32) -> i64 {
        Local
            .with_ymd_and_hms(2024, 1, day, hour, minute, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn weight(kg: f64) -> LogValue {
        LogValue::Weight(WeightReading::new(kg, None, 1.75))
    }

    fn roster() -> Vec<UserId> {
        vec![UserId::from("Me"), UserId::from("Wife"), UserId::from("Family")]
    }

    fn repo_with(entries: &[(&str, LogRecord)]) -> LogRepository<MemoryStore> {
        let repo = LogRepository::new(MemoryStore::new());
        for user in roster() {
            let logs: Vec<LogRecord> = entries
                .iter()
                .filter(|(u, _)| *u == user.as_str())
                .map(|(_, r)| r.clone())
                .collect();
            if !logs.is_empty() {
                repo.save(&user, &logs).unwrap();
            }
        }
        repo
    }

    // ========== dedup_day() tests ==========

    #[test]
    fn test_dedup_day_empty() {
        assert!(DailyAggregator::dedup_day(&[], jan(15)).is_empty());
    }

    #[test]
    fn test_dedup_day_keeps_latest_weight() {
        let logs = vec![
            LogRecord::new("w1", ts(15, 8, 0), weight(70.0)),
            LogRecord::new("w2", ts(15, 20, 0), weight(71.0)),
        ];

        let result = DailyAggregator::dedup_day(&logs, jan(15));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "w2");
    }

    #[test]
    fn test_dedup_day_latest_by_timestamp_not_position() {
        let logs = vec![
            LogRecord::new("late", ts(15, 22, 0), LogValue::Sleep("22:00-06:00".into())),
            LogRecord::new("early", ts(15, 7, 0), LogValue::Sleep("23:00-07:00".into())),
        ];

        let result = DailyAggregator::dedup_day(&logs, jan(15));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "late");
    }

    #[test]
    fn test_dedup_day_tie_breaks_on_greater_id() {
        let t = ts(15, 8, 0);
        let logs = vec![
            LogRecord::new("b", t, weight(71.0)),
            LogRecord::new("c", t, weight(72.0)),
            LogRecord::new("a", t, weight(70.0)),
        ];

        let result = DailyAggregator::dedup_day(&logs, jan(15));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "c");
    }

    #[test]
    fn test_dedup_day_unique_types_are_independent() {
        let logs = vec![
            LogRecord::new("s1", ts(15, 7, 0), LogValue::Sleep("23:00-07:00".into())),
            LogRecord::new("w1", ts(15, 8, 0), weight(70.0)),
            LogRecord::new("w2", ts(15, 9, 0), weight(69.5)),
        ];

        let result = DailyAggregator::dedup_day(&logs, jan(15));

        assert_eq!(result.len(), 2);
        // weight first, then sleep
        assert_eq!(result[0].id, "w2");
        assert_eq!(result[1].id, "s1");
    }

    #[test]
    fn test_dedup_day_keeps_every_accumulative_record() {
        let logs = vec![
            LogRecord::new("a", ts(15, 8, 0), LogValue::Water(500.0)),
            LogRecord::new("b", ts(15, 9, 0), LogValue::Pee),
            LogRecord::new("c", ts(15, 9, 0), LogValue::Pee),
            LogRecord::new("d", ts(15, 10, 0), LogValue::Water(700.0)),
        ];

        let result = DailyAggregator::dedup_day(&logs, jan(15));

        let ids: Vec<&str> = result.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_dedup_day_filters_by_calendar_day() {
        let logs = vec![
            LogRecord::new("yesterday", ts(14, 23, 59), LogValue::Water(100.0)),
            LogRecord::new("today_start", ts(15, 0, 0), LogValue::Water(200.0)),
            LogRecord::new("yesterday_weight", ts(14, 20, 0), weight(80.0)),
        ];

        let result = DailyAggregator::dedup_day(&logs, jan(15));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "today_start");
    }

    // ========== aggregate_for_date() tests ==========

    #[test]
    fn test_aggregate_weight_scenario() {
        let repo = repo_with(&[
            ("Me", LogRecord::new("w70", ts(15, 8, 0), weight(70.0))),
            ("Me", LogRecord::new("w71", ts(15, 20, 0), weight(71.0))),
        ]);

        let (merged, warnings) = DailyAggregator::aggregate_for_date(&repo, jan(15), &roster());

        assert!(warnings.is_empty());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].record.id, "w71");
        assert_eq!(merged[0].original_user, UserId::from("Me"));
        // older record stays in storage
        assert_eq!(repo.load(&UserId::from("Me")).0.len(), 2);
    }

    #[test]
    fn test_aggregate_pee_per_user() {
        let repo = repo_with(&[
            ("Me", LogRecord::new("p1", ts(15, 9, 0), LogValue::Pee)),
            ("Wife", LogRecord::new("p2", ts(15, 9, 30), LogValue::Pee)),
        ]);

        let (merged, _) = DailyAggregator::aggregate_for_date(&repo, jan(15), &roster());

        let pees: Vec<&MergedLogRecord> =
            merged.iter().filter(|m| m.kind() == LogKind::Pee).collect();
        assert_eq!(pees.len(), 2);
        assert_eq!(pees[0].original_user, UserId::from("Me"));
        assert_eq!(pees[1].original_user, UserId::from("Wife"));
    }

    #[test]
    fn test_aggregate_dedups_per_user_not_across_users() {
        let repo = repo_with(&[
            ("Me", LogRecord::new("me_w", ts(15, 8, 0), weight(70.0))),
            ("Wife", LogRecord::new("wife_w", ts(15, 7, 0), weight(55.0))),
        ]);

        let (merged, _) = DailyAggregator::aggregate_for_date(&repo, jan(15), &roster());

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_aggregate_follows_roster_order() {
        let repo = repo_with(&[
            ("Family", LogRecord::new("f", ts(15, 6, 0), LogValue::Poop)),
            ("Me", LogRecord::new("m", ts(15, 12, 0), LogValue::Poop)),
        ]);

        let (merged, _) = DailyAggregator::aggregate_for_date(&repo, jan(15), &roster());
        let users: Vec<&str> = merged.iter().map(|m| m.original_user.as_str()).collect();
        assert_eq!(users, vec!["Me", "Family"]);

        let reversed: Vec<UserId> = roster().into_iter().rev().collect();
        let (merged, _) = DailyAggregator::aggregate_for_date(&repo, jan(15), &reversed);
        let users: Vec<&str> = merged.iter().map(|m| m.original_user.as_str()).collect();
        assert_eq!(users, vec!["Family", "Me"]);
    }

    #[test]
    fn test_aggregate_accumulative_counts_match_storage() {
        let repo = repo_with(&[
            ("Me", LogRecord::new("1", ts(15, 8, 0), LogValue::Water(500.0))),
            ("Me", LogRecord::new("2", ts(15, 9, 0), LogValue::Water(700.0))),
            ("Me", LogRecord::new("3", ts(16, 9, 0), LogValue::Water(300.0))),
            ("Wife", LogRecord::new("4", ts(15, 10, 0), LogValue::Water(250.0))),
            ("Family", LogRecord::new("5", ts(15, 11, 0), LogValue::Pee)),
        ]);

        let (merged, _) = DailyAggregator::aggregate_for_date(&repo, jan(15), &roster());

        let water = merged.iter().filter(|m| m.kind() == LogKind::Water).count();
        assert_eq!(water, 3);
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_aggregate_corrupt_partition_contributes_nothing() {
        let repo = repo_with(&[("Me", LogRecord::new("1", ts(15, 8, 0), LogValue::Pee))]);
        repo.store().set("healthLogs_Wife", "garbage").unwrap();

        let (merged, warnings) = DailyAggregator::aggregate_for_date(&repo, jan(15), &roster());

        assert_eq!(merged.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_matches!(warnings[0], HealthLogError::StorageRead(_));
    }

    #[test]
    fn test_aggregate_empty_day() {
        let repo = repo_with(&[("Me", LogRecord::new("1", ts(14, 8, 0), LogValue::Pee))]);

        let (merged, warnings) = DailyAggregator::aggregate_for_date(&repo, jan(15), &roster());

        assert!(merged.is_empty());
        assert!(warnings.is_empty());
    }
}
