//! Criterion benchmarks for day aggregation and summaries

use chrono::{Local, NaiveDate, TimeZone};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use healthlog::config::default_roster;
use healthlog::services::{DailyAggregator, LogRepository, MemoryStore, SummaryCalculator};
use healthlog::types::{LogRecord, LogValue, Meal, MealType, UserId, WeightReading};

const DAYS: u32 = 30;

/// Roughly a month of activity per user: water, meals, weight and sleep every day
fn seeded_repo(per_day: usize) -> LogRepository<MemoryStore> {
    let repo = LogRepository::new(MemoryStore::new());

    for profile in default_roster() {
        let mut logs = Vec::new();
        for day in 1..=DAYS {
            let base = Local
                .with_ymd_and_hms(2024, 1, day, 7, 0, 0)
                .unwrap()
                .timestamp_millis();
            for i in 0..per_day {
                let ts = base + (i as i64) * 60_000;
                let value = match i % 5 {
                    0 => LogValue::Water(250.0),
                    1 => LogValue::Food(Meal {
                        meal_type: MealType::Lunch,
                        description: "面".into(),
                        calories: Some(500.0),
                    }),
                    2 => LogValue::Weight(WeightReading::new(70.0, None, 1.75)),
                    3 => LogValue::Sleep("23:00-07:00".into()),
                    _ => LogValue::Pee,
                };
                logs.push(LogRecord::new(format!("{}-{}-{}", profile.id, day, i), ts, value));
            }
        }
        repo.save(&profile.id, &logs).unwrap();
    }

    repo
}

fn bench_aggregate_for_date(c: &mut Criterion) {
    let roster = default_roster();
    let users: Vec<UserId> = roster.iter().map(|p| p.id.clone()).collect();
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

    let mut group = c.benchmark_group("aggregator");
    for per_day in [10usize, 50, 200] {
        let repo = seeded_repo(per_day);
        group.throughput(Throughput::Elements((per_day * DAYS as usize * users.len()) as u64));
        group.bench_with_input(
            BenchmarkId::new("aggregate_for_date", format!("{} per day", per_day)),
            &repo,
            |b, repo| {
                b.iter(|| DailyAggregator::aggregate_for_date(repo, black_box(date), &users));
            },
        );
    }
    group.finish();
}

fn bench_summarize_roster(c: &mut Criterion) {
    let roster = default_roster();
    let users: Vec<UserId> = roster.iter().map(|p| p.id.clone()).collect();
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let repo = seeded_repo(200);
    let (merged, _) = DailyAggregator::aggregate_for_date(&repo, date, &users);

    let mut group = c.benchmark_group("summary");
    group.throughput(Throughput::Elements(merged.len() as u64));
    group.bench_function("summarize_roster", |b| {
        b.iter(|| SummaryCalculator::summarize_roster(black_box(&merged), &roster));
    });
    group.finish();
}

criterion_group!(benches, bench_aggregate_for_date, bench_summarize_roster);
criterion_main!(benches);
