//! Storage, aggregation and export services

pub mod aggregator;
pub mod export;
pub mod repository;
pub mod store;
pub mod summary;

pub use aggregator::DailyAggregator;
pub use export::{export_csv, CSV_HEADER};
pub use repository::LogRepository;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use summary::SummaryCalculator;
