//! healthlog: a family health log kept as one JSON partition per user.
//!
//! Records (water, meals, weight, sleep, fitness, bathroom visits) are
//! appended per user and merged into a single per-day view for the
//! household roster.

pub mod cli;
pub mod config;
pub mod render;
pub mod services;
pub mod types;
