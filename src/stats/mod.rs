//! Statistics module - county vote share summaries

mod calculator;

pub use calculator::{CandidateStats, StatsCalculator};
