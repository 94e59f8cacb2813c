//! Analysis pipeline: load the tables once, run both queries and the
//! per-candidate statistics. Shared by the window and the headless export.

use crate::config::AppConfig;
use crate::data::{
    CountyResults, DataLoader, DataProcessor, ElectionData, LoaderError, NationalResult,
    ProcessorError, TablePreview, PREVIEW_ROWS,
};
use crate::stats::{CandidateStats, StatsCalculator};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

/// Everything the charts need.
#[derive(Debug, Clone)]
pub struct ElectionAnalysis {
    /// Nationwide shares, highest first.
    pub national: Vec<NationalResult>,
    pub counties: CountyResults,
    /// Surnames of candidate A and candidate B.
    pub labels: [String; 2],
    /// Statistics of candidate A and candidate B, in that order.
    pub stats: Vec<CandidateStats>,
    /// Heads of the three input tables.
    pub tables: Vec<TablePreview>,
}

impl ElectionAnalysis {
    pub fn run(config: &AppConfig) -> Result<Self, AnalysisError> {
        let data = DataLoader::load(&config.data, &config.columns)?;
        Self::from_data(&data, config)
    }

    pub fn from_data(data: &ElectionData, config: &AppConfig) -> Result<Self, AnalysisError> {
        let national = DataProcessor::national_results(&data.candidates, &config.columns)?;
        let counties =
            DataProcessor::county_results(data, &config.analysis, &config.columns)?;
        let labels =
            DataProcessor::candidate_labels(&data.candidates, &config.analysis, &config.columns);
        let stats = StatsCalculator::compute_all(&counties, &labels);

        info!(
            candidates = national.len(),
            counties = counties.len(),
            excluded = counties.excluded.len(),
            "analysis complete"
        );
        Ok(Self {
            national,
            counties,
            labels,
            stats,
            tables: data.previews(PREVIEW_ROWS),
        })
    }

    /// Sum of the nationwide percentages, expected to be ~100.
    pub fn national_total(&self) -> f64 {
        self.national.iter().map(|r| r.pct).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn builds_everything_from_frames() {
        let config = AppConfig::default();
        let c = &config.columns;
        let data = ElectionData {
            candidates: df!(
                c.candidate_number.as_str() => [8i64, 11, 3],
                c.candidate_name.as_str() => ["Karol NAWROCKI", "Rafał TRZASKOWSKI", "Jan KOWALSKI"],
                c.candidate_pct.as_str() => [45.0, 40.0, 15.0],
            )
            .unwrap(),
            demographics: df!(
                c.county.as_str() => ["0201", "0202", "0203"],
                c.population.as_str() => [100.0, 50.0, 900.0],
                c.density.as_str() => [80.0, 40.0, 3000.0],
            )
            .unwrap(),
            results: df!(
                c.county.as_str() => ["0201", "0201", "0201", "0202", "0202", "0202", "0203", "0203", "0203"],
                c.candidate.as_str() => [0i64, 8, 11, 0, 8, 11, 0, 8, 11],
                c.votes.as_str() => [1000i64, 450, 400, 200, 120, 50, 5000, 1500, 3000],
            )
            .unwrap(),
        };

        let analysis = ElectionAnalysis::from_data(&data, &config).unwrap();
        assert_eq!(analysis.labels, ["NAWROCKI".to_string(), "TRZASKOWSKI".to_string()]);
        assert_eq!(analysis.national[0].surname, "NAWROCKI");
        assert!((analysis.national_total() - 100.0).abs() < 1e-9);
        assert_eq!(analysis.counties.len(), 3);
        assert_eq!(analysis.stats.len(), 2);
        assert_eq!(analysis.stats[1].label, "TRZASKOWSKI");
        // Share of B grows with density in this sample
        assert!(analysis.stats[1].correlation > 0.0);
        assert_eq!(analysis.tables.len(), 3);
        assert_eq!(analysis.tables[2].height, 9);
    }
}
