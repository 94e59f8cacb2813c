//! Election Data Processor Module
//! Nationwide ranking of candidates and the county pivot (long vote rows to
//! one row per county with vote shares of the two analysed candidates).

use crate::config::{AnalysisConfig, ColumnConfig, MissingTotalPolicy};
use crate::data::ElectionData;
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("{} counties have no total valid votes: {}", .counties.len(), .counties.join(", "))]
    MissingTotal { counties: Vec<String> },
}

/// One of the two candidates under analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Candidate {
    A,
    B,
}

impl Candidate {
    pub const BOTH: [Candidate; 2] = [Candidate::A, Candidate::B];

    pub fn number(self, analysis: &AnalysisConfig) -> i64 {
        match self {
            Candidate::A => analysis.candidate_a,
            Candidate::B => analysis.candidate_b,
        }
    }
}

/// Nationwide share of valid votes for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct NationalResult {
    pub surname: String,
    pub pct: f64,
}

/// Vote shares of the analysed candidates in one county.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyResult {
    pub teryt: String,
    /// People per km².
    pub density: f64,
    /// Population in thousands.
    pub population: f64,
    /// `None` when the county has no vote row for the candidate.
    pub pct_a: Option<f64>,
    pub pct_b: Option<f64>,
}

impl CountyResult {
    /// Share of valid votes that went to every other candidate, known only
    /// when both analysed candidates have a vote row.
    pub fn others_pct(&self) -> Option<f64> {
        Some(100.0 - self.pct_a? - self.pct_b?)
    }

    pub fn pct(&self, candidate: Candidate) -> Option<f64> {
        match candidate {
            Candidate::A => self.pct_a,
            Candidate::B => self.pct_b,
        }
    }
}

/// Output of the county pivot.
#[derive(Debug, Clone, Default)]
pub struct CountyResults {
    /// Sorted by county code.
    pub rows: Vec<CountyResult>,
    /// Counties left out because their total was missing or zero.
    pub excluded: Vec<String>,
}

impl CountyResults {
    /// Scatter series for one candidate: (density, pct, population).
    /// Counties without a vote row for the candidate are skipped.
    pub fn series(&self, candidate: Candidate) -> Vec<(f64, f64, f64)> {
        self.rows
            .iter()
            .filter_map(|r| Some((r.density, r.pct(candidate)?, r.population)))
            .collect()
    }

    /// Every known share of either candidate.
    pub fn all_pcts(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().flat_map(|r| r.pct_a.into_iter().chain(r.pct_b))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

const TOTAL: &str = "total";
const VOTES_A: &str = "votes_a";
const VOTES_B: &str = "votes_b";
const PCT_A: &str = "pct_a";
const PCT_B: &str = "pct_b";
const DENSITY: &str = "density";
const POPULATION: &str = "population";

/// Query layer over the loaded election tables.
pub struct DataProcessor;

impl DataProcessor {
    /// Candidates ranked by nationwide share of valid votes, highest first.
    ///
    /// The surname is the last whitespace separated token of the name.
    pub fn national_results(
        candidates: &DataFrame,
        cols: &ColumnConfig,
    ) -> Result<Vec<NationalResult>, ProcessorError> {
        let pct_f64 = candidates
            .column(cols.candidate_pct.as_str())?
            .cast(&DataType::Float64)?;
        let pct_ca = pct_f64.f64()?;
        let names = candidates.column(cols.candidate_name.as_str())?;
        let names = names.cast(&DataType::String)?;
        let names_ca = names.str()?;

        let mut results: Vec<NationalResult> = Vec::with_capacity(candidates.height());
        for i in 0..candidates.height() {
            let Some(pct) = pct_ca.get(i) else {
                continue;
            };
            let name = names_ca.get(i).unwrap_or_default();
            results.push(NationalResult {
                surname: Self::surname(name),
                pct,
            });
        }

        // Stable: equal percentages keep their input order
        results.sort_by(|a, b| b.pct.partial_cmp(&a.pct).unwrap_or(std::cmp::Ordering::Equal));
        Ok(results)
    }

    /// Last whitespace separated token of a full name.
    pub fn surname(full_name: &str) -> String {
        full_name
            .split_whitespace()
            .last()
            .unwrap_or_default()
            .to_string()
    }

    /// Surname of the candidate with the given list number, if the candidate
    /// table carries list numbers.
    pub fn candidate_surname(
        candidates: &DataFrame,
        cols: &ColumnConfig,
        number: i64,
    ) -> Option<String> {
        let numbers = candidates
            .column(cols.candidate_number.as_str())
            .ok()?
            .cast(&DataType::Int64)
            .ok()?;
        let names = candidates
            .column(cols.candidate_name.as_str())
            .ok()?
            .cast(&DataType::String)
            .ok()?;
        let numbers_ca = numbers.i64().ok()?;
        let names_ca = names.str().ok()?;

        (0..candidates.height())
            .find(|&i| numbers_ca.get(i) == Some(number))
            .and_then(|i| names_ca.get(i))
            .map(Self::surname)
    }

    /// Display labels for both analysed candidates.
    pub fn candidate_labels(
        candidates: &DataFrame,
        analysis: &AnalysisConfig,
        cols: &ColumnConfig,
    ) -> [String; 2] {
        Candidate::BOTH.map(|c| {
            let number = c.number(analysis);
            Self::candidate_surname(candidates, cols, number)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("Kandydat {}", number))
        })
    }

    /// Join demographics with the vote rows, pivot the total and the two
    /// analysed candidates into columns and compute their vote shares.
    pub fn county_pivot(
        data: &ElectionData,
        analysis: &AnalysisConfig,
        cols: &ColumnConfig,
    ) -> Result<DataFrame, ProcessorError> {
        let county = cols.county.as_str();
        let candidate = || col(cols.candidate.as_str()).cast(DataType::Int64);
        let votes = || col(cols.votes.as_str()).cast(DataType::Float64);
        let is = |number: i64| candidate().eq(lit(number));

        let pivot = data
            .demographics
            .clone()
            .lazy()
            .join(
                data.results.clone().lazy(),
                [col(county)],
                [col(county)],
                JoinArgs::new(JoinType::Inner),
            )
            .filter(
                is(analysis.total_candidate)
                    .or(is(analysis.candidate_a))
                    .or(is(analysis.candidate_b)),
            )
            .group_by([col(county)])
            .agg([
                col(cols.density.as_str())
                    .cast(DataType::Float64)
                    .first()
                    .alias(DENSITY),
                col(cols.population.as_str())
                    .cast(DataType::Float64)
                    .first()
                    .alias(POPULATION),
                votes()
                    .filter(is(analysis.total_candidate))
                    .first()
                    .alias(TOTAL),
                votes()
                    .filter(is(analysis.candidate_a))
                    .first()
                    .alias(VOTES_A),
                votes()
                    .filter(is(analysis.candidate_b))
                    .first()
                    .alias(VOTES_B),
            ])
            .with_columns([
                (lit(100.0) * col(VOTES_A) / col(TOTAL)).alias(PCT_A),
                (lit(100.0) * col(VOTES_B) / col(TOTAL)).alias(PCT_B),
            ])
            .collect()?;

        debug!(counties = pivot.height(), "county pivot computed");
        Ok(pivot)
    }

    /// Per-county vote shares, with counties lacking a usable total handled
    /// according to `analysis.missing_total`.
    pub fn county_results(
        data: &ElectionData,
        analysis: &AnalysisConfig,
        cols: &ColumnConfig,
    ) -> Result<CountyResults, ProcessorError> {
        let pivot = Self::county_pivot(data, analysis, cols)?;

        let codes = pivot
            .column(cols.county.as_str())?
            .cast(&DataType::String)?;
        let codes = codes.str()?;
        let density = pivot.column(DENSITY)?.f64()?;
        let population = pivot.column(POPULATION)?.f64()?;
        let total = pivot.column(TOTAL)?.f64()?;
        let pct_a = pivot.column(PCT_A)?.f64()?;
        let pct_b = pivot.column(PCT_B)?.f64()?;

        let mut results = CountyResults::default();
        for i in 0..pivot.height() {
            let teryt = codes.get(i).unwrap_or_default().to_string();

            if !total.get(i).is_some_and(|t| t > 0.0) {
                results.excluded.push(teryt);
                continue;
            }

            results.rows.push(CountyResult {
                teryt,
                density: density.get(i).unwrap_or(f64::NAN),
                population: population.get(i).unwrap_or(0.0),
                pct_a: pct_a.get(i),
                pct_b: pct_b.get(i),
            });
        }

        results.rows.sort_by(|x, y| x.teryt.cmp(&y.teryt));
        results.excluded.sort();

        if !results.excluded.is_empty() {
            match analysis.missing_total {
                MissingTotalPolicy::Drop => {
                    warn!(
                        excluded = results.excluded.len(),
                        counties = %results.excluded.join(","),
                        "counties without total valid votes dropped"
                    );
                }
                MissingTotalPolicy::Error => {
                    return Err(ProcessorError::MissingTotal {
                        counties: results.excluded,
                    });
                }
            }
        }

        Ok(results)
    }
}
