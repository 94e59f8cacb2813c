//! Statistics Calculator Module
//! Summary statistics of county vote shares and their correlation with
//! (log) population density.

use crate::data::{Candidate, CountyResults};
use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Significance threshold for the correlation t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Statistics of one candidate's county vote shares.
#[derive(Debug, Clone)]
pub struct CandidateStats {
    pub label: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p05: f64,
    /// Pearson r between log10(density) and the vote share.
    pub correlation: f64,
    pub p_value: f64,
    pub is_significant: bool,
}

impl Default for CandidateStats {
    fn default() -> Self {
        Self {
            label: String::new(),
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            p95: f64::NAN,
            p05: f64::NAN,
            correlation: f64::NAN,
            p_value: f64::NAN,
            is_significant: false,
        }
    }
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> CandidateStats {
        let n = values.len();
        if n == 0 {
            return CandidateStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        CandidateStats {
            count: n,
            mean,
            median,
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[n - 1],
            p95: Self::percentile(&sorted, 95.0),
            p05: Self::percentile(&sorted, 5.0),
            ..CandidateStats::default()
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Pearson correlation coefficient, `NaN` when undefined.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return f64::NAN;
        }

        let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
        let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for (x, y) in xs.iter().zip(ys.iter()) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return f64::NAN;
        }
        cov / (var_x.sqrt() * var_y.sqrt())
    }

    /// Two-tailed t-test of r = 0 with n - 2 degrees of freedom.
    pub fn correlation_ttest(r: f64, n: usize) -> (f64, bool) {
        if r.is_nan() || n < 3 {
            return (f64::NAN, false);
        }
        if r.abs() >= 1.0 {
            return (0.0, true);
        }

        let df = (n - 2) as f64;
        let t = r * (df / (1.0 - r * r)).sqrt();

        if let Ok(dist) = StudentsT::new(0.0, 1.0, df) {
            let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));
            (p_value, p_value <= SIGNIFICANCE_THRESHOLD)
        } else {
            (f64::NAN, false)
        }
    }

    /// Statistics for one candidate across all counties.
    pub fn compute_candidate_stats(
        results: &CountyResults,
        candidate: Candidate,
        label: &str,
    ) -> CandidateStats {
        let series = results.series(candidate);
        let shares: Vec<f64> = series.iter().map(|&(_, pct, _)| pct).collect();

        let mut stats = Self::compute_descriptive_stats(&shares);
        stats.label = label.to_string();

        // log10 is only defined for positive densities
        let (log_density, shares): (Vec<f64>, Vec<f64>) = series
            .iter()
            .filter(|&&(density, _, _)| density > 0.0)
            .map(|&(density, pct, _)| (density.log10(), pct))
            .unzip();

        stats.correlation = Self::pearson(&log_density, &shares);
        let (p_value, is_significant) =
            Self::correlation_ttest(stats.correlation, log_density.len());
        stats.p_value = p_value;
        stats.is_significant = is_significant;
        stats
    }

    /// Statistics for both analysed candidates, computed in parallel.
    pub fn compute_all(results: &CountyResults, labels: &[String; 2]) -> Vec<CandidateStats> {
        Candidate::BOTH
            .par_iter()
            .zip(labels.par_iter())
            .map(|(&candidate, label)| Self::compute_candidate_stats(results, candidate, label))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CountyResult;

    fn county(teryt: &str, density: f64, pct_a: f64, pct_b: f64) -> CountyResult {
        CountyResult {
            teryt: teryt.to_string(),
            density,
            population: 100.0,
            pct_a: Some(pct_a),
            pct_b: Some(pct_b),
        }
    }

    #[test]
    fn descriptive_stats_match_numpy() {
        let stats = StatsCalculator::compute_descriptive_stats(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        assert!((stats.median - 2.5).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert!((stats.p95 - 3.85).abs() < 1e-12);
        assert!((stats.p05 - 1.15).abs() < 1e-12);
    }

    #[test]
    fn empty_input_is_nan() {
        let stats = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn pearson_detects_perfect_relationships() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((StatsCalculator::pearson(&xs, &[2.0, 4.0, 6.0, 8.0]) - 1.0).abs() < 1e-12);
        assert!((StatsCalculator::pearson(&xs, &[8.0, 6.0, 4.0, 2.0]) + 1.0).abs() < 1e-12);
        assert!(StatsCalculator::pearson(&xs, &[5.0, 5.0, 5.0, 5.0]).is_nan());
    }

    #[test]
    fn ttest_needs_three_points() {
        assert!(StatsCalculator::correlation_ttest(0.5, 2).0.is_nan());
        let (p, significant) = StatsCalculator::correlation_ttest(0.1, 10);
        assert!(p > 0.5);
        assert!(!significant);
    }

    #[test]
    fn shares_correlate_with_log_density() {
        let results = CountyResults {
            rows: vec![
                county("01", 10.0, 60.0, 20.0),
                county("02", 100.0, 50.0, 30.0),
                county("03", 1000.0, 40.0, 40.0),
                county("04", 10000.0, 30.0, 50.0),
                county("05", 0.0, 45.0, 35.0),
            ],
            excluded: Vec::new(),
        };
        let labels = ["NAWROCKI".to_string(), "TRZASKOWSKI".to_string()];

        let stats = StatsCalculator::compute_all(&results, &labels);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].label, "NAWROCKI");
        assert_eq!(stats[0].count, 5);
        assert!((stats[0].correlation + 1.0).abs() < 1e-12);
        assert!((stats[1].correlation - 1.0).abs() < 1e-12);
        assert!(stats[1].is_significant);
    }

    #[test]
    fn county_without_candidate_row_is_not_counted() {
        let mut missing_a = county("03", 1000.0, 0.0, 40.0);
        missing_a.pct_a = None;
        let results = CountyResults {
            rows: vec![
                county("01", 10.0, 60.0, 20.0),
                county("02", 100.0, 50.0, 30.0),
                missing_a,
            ],
            excluded: Vec::new(),
        };
        let labels = ["NAWROCKI".to_string(), "TRZASKOWSKI".to_string()];

        let stats = StatsCalculator::compute_all(&results, &labels);
        assert_eq!(stats[0].count, 2);
        assert!((stats[0].mean - 55.0).abs() < 1e-12);
        assert_eq!(stats[0].min, 50.0);
        assert_eq!(stats[1].count, 3);
    }
}
