//! Application Configuration
//! Data paths, analysed candidates, column names and rendering settings.
//!
//! Every field has a compiled default, so a JSON config file only needs the
//! keys it wants to change.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },
    #[error("Invalid config in {path}: {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}

/// What to do with a county that has no usable "total valid votes" row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTotalPolicy {
    /// Leave the county out of the results and report it.
    #[default]
    Drop,
    /// Abort the analysis.
    Error,
}

/// Input file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub demographics: PathBuf,
    pub candidates: PathBuf,
    pub results: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            demographics: PathBuf::from("demografia2023.parquet"),
            candidates: PathBuf::from("kandydaci2025.parquet"),
            results: PathBuf::from("wyniki2025.parquet"),
        }
    }
}

impl DataConfig {
    /// Resolve a file against `dir` unless it is already absolute.
    pub fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.dir.join(file)
        }
    }

    pub fn demographics_path(&self) -> PathBuf {
        self.resolve(&self.demographics)
    }

    pub fn candidates_path(&self) -> PathBuf {
        self.resolve(&self.candidates)
    }

    pub fn results_path(&self) -> PathBuf {
        self.resolve(&self.results)
    }
}

/// Candidate numbers under analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pseudo-candidate holding the total valid votes of a county.
    pub total_candidate: i64,
    pub candidate_a: i64,
    pub candidate_b: i64,
    pub missing_total: MissingTotalPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            total_candidate: 0,
            candidate_a: 8,
            candidate_b: 11,
            missing_total: MissingTotalPolicy::Drop,
        }
    }
}

/// Column names of the three input tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub county: String,
    pub population: String,
    pub density: String,
    pub candidate: String,
    pub votes: String,
    pub candidate_number: String,
    pub candidate_name: String,
    pub candidate_pct: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            county: "TERYT Powiatu".to_string(),
            population: "Osób (tys.)".to_string(),
            density: "Osób/km^2".to_string(),
            candidate: "Kandydat".to_string(),
            votes: "Liczba głosów".to_string(),
            candidate_number: "Numer".to_string(),
            candidate_name: "Nazwisko i imiona".to_string(),
            candidate_pct: "Procent głosów".to_string(),
        }
    }
}

/// Chart output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Size of the two-panel county scatter figure.
    pub width: u32,
    pub height: u32,
    /// Size of the nationwide bar and pie figures.
    pub summary_width: u32,
    pub summary_height: u32,
    /// Population (thousands) is divided by this to get the marker area.
    pub marker_divisor: f64,
    /// Pie slices at or below this percentage are left unlabelled.
    pub pie_label_min_pct: f64,
    pub output_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 500,
            summary_width: 900,
            summary_height: 600,
            marker_divisor: 6.0,
            pie_label_min_pct: 4.0,
            output_dir: PathBuf::from("charts"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub analysis: AnalysisConfig,
    pub columns: ColumnConfig,
    pub render: RenderConfig,
}

impl AppConfig {
    /// Load from an optional JSON file, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    })?;
                Self::from_json_at(&content, &path.display().to_string())?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON string (used by tests).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config = Self::from_json_at(json, "<string>")?;
        config.validate()?;
        Ok(config)
    }

    fn from_json_at(json: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Apply command line overrides on top of the loaded values.
    pub fn apply_overrides(&mut self, data_dir: Option<PathBuf>, out_dir: Option<PathBuf>) {
        if let Some(dir) = data_dir {
            self.data.dir = dir;
        }
        if let Some(dir) = out_dir {
            self.render.output_dir = dir;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analysis;
        if a.candidate_a == a.candidate_b
            || a.candidate_a == a.total_candidate
            || a.candidate_b == a.total_candidate
        {
            return Err(ConfigError::ValidationFailed {
                field: "analysis".to_string(),
                message: "total_candidate, candidate_a and candidate_b must differ".to_string(),
            });
        }
        let r = &self.render;
        if r.width == 0 || r.height == 0 || r.summary_width == 0 || r.summary_height == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "render sizes".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.render.marker_divisor.is_nan() || self.render.marker_divisor <= 0.0 {
            return Err(ConfigError::ValidationFailed {
                field: "render.marker_divisor".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_2025_dataset() {
        let config = AppConfig::default();
        assert_eq!(config.analysis.candidate_a, 8);
        assert_eq!(config.analysis.candidate_b, 11);
        assert_eq!(config.analysis.total_candidate, 0);
        assert_eq!(
            config.data.results_path(),
            PathBuf::from("data").join("wyniki2025.parquet")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = AppConfig::from_json(
            r#"{ "analysis": { "missing_total": "error" }, "render": { "width": 800 } }"#,
        )
        .unwrap();
        assert_eq!(config.analysis.missing_total, MissingTotalPolicy::Error);
        assert_eq!(config.analysis.candidate_b, 11);
        assert_eq!(config.render.width, 800);
        assert_eq!(config.render.height, 500);
        assert_eq!(config.columns.county, "TERYT Powiatu");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = AppConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn duplicate_candidates_are_rejected() {
        let err =
            AppConfig::from_json(r#"{ "analysis": { "candidate_a": 3, "candidate_b": 3 } }"#)
                .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/powiaty.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn overrides_replace_directories() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some(PathBuf::from("/tmp/in")), None);
        assert_eq!(config.data.dir, PathBuf::from("/tmp/in"));
        assert_eq!(config.render.output_dir, PathBuf::from("charts"));
        assert_eq!(
            config.data.resolve(Path::new("/abs/file.parquet")),
            PathBuf::from("/abs/file.parquet")
        );
    }
}
