//! Election Data Loader Module
//! Reads the candidate list, county demographics and county vote counts
//! into memory using Polars.

use crate::config::{ColumnConfig, DataConfig};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read table: {0}")]
    Polars(#[from] PolarsError),
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Table '{table}' has no column '{column}'")]
    MissingColumn { table: &'static str, column: String },
}

/// The three input relations, read once and kept read-only.
#[derive(Debug, Clone)]
pub struct ElectionData {
    pub candidates: DataFrame,
    pub demographics: DataFrame,
    pub results: DataFrame,
}

/// Rows shown per input table in the window.
pub const PREVIEW_ROWS: usize = 100;

/// Head of an input table as display text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePreview {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Row count of the whole table.
    pub height: usize,
}

impl TablePreview {
    pub fn from_frame(name: &str, df: &DataFrame, max_rows: usize) -> Self {
        let head = df.head(Some(max_rows));
        let rows = (0..head.height())
            .map(|i| {
                head.get_columns()
                    .iter()
                    .map(|c| c.get(i).map(|v| cell_text(&v)).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self {
            name: name.to_string(),
            columns: DataLoader::get_columns(df),
            rows,
            height: df.height(),
        }
    }
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

impl ElectionData {
    /// Heads of the candidate, demographics and results tables, in that order.
    pub fn previews(&self, max_rows: usize) -> Vec<TablePreview> {
        vec![
            TablePreview::from_frame("kandydaci", &self.candidates, max_rows),
            TablePreview::from_frame("demografia", &self.demographics, max_rows),
            TablePreview::from_frame("wyniki", &self.results, max_rows),
        ]
    }

    /// Row counts as (candidates, demographics, results).
    pub fn row_counts(&self) -> (usize, usize, usize) {
        (
            self.candidates.height(),
            self.demographics.height(),
            self.results.height(),
        )
    }
}

/// Loads Parquet (or CSV) tables with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a single table, picking the reader by file extension.
    pub fn load_table(path: &Path) -> Result<DataFrame, LoaderError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let df = match extension.as_deref() {
            Some("parquet") => {
                let file = File::open(path).map_err(|source| LoaderError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                ParquetReader::new(file).finish()?
            }
            Some("csv") => {
                if !path.exists() {
                    return Err(LoaderError::Io {
                        path: path.to_path_buf(),
                        source: std::io::Error::from(std::io::ErrorKind::NotFound),
                    });
                }
                LazyCsvReader::new(path)
                    .with_infer_schema_length(Some(10000))
                    .finish()?
                    .collect()?
            }
            _ => return Err(LoaderError::UnsupportedFormat(path.to_path_buf())),
        };

        debug!(
            path = %path.display(),
            rows = df.height(),
            columns = ?Self::get_columns(&df),
            "table loaded"
        );
        Ok(df)
    }

    /// Load all three tables and check that the configured columns exist.
    pub fn load(data: &DataConfig, cols: &ColumnConfig) -> Result<ElectionData, LoaderError> {
        let candidates = Self::load_table(&data.candidates_path())?;
        Self::require_columns(
            &candidates,
            "candidates",
            &[&cols.candidate_name, &cols.candidate_pct],
        )?;

        let demographics = Self::load_table(&data.demographics_path())?;
        Self::require_columns(
            &demographics,
            "demographics",
            &[&cols.county, &cols.population, &cols.density],
        )?;

        let results = Self::load_table(&data.results_path())?;
        Self::require_columns(
            &results,
            "results",
            &[&cols.county, &cols.candidate, &cols.votes],
        )?;

        let data = ElectionData {
            candidates,
            demographics,
            results,
        };
        let (c, d, r) = data.row_counts();
        info!(candidates = c, counties = d, vote_rows = r, "election data loaded");
        Ok(data)
    }

    fn require_columns(
        df: &DataFrame,
        table: &'static str,
        columns: &[&String],
    ) -> Result<(), LoaderError> {
        for column in columns {
            if df.column(column.as_str()).is_err() {
                return Err(LoaderError::MissingColumn {
                    table,
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Column names of a table, for display.
    pub fn get_columns(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_parquet(dir: &Path, name: &str, mut df: DataFrame) {
        let mut file = File::create(dir.join(name)).unwrap();
        ParquetWriter::new(&mut file).finish(&mut df).unwrap();
    }

    fn sample_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let cols = ColumnConfig::default();

        write_parquet(
            dir.path(),
            "kandydaci2025.parquet",
            df!(
                cols.candidate_number.as_str() => [8i64, 11],
                cols.candidate_name.as_str() => ["Karol Tadeusz NAWROCKI", "Rafał Kazimierz TRZASKOWSKI"],
                cols.candidate_pct.as_str() => [29.54, 31.36],
            )
            .unwrap(),
        );
        write_parquet(
            dir.path(),
            "demografia2023.parquet",
            df!(
                cols.county.as_str() => ["0201", "0202"],
                cols.population.as_str() => [120.5, 80.0],
                cols.density.as_str() => [110.0, 55.5],
            )
            .unwrap(),
        );
        write_parquet(
            dir.path(),
            "wyniki2025.parquet",
            df!(
                cols.county.as_str() => ["0201", "0201", "0201"],
                cols.candidate.as_str() => [0i64, 8, 11],
                cols.votes.as_str() => [1000i64, 450, 400],
            )
            .unwrap(),
        );
        dir
    }

    #[test]
    fn loads_all_three_tables() {
        let dir = sample_dir();
        let data_cfg = DataConfig {
            dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let data = DataLoader::load(&data_cfg, &ColumnConfig::default()).unwrap();
        assert_eq!(data.row_counts(), (2, 2, 3));
        assert!(DataLoader::get_columns(&data.results).contains(&"Kandydat".to_string()));
    }

    #[test]
    fn previews_show_the_head_of_each_table() {
        let dir = sample_dir();
        let data_cfg = DataConfig {
            dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let data = DataLoader::load(&data_cfg, &ColumnConfig::default()).unwrap();

        let previews = data.previews(2);
        let names: Vec<&str> = previews.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["kandydaci", "demografia", "wyniki"]);

        let candidates = &previews[0];
        assert_eq!(candidates.columns, ["Numer", "Nazwisko i imiona", "Procent głosów"]);
        assert_eq!(candidates.rows[1][1], "Rafał Kazimierz TRZASKOWSKI");
        assert_eq!(candidates.rows[0][0], "8");

        let results = &previews[2];
        assert_eq!(results.height, 3);
        assert_eq!(results.rows.len(), 2);
    }

    #[test]
    fn missing_file_fails_fast() {
        let dir = TempDir::new().unwrap();
        let data_cfg = DataConfig {
            dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let err = DataLoader::load(&data_cfg, &ColumnConfig::default()).unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }

    #[test]
    fn missing_column_is_named() {
        let dir = sample_dir();
        let data_cfg = DataConfig {
            dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let cols = ColumnConfig {
            density: "Gęstość".to_string(),
            ..Default::default()
        };

        match DataLoader::load(&data_cfg, &cols).unwrap_err() {
            LoaderError::MissingColumn { table, column } => {
                assert_eq!(table, "demographics");
                assert_eq!(column, "Gęstość");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reads_csv_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("demografia.csv");
        let mut df = df!("a" => [1i64, 2, 3], "b" => [0.5, 1.5, 2.5]).unwrap();
        let mut file = File::create(&path).unwrap();
        CsvWriter::new(&mut file).finish(&mut df).unwrap();

        let loaded = DataLoader::load_table(&path).unwrap();
        assert_eq!(loaded.shape(), (3, 2));
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = DataLoader::load_table(Path::new("data/wyniki.xlsx")).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedFormat(_)));
    }
}
