//! Data module - election table loading and queries

mod loader;
mod processor;

pub use loader::{DataLoader, ElectionData, LoaderError, TablePreview, PREVIEW_ROWS};
pub use processor::{
    Candidate, CountyResult, CountyResults, DataProcessor, NationalResult, ProcessorError,
};
