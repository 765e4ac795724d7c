//! Domain models for analysis records.

mod analysis;

pub use analysis::{AnalysisRecord, AnalysisStatus, DuplicateInfo, TextStatistics};
