//! Analysis pipeline services.
//!
//! Each stage operates on the same buffered content and reports its outcome
//! as data; the orchestrator composes stage outcomes into the persisted
//! analysis record.

pub mod duplicate;
pub mod orchestrator;
pub mod statistics;
pub mod wordcloud;

pub use duplicate::DuplicateDetector;
pub use orchestrator::{AnalysisError, AnalysisOrchestrator};
pub use statistics::StatisticsCounter;
pub use wordcloud::{WordCloudOutcome, WordCloudStage};
