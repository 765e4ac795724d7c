//! docanalyze - document analysis and deduplication service.
//!
//! Ingests previously stored documents, fingerprints their content, and runs
//! a fixed pipeline of analysis stages (text statistics, duplicate detection,
//! word-cloud rendering), persisting progress and results so repeated
//! requests for the same content are served without recomputation.

pub mod cli;
pub mod config;
pub mod models;
pub mod repository;
pub mod schema;
pub mod services;
pub mod storage;
