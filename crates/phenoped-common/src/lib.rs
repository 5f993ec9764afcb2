//! phenoped-common — Shared error type and configuration used across all PhenoPed crates.

pub mod error;
pub mod config;

// Re-export commonly used types
pub use config::{
    PedigreeConfig, PhenopedConfig, ProcessorConfig, VocabulariesConfig, VocabularySource,
};
pub use error::{PhenopedError, Result};
