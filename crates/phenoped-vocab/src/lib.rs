//! phenoped-vocab — Vocabulary lookup capability.
//!
//! The converter only needs `lookup(identifier) -> term | not-found`; the
//! `Vocabulary` trait is that seam. `InMemoryVocabulary` is the bundled
//! implementation, built from a TSV or JSON term table.

pub mod memory;
pub mod term;

pub use memory::InMemoryVocabulary;
pub use term::VocabularyTerm;

use phenoped_common::Result;

/// A terminology service (OMIM, HPO, ...) that resolves identifiers to terms.
pub trait Vocabulary: Send + Sync {
    /// Short name used in log lines, e.g. "omim".
    fn name(&self) -> &str;

    /// Resolve an identifier. `Ok(None)` means the id is unknown;
    /// `Err` means the lookup itself failed.
    fn get_term(&self, id: &str) -> Result<Option<VocabularyTerm>>;
}
