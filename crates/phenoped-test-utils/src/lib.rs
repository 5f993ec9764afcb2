//! Fakes and fixtures for PhenoPed tests.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use phenoped_common::{PhenopedError, Result};
use phenoped_vocab::{InMemoryVocabulary, Vocabulary, VocabularyTerm};
use serde_json::{json, Value};

/// OMIM vocabulary with a handful of terms, including `OMIM:100` → "X".
pub fn sample_omim() -> Arc<dyn Vocabulary> {
    Arc::new(InMemoryVocabulary::from_terms(
        "omim",
        vec![
            VocabularyTerm::new("OMIM:100", "X"),
            VocabularyTerm::new("OMIM:143100", "Huntington disease"),
            VocabularyTerm::new("OMIM:219700", "Cystic fibrosis"),
        ],
    ))
}

/// HPO vocabulary with a handful of phenotype terms.
pub fn sample_hpo() -> Arc<dyn Vocabulary> {
    Arc::new(InMemoryVocabulary::from_terms(
        "hpo",
        vec![
            VocabularyTerm::new("HP:0001250", "Seizure"),
            VocabularyTerm::new("HP:0000256", "Macrocephaly"),
        ],
    ))
}

pub fn empty_vocabulary(name: &str) -> Arc<dyn Vocabulary> {
    Arc::new(InMemoryVocabulary::from_terms(name, Vec::new()))
}

/// Delegates to an inner vocabulary but fails for the listed ids,
/// and counts every lookup.
pub struct FlakyVocabulary {
    inner: Arc<dyn Vocabulary>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FlakyVocabulary {
    pub fn new(inner: Arc<dyn Vocabulary>, failing: &[&str]) -> Self {
        Self {
            inner,
            failing: failing.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Vocabulary for FlakyVocabulary {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get_term(&self, id: &str) -> Result<Option<VocabularyTerm>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(id) {
            return Err(PhenopedError::Vocabulary(format!("lookup of {id} failed")));
        }
        self.inner.get_term(id)
    }
}

/// A vocabulary whose every lookup fails.
pub struct FailingVocabulary;

impl Vocabulary for FailingVocabulary {
    fn name(&self) -> &str {
        "failing"
    }

    fn get_term(&self, id: &str) -> Result<Option<VocabularyTerm>> {
        Err(PhenopedError::Vocabulary(format!("service unavailable for {id}")))
    }
}

/// Pedigree JSON in the editor's layout, one `GG` node per property bag.
pub fn pedigree_json(version: Option<&str>, individuals: Vec<Value>) -> Value {
    let nodes: Vec<Value> = individuals
        .into_iter()
        .enumerate()
        .map(|(id, prop)| json!({"id": id, "prop": prop}))
        .collect();
    let mut doc = json!({"GG": nodes, "ranks": [], "order": []});
    if let Some(v) = version {
        doc["JSON_version"] = json!(v);
    }
    doc
}
