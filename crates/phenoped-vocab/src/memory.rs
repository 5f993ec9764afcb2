//! In-memory vocabulary built from a term table.
//!
//! Accepted inputs:
//! - TSV with a header row: `id`, `label`, `synonyms` (`|`-separated), `alt_ids` (`|`-separated)
//! - JSON array of term objects (`{"id": ..., "label": ..., ...}`)
//!
//! Usage:
//! ```ignore
//! let omim = InMemoryVocabulary::from_path("omim", "data/omim.tsv")?;
//! let term = omim.get_term("omim:143100")?;  // Some(VocabularyTerm { id: "OMIM:143100", .. })
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use phenoped_common::{PhenopedError, Result};
use serde_json::Value;

use crate::term::VocabularyTerm;
use crate::Vocabulary;

/// Vocabulary kept entirely in memory.
/// Build once at startup; share as `Arc<dyn Vocabulary>`.
pub struct InMemoryVocabulary {
    name: String,
    terms: Vec<VocabularyTerm>,
    /// Map from any known id / alternative id (normalised) → index into `terms`.
    lookup: HashMap<String, usize>,
}

impl InMemoryVocabulary {
    // ── Constructors ──────────────────────────────────────────────────────────

    pub fn from_terms(
        name: impl Into<String>,
        terms: impl IntoIterator<Item = VocabularyTerm>,
    ) -> Self {
        let mut vocab = Self { name: name.into(), terms: Vec::new(), lookup: HashMap::new() };
        for term in terms {
            vocab.insert(term, &[]);
        }
        vocab
    }

    /// Build from a TSV string (header row skipped).
    pub fn from_tsv(name: impl Into<String>, tsv: &str) -> Result<Self> {
        let mut vocab = Self { name: name.into(), terms: Vec::new(), lookup: HashMap::new() };

        for (line_no, line) in tsv.lines().enumerate() {
            if line_no == 0 || line.trim().is_empty() { continue; }

            let fields: Vec<&str> = line.split('\t').collect();
            let get = |i: usize| fields.get(i).copied().unwrap_or("").trim();

            let id = get(0);
            if id.is_empty() {
                tracing::debug!("{}: skipping line {} without an id", vocab.name, line_no + 1);
                continue;
            }

            let mut term = VocabularyTerm {
                id: id.to_string(),
                label: non_empty(get(1)),
                extra: Default::default(),
            };
            let synonyms = split_pipes(get(2));
            if !synonyms.is_empty() {
                term.extra.insert("synonyms".to_string(), Value::from(synonyms));
            }
            let alt_ids = split_pipes(get(3));
            vocab.insert(term, &alt_ids);
        }

        tracing::info!(
            "{} vocabulary built: {} terms, {} lookup entries",
            vocab.name,
            vocab.len(),
            vocab.lookup.len()
        );
        Ok(vocab)
    }

    /// Build from a JSON array of term objects.
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self> {
        let name = name.into();
        let terms: Vec<VocabularyTerm> = serde_json::from_str(json)?;
        let vocab = Self::from_terms(name, terms);
        tracing::info!("{} vocabulary built: {} terms", vocab.name, vocab.len());
        Ok(vocab)
    }

    /// Load a term table from disk; `.json` files are parsed as JSON, anything else as TSV.
    pub fn from_path(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(name, &content),
            _ => Self::from_tsv(name, &content),
        }
    }

    /// Download a TSV term table at runtime.
    pub async fn from_url(name: impl Into<String>, url: &str) -> Result<Self> {
        let name = name.into();
        tracing::info!("Downloading {} vocabulary from {}", name, url);
        let body = reqwest::get(url)
            .await
            .context("vocabulary download failed")?
            .error_for_status()?
            .text()
            .await
            .context("vocabulary response read failed")?;
        if url.ends_with(".json") {
            Self::from_json(name, &body)
        } else {
            Self::from_tsv(name, &body)
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Number of distinct terms loaded.
    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    fn lookup(&self, id: &str) -> Option<&VocabularyTerm> {
        self.lookup.get(&normalise_id(id)).map(|&i| &self.terms[i])
    }

    fn insert(&mut self, term: VocabularyTerm, alt_ids: &[String]) {
        let idx = self.terms.len();
        let key = normalise_id(&term.id);
        if self.lookup.contains_key(&key) {
            tracing::warn!("{}: duplicate term id {}, keeping the first", self.name, term.id);
            return;
        }
        self.lookup.insert(key, idx);
        for alt in alt_ids {
            self.lookup.entry(normalise_id(alt)).or_insert(idx);
        }
        self.terms.push(term);
    }
}

impl Vocabulary for InMemoryVocabulary {
    fn name(&self) -> &str { &self.name }

    fn get_term(&self, id: &str) -> Result<Option<VocabularyTerm>> {
        if id.trim().is_empty() {
            return Err(PhenopedError::Vocabulary(format!("{}: empty identifier", self.name)));
        }
        Ok(self.lookup(id).cloned())
    }
}

fn normalise_id(id: &str) -> String {
    id.trim().to_uppercase()
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

fn split_pipes(s: &str) -> Vec<String> {
    s.split('|').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
