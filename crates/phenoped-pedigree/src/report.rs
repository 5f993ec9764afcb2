//! Non-fatal problems collected while converting a pedigree.

use serde::Serialize;

use crate::record::PatientRecord;

/// The unit of isolation during conversion: a failing group is dropped
/// from its record without touching the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    Document,
    Id,
    ExternalId,
    DateOfBirth,
    DateOfDeath,
    Features,
    Disorders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionIssue {
    /// Index of the individual in extraction order; `None` for document-level issues.
    pub node: Option<usize>,
    pub group: FieldGroup,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    pub records: Vec<PatientRecord>,
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    pub fn warn(&mut self, node: Option<usize>, group: FieldGroup, message: String) {
        tracing::warn!(node = ?node, group = ?group, "{}", message);
        self.issues.push(ConversionIssue { node, group, severity: Severity::Warning, message });
    }

    pub fn error(&mut self, node: Option<usize>, group: FieldGroup, message: String) {
        tracing::error!(node = ?node, group = ?group, "{}", message);
        self.issues.push(ConversionIssue { node, group, severity: Severity::Error, message });
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn issues_for(&self, node: usize) -> impl Iterator<Item = &ConversionIssue> {
        self.issues.iter().filter(move |i| i.node == Some(node))
    }
}
