//! phenoped-pedigree — Pedigree JSON to patient record conversion.
//! - Pedigree document wrapping and per-individual extraction
//! - Field-group mapping into the patient record schema
//! - OMIM disorder resolution through an injected vocabulary
//! - Non-fatal issue collection

pub mod document;
pub mod processor;
pub mod record;
pub mod report;

pub use document::{Pedigree, PedigreeDocument};
pub use processor::PedigreeProcessor;
pub use record::{LifeStatus, PatientName, PatientRecord};
pub use report::{ConversionIssue, ConversionReport, FieldGroup, Severity};
