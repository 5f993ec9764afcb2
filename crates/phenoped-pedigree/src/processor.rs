//! Converts the JSON produced by the pedigree editor into patient records.
//!
//! Each individual is mapped field by field (ids, basic data, life status,
//! dates, phenotypes, disorders, family history, genes). A field that fails
//! is reported and left out of that record; the remaining fields and the
//! remaining individuals are still converted. `convert` never fails.

use std::sync::Arc;

use phenoped_common::{PhenopedConfig, PhenopedError, Result};
use phenoped_vocab::Vocabulary;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::document::{Pedigree, VERSION_KEY};
use crate::record::{LifeStatus, PatientName, PatientRecord};
use crate::report::{ConversionReport, FieldGroup};

const KEY_PHENOTIPS_ID: &str = "phenotipsId";
const KEY_EXTERNAL_ID: &str = "externalID";
const KEY_FEATURES: &str = "features";
const KEY_NON_STANDARD_FEATURES: &str = "nonstandard_features";
const KEY_GENES: &str = "genes";
const KEY_FAMILY_HISTORY: &str = "family_history";
const KEY_DISORDERS: &str = "disorders";

const DEFAULT_LIFE_STATUS: &str = "alive";

pub struct PedigreeProcessor {
    hpo: Arc<dyn Vocabulary>,
    omim: Arc<dyn Vocabulary>,
    expected_version: String,
    check_feature_terms: bool,
}

impl PedigreeProcessor {
    pub fn new(hpo: Arc<dyn Vocabulary>, omim: Arc<dyn Vocabulary>) -> Self {
        Self::with_config(hpo, omim, &PhenopedConfig::default())
    }

    pub fn with_config(
        hpo: Arc<dyn Vocabulary>,
        omim: Arc<dyn Vocabulary>,
        config: &PhenopedConfig,
    ) -> Self {
        Self {
            hpo,
            omim,
            expected_version: config.pedigree.expected_version.clone(),
            check_feature_terms: config.processor.check_feature_terms,
        }
    }

    /// One patient record per individual in the pedigree; empty for `None`.
    pub fn convert<P: Pedigree + ?Sized>(&self, pedigree: Option<&P>) -> Vec<PatientRecord> {
        self.convert_with_report(pedigree).records
    }

    /// Like [`convert`](Self::convert), also returning every issue that was logged.
    #[instrument(skip_all)]
    pub fn convert_with_report<P: Pedigree + ?Sized>(
        &self,
        pedigree: Option<&P>,
    ) -> ConversionReport {
        let mut report = ConversionReport::default();
        let Some(pedigree) = pedigree else {
            return report;
        };

        match pedigree.version() {
            Ok(Some(version)) if !version.eq_ignore_ascii_case(&self.expected_version) => {
                report.warn(
                    None,
                    FieldGroup::Document,
                    format!(
                        "Pedigree JSON version {version} differs from the expected {}",
                        self.expected_version
                    ),
                )
            }
            Ok(_) => {}
            Err(e) => report.error(
                None,
                FieldGroup::Document,
                format!("Could not read {VERSION_KEY}: {e}"),
            ),
        }

        let individuals = match pedigree.extract_patient_properties() {
            Ok(individuals) => individuals,
            Err(e) => {
                report.error(
                    None,
                    FieldGroup::Document,
                    format!("Could not extract pedigree individuals: {e}"),
                );
                return report;
            }
        };

        for (idx, individual) in individuals.iter().enumerate() {
            let record = self.convert_individual(idx, individual, &mut report);
            report.records.push(record);
        }

        info!(
            "Converted {} pedigree individuals ({} issues)",
            report.records.len(),
            report.issues.len()
        );
        report
    }

    fn convert_individual(
        &self,
        idx: usize,
        node: &Map<String, Value>,
        report: &mut ConversionReport,
    ) -> PatientRecord {
        let mut record = PatientRecord::default();

        match string_field(node, KEY_PHENOTIPS_ID) {
            Ok(id) => record.id = id,
            Err(e) => report.error(
                Some(idx),
                FieldGroup::Id,
                format!("Could not convert patient ID: {e}"),
            ),
        }
        match string_field(node, KEY_EXTERNAL_ID) {
            Ok(external_id) => record.external_id = external_id,
            Err(e) => report.error(
                Some(idx),
                FieldGroup::ExternalId,
                format!("Could not convert external ID: {e}"),
            ),
        }

        let (name, sex) = exchange_basic_data(node);
        record.patient_name = name;
        record.sex = sex;

        record.life_status = exchange_life_status(node);

        match exchange_date(node, "dob") {
            Ok(date) => record.date_of_birth = date,
            Err(e) => report.error(
                Some(idx),
                FieldGroup::DateOfBirth,
                format!("Could not convert date of birth: {e}"),
            ),
        }
        match exchange_date(node, "dod") {
            Ok(date) => record.date_of_death = date,
            Err(e) => report.error(
                Some(idx),
                FieldGroup::DateOfDeath,
                format!("Could not convert date of death: {e}"),
            ),
        }

        record.features = opt_array(node, KEY_FEATURES);
        record.nonstandard_features = opt_array(node, KEY_NON_STANDARD_FEATURES);
        if self.check_feature_terms {
            if let Some(ref features) = record.features {
                self.check_features(idx, features, report);
            }
        }

        record.disorders = self.exchange_disorders(idx, node, report);
        record.family_history = node.get(KEY_FAMILY_HISTORY).cloned();
        record.genes = opt_array(node, KEY_GENES);

        record
    }

    fn exchange_disorders(
        &self,
        idx: usize,
        node: &Map<String, Value>,
        report: &mut ConversionReport,
    ) -> Vec<Value> {
        let Some(external_terms) = node.get(KEY_DISORDERS).and_then(Value::as_array) else {
            return Vec::new();
        };

        let mut internal_terms = Vec::with_capacity(external_terms.len());
        for term_id in external_terms {
            let term_id = stringify(term_id);
            match self.omim.get_term(&term_id) {
                Ok(Some(term)) => internal_terms.push(term.to_json()),
                Ok(None) => {
                    debug!("Disorder {} not found in {}, dropping", term_id, self.omim.name())
                }
                Err(e) => report.error(
                    Some(idx),
                    FieldGroup::Disorders,
                    format!("Could not convert disorder {term_id}: {e}"),
                ),
            }
        }
        internal_terms
    }

    fn check_features(&self, idx: usize, features: &[Value], report: &mut ConversionReport) {
        let ids = features.iter().filter_map(|f| f.get("id")).filter_map(Value::as_str);
        for feature_id in ids {
            match self.hpo.get_term(feature_id) {
                Ok(Some(_)) => {}
                Ok(None) => report.warn(
                    Some(idx),
                    FieldGroup::Features,
                    format!("Feature {feature_id} is not a known {} term", self.hpo.name()),
                ),
                Err(e) => report.warn(
                    Some(idx),
                    FieldGroup::Features,
                    format!("Could not look up feature {feature_id}: {e}"),
                ),
            }
        }
    }
}

fn exchange_basic_data(node: &Map<String, Value>) -> (Option<PatientName>, Option<Value>) {
    let name = PatientName {
        first_name: present(node, "fName"),
        last_name: present(node, "lName"),
    };
    let name = if name.is_empty() { None } else { Some(name) };
    (name, present(node, "gender"))
}

fn exchange_life_status(node: &Map<String, Value>) -> LifeStatus {
    let status = match node.get("lifeStatus") {
        None | Some(Value::Null) => DEFAULT_LIFE_STATUS.to_string(),
        Some(other) => stringify(other),
    };
    LifeStatus::from_pedigree(&status)
}

fn exchange_date(node: &Map<String, Value>, key: &str) -> Result<Option<Map<String, Value>>> {
    match node.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(date)) => Ok(Some(pedigree_date_to_date(date))),
        Some(other) => Err(PhenopedError::MalformedPedigree(format!(
            "\"{key}\" is not a date object: {other}"
        ))),
    }
}

/// Pedigree dates already use the patient record's date layout.
fn pedigree_date_to_date(date: &Map<String, Value>) -> Map<String, Value> {
    date.clone()
}

fn string_field(node: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match node.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(PhenopedError::MalformedPedigree(format!(
            "\"{key}\" is not a string: {other}"
        ))),
    }
}

fn present(node: &Map<String, Value>, key: &str) -> Option<Value> {
    node.get(key).filter(|v| !v.is_null()).cloned()
}

fn opt_array(node: &Map<String, Value>, key: &str) -> Option<Vec<Value>> {
    node.get(key).and_then(Value::as_array).cloned()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_life_status_defaults_to_alive() {
        let status = |v: Value| exchange_life_status(&node(v));
        assert_eq!(status(json!({})), LifeStatus::Alive);
        assert_eq!(status(json!({"lifeStatus": null})), LifeStatus::Alive);
        assert_eq!(status(json!({"lifeStatus": "Alive"})), LifeStatus::Alive);
        assert_eq!(status(json!({"lifeStatus": "miscarriage"})), LifeStatus::Deceased);
        assert_eq!(status(json!({"lifeStatus": 0})), LifeStatus::Deceased);
    }

    #[test]
    fn test_string_field() {
        let n = node(json!({"phenotipsId": "P1", "externalID": 12, "other": null}));
        assert_eq!(string_field(&n, KEY_PHENOTIPS_ID).unwrap().as_deref(), Some("P1"));
        assert!(string_field(&n, KEY_EXTERNAL_ID).is_err());
        assert!(string_field(&n, "other").unwrap().is_none());
        assert!(string_field(&n, "missing").unwrap().is_none());
    }

    #[test]
    fn test_bad_external_id_keeps_id() {
        let processor = PedigreeProcessor::new(
            Arc::new(phenoped_vocab::InMemoryVocabulary::from_terms("hpo", Vec::new())),
            Arc::new(phenoped_vocab::InMemoryVocabulary::from_terms("omim", Vec::new())),
        );
        let mut report = ConversionReport::default();

        let record = processor.convert_individual(
            0,
            &node(json!({"phenotipsId": "P1", "externalID": 7})),
            &mut report,
        );
        assert_eq!(record.id.as_deref(), Some("P1"));
        assert!(record.external_id.is_none());

        let record = processor.convert_individual(
            1,
            &node(json!({"phenotipsId": ["P2"], "externalID": "E2"})),
            &mut report,
        );
        assert!(record.id.is_none());
        assert_eq!(record.external_id.as_deref(), Some("E2"));

        let groups: Vec<_> = report.issues.iter().map(|i| (i.node, i.group)).collect();
        assert_eq!(groups, vec![(Some(0), FieldGroup::ExternalId), (Some(1), FieldGroup::Id)]);
    }

    #[test]
    fn test_basic_data_omits_missing_name() {
        let (name, sex) = exchange_basic_data(&node(json!({"gender": "F"})));
        assert!(name.is_none());
        assert_eq!(sex, Some(json!("F")));

        let (name, sex) = exchange_basic_data(&node(json!({"fName": "Ann", "lName": null})));
        let name = name.unwrap();
        assert_eq!(name.first_name, Some(json!("Ann")));
        assert!(name.last_name.is_none());
        assert!(sex.is_none());
    }

    #[test]
    fn test_date_pass_through() {
        let date = json!({"year": 1970, "month": 4, "day": 1});
        let out = exchange_date(&node(json!({"dob": date.clone()})), "dob").unwrap().unwrap();
        assert_eq!(Value::Object(out), date);
        assert!(exchange_date(&node(json!({})), "dob").unwrap().is_none());
        assert!(exchange_date(&node(json!({"dob": "1970-04-01"})), "dob").is_err());
    }

    #[test]
    fn test_opt_array_ignores_non_arrays() {
        let n = node(json!({"genes": [{"gene": "BRCA1"}], "features": "none"}));
        assert_eq!(opt_array(&n, "genes"), Some(vec![json!({"gene": "BRCA1"})]));
        assert_eq!(opt_array(&n, "features"), None);
        assert_eq!(opt_array(&n, "nonstandard_features"), None);
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!("OMIM:1")), "OMIM:1");
        assert_eq!(stringify(&json!(143100)), "143100");
    }
}
