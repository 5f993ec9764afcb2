//! Patient record in the target storage schema.

use phenoped_common::Result;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<PatientName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<Value>,
    pub life_status: LifeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_death: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonstandard_features: Option<Vec<Value>>,
    pub disorders: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genes: Option<Vec<Value>>,
    /// Always emitted; `null` when the pedigree carried none.
    pub family_history: Option<Value>,
}

impl PatientRecord {
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<Value>,
}

impl PatientName {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeStatus {
    #[default]
    Alive,
    Deceased,
}

impl LifeStatus {
    /// Anything other than a case-insensitive "alive" counts as deceased
    /// (the drawing tool also emits "miscarriage", "stillborn", "aborted", ...).
    pub fn from_pedigree(status: &str) -> Self {
        if status.eq_ignore_ascii_case("alive") { LifeStatus::Alive } else { LifeStatus::Deceased }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifeStatus::Alive    => "alive",
            LifeStatus::Deceased => "deceased",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_record_shape() {
        let json = PatientRecord::default().to_json().unwrap();
        assert_eq!(json, json!({"life_status": "alive", "disorders": [], "family_history": null}));
    }

    #[test]
    fn test_life_status_from_pedigree() {
        assert_eq!(LifeStatus::from_pedigree("alive"), LifeStatus::Alive);
        assert_eq!(LifeStatus::from_pedigree("ALIVE"), LifeStatus::Alive);
        for s in ["deceased", "Deceased", "miscarriage", "stillborn", ""] {
            assert_eq!(LifeStatus::from_pedigree(s), LifeStatus::Deceased, "{s}");
        }
        assert_eq!(LifeStatus::Deceased.as_str(), "deceased");
    }
}
