use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A coded clinical concept returned by a vocabulary lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyTerm {
    /// Canonical identifier, e.g. "OMIM:143100" or "HP:0001250"
    pub id: String,
    /// Preferred human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Any further fields the source table carries (synonyms, parents, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VocabularyTerm {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: Some(label.into()), extra: Map::new() }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Serialized form embedded into patient records.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("id".to_string(), Value::String(self.id.clone()));
        if let Some(ref label) = self.label {
            obj.insert("label".to_string(), Value::String(label.clone()));
        }
        for (k, v) in &self.extra {
            obj.entry(k.clone()).or_insert_with(|| v.clone());
        }
        Value::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_json_minimal() {
        let term = VocabularyTerm::new("OMIM:100", "X");
        assert_eq!(term.to_json(), json!({"id": "OMIM:100", "label": "X"}));
    }

    #[test]
    fn test_to_json_keeps_extra_fields() {
        let term = VocabularyTerm::new("OMIM:143100", "Huntington disease")
            .with_field("synonyms", json!(["HD"]));
        assert_eq!(
            term.to_json(),
            json!({"id": "OMIM:143100", "label": "Huntington disease", "synonyms": ["HD"]})
        );
    }

    #[test]
    fn test_extra_cannot_shadow_id() {
        let term = VocabularyTerm::new("OMIM:1", "A").with_field("id", json!("bogus"));
        assert_eq!(term.to_json()["id"], "OMIM:1");
    }

    #[test]
    fn test_deserialize_flattens_unknown_fields() {
        let raw = json!({"id": "HP:0001250", "label": "Seizure", "is_a": ["HP:1"]});
        let term: VocabularyTerm = serde_json::from_value(raw).unwrap();
        assert_eq!(term.label.as_deref(), Some("Seizure"));
        assert_eq!(term.extra["is_a"], json!(["HP:1"]));
    }
}
