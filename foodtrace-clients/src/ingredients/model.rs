//! Ingredient record schema as served by the document API

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// One traceable ingredient batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRecord {
    /// Batch identifier; the natural sort and display key
    pub batch_number: String,
    pub name: String,
    pub origin: String,
    pub supplier: String,
    /// Free-text inspection outcome
    pub test_result: String,
    /// Inspection detail name -> measured value; anything but an object is dropped
    #[serde(
        default,
        deserialize_with = "object_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub test_details: Option<BTreeMap<String, JsonValue>>,

    // Never rendered into context, so passed through as received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_date: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<JsonValue>,
}

fn object_or_none<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, JsonValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::Object(map) => Some(map.into_iter().collect()),
        _ => None,
    })
}

impl IngredientRecord {
    /// Create a record with the fields that feed the chat context
    pub fn new(
        batch_number: impl Into<String>,
        name: impl Into<String>,
        origin: impl Into<String>,
        supplier: impl Into<String>,
        test_result: impl Into<String>,
    ) -> Self {
        Self {
            batch_number: batch_number.into(),
            name: name.into(),
            origin: origin.into(),
            supplier: supplier.into(),
            test_result: test_result.into(),
            test_details: None,
            id: None,
            production_date: None,
            expiry_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Add one inspection detail
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.test_details
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Test details as `(key, rendered value)` pairs, sorted by key
    pub fn rendered_details(&self) -> Vec<(&str, String)> {
        self.test_details
            .iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), render_value(v)))
            .collect()
    }
}

/// Strings render bare; everything else as compact JSON.
fn render_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `{data: ...}` envelope used by the document API
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_wire_record() {
        let record: IngredientRecord = serde_json::from_value(json!({
            "id": "7c0e",
            "batchNumber": "MG20241201-001",
            "name": "Mango",
            "origin": "Tainan",
            "supplier": "Yujing Growers",
            "productionDate": "2024-12-01T00:00:00.000Z",
            "expiryDate": "2024-12-15T00:00:00.000Z",
            "testResult": "Pass",
            "testDetails": {"pesticide": "0.01ppm", "heavyMetal": "none"}
        }))
        .unwrap();

        assert_eq!(record.batch_number, "MG20241201-001");
        assert_eq!(record.id, Some(json!("7c0e")));
        assert_eq!(record.production_date, Some(json!("2024-12-01T00:00:00.000Z")));
        assert_eq!(record.test_details.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let result = serde_json::from_value::<IngredientRecord>(json!({
            "batchNumber": "B1",
            "name": "Mango"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_null_test_details() {
        let record: IngredientRecord = serde_json::from_value(json!({
            "batchNumber": "B1",
            "name": "Mango",
            "origin": "Taiwan",
            "supplier": "S1",
            "testResult": "Pass",
            "testDetails": null
        }))
        .unwrap();
        assert!(record.test_details.is_none());
        assert!(record.rendered_details().is_empty());
    }

    #[test]
    fn test_unrendered_fields_are_lenient() {
        let record: IngredientRecord = serde_json::from_value(json!({
            "id": 42,
            "batchNumber": "B2",
            "name": "Banana",
            "origin": "Kaohsiung",
            "supplier": "S2",
            "testResult": "Fail",
            "productionDate": "2024-12-01",
            "expiryDate": 1733011200,
            "testDetails": "see attached report"
        }))
        .unwrap();

        assert_eq!(record.batch_number, "B2");
        assert_eq!(record.production_date, Some(json!("2024-12-01")));
        assert_eq!(record.expiry_date, Some(json!(1733011200)));
        assert!(record.test_details.is_none());
        assert!(record.rendered_details().is_empty());
    }

    #[test]
    fn test_rendered_details_sorted_and_typed() {
        let record = IngredientRecord::new("B1", "Mango", "Taiwan", "S1", "Pass")
            .with_detail("pesticide", "none")
            .with_detail("bacteria", json!(0))
            .with_detail("lead", json!(0.01));

        let rendered = record.rendered_details();
        assert_eq!(
            rendered,
            vec![
                ("bacteria", "0".to_string()),
                ("lead", "0.01".to_string()),
                ("pesticide", "none".to_string()),
            ]
        );
    }
}
