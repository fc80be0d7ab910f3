//! Request payload validation.
//!
//! Callers name the fields they accept and whether each is required; the
//! composite schema for that field set is built once and cached. Unknown keys
//! are dropped, recognised ones come back coerced (trimmed strings, integers
//! from numeric text, prices rounded to cents).

pub mod catalog;
pub mod messages;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config;
use crate::error::ApiError;
use catalog::Rule;
use messages::{Label, Violation};

const FINAL_SCHEMA: &str = "MODEL:VALIDATOR:FINAL_SCHEMA";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requiredness {
    Required,
    Optional,
}

pub use Requiredness::{Optional, Required};

/// Field rules for one field set, in canonical (sorted) order
#[derive(Debug)]
pub struct Schema {
    fields: Vec<(&'static str, Rule)>,
}

impl Schema {
    fn build(names: &[&str]) -> Result<Self, ApiError> {
        let mut fields = Vec::with_capacity(names.len());
        for name in names {
            let entry = catalog::FIELDS
                .iter()
                .copied()
                .find(|field| field == name)
                .and_then(|field| catalog::lookup(field).map(|rule| (field, rule)))
                .ok_or_else(|| {
                    ApiError::internal(format!("no validation rule for field \"{}\"", name))
                })?;
            fields.push(entry);
        }
        Ok(Self { fields })
    }

    fn check(
        &self,
        obj: &Map<String, Value>,
        required: &HashMap<&str, Requiredness>,
    ) -> Result<Map<String, Value>, Violation> {
        let mut clean = Map::new();

        for (name, rule) in &self.fields {
            let label = Label::field(name);
            match obj.get(*name) {
                Some(value) => {
                    clean.insert(name.to_string(), rule.apply(&label, value)?);
                }
                None if required.get(name) == Some(&Required) => {
                    return Err(Violation::required(&label));
                }
                None => {}
            }
        }

        Ok(clean)
    }
}

/// Bounded, grow-only cache of composite schemas keyed by sorted field names
struct SchemaCache {
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
}

impl SchemaCache {
    fn get_or_build(&self, names: &[&str]) -> Result<Arc<Schema>, ApiError> {
        let key = names.join(",");

        if let Ok(schemas) = self.schemas.read() {
            if let Some(schema) = schemas.get(&key) {
                return Ok(schema.clone());
            }
        }

        let schema = Arc::new(Schema::build(names)?);

        if let Ok(mut schemas) = self.schemas.write() {
            if schemas.len() < config::config().validator.cache_capacity {
                schemas.entry(key).or_insert_with(|| schema.clone());
            }
        }

        Ok(schema)
    }

    #[cfg(test)]
    fn contains(&self, names: &[&str]) -> bool {
        self.schemas
            .read()
            .map(|schemas| schemas.contains_key(&names.join(",")))
            .unwrap_or(false)
    }
}

static CACHE: Lazy<SchemaCache> = Lazy::new(|| SchemaCache {
    schemas: RwLock::new(HashMap::new()),
});

/// Validate `raw` against the named fields and return only the recognised, coerced ones
pub fn validate(raw: &Value, keys: &[(&str, Requiredness)]) -> Result<Map<String, Value>, ApiError> {
    let obj = match raw {
        Value::Object(obj) => obj,
        _ => return Err(Violation::object_base(&Label::field("body")).into()),
    };
    if obj.is_empty() {
        return Err(Violation::object_min().into());
    }

    let mut names: Vec<&str> = keys.iter().map(|(name, _)| *name).collect();
    names.sort_unstable();
    names.dedup();

    let required: HashMap<&str, Requiredness> = keys.iter().copied().collect();
    let schema = CACHE.get_or_build(&names)?;

    Ok(schema.check(obj, &required)?)
}

/// `validate`, then deserialize the clean fields into `T`
pub fn validate_into<T: DeserializeOwned>(
    raw: &Value,
    keys: &[(&str, Requiredness)],
) -> Result<T, ApiError> {
    let clean = validate(raw, keys)?;
    serde_json::from_value(Value::Object(clean))
        .map_err(|e| ApiError::internal(format!("validated payload did not deserialize: {}", e)))
}

impl From<Violation> for ApiError {
    fn from(violation: Violation) -> Self {
        ApiError::validation(violation.message)
            .with_location(FINAL_SCHEMA)
            .with_key(violation.key)
            .with_type(violation.error_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body_of(err: ApiError) -> (String, String, String) {
        let d = err.details().cloned().unwrap();
        (d.message, d.key.unwrap(), d.error_type.unwrap())
    }

    #[test]
    fn rejects_non_object_payloads() {
        let (message, key, kind) = body_of(validate(&json!([1]), &[("id", Required)]).unwrap_err());
        assert_eq!(message, "\"body\" enviado deve ser do tipo Object.");
        assert_eq!(key, "object");
        assert_eq!(kind, "object.base");
    }

    #[test]
    fn empty_object_fails_before_required_fields() {
        let err = validate(&json!({}), &[("order_status", Required)]).unwrap_err();
        let (message, key, kind) = body_of(err);
        assert_eq!(message, "Objeto enviado deve ter no mínimo uma chave.");
        assert_eq!(key, "object");
        assert_eq!(kind, "object.min");
    }

    #[test]
    fn missing_required_field_is_reported_with_its_key() {
        let err = validate(&json!({ "name": "Chocolate" }), &[("name", Required), ("price", Required)])
            .unwrap_err();
        assert_eq!(err.details().unwrap().error_location_code.as_deref(), Some(FINAL_SCHEMA));
        let (message, key, kind) = body_of(err);
        assert_eq!(message, "\"price\" é um campo obrigatório.");
        assert_eq!(key, "price");
        assert_eq!(kind, "any.required");
    }

    #[test]
    fn optional_fields_may_be_absent_and_unknown_keys_are_stripped() {
        let clean = validate(
            &json!({ "name": "Leite ", "admin": true }),
            &[("name", Required), ("value", Optional), ("price", Optional)],
        )
        .unwrap();
        assert_eq!(Value::Object(clean), json!({ "name": "Leite" }));
    }

    #[test]
    fn fields_are_checked_in_sorted_order() {
        let err = validate(
            &json!({ "value": "x", "name": " bad" }),
            &[("value", Required), ("name", Required)],
        )
        .unwrap_err();
        assert_eq!(body_of(err).1, "name");
    }

    #[test]
    fn schemas_are_cached_per_sorted_field_set() {
        validate(&json!({ "value": 1 }), &[("value", Optional), ("price", Optional)]).unwrap();
        assert!(CACHE.contains(&["price", "value"]));

        // Same field set, opposite requiredness, reuses the cached schema
        let err = validate(&json!({ "value": 1 }), &[("price", Required), ("value", Required)])
            .unwrap_err();
        assert_eq!(body_of(err).2, "any.required");
    }

    #[test]
    fn unknown_field_names_are_an_internal_error() {
        let err = validate(&json!({ "a": 1 }), &[("not_a_field", Required)]).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validate_into_deserializes_coerced_values() {
        #[derive(serde::Deserialize)]
        struct Ingredient {
            name: String,
            value: Option<i32>,
            price: Option<rust_decimal::Decimal>,
        }

        let ingredient: Ingredient = validate_into(
            &json!({ "name": "Chocolate", "value": "16", "price": "1.49" }),
            &[("name", Required), ("value", Optional), ("price", Optional)],
        )
        .unwrap();
        assert_eq!(ingredient.name, "Chocolate");
        assert_eq!(ingredient.value, Some(16));
        assert_eq!(ingredient.price.unwrap().to_string(), "1.49");
    }
}
