// handlers/mod.rs - Route handlers for /api/v1
//
// Each handler follows the same chain: request context (optional user) ->
// validation -> authorization -> accessor calls (mutations inside
// `transaction::run`) -> database error mapping -> JSON response.

pub mod categories;
pub mod fallback;
pub mod ingredients;
pub mod orders;
pub mod products;
pub mod sessions;
pub mod status;
pub mod user;
pub mod users;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::ApiError;
use crate::validator::{self, Required};

/// Query string as a JSON object for the validator; `list_fields` are split on commas
pub(crate) fn query_object(raw: Option<String>, list_fields: &[&str]) -> Value {
    let mut obj = Map::new();

    if let Some(raw) = raw {
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let value = if list_fields.contains(&key.as_ref()) {
                Value::from(value.split(',').map(str::to_string).collect::<Vec<_>>())
            } else {
                Value::String(value.into_owned())
            };
            obj.insert(key.into_owned(), value);
        }
    }

    Value::Object(obj)
}

#[derive(Deserialize)]
struct IdParam {
    id: i32,
}

/// Validate the `{id}` path segment as an integer
pub(crate) fn path_id(raw: &str) -> Result<i32, ApiError> {
    let IdParam { id } = validator::validate_into(&json!({ "id": raw }), &[("id", Required)])?;
    Ok(id)
}

/// Map a unique violation on `name` to a ValidationError reported at `location`
pub(crate) fn duplicate_name(err: ApiError, location: &str) -> ApiError {
    if !err.is_unique_violation() {
        return err;
    }
    ApiError::validation("O nome enviado parece ser duplicado.")
        .with_action("Utilize um \"nome\" diferente.")
        .with_location(location)
        .with_key("name")
}

/// First element of a validated status list; the validator guarantees one exists
pub(crate) fn first_status(statuses: Vec<String>) -> Result<String, ApiError> {
    statuses
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::internal("validated status list was empty"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_lists_are_split_on_commas() {
        let obj = query_object(
            Some("order_status=pending,accepted&category=teas".to_string()),
            &["order_status"],
        );
        assert_eq!(obj, json!({ "order_status": ["pending", "accepted"], "category": "teas" }));
    }

    #[test]
    fn missing_query_is_an_empty_object() {
        assert_eq!(query_object(None, &["order_status"]), json!({}));
    }

    #[test]
    fn path_ids_must_be_integers() {
        assert_eq!(path_id("12").unwrap(), 12);
        let err = path_id("abc").unwrap_err();
        assert_eq!(err.details().unwrap().error_type.as_deref(), Some("number.base"));
    }

    #[test]
    fn non_unique_errors_pass_through() {
        let err = duplicate_name(ApiError::not_found("x"), "LOC");
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
