use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Raw JSON request body handed to the validator.
///
/// An empty body reads as `{}` so the validator reports `object.min`;
/// anything unparseable is a ValidationError rather than an axum rejection.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| parse_error())?;

        parse(&bytes).map(JsonBody)
    }
}

fn parse(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|_| parse_error())
}

fn parse_error() -> ApiError {
    ApiError::validation("Não foi possível interpretar o valor enviado.")
        .with_action("Verifique se o valor enviado é um JSON válido.")
        .with_location("MODEL:VALIDATOR:ERROR_PARSING_JSON")
        .with_key("object")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_is_an_empty_object() {
        assert_eq!(parse(b"").unwrap(), json!({}));
        assert_eq!(parse(b"  \n").unwrap(), json!({}));
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        let err = parse(b"{\"name\": ").unwrap_err();
        let details = err.details().unwrap();
        assert_eq!(details.error_location_code.as_deref(), Some("MODEL:VALIDATOR:ERROR_PARSING_JSON"));
        assert_eq!(details.key.as_deref(), Some("object"));
    }

    #[test]
    fn arrays_are_passed_through() {
        assert_eq!(parse(b"[1,2]").unwrap(), json!([1, 2]));
    }
}
