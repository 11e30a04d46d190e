//! The `{message, data, errors}` envelope and status classification.
//!
//! # Design
//! Every response, successful or not, is decoded into the same generic
//! envelope before the status code is looked at. Error responses carry
//! `data: {}` and a populated `errors` map, success responses carry the
//! resource under an operation-specific key inside `data`. Only once the
//! whole body has decoded does the status decide which half is returned;
//! the other half is dropped.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, Errors, ServiceError};
use crate::http::HttpResponse;

/// Generic response wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Map<String, Value>,
    #[serde(default, deserialize_with = "error_map")]
    pub errors: Errors,
}

impl Envelope {
    /// Decodes a response body. A blank body or a literal `null` is an
    /// empty envelope; anything else must be a JSON object.
    pub fn decode(body: &str) -> Result<Self, ApiError> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(body).map_err(|e| {
            tracing::warn!(error = %e, "response body is not valid JSON");
            ApiError::Decoding(e.to_string())
        })?;
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => serde_json::from_value(value).map_err(|e| {
                tracing::warn!(error = %e, "response body is not a valid envelope");
                ApiError::Decoding(e.to_string())
            }),
            other => {
                tracing::warn!(found = kind(&other), "response body is not a JSON object");
                Err(ApiError::Decoding(format!(
                    "expected an envelope object, found {}",
                    kind(&other)
                )))
            }
        }
    }

    /// Removes `data.<key>` and decodes it. Absent or `null` yields the
    /// default value, which is how an empty list read comes back.
    ///
    /// The value must have the same JSON kind as `T::default()` encodes to:
    /// an object for a resource, an array for a list.
    pub fn take_data<T>(&mut self, key: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        let value = match self.data.remove(key) {
            None | Some(Value::Null) => return Ok(T::default()),
            Some(value) => value,
        };
        let expected = serde_json::to_value(T::default())
            .map_err(|e| ApiError::Decoding(format!("data.{key}: {e}")))?;
        if kind(&expected) != kind(&value) {
            tracing::warn!(key, found = kind(&value), "envelope data has the wrong JSON kind");
            return Err(ApiError::Decoding(format!(
                "data.{key}: expected {}, found {}",
                kind(&expected),
                kind(&value)
            )));
        }
        serde_json::from_value(value).map_err(|e| {
            tracing::warn!(key, error = %e, "envelope data does not match the resource shape");
            ApiError::Decoding(format!("data.{key}: {e}"))
        })
    }
}

/// Serializes a request payload.
pub fn encode<T: Serialize>(payload: &T) -> Result<String, ApiError> {
    serde_json::to_string(payload).map_err(|e| ApiError::Encoding(e.to_string()))
}

/// Decodes `response` and classifies it against `expected`.
///
/// With `key` set the resource under `data.<key>` is returned on success;
/// with no key the data half is ignored and `T` is its default (use `()`).
pub fn classify<T>(response: &HttpResponse, expected: u16, key: Option<&str>) -> Result<T, ApiError>
where
    T: DeserializeOwned + Serialize + Default,
{
    let mut envelope = Envelope::decode(&response.body)?;
    let data = match key {
        Some(key) => envelope.take_data(key)?,
        None => T::default(),
    };

    if response.status != expected {
        tracing::debug!(
            status = response.status,
            expected,
            message = %envelope.message,
            "bank service rejected request"
        );
        return Err(ServiceError::new(response.status, envelope.errors).into());
    }
    Ok(data)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Like `null_as_default`, and a `null` message list is an empty list.
fn error_map<'de, D>(deserializer: D) -> Result<Errors, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<Vec<String>>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, messages)| (key, messages.unwrap_or_default()))
        .collect())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BankAccount, BankAccounts, Tags};

    const FORBIDDEN: &str = r#"{"message":"Forbidden: Unable to process request","data":{},"errors":{"permission":["Please ensure you have permission"]}}"#;

    #[test]
    fn error_response_is_decoded_before_classification() {
        let response = HttpResponse::new(403, FORBIDDEN);
        let err = classify::<BankAccounts>(&response, 200, Some("bank_accounts")).unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(
            err,
            ServiceError::single(403, "permission", "Please ensure you have permission").into()
        );
    }

    #[test]
    fn mismatched_status_discards_decoded_data() {
        let body = r#"{"message":"","data":{"bank_account":{"account_number":"1"}},"errors":{"user":["not found"]}}"#;
        let response = HttpResponse::new(404, body);
        let err = classify::<BankAccount>(&response, 201, Some("bank_account")).unwrap_err();
        assert_eq!(err, ServiceError::single(404, "user", "not found").into());
    }

    #[test]
    fn unexpected_success_code_is_still_an_error() {
        let body = r#"{"message":"created","data":{"tag":{}},"errors":{}}"#;
        let err = classify::<crate::types::Tag>(&HttpResponse::new(200, body), 201, Some("tag"))
            .unwrap_err();
        assert_eq!(err.status(), Some(200));
        assert!(err.errors().is_empty());
    }

    #[test]
    fn empty_list_is_ok_not_error() {
        let body = r#"{"message":"user tags found","data":{"tags":[]},"errors":{}}"#;
        let tags: Tags = classify(&HttpResponse::new(200, body), 200, Some("tags")).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn missing_or_null_key_yields_default() {
        let tags: Tags = classify(&HttpResponse::new(200, r#"{"data":{}}"#), 200, Some("tags")).unwrap();
        assert!(tags.is_empty());
        let tags: Tags =
            classify(&HttpResponse::new(200, r#"{"data":{"tags":null}}"#), 200, Some("tags")).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn null_sections_are_tolerated() {
        let envelope = Envelope::decode(r#"{"message":null,"data":null,"errors":null}"#).unwrap();
        assert!(envelope.message.is_empty());
        assert!(envelope.data.is_empty());
        assert!(envelope.errors.is_empty());
    }

    #[test]
    fn blank_body_with_expected_status_succeeds() {
        classify::<()>(&HttpResponse::new(200, ""), 200, None).unwrap();
        let err = classify::<()>(&HttpResponse::new(500, "  "), 200, None).unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn malformed_body_is_a_decoding_error() {
        let err = classify::<()>(&HttpResponse::new(502, "<html>bad gateway</html>"), 200, None)
            .unwrap_err();
        assert!(matches!(err, ApiError::Decoding(_)));
    }

    #[test]
    fn schema_mismatch_is_a_decoding_error() {
        let body = r#"{"data":{"bank_accounts":{"not":"a list"}},"errors":{}}"#;
        let err = classify::<BankAccounts>(&HttpResponse::new(200, body), 200, Some("bank_accounts"))
            .unwrap_err();
        match err {
            ApiError::Decoding(message) => assert!(message.starts_with("data.bank_accounts")),
            other => panic!("expected decoding error, got {other:?}"),
        }
    }

    #[test]
    fn non_object_body_is_a_decoding_error() {
        for body in ["[]", r#"["hi",{"tags":[]},{}]"#, "42", r#""tags""#] {
            let err = classify::<Tags>(&HttpResponse::new(200, body), 200, Some("tags")).unwrap_err();
            assert!(matches!(err, ApiError::Decoding(_)), "{body}: got {err:?}");
        }
    }

    #[test]
    fn null_body_is_an_empty_envelope() {
        let tags: Tags = classify(&HttpResponse::new(200, "null"), 200, Some("tags")).unwrap();
        assert!(tags.is_empty());
        let err = classify::<()>(&HttpResponse::new(404, " null "), 200, None).unwrap_err();
        assert_eq!(err, ServiceError::new(404, Errors::new()).into());
    }

    #[test]
    fn resource_given_as_array_is_a_decoding_error() {
        let body = r#"{"data":{"tag":["00000000-0000-0000-0000-000000000000"]},"errors":{}}"#;
        let err = classify::<crate::types::Tag>(&HttpResponse::new(201, body), 201, Some("tag"))
            .unwrap_err();
        match err {
            ApiError::Decoding(message) => {
                assert_eq!(message, "data.tag: expected an object, found an array")
            }
            other => panic!("expected decoding error, got {other:?}"),
        }
    }

    #[test]
    fn null_message_list_is_empty() {
        let body = r#"{"message":"","data":{},"errors":{"user":null,"permission":["denied"]}}"#;
        let err = classify::<()>(&HttpResponse::new(404, body), 200, None).unwrap_err();
        let mut errors = Errors::new();
        errors.insert("user".into(), vec![]);
        errors.insert("permission".into(), vec!["denied".into()]);
        assert_eq!(err, ServiceError::new(404, errors).into());
    }
}
