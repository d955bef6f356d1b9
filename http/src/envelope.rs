//! Response-envelope adapter.
//!
//! The services these operations talk to do not agree on a response shape:
//! some wrap the payload as `{"data": …}`, list endpoints use
//! `{"items": …}`, and a few return the payload bare. This module is the
//! single place that difference is absorbed, so endpoint code and response
//! types stay envelope-agnostic.

use crate::error::HttpError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Strip a known envelope from a decoded response body.
///
/// Extraction order: a `data` key wins over an `items` key; an object with
/// neither, or any non-object body, is already the payload.
#[must_use]
pub fn extract_payload(body: Value) -> Value {
    match body {
        Value::Object(mut fields) => {
            if let Some(payload) = fields.remove("data") {
                payload
            } else if let Some(payload) = fields.remove("items") {
                payload
            } else {
                Value::Object(fields)
            }
        },
        other => other,
    }
}

/// Decode a response body into `T`, unwrapping any envelope first.
///
/// # Errors
///
/// Returns [`HttpError::Decode`] if the payload does not match `T`.
pub fn decode_envelope<T: DeserializeOwned>(body: Value) -> Result<T, HttpError> {
    serde_json::from_value(extract_payload(body))
        .map_err(|e| HttpError::Decode(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests may unwrap on failure
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_a_data_envelope() {
        let body = json!({"data": {"id": 7, "name": "Acme"}});
        assert_eq!(extract_payload(body), json!({"id": 7, "name": "Acme"}));
    }

    #[test]
    fn unwraps_an_items_envelope() {
        let body = json!({"items": [1, 2, 3]});
        assert_eq!(extract_payload(body), json!([1, 2, 3]));
    }

    #[test]
    fn data_wins_when_both_keys_are_present() {
        let body = json!({"data": "payload", "items": "ignored"});
        assert_eq!(extract_payload(body), json!("payload"));
    }

    #[test]
    fn bare_payloads_pass_through() {
        assert_eq!(
            extract_payload(json!({"id": 7})),
            json!({"id": 7})
        );
        assert_eq!(extract_payload(json!([1, 2])), json!([1, 2]));
        assert_eq!(extract_payload(json!("plain")), json!("plain"));
    }

    #[test]
    fn decodes_through_the_envelope() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Customer {
            id: u32,
            name: String,
        }

        let body = json!({"data": {"id": 7, "name": "Acme"}});
        let customer: Customer = decode_envelope(body).unwrap();
        assert_eq!(
            customer,
            Customer {
                id: 7,
                name: "Acme".to_string()
            }
        );
    }

    #[test]
    fn decode_mismatch_reports_the_serde_error() {
        let body = json!({"data": {"id": "not-a-number"}});
        let result: Result<Vec<u32>, HttpError> = decode_envelope(body);
        assert!(matches!(result, Err(HttpError::Decode(_))));
    }
}
