//! Endpoint behavior against a mock server: envelopes, auth, error mapping.

#![allow(clippy::unwrap_used)] // Tests may unwrap on failure

use resource_slice_http::{HttpError, JsonEndpoint, StaticToken};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize)]
struct CustomerQuery {
    region: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Customer {
    id: u32,
    name: String,
}

#[tokio::test]
async fn get_decodes_a_data_enveloped_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customers"))
        .and(query_param("region", "north"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1, "name": "Acme"}, {"id": 2, "name": "Globex"}]
        })))
        .mount(&server)
        .await;

    let endpoint = JsonEndpoint::get(format!("{}/customers", server.uri()));
    let customers: Vec<Customer> = endpoint
        .send(&CustomerQuery {
            region: "north".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0].name, "Acme");
}

#[tokio::test]
async fn list_responses_may_use_an_items_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 3, "name": "Initech"}]
        })))
        .mount(&server)
        .await;

    let endpoint = JsonEndpoint::get(format!("{}/customers", server.uri()));
    let customers: Vec<Customer> = endpoint.send(&json!({})).await.unwrap();

    assert_eq!(
        customers,
        vec![Customer {
            id: 3,
            name: "Initech".to_string()
        }]
    );
}

#[tokio::test]
async fn post_sends_a_json_body_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(header("authorization", "Bearer session-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 9, "name": "order"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = JsonEndpoint::post(format!("{}/orders", server.uri()))
        .with_credentials(StaticToken::new("session-token"));
    let created: Customer = endpoint.send(&json!({"sku": "A-100"})).await.unwrap();

    assert_eq!(created.id, 9);
}

#[tokio::test]
async fn unauthorized_maps_to_its_own_variant() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let endpoint = JsonEndpoint::get(format!("{}/customers", server.uri()));
    let result: Result<Vec<Customer>, HttpError> = endpoint.send(&json!({})).await;

    assert_eq!(result.unwrap_err(), HttpError::Unauthorized);
}

#[tokio::test]
async fn server_errors_carry_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let endpoint = JsonEndpoint::get(format!("{}/customers", server.uri()));
    let result: Result<Vec<Customer>, HttpError> = endpoint.send(&json!({})).await;

    let error = result.unwrap_err();
    assert_eq!(
        error,
        HttpError::Api {
            status: 500,
            message: "database unavailable".to_string()
        }
    );
    assert!(error.is_transient());
}

#[tokio::test]
async fn payload_type_mismatch_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"unexpected": true}})),
        )
        .mount(&server)
        .await;

    let endpoint = JsonEndpoint::get(format!("{}/customers", server.uri()));
    let result: Result<Vec<Customer>, HttpError> = endpoint.send(&json!({})).await;

    assert!(matches!(result.unwrap_err(), HttpError::Decode(_)));
}

#[tokio::test]
async fn an_endpoint_operation_drives_a_request_per_invocation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1, "name": "Acme"}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let endpoint = JsonEndpoint::get(format!("{}/customers", server.uri()));
    let operation = endpoint.into_operation::<CustomerQuery, Vec<Customer>>();

    for _ in 0..2 {
        let customers = operation(CustomerQuery {
            region: "north".to_string(),
        })
        .await
        .unwrap();
        assert_eq!(customers[0].id, 1);
    }
}
