mod common;

use httpmock::prelude::*;

use shopcheck_core::params::RequestParams;
use shopcheck_core::scenario::Method;
use shopcheck_runner::{ApiClient, ClientError};

use common::config_for;

#[test]
fn get_sends_accept_header_and_no_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/productsList")
            .header("accept", "application/json");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"responseCode": 200, "products": []}"#);
    });

    let client = ApiClient::new(&config_for(&server)).unwrap();
    let resp = client
        .send(Method::Get, "/productsList", &RequestParams::new())
        .unwrap();

    mock.assert();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type.as_deref(), Some("application/json"));
    assert!(resp.body.contains("products"));
}

#[test]
fn post_sends_form_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/verifyLogin")
            .header("content-type", "application/x-www-form-urlencoded")
            .body("email=helen%40gmail.com&password=12345");
        then.status(200).body(r#"{"responseCode": 200, "message": "User exists!"}"#);
    });

    let params = RequestParams::new()
        .with("email", "helen@gmail.com")
        .with("password", "12345");
    let client = ApiClient::new(&config_for(&server)).unwrap();
    let resp = client.send(Method::Post, "/verifyLogin", &params).unwrap();

    mock.assert();
    assert!(resp.body.contains("User exists!"));
}

#[test]
fn put_sends_form_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/api/updateAccount")
            .body("lastname=Vasconcelos");
        then.status(200).body("{}");
    });

    let params = RequestParams::new().with("lastname", "Vasconcelos");
    let client = ApiClient::new(&config_for(&server)).unwrap();
    client.send(Method::Put, "/updateAccount", &params).unwrap();

    mock.assert();
}

#[test]
fn delete_sends_query_string() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/api/deleteAccount")
            .query_param("email", "aline@email.com")
            .query_param("password", "aline123");
        then.status(200).body("{}");
    });

    let params = RequestParams::new()
        .with("email", "aline@email.com")
        .with("password", "aline123");
    let client = ApiClient::new(&config_for(&server)).unwrap();
    client.send(Method::Delete, "/deleteAccount", &params).unwrap();

    mock.assert();
}

#[test]
fn non_success_status_is_still_a_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/brandsList");
        then.status(503).body("Service Unavailable");
    });

    let client = ApiClient::new(&config_for(&server)).unwrap();
    let resp = client
        .send(Method::Get, "/brandsList", &RequestParams::new())
        .unwrap();
    assert_eq!(resp.status, 503);
    assert_eq!(resp.body, "Service Unavailable");
}

#[test]
fn refused_connection_is_transport_error() {
    let config = shopcheck_core::Config {
        base_url: "http://127.0.0.1:1".into(),
        ..shopcheck_core::Config::default()
    };
    let client = ApiClient::new(&config).unwrap();
    let err = client
        .send(Method::Get, "/productsList", &RequestParams::new())
        .unwrap_err();
    match err {
        ClientError::Transport { url, .. } => {
            assert_eq!(url, "http://127.0.0.1:1/api/productsList");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}
