//! Emulated storefront for integration tests
//!
//! Success paths answer with bare JSON; rejections answer with an HTML page
//! whose body holds the JSON, as the live service does.

#![allow(dead_code)]

use httpmock::prelude::*;
use httpmock::{Mock, MockServer};

use shopcheck_core::Config;
use shopcheck_core::fixture::UserAccount;

pub const METHOD_NOT_SUPPORTED: &str =
    r#"{"responseCode": 405, "message": "This request method is not supported."}"#;

pub fn html(json: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>API</title></head><body>{json}</body></html>"
    )
}

/// Same page, with quotes escaped the way an HTML serializer emits them.
pub fn html_escaped(json: &str) -> String {
    html(&json.replace('"', "&quot;"))
}

pub fn config_for(server: &MockServer) -> Config {
    Config {
        base_url: server.base_url(),
        max_response_time_ms: 5_000,
        ..Config::default()
    }
}

fn bare(then: httpmock::Then, body: &str) -> httpmock::Then {
    then.status(200)
        .header("content-type", "application/json")
        .body(body)
}

fn wrapped(then: httpmock::Then, page: String) -> httpmock::Then {
    then.status(200)
        .header("content-type", "text/html; charset=utf-8")
        .body(page)
}

/// Mount every endpoint the standard suite calls, answering as expected.
///
/// When more than one mock matches, the first mounted wins; the bodied
/// search mock is mounted before the parameterless one.
pub fn mount_storefront<'a>(server: &'a MockServer, account: &UserAccount) -> Vec<Mock<'a>> {
    let email = account.email.clone();
    let user = format!(
        r#"{{"responseCode": 200, "user": {{"id": 4242, "name": "{}", "email": "{}", "title": "Mrs",
            "birth_day": "10", "birth_month": "11", "birth_year": "2001", "first_name": "Alana",
            "last_name": "Alves", "company": "accltda", "address1": "rua dos bobos",
            "address2": "Casa Amarela", "country": "Brasil", "state": "Pernambuco",
            "city": "Recife", "zipcode": "53876590"}}}}"#,
        account.name, account.email
    );

    vec![
        server.mock(|when, then| {
            when.method(GET).path("/api/productsList");
            bare(
                then,
                r#"{"responseCode": 200, "products": [{"id": 1, "name": "Blue Top", "price": "Rs. 500", "brand": "Polo",
                    "category": {"usertype": {"usertype": "Women"}, "category": "Tops"}}]}"#,
            );
        }),
        server.mock(|when, then| {
            when.method(POST).path("/api/productsList");
            wrapped(then, html(METHOD_NOT_SUPPORTED));
        }),
        server.mock(|when, then| {
            when.method(GET).path("/api/brandsList");
            bare(
                then,
                r#"{"responseCode": 200, "brands": [{"id": 1, "brand": "Polo"}, {"id": 2, "brand": "H&M"}]}"#,
            );
        }),
        server.mock(|when, then| {
            when.method(PUT).path("/api/brandsList");
            wrapped(then, html_escaped(METHOD_NOT_SUPPORTED));
        }),
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/searchProduct")
                .body("search_product=top");
            bare(
                then,
                r#"{"responseCode": 200, "products": [{"id": 1, "name": "Blue Top"}, {"id": 5, "name": "Winter Top"}]}"#,
            );
        }),
        server.mock(|when, then| {
            when.method(POST).path("/api/searchProduct");
            wrapped(
                then,
                html(
                    r#"{"responseCode": 400, "message": "Bad request, search_product parameter is missing in POST request."}"#,
                ),
            );
        }),
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/verifyLogin")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("email=helen%40gmail.com&password=12345");
            bare(then, r#"{"responseCode": 200, "message": "User exists!"}"#);
        }),
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/verifyLogin")
                .body("password=1234");
            wrapped(
                then,
                html(
                    r#"{"responseCode": 400, "message": "Bad request, email or password parameter is missing in POST request."}"#,
                ),
            );
        }),
        server.mock(|when, then| {
            when.method(DELETE).path("/api/verifyLogin");
            wrapped(then, html(METHOD_NOT_SUPPORTED));
        }),
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/verifyLogin")
                .body("email=helen%40gmail.com&password=11111");
            bare(then, r#"{"responseCode": 404, "message": "User not found!"}"#);
        }),
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/createAccount")
                .body_contains("firstname=Alana")
                .body_contains("lastname=Alves");
            bare(then, r#"{"responseCode": 201, "message": "User created!"}"#);
        }),
        server.mock(|when, then| {
            when.method(DELETE)
                .path("/api/deleteAccount")
                .query_param("email", "aline@email.com")
                .query_param("password", "aline123");
            bare(then, r#"{"responseCode": 200, "message": "Account deleted!"}"#);
        }),
        server.mock(|when, then| {
            when.method(PUT)
                .path("/api/updateAccount")
                .body_contains("lastname=Vasconcelos");
            bare(then, r#"{"responseCode": 200, "message": "User updated!"}"#);
        }),
        server.mock(move |when, then| {
            when.method(GET)
                .path("/api/getUserDetailByEmail")
                .query_param("email", email.as_str());
            bare(then, &user);
        }),
    ]
}
