//! HTTP API tests for the account endpoints.

mod common;

use common::TestApp;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn get_account() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/accounts/1"))
        .header("accept", "application/json")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["accountNumber"], 1);
    assert_eq!(body["balance"], 100);
}

#[tokio::test]
async fn get_unknown_account_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/accounts/-1"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert!(body["error"].as_str().unwrap().contains("Unknown account"));
}

#[tokio::test]
async fn list_accounts() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/accounts"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!([1, 2]));
}

#[tokio::test]
async fn deposit_returns_no_content() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/accounts/1/deposit"))
        .json(&json!({ "amount": 50 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.balance(1).await, 150);
}

#[tokio::test]
async fn negative_deposit_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/accounts/1/deposit"))
        .json(&json!({ "amount": -50 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.balance(1).await, 100);
}

#[tokio::test]
async fn deposit_to_unknown_account_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/accounts/42/deposit"))
        .json(&json!({ "amount": 10 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deposit_that_overflows_balance_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/accounts/1/deposit"))
        .json(&json!({ "amount": i64::MAX }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.balance(1).await, 100);
}

#[tokio::test]
async fn withdraw_returns_updated_account() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/accounts/1/withdraw"))
        .header("accept", "application/json")
        .json(&json!({ "amount": 50 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["accountNumber"], 1);
    assert_eq!(body["balance"], 50);
}

#[tokio::test]
async fn negative_withdraw_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/accounts/1/withdraw"))
        .json(&json!({ "amount": -50 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.balance(1).await, 100);
}

#[tokio::test]
async fn overdraw_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/accounts/1/withdraw"))
        .json(&json!({ "amount": 200 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.balance(1).await, 100);
}

#[tokio::test]
async fn withdraw_from_unknown_account_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/accounts/42/withdraw"))
        .json(&json!({ "amount": 10 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn transfer_moves_funds() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/transfers"))
        .json(&json!({ "fromAccountNumber": 1, "toAccountNumber": 2, "amount": 10 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.balance(1).await, 90);
    assert_eq!(app.balance(2).await, 210);
}

#[tokio::test]
async fn transfer_to_unknown_account_is_not_found_and_atomic() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/transfers"))
        .json(&json!({ "fromAccountNumber": 1, "toAccountNumber": 99, "amount": 10 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.balance(1).await, 100);
}

#[tokio::test]
async fn overdrawing_transfer_is_bad_request_and_atomic() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/transfers"))
        .json(&json!({ "fromAccountNumber": 1, "toAccountNumber": 2, "amount": 200 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.balance(1).await, 100);
    assert_eq!(app.balance(2).await, 200);
}

#[tokio::test]
async fn transfer_whose_credit_overflows_is_bad_request_and_atomic() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/accounts/2/deposit"))
        .json(&json!({ "amount": i64::MAX - 200 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .client
        .post(app.url("/transfers"))
        .json(&json!({ "fromAccountNumber": 1, "toAccountNumber": 2, "amount": 10 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.balance(1).await, 100);
    assert_eq!(app.balance(2).await, i64::MAX);
}

#[tokio::test]
async fn transfer_to_same_account_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/transfers"))
        .json(&json!({ "fromAccountNumber": 1, "toAccountNumber": 1, "amount": 10 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.balance(1).await, 100);
}

#[tokio::test]
async fn transfer_with_non_positive_amount_is_bad_request() {
    let app = TestApp::spawn().await;

    for amount in [0, -10] {
        let response = app
            .client
            .post(app.url("/transfers"))
            .json(&json!({ "fromAccountNumber": 1, "toAccountNumber": 2, "amount": amount }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(app.balance(1).await, 100);
    assert_eq!(app.balance(2).await, 200);
}

#[tokio::test]
async fn delete_account_returns_no_content() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .delete(app.url("/accounts/1"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .client
        .get(app.url("/accounts/1"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_account_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .delete(app.url("/accounts/-1"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/accounts"))
        .header("x-request-id", "test-request-1")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.headers()["x-request-id"], "test-request-1");
}
