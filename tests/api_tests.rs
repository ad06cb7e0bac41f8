//! API integration tests
//!
//! These run against a live server and database:
//!   JWT_SECRET=... cargo run &
//!   JWT_SECRET=... cargo test -- --ignored

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";

fn secret() -> String {
    std::env::var("JWT_SECRET").expect("JWT_SECRET must match the running server")
}

/// Mint a token the way the external identity service would
fn make_token(email: &str, role: &str) -> String {
    let now = Utc::now().timestamp();
    encode(
        &Header::default(),
        &json!({
            "sub": email,
            "auth_id": null,
            "role": role,
            "exp": now + 3600,
            "iat": now,
        }),
        &EncodingKey::from_secret(secret().as_bytes()),
    )
    .expect("Failed to mint test token")
}

fn admin_token() -> String {
    make_token("librarian@library.com", "ADMIN")
}

fn user_token() -> String {
    make_token("user@library.com", "USER")
}

async fn create_book(client: &Client, title: &str, isbn: &str) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(admin_token())
        .json(&json!({
            "title": title,
            "author": "George Orwell",
            "publication_year": 1949,
            "isbn": isbn,
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse book")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");

    // Readiness round-trips a query through the store
    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_books_are_public_but_creation_requires_admin() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to list books");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(user_token())
        .json(&json!({
            "title": "Brave New World",
            "author": "Aldous Huxley",
            "isbn": "978-0060850524",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Brave New World",
            "author": "Aldous Huxley",
            "isbn": "978-0060850524",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle() {
    let client = Client::new();

    let book = create_book(&client, "1984", "978-0451524935").await;
    assert_eq!(book["status"], "available");
    let book_id = book["id"].as_i64().unwrap();

    // Self-service loan from a regular caller
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(user_token())
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to create loan");
    assert!(response.status().is_success());

    let loan: Value = response.json().await.unwrap();
    assert_eq!(loan["status"], "active");
    assert!(loan["return_date"].is_null());
    let loan_id = loan["id"].as_i64().unwrap();

    // The book flips out of "available" atomically with the loan
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["status"], "loaned");

    // Return is admin-only
    let response = client
        .put(format!("{}/loans/return/{}", BASE_URL, loan_id))
        .bearer_auth(user_token())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .put(format!("{}/loans/return/{}", BASE_URL, loan_id))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let returned: Value = response.json().await.unwrap();
    assert_eq!(returned["status"], "returned");
    assert!(!returned["return_date"].is_null());

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["status"], "available");

    // Returning twice fails with 400 and changes nothing
    let response = client
        .put(format!("{}/loans/return/{}", BASE_URL, loan_id))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_double_booking_yields_one_success() {
    let client = Client::new();

    let book = create_book(&client, "Animal Farm", "978-0452284241").await;
    let book_id = book["id"].as_i64().unwrap();

    let first = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(user_token())
        .json(&json!({ "book_id": book_id }))
        .send();
    let second = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(admin_token())
        .json(&json!({ "book_id": book_id }))
        .send();

    let (first, second) = tokio::join!(first, second);
    let statuses = [first.unwrap().status(), second.unwrap().status()];

    let successes = statuses.iter().filter(|s| s.is_success()).count();
    let conflicts = statuses
        .iter()
        .filter(|s| **s == StatusCode::BAD_REQUEST)
        .count();
    assert_eq!(successes, 1, "exactly one loan must win");
    assert_eq!(conflicts, 1, "the loser must see a conflict");
}

#[tokio::test]
#[ignore]
async fn test_deleting_active_loan_frees_the_book() {
    let client = Client::new();

    let book = create_book(&client, "Homage to Catalonia", "978-0156421171").await;
    let book_id = book["id"].as_i64().unwrap();

    let loan: Value = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(user_token())
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let loan_id = loan["id"].as_i64().unwrap();

    let response = client
        .delete(format!("{}/loans/{}", BASE_URL, loan_id))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // The loan is gone, the book is lendable again
    let response = client
        .get(format!("{}/loans/{}", BASE_URL, loan_id))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["status"], "available");
}

#[tokio::test]
#[ignore]
async fn test_soft_deleted_book_stays_resolvable() {
    let client = Client::new();

    let book = create_book(&client, "Down and Out in Paris and London", "978-0156262248").await;
    let book_id = book["id"].as_i64().unwrap();

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["status"], "inactive");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_user_email_conflicts() {
    let client = Client::new();

    let payload = json!({
        "full_name": "Duplicate Dan",
        "email": "dan@library.com",
    });

    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(admin_token())
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(admin_token())
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_my_loans_and_ownership_check() {
    let client = Client::new();

    let book = create_book(&client, "Coming Up for Air", "978-0156196253").await;
    let book_id = book["id"].as_i64().unwrap();

    let loan: Value = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(user_token())
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let loan_id = loan["id"].as_i64().unwrap();

    // Without a token, /loans/me is forbidden rather than challenged
    let response = client
        .get(format!("{}/loans/me", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let mine: Vec<Value> = client
        .get(format!("{}/loans/me", BASE_URL))
        .bearer_auth(user_token())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(mine.iter().any(|l| l["id"].as_i64() == Some(loan_id)));

    // Another regular user cannot read this loan; an admin can
    let response = client
        .get(format!("{}/loans/{}", BASE_URL, loan_id))
        .bearer_auth(make_token("stranger@library.com", "USER"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .get(format!("{}/loans/{}", BASE_URL, loan_id))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_dashboard_stats_consistency() {
    let client = Client::new();

    let response = client
        .get(format!("{}/stats/dashboard", BASE_URL))
        .bearer_auth(user_token())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let before: Value = response.json().await.unwrap();

    let book = create_book(&client, "Burmese Days", "978-0156148504").await;
    let book_id = book["id"].as_i64().unwrap();

    client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(user_token())
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .unwrap();

    let after: Value = client
        .get(format!("{}/stats/dashboard", BASE_URL))
        .bearer_auth(user_token())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(
        after["total_books"].as_i64().unwrap(),
        before["total_books"].as_i64().unwrap() + 1
    );
    // The new book was immediately loaned out: available count is unchanged
    assert_eq!(
        after["available_books"].as_i64().unwrap(),
        before["available_books"].as_i64().unwrap()
    );
    assert_eq!(
        after["active_loans"].as_i64().unwrap(),
        before["active_loans"].as_i64().unwrap() + 1
    );

    // Without a token, the dashboard is forbidden rather than challenged
    let response = client
        .get(format!("{}/stats/dashboard", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_auto_provisioning_on_first_request() {
    let client = Client::new();

    let email = format!("first-{}@library.com", Utc::now().timestamp_millis());
    let token = make_token(&email, "USER");

    // A read endpoint creates the local account as a side effect
    let response = client
        .get(format!("{}/loans/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let users: Vec<Value> = client
        .get(format!("{}/users", BASE_URL))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let provisioned = users
        .iter()
        .find(|u| u["email"] == email.as_str())
        .expect("user should be auto-provisioned");
    assert_eq!(provisioned["status"], "active");
    assert_eq!(
        provisioned["full_name"].as_str().unwrap(),
        email.split('@').next().unwrap()
    );
}
