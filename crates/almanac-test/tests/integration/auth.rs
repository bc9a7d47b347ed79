//! Account endpoints and request authentication.

use salvo::http::StatusCode;

use super::helpers::*;

const REGISTER: &str = "/api/auth/register";
const LOGIN: &str = "/api/auth/login";
const LOGOUT: &str = "/api/auth/logout";
const WHOAMI: &str = "/api/app/whoami";

#[test_log::test(tokio::test)]
async fn healthcheck_needs_no_credentials() {
    let test_db = TestDb::new().await.expect("Failed to acquire test database");
    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::get("/api/app/healthcheck")
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(response.json(), json!({ "status": "ok" }));
}

#[test_log::test(tokio::test)]
async fn register_issues_a_working_token() {
    let test_db = TestDb::new().await.expect("Failed to acquire test database");
    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::post(REGISTER)
        .json(&json!({
            "name": "Ada",
            "email": "Ada@Example.com",
            "password": "correct horse",
            "password_confirmation": "correct horse",
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED);

    let body = response.json();
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"].get("password_hash").is_none());
    let token = body["token"].as_str().expect("token in response").to_string();

    let whoami = TestRequest::get(WHOAMI)
        .bearer(&token)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(whoami.json()["name"], "Ada");
}

#[test_log::test(tokio::test)]
async fn register_rejects_taken_email_and_mismatched_confirmation() {
    let test_db = TestDb::new().await.expect("Failed to acquire test database");
    test_db
        .seed_user("Existing", "taken@example.com")
        .await
        .expect("Failed to seed user");
    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::post(REGISTER)
        .json(&json!({
            "name": "Someone",
            "email": "TAKEN@example.com",
            "password": "long enough",
            "password_confirmation": "different",
        }))
        .send(&service)
        .await
        .assert_validation_error("email", "The email has already been taken.")
        .assert_validation_error("password", "The password field confirmation does not match.");

    assert_eq!(response.json()["message"], "Validation error.");
}

#[test_log::test(tokio::test)]
async fn login_checks_the_password() {
    let test_db = TestDb::new().await.expect("Failed to acquire test database");
    test_db
        .seed_user_with_password("Grace", "grace@example.com", "hopper1906")
        .await
        .expect("Failed to seed user");
    let service = create_db_test_service(&test_db.url()).await;

    #[expect(unused_must_use)]
    TestRequest::post(LOGIN)
        .json(&json!({ "email": "grace@example.com", "password": "wrong password" }))
        .send(&service)
        .await
        .assert_validation_error("email", "The provided credentials are incorrect.");

    let response = TestRequest::post(LOGIN)
        .json(&json!({ "email": "GRACE@example.com", "password": "hopper1906" }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.json()["user"]["name"], "Grace");
}

#[test_log::test(tokio::test)]
async fn logout_revokes_only_the_current_token() {
    let test_db = TestDb::new().await.expect("Failed to acquire test database");
    let (user, first) = test_db
        .seed_authenticated_user("owner@example.com")
        .await
        .expect("Failed to seed user");
    let second = test_db.seed_token(user.id).await.expect("Failed to seed token");
    let service = create_db_test_service(&test_db.url()).await;

    #[expect(unused_must_use)]
    TestRequest::post(LOGOUT)
        .bearer(&first)
        .send(&service)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = TestRequest::get(WHOAMI)
        .bearer(&first)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json(), json!({ "message": "Unauthenticated." }));

    #[expect(unused_must_use)]
    TestRequest::get(WHOAMI)
        .bearer(&second)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn resource_routes_require_a_token() {
    let test_db = TestDb::new().await.expect("Failed to acquire test database");
    let service = create_db_test_service(&test_db.url()).await;

    #[expect(unused_must_use)]
    TestRequest::get("/api/v1/calendars")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    #[expect(unused_must_use)]
    TestRequest::get("/api/v1/calendars")
        .bearer("not-a-real-token")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn single_user_mode_creates_the_configured_user() {
    let test_db = TestDb::new().await.expect("Failed to acquire test database");
    let service = create_single_user_test_service(&test_db.url()).await;

    let first = TestRequest::get(WHOAMI)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(first["email"], "owner@example.com");

    let second = TestRequest::get(WHOAMI)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(first["id"], second["id"]);
}
