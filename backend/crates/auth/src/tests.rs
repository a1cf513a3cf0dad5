//! End-to-end tests for the auth router
//! Requests go through the full router (gate, extractors, handlers) backed
//! by the in-memory credential store.

#[cfg(test)]
mod support {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{HeaderMap, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use platform::password::HashingParams;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::application::config::AuthConfig;
    use crate::infra::memory::InMemoryAuthRepository;
    use crate::presentation::router::auth_router_generic;

    pub const SECRET: &str = "test-signing-secret";

    pub fn config() -> AuthConfig {
        AuthConfig {
            hashing: HashingParams {
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            },
            ..AuthConfig::with_secret(SECRET)
        }
    }

    pub fn app(repo: InMemoryAuthRepository) -> Router {
        app_with(repo, config())
    }

    pub fn app_with(repo: InMemoryAuthRepository, config: AuthConfig) -> Router {
        auth_router_generic(repo, config).unwrap()
    }

    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: Vec<u8>,
    }

    impl TestResponse {
        pub fn json(&self) -> Value {
            serde_json::from_slice(&self.body).unwrap()
        }
    }

    pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    pub async fn post_auth(app: &Router, username: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({ "username": username, "password": password });
        send(app, request("POST", "/auth", None, Some(body))).await
    }

    pub async fn login(app: &Router, username: &str, password: &str) -> String {
        let response = post_auth(app, username, password).await;
        assert_eq!(response.status, StatusCode::OK, "login as {username}");
        response.json()["token"].as_str().unwrap().to_string()
    }

    pub fn error_fields(response: &TestResponse) -> Vec<String> {
        response.json()["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap().to_string())
            .collect()
    }
}

#[cfg(test)]
mod authenticate_tests {
    use super::support::*;
    use crate::application::token::TokenIssuer;
    use crate::infra::memory::InMemoryAuthRepository;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app(InMemoryAuthRepository::new());
        let response = send(&app, request("GET", "/health", None, None)).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_allow_listed_user_registers_on_first_login() {
        let repo = InMemoryAuthRepository::with_allowed(["alice"]);
        let app = app(repo.clone());

        let token = login(&app, "alice", "pw12").await;
        assert_eq!(repo.user_count().await, 1);

        let claims = TokenIssuer::new(&config()).unwrap().validate(&token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[tokio::test]
    async fn test_returning_user_keeps_identity() {
        let repo = InMemoryAuthRepository::with_allowed(["alice"]);
        let app = app(repo.clone());
        let issuer = TokenIssuer::new(&config()).unwrap();

        let first = issuer.validate(&login(&app, "alice", "pw12").await).unwrap();
        let second = issuer.validate(&login(&app, "alice", "pw12").await).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let app = app(InMemoryAuthRepository::with_allowed(["alice"]));
        login(&app, "alice", "pw12").await;

        let response = post_auth(&app, "alice", "pw13").await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert!(response.json().get("token").is_none());
    }

    #[tokio::test]
    async fn test_unknown_user_not_on_allow_list_is_forbidden() {
        let repo = InMemoryAuthRepository::with_allowed(["alice"]);
        let app = app(repo.clone());

        let response = post_auth(&app, "mallory", "pw12").await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(repo.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_user_names_are_case_sensitive() {
        let app = app(InMemoryAuthRepository::with_allowed(["alice"]));
        login(&app, "alice", "pw12").await;

        let response = post_auth(&app, "Alice", "pw12").await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_whitespace_is_trimmed() {
        let app = app(InMemoryAuthRepository::with_allowed(["alice"]));
        login(&app, " alice ", " pw12 ").await;
        login(&app, "alice", "pw12").await;
    }

    #[tokio::test]
    async fn test_missing_fields_report_every_field() {
        let app = app(InMemoryAuthRepository::new());
        let response = send(
            &app,
            request("POST", "/auth", None, Some(serde_json::json!({}))),
        )
        .await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_fields(&response), ["username", "password"]);
        assert_eq!(response.json()["errors"][0]["location"], "body");
    }

    #[tokio::test]
    async fn test_short_user_name_is_unprocessable() {
        let repo = InMemoryAuthRepository::with_allowed(["al"]);
        let app = app(repo.clone());
        let response = post_auth(&app, "al", "pw12").await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_fields(&response), ["username"]);
        assert_eq!(repo.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_long_password_registers_and_logs_in() {
        let repo = InMemoryAuthRepository::with_allowed(["alice"]);
        let app = app(repo.clone());
        let password = "a".repeat(129);

        login(&app, "alice", &password).await;
        login(&app, "alice", &password).await;
        assert_eq!(repo.user_count().await, 1);

        let response = post_auth(&app, "alice", &"a".repeat(128)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_password_is_not_echoed() {
        let app = app(InMemoryAuthRepository::new());
        let response = post_auth(&app, "alice", "pw!").await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_fields(&response), ["password"]);
        assert!(!String::from_utf8_lossy(&response.body).contains("pw!"));
    }

    #[tokio::test]
    async fn test_form_body_login() {
        let app = app(InMemoryAuthRepository::with_allowed(["alice"]));
        let req = Request::builder()
            .method("POST")
            .uri("/auth")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=alice&password=pw12"))
            .unwrap();

        let response = send(&app, req).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.json()["token"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = app(InMemoryAuthRepository::new());
        let req = Request::builder()
            .method("POST")
            .uri("/auth")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"username\": "))
            .unwrap();

        let response = send(&app, req).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_store_failure_hides_detail() {
        let repo = InMemoryAuthRepository::with_allowed(["alice"]);
        let app = app(repo.clone());
        repo.set_unavailable(true);

        let response = post_auth(&app, "alice", "pw12").await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.json()["detail"], "Internal Server Error");
        assert!(!String::from_utf8_lossy(&response.body).contains("in-memory"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_first_logins_create_one_record() {
        let repo = InMemoryAuthRepository::with_allowed(["alice"]);
        let app = app(repo.clone());

        let (a, b) = tokio::join!(
            post_auth(&app, "alice", "pw12"),
            post_auth(&app, "alice", "pw12")
        );

        assert_eq!(a.status, StatusCode::OK);
        assert_eq!(b.status, StatusCode::OK);
        assert_eq!(repo.user_count().await, 1);
    }
}

#[cfg(test)]
mod gate_tests {
    use super::support::*;
    use crate::application::token::TokenIssuer;
    use crate::domain::value_object::user_name::UserName;
    use crate::infra::memory::InMemoryAuthRepository;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{Duration, Utc};
    use kernel::id::UserId;

    #[tokio::test]
    async fn test_validate_requires_token() {
        let app = app(InMemoryAuthRepository::new());
        let response = send(&app, request("GET", "/auth/validate", None, None)).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[tokio::test]
    async fn test_validate_accepts_issued_token() {
        let app = app(InMemoryAuthRepository::with_allowed(["alice"]));
        let token = login(&app, "alice", "pw12").await;

        let response = send(&app, request("GET", "/auth/validate", Some(&token), None)).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_validate_rejects_garbage_and_foreign_tokens() {
        let app = app(InMemoryAuthRepository::new());
        let response = send(&app, request("GET", "/auth/validate", Some("abc.def.ghi"), None)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);

        let foreign = TokenIssuer::new(&crate::AuthConfig::with_secret("other"))
            .unwrap()
            .issue(&UserId::new(), &UserName::new("alice").unwrap())
            .unwrap();
        let response = send(&app, request("GET", "/auth/validate", Some(&foreign), None)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let app = app(InMemoryAuthRepository::new());
        let expired = TokenIssuer::new(&config())
            .unwrap()
            .issue_at(
                &UserId::new(),
                &UserName::new("alice").unwrap(),
                Utc::now() - Duration::hours(13),
            )
            .unwrap();

        let response = send(&app, request("GET", "/auth/validate", Some(&expired), None)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_path_is_gated() {
        let app = app(InMemoryAuthRepository::with_allowed(["alice"]));

        let response = send(&app, request("GET", "/nowhere", None, None)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);

        let token = login(&app, "alice", "pw12").await;
        let response = send(&app, request("GET", "/nowhere", Some(&token), None)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_options_bypasses_gate() {
        let app = app(InMemoryAuthRepository::new());
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/auth/changepassword")
            .body(Body::empty())
            .unwrap();

        let response = send(&app, req).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.is_empty());
    }
}

#[cfg(test)]
mod change_password_tests {
    use super::support::*;
    use crate::application::config::AuthConfig;
    use crate::application::token::TokenIssuer;
    use crate::infra::memory::InMemoryAuthRepository;
    use axum::http::StatusCode;
    use serde_json::json;

    fn change(username: &str, new_password: &str) -> Option<serde_json::Value> {
        Some(json!({ "username": username, "newPassword": new_password }))
    }

    #[tokio::test]
    async fn test_change_own_password() {
        let app = app(InMemoryAuthRepository::with_allowed(["alice"]));
        let token = login(&app, "alice", "pw12").await;
        let issuer = TokenIssuer::new(&config()).unwrap();
        let before = issuer.validate(&token).unwrap();

        let response = send(
            &app,
            request("PUT", "/auth/changepassword", Some(&token), change("alice", "pw34")),
        )
        .await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);

        assert_eq!(post_auth(&app, "alice", "pw12").await.status, StatusCode::UNAUTHORIZED);
        let after = issuer.validate(&login(&app, "alice", "pw34").await).unwrap();
        assert_eq!(before.id, after.id);
    }

    #[tokio::test]
    async fn test_repeated_change_leaves_only_new_password() {
        let repo = InMemoryAuthRepository::with_allowed(["alice"]);
        let app = app(repo.clone());
        let token = login(&app, "alice", "pw12").await;

        for _ in 0..2 {
            let response = send(
                &app,
                request("PUT", "/auth/changepassword", Some(&token), change("alice", "pw56")),
            )
            .await;
            assert_eq!(response.status, StatusCode::NO_CONTENT);
        }

        assert_eq!(post_auth(&app, "alice", "pw12").await.status, StatusCode::UNAUTHORIZED);
        login(&app, "alice", "pw56").await;
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_change_requires_token() {
        let app = app(InMemoryAuthRepository::new());
        let response = send(
            &app,
            request("PUT", "/auth/changepassword", None, change("alice", "pw34")),
        )
        .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_change_for_other_account_is_forbidden() {
        let repo = InMemoryAuthRepository::with_allowed(["alice", "bob"]);
        let app = app(repo.clone());
        login(&app, "bob", "bobpw").await;
        let token = login(&app, "alice", "pw12").await;

        let response = send(
            &app,
            request("PUT", "/auth/changepassword", Some(&token), change("bob", "stolen")),
        )
        .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        login(&app, "bob", "bobpw").await;
    }

    #[tokio::test]
    async fn test_unbound_change_upserts_any_account() {
        let repo = InMemoryAuthRepository::with_allowed(["alice"]);
        let config = AuthConfig {
            bind_password_change_to_subject: false,
            ..config()
        };
        let app = app_with(repo.clone(), config);
        let token = login(&app, "alice", "pw12").await;

        let response = send(
            &app,
            request("PUT", "/auth/changepassword", Some(&token), change("carol", "carolpw")),
        )
        .await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(repo.user_count().await, 2);

        // carol is not allow-listed but now has a record
        login(&app, "carol", "carolpw").await;
    }

    #[tokio::test]
    async fn test_change_validation_uses_new_password_field() {
        let app = app(InMemoryAuthRepository::with_allowed(["alice"]));
        let token = login(&app, "alice", "pw12").await;

        let response = send(
            &app,
            request("PUT", "/auth/changepassword", Some(&token), change("alice", "pw")),
        )
        .await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_fields(&response), ["newPassword"]);
    }
}
