use reqwest::StatusCode;
use serde_json::Value;

use crate::common::{FAKE_IDP, TestServer, cookie_pairs, location, set_cookie};

#[tokio::test]
async fn test_login_redirects_to_identity_provider() {
    let server = TestServer::start().await;

    let response = server.get("/auth/fake/login").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = location(&response);
    assert!(location.starts_with(FAKE_IDP));
    let expected_callback = urlencode(&server.url("/auth/fake/login/callback"));
    assert!(
        location.contains(&format!("redirect_uri={expected_callback}")),
        "unexpected location {location}"
    );

    server.shutdown();
}

#[tokio::test]
async fn test_callback_success_sets_cookies_and_redirects() {
    let server = TestServer::start().await;

    let response = server.get("/auth/fake/login/callback?code=alice").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        server.url("/account?state=success&provider_name=fake")
    );

    let headers = response.headers();
    let access_token = set_cookie(headers, "access_token").unwrap();
    assert!(access_token.contains("Path=/"));
    assert!(access_token.contains("Max-Age=1209600"));
    assert!(!access_token.contains("HttpOnly"));
    assert!(set_cookie(headers, "userId").is_some());
    assert!(set_cookie(headers, "SessionId").is_some());

    server.shutdown();
}

#[tokio::test]
async fn test_callback_without_user_redirects_to_failure() {
    let server = TestServer::start().await;

    let response = server.get("/auth/fake/login/callback?code=deny").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        server.url(
            "/account/login?state=failure&provider_name=fake&error_code=401&error_message=authentication+failed"
        )
    );
    assert!(set_cookie(response.headers(), "access_token").is_none());

    server.shutdown();
}

#[tokio::test]
async fn test_json_provider_returns_token_in_body() {
    let server = TestServer::start().await;

    let response = server.get("/auth/fake-api/login/callback?code=bob").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("set-cookie").is_none());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["state"], "success");
    assert_eq!(body["provider_name"], "fake-api");
    assert!(body["userId"].is_string());
    assert!(body["access_token"].is_string());

    server.shutdown();
}

#[tokio::test]
async fn test_json_provider_failure_body() {
    let server = TestServer::start().await;

    let response = server.get("/auth/fake-api/login/callback?code=deny").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["state"], "failure");
    assert_eq!(body["error_code"], 401);
    assert_eq!(body["error_message"], "authentication failed");

    server.shutdown();
}

#[tokio::test]
async fn test_post_route_parses_form_body() {
    let server = TestServer::start().await;

    // GET is not installed for a POST provider
    let response = server.get("/auth/ldap/login").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = server
        .client
        .post(server.url("/auth/ldap/login"))
        .form(&[("code", "dave")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["provider_name"], "ldap");
    assert!(body["access_token"].is_string());

    server.shutdown();
}

#[tokio::test]
async fn test_return_to_is_used_once() {
    let server = TestServer::start().await;

    // Given an anonymous visit to a guarded page
    let response = server.get("/protected?tab=2").await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/account/login");
    let session = cookie_pairs(response.headers()).join("; ");
    assert!(session.starts_with("SessionId="));

    // When the login callback completes in that session
    let response = server
        .get_with_cookies("/auth/fake/login/callback?code=carol", &session)
        .await;

    // Then the browser is sent back to the remembered page
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        "/protected?tab=2&state=success&provider_name=fake"
    );
    let logged_in = cookie_pairs(response.headers())
        .into_iter()
        .filter(|pair| pair.starts_with("SessionId="))
        .collect::<Vec<_>>()
        .join("; ");

    let page = server.get_with_cookies("/protected", &logged_in).await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().starts_with("hello "));

    // And a second login in the same session falls back to the success URL
    let response = server
        .get_with_cookies("/auth/fake/login/callback?code=carol", &logged_in)
        .await;
    assert_eq!(
        location(&response),
        server.url("/account?state=success&provider_name=fake")
    );

    server.shutdown();
}

fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
