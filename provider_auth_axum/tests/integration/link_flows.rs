use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use crate::common::{FAKE_IDP, TestServer, cookie_pairs, location, set_cookie};

const LINK_COOKIE: &str = "linkWithProvider_fake-link";

/// Log in through the JSON provider and return the issued access token.
async fn login_token(server: &TestServer, code: &str) -> String {
    let response = server
        .get(&format!("/auth/fake-api/login/callback?code={code}"))
        .await;
    let body: Value = response.json().await.unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

/// Start a link as the owner of `token` and return the link cookie to send back.
async fn start_link(server: &TestServer, token: &str) -> String {
    let response = server
        .client
        .get(server.url("/auth/fake-link/link"))
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    cookie_pairs(response.headers())
        .into_iter()
        .find(|pair| pair.starts_with(&format!("{LINK_COOKIE}=")))
        .unwrap()
}

#[tokio::test]
async fn test_link_without_token_is_rejected() {
    let server = TestServer::start().await;

    let response = server.get("/auth/fake-link/link").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    if let Some(cookie) = set_cookie(response.headers(), LINK_COOKIE) {
        assert!(cookie.contains("Max-Age=0"), "link cookie was set: {cookie}");
    }
    assert_eq!(
        response.text().await.unwrap(),
        "No accessToken found in request object"
    );

    server.shutdown();
}

#[tokio::test]
async fn test_link_sets_short_lived_cookie() {
    let server = TestServer::start().await;
    let token = login_token(&server, "frank").await;

    let response = server
        .client
        .get(server.url("/auth/fake-link/link"))
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with(FAKE_IDP));
    let cookie = set_cookie(response.headers(), LINK_COOKIE).unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=300"));
    assert!(cookie.contains("Path=/auth/fake-link/link"));
    assert!(cookie.starts_with(&format!("{LINK_COOKIE}=s%3A{token}%7C")));

    server.shutdown();
}

#[tokio::test]
async fn test_link_round_trip() {
    let server = TestServer::start().await;
    let token = login_token(&server, "frank").await;
    let link_cookie = start_link(&server, &token).await;

    let response = server
        .get_with_cookies("/auth/fake-link/link/callback?code=frank-gh", &link_cookie)
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        server.url("/account/authorize/result?state=success&provider_name=fake-link")
    );
    let cleared = set_cookie(response.headers(), LINK_COOKIE).unwrap();
    assert!(cleared.contains("Max-Age=0"));
    assert!(set_cookie(response.headers(), "access_token").is_none());

    server.shutdown();
}

#[tokio::test]
async fn test_link_callback_without_cookie_fails() {
    let server = TestServer::start().await;

    let response = server
        .get("/auth/fake-link/link/callback?code=frank-gh")
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        server.url(
            "/account/authorize/result?state=failure&provider_name=fake-link&error_code=401&error_message=authentication+failed"
        )
    );

    server.shutdown();
}

#[tokio::test]
async fn test_link_to_second_user_is_rejected() {
    let server = TestServer::start().await;

    // Given an external account already linked to one user
    let first = login_token(&server, "grace").await;
    let cookie = start_link(&server, &first).await;
    let response = server
        .get_with_cookies("/auth/fake-link/link/callback?code=shared", &cookie)
        .await;
    assert!(location(&response).contains("state=success"));

    // When another user tries to link the same account
    let second = login_token(&server, "heidi").await;
    let cookie = start_link(&server, &second).await;
    let response = server
        .get_with_cookies("/auth/fake-link/link/callback?code=shared", &cookie)
        .await;

    // Then the link is refused with a 403 failure
    let location = location(&response);
    assert!(location.contains("state=failure"), "{location}");
    assert!(location.contains("error_code=403"), "{location}");

    server.shutdown();
}
