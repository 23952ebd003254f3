use std::time::Duration;

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn fast_client(attempts: u32) -> HttpClient {
    HttpClient::new(Duration::from_secs(5))
        .with_retry_attempts(attempts)
        .with_backoff(Duration::from_millis(10))
}

#[test]
fn retry_attempts_never_drop_below_one() {
    let client = HttpClient::default().with_retry_attempts(0);
    assert_eq!(client.retry_attempts(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn post_json_sends_body_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(serde_json::json!({"hello": "world"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/echo", server.uri());
    let body = tokio::task::spawn_blocking(move || {
        fast_client(1).post_json(
            &url,
            &serde_json::json!({"hello": "world"}),
            &[("Authorization", "Bearer secret")],
        )
    })
    .await
    .expect("blocking task should join")
    .expect("request should succeed");

    assert_eq!(body, "ok");
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let url = format!("{}/flaky", server.uri());
    let result = tokio::task::spawn_blocking(move || fast_client(3).get_text(&url))
        .await
        .expect("blocking task should join");

    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let error = tokio::task::spawn_blocking(move || fast_client(3).get_text(&url))
        .await
        .expect("blocking task should join")
        .expect_err("404 should fail");

    assert!(error.to_string().contains("404"));
}
