use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn client_for(server: &MockServer, config: EmbeddingConfig) -> OllamaClient {
    let url = Url::parse(&server.uri()).expect("mock server uri should parse");
    let config = EmbeddingConfig {
        host: url.host_str().unwrap_or("127.0.0.1").to_string(),
        port: url.port().unwrap_or(80),
        ..config
    };
    OllamaClient::new(&config)
        .expect("Failed to create client")
        .with_retry_attempts(1)
}

#[test]
fn client_configuration() {
    let config = EmbeddingConfig {
        host: "test-host".to_string(),
        port: 1234,
        model: "test-model".to_string(),
        batch_size: 128,
        ..EmbeddingConfig::default()
    };
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.model_name(), "test-model");
    assert_eq!(client.batch_size, 128);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
}

#[test]
fn normalize_scales_to_unit_length() {
    let mut vector = vec![3.0, 4.0];
    l2_normalize(&mut vector);
    assert_eq!(vector, vec![0.6, 0.8]);

    let mut zero = vec![0.0, 0.0];
    l2_normalize(&mut zero);
    assert_eq!(zero, vec![0.0, 0.0]);
}

#[tokio::test(flavor = "multi_thread")]
async fn embed_batches_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_json(json!({"model": "all-minilm:latest", "input": ["a", "b"]})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[1.0, 0.0], [0.0, 1.0]]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_json(json!({"model": "all-minilm:latest", "input": ["c"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[0.5, 0.5]]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(
        &server,
        EmbeddingConfig {
            batch_size: 2,
            ..EmbeddingConfig::default()
        },
    );
    let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let vectors = tokio::task::spawn_blocking(move || client.embed(&texts))
        .await
        .expect("blocking task should join")
        .expect("embedding should succeed");

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]);
}

#[tokio::test(flavor = "multi_thread")]
async fn embed_normalizes_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[3.0, 4.0]]})))
        .mount(&server)
        .await;

    let client = client_for(
        &server,
        EmbeddingConfig {
            normalize: true,
            ..EmbeddingConfig::default()
        },
    );
    let vector = tokio::task::spawn_blocking(move || client.embed_one("question"))
        .await
        .expect("blocking task should join")
        .expect("embedding should succeed");

    assert_eq!(vector, vec![0.6, 0.8]);
}

#[tokio::test(flavor = "multi_thread")]
async fn count_mismatch_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[1.0]]})))
        .mount(&server)
        .await;

    let client = client_for(&server, EmbeddingConfig::default());
    let texts = vec!["a".to_string(), "b".to_string()];
    let result = tokio::task::spawn_blocking(move || client.embed(&texts))
        .await
        .expect("blocking task should join");

    assert!(matches!(result, Err(RagError::Embedding(msg)) if msg.contains("Mismatch")));
}

#[tokio::test(flavor = "multi_thread")]
async fn mixed_dimensions_are_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[1.0, 2.0], [1.0]]})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, EmbeddingConfig::default());
    let texts = vec!["a".to_string(), "b".to_string()];
    let result = tokio::task::spawn_blocking(move || client.embed(&texts))
        .await
        .expect("blocking task should join");

    assert!(matches!(result, Err(RagError::Embedding(msg)) if msg.contains("Inconsistent")));
}

#[tokio::test(flavor = "multi_thread")]
async fn health_check_requires_configured_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "nomic-embed-text:latest", "size": 274302450}]
        })))
        .mount(&server)
        .await;

    let missing = client_for(&server, EmbeddingConfig::default());
    let present = client_for(
        &server,
        EmbeddingConfig {
            model: "nomic-embed-text:latest".to_string(),
            ..EmbeddingConfig::default()
        },
    );

    let (missing, present) =
        tokio::task::spawn_blocking(move || (missing.health_check(), present.health_check()))
            .await
            .expect("blocking task should join");

    assert!(matches!(missing, Err(RagError::Embedding(_))));
    assert!(present.is_ok());
}

#[test]
fn empty_input_makes_no_request() {
    let config = EmbeddingConfig {
        host: "unreachable.invalid".to_string(),
        ..EmbeddingConfig::default()
    };
    let client = OllamaClient::new(&config).expect("Failed to create client");
    let vectors = client.embed(&[]).expect("empty input should succeed");
    assert!(vectors.is_empty());
}
