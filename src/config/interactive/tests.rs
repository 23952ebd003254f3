use std::fs;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

#[test]
fn missing_config_falls_back_to_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let config = load_existing_config(temp_dir.path());

    assert_eq!(config, Config::with_base_dir(temp_dir.path()));
}

#[test]
fn existing_config_is_loaded() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(
        temp_dir.path().join(crate::config::CONFIG_FILE),
        "[retrieval]\ntop_k = 8\n\n[generation]\nbackend = \"gemini\"\n",
    )
    .expect("should write config");

    let config = load_existing_config(temp_dir.path());

    assert_eq!(config.retrieval.top_k, 8);
    assert_eq!(config.generation.backend, Backend::Gemini);
}

#[test]
fn invalid_config_falls_back_to_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(
        temp_dir.path().join(crate::config::CONFIG_FILE),
        "[chunking]\nchunk_size = 10\noverlap = 20\n",
    )
    .expect("should write config");

    let config = load_existing_config(temp_dir.path());

    assert_eq!(config.chunking, ChunkingConfig::default());
}

#[test]
fn backend_positions_follow_menu_order() {
    assert_eq!(backend_position(Backend::Groq), 0);
    assert_eq!(backend_position(Backend::Gemini), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn connection_test_succeeds_against_running_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"models": []}"#))
        .mount(&server)
        .await;

    let address = server.address();
    let embedding = EmbeddingConfig {
        host: address.ip().to_string(),
        port: address.port(),
        ..EmbeddingConfig::default()
    };

    let reachable = tokio::task::spawn_blocking(move || test_ollama_connection(&embedding))
        .await
        .expect("blocking task should join");

    assert!(reachable);
}

#[test]
fn connection_test_fails_without_server() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("should bind");
    let port = listener
        .local_addr()
        .expect("listener should have an address")
        .port();
    drop(listener);

    let embedding = EmbeddingConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..EmbeddingConfig::default()
    };

    assert!(!test_ollama_connection(&embedding));
}
