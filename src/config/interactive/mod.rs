#[cfg(test)]
mod tests;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};

use super::{Config, ConfigError, EmbeddingConfig, GenerationConfig, RetrievalConfig};
use crate::embeddings::{ChunkingConfig, OllamaClient};
use crate::generation::Backend;

#[inline]
pub fn run_interactive_config(base_dir: &Path) -> Result<()> {
    eprintln!("{}", style("🔧 Docs RAG Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config(base_dir);

    eprintln!("{}", style("Embedding Configuration").bold().yellow());
    eprintln!("Configure your local Ollama instance for embedding generation.");
    eprintln!();
    configure_embedding(&mut config.embedding)?;

    eprintln!();
    eprintln!("{}", style("Chunking & Retrieval").bold().yellow());
    configure_chunking(&mut config.chunking)?;
    config.retrieval.top_k = Input::new()
        .with_prompt("Chunks retrieved per question (top-k)")
        .default(config.retrieval.top_k)
        .validate_with(|input: &usize| -> Result<(), ConfigError> {
            RetrievalConfig::check_top_k(*input).map(|_| ())
        })
        .interact_text()?;

    eprintln!();
    eprintln!("{}", style("Answer Generation").bold().yellow());
    configure_generation(&mut config.generation)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_ollama_connection(&config.embedding) {
        eprintln!("{}", style("✓ Ollama connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to Ollama").yellow()
        );
        eprintln!("You can continue, but make sure Ollama is running before building.");
    }

    let key_env = config.generation.backend.api_key_env();
    if std::env::var_os(key_env).is_none() {
        eprintln!(
            "{}",
            style(format!("⚠ {key_env} is not set; questions cannot be answered until it is")).yellow()
        );
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config(config: &Config) {
    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    let embedding = &config.embedding;
    eprintln!("{}", style("Embedding Settings:").bold().yellow());
    match embedding.ollama_url() {
        Ok(url) => eprintln!("  Ollama URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Ollama URL: {} ({})", style("Invalid").red(), e),
    }
    eprintln!("  Model: {}", style(&embedding.model).cyan());
    eprintln!("  Batch Size: {}", style(embedding.batch_size).cyan());
    eprintln!("  Normalize: {}", style(embedding.normalize).cyan());

    eprintln!();
    eprintln!("{}", style("Chunking & Retrieval:").bold().yellow());
    eprintln!("  Chunk Size: {}", style(config.chunking.chunk_size).cyan());
    eprintln!("  Overlap: {}", style(config.chunking.overlap).cyan());
    eprintln!(
        "  Minimum Chunk: {} chars",
        style(config.chunking.discard_threshold()).cyan()
    );
    eprintln!("  Top-k: {}", style(config.retrieval.top_k).cyan());

    let generation = &config.generation;
    eprintln!();
    eprintln!("{}", style("Generation Settings:").bold().yellow());
    eprintln!("  Backend: {}", style(generation.backend).cyan());
    eprintln!("  Model: {}", style(generation.model_name()).cyan());
    eprintln!("  Endpoint: {}", style(generation.base_url()).cyan());
    eprintln!("  Temperature: {}", style(generation.temperature).cyan());
    eprintln!("  Max Tokens: {}", style(generation.max_tokens).cyan());
    eprintln!(
        "  API Key ({}): {}",
        generation.backend.api_key_env(),
        api_key_status(generation.backend)
    );

    eprintln!();
    eprintln!("{}", style("Paths:").bold().yellow());
    eprintln!("  Data: {}", style(config.data_dir().display()).cyan());
    eprintln!("  Snapshot: {}", style(config.snapshot_dir().display()).cyan());
    eprintln!(
        "  Server: {}",
        style(format!("{}:{}", config.server.host, config.server.port)).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
}

fn api_key_status(backend: Backend) -> console::StyledObject<&'static str> {
    if std::env::var_os(backend.api_key_env()).is_some() {
        style("set").green()
    } else {
        style("missing").red()
    }
}

fn load_existing_config(base_dir: &Path) -> Config {
    if !base_dir.join(super::CONFIG_FILE).exists() {
        eprintln!(
            "{}",
            style("No existing configuration found. Using defaults.").yellow()
        );
        return Config::with_base_dir(base_dir);
    }

    Config::load(base_dir).map_or_else(
        |e| {
            eprintln!(
                "{}",
                style(format!("Existing configuration is invalid ({e:#}). Using defaults.")).yellow()
            );
            Config::with_base_dir(base_dir)
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            config
        },
    )
}

fn configure_embedding(embedding: &mut EmbeddingConfig) -> Result<()> {
    let protocols = &["http", "https"];
    let default_index = protocols
        .iter()
        .position(|&p| p == embedding.protocol)
        .unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt("Ollama protocol")
        .default(default_index)
        .items(protocols)
        .interact()?;
    embedding.protocol = protocols[protocol_index].to_string();

    let protocol = embedding.protocol.clone();
    let host: String = Input::new()
        .with_prompt("Ollama host")
        .default(embedding.host.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            EmbeddingConfig {
                protocol: protocol.clone(),
                host: input.clone(),
                ..EmbeddingConfig::default()
            }
            .ollama_url()
            .map(|_| ())
        })
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Ollama port")
        .default(embedding.port)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(embedding.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding generation")
        .default(embedding.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 1000 {
                Err("Batch size must be 1000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    embedding.normalize = Confirm::new()
        .with_prompt("L2-normalize embeddings?")
        .default(embedding.normalize)
        .interact()?;

    embedding.set_host(host)?;
    embedding.set_port(port)?;
    embedding.set_model(model)?;
    embedding.set_batch_size(batch_size)?;

    Ok(())
}

fn configure_chunking(chunking: &mut ChunkingConfig) -> Result<()> {
    let chunk_size: usize = Input::new()
        .with_prompt("Chunk size (characters)")
        .default(chunking.chunk_size)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if *input == 0 {
                Err("Chunk size must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let overlap: usize = Input::new()
        .with_prompt("Chunk overlap (characters)")
        .default(chunking.overlap.min(chunk_size.saturating_sub(1)))
        .validate_with(|input: &usize| -> Result<(), String> {
            ChunkingConfig::new(chunk_size, *input)
                .validate()
                .map_err(|e| e.to_string())
        })
        .interact_text()?;

    chunking.chunk_size = chunk_size;
    chunking.overlap = overlap;
    Ok(())
}

fn configure_generation(generation: &mut GenerationConfig) -> Result<()> {
    let labels: Vec<String> = Backend::ALL
        .iter()
        .map(|backend| format!("{backend} ({})", backend.default_model()))
        .collect();

    let backend_index = Select::new()
        .with_prompt("Generation backend")
        .default(backend_position(generation.backend))
        .items(&labels)
        .interact()?;
    let backend = Backend::ALL[backend_index];
    if backend != generation.backend {
        // A model override for one provider is meaningless for the other
        generation.model = None;
    }
    generation.backend = backend;

    let model: String = Input::new()
        .with_prompt("Generation model")
        .default(generation.model_name().to_string())
        .interact_text()?;
    generation.model = if model.trim().is_empty() || model == backend.default_model() {
        None
    } else {
        Some(model)
    };

    generation.temperature = Input::new()
        .with_prompt("Temperature")
        .default(generation.temperature)
        .validate_with(|input: &f32| -> Result<(), ConfigError> {
            if (0.0..=2.0).contains(input) {
                Ok(())
            } else {
                Err(ConfigError::InvalidTemperature(*input))
            }
        })
        .interact_text()?;

    Ok(())
}

fn backend_position(backend: Backend) -> usize {
    Backend::ALL
        .iter()
        .position(|&candidate| candidate == backend)
        .unwrap_or(0)
}

fn test_ollama_connection(embedding: &EmbeddingConfig) -> bool {
    OllamaClient::new(embedding)
        .map(|client| {
            client
                .with_timeout(Duration::from_secs(5))
                .with_retry_attempts(1)
        })
        .and_then(|client| client.ping())
        .is_ok()
}
