// Configuration management module
// TOML settings under the base directory plus the interactive setup flow

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    BASE_DIR_ENV, CONFIG_FILE, Config, ConfigError, EmbeddingConfig, GenerationConfig,
    PathsConfig, RetrievalConfig, ServerConfig,
};
