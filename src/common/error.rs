use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("YAML deserialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Database error: {message}")]
    Database { message: String },
}

pub type Result<T> = std::result::Result<T, ToolkitError>;
