//! Tipos de erro do Iberia Chronos.

use thiserror::Error;

/// Tipo de resultado padrão do Iberia Chronos.
pub type ChronosResult<T> = Result<T, ChronosError>;

/// Erros possíveis no Iberia Chronos.
#[derive(Error, Debug)]
pub enum ChronosError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generator '{0}' failed: {1}")]
    Generator(String, String),

    #[error("API key not found in environment variable '{0}'")]
    MissingApiKey(String),

    #[error("{0}")]
    InvalidYear(#[from] crate::shell::YearInputError),

    #[cfg(feature = "cli")]
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),
}

impl ChronosError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro de gerador.
    pub fn generator<N: Into<String>, S: Into<String>>(name: N, msg: S) -> Self {
        Self::Generator(name.into(), msg.into())
    }
}
