use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown identifier: {0}")]
    UnknownId(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SettlementError>;
