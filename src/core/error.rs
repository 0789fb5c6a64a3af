use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegregationError {
    #[error("Cell not found: {0}")]
    CellNotFound(crate::core::types::CellId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SegregationError>;
