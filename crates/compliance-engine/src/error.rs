use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    #[error("Invalid page height: {0}")]
    InvalidPageHeight(f64),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}
