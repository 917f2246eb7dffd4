use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataGenError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Token signing error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Credentials error: {0}")]
    CredentialsError(String),
}

pub type Result<T> = std::result::Result<T, DataGenError>;
