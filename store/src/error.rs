use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage engine error: {0}")]
    EngineError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Data conversion error: {0}")]
    ConversionError(String),
}

impl From<StoreError> for common::Error {
    fn from(err: StoreError) -> Self {
        common::Error::DbError(err.to_string())
    }
}

impl From<fjall::Error> for StoreError {
    fn from(err: fjall::Error) -> Self {
        StoreError::EngineError(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::ConversionError(err.to_string())
    }
}
