use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend refused the operation.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Stored bytes could not be decoded or a value could not be encoded.
    #[error("Malformed stored data: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
