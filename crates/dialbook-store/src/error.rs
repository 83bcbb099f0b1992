use dialbook_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("invalid json in stored contact {phone}: {source}")]
    InvalidJson {
        phone: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("incompatible schema: {0}")]
    Schema(String),
    #[error("invalid data path: {0}")]
    InvalidDataPath(PathBuf),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Io,
    Sql,
    Core,
    InvalidJson,
    MissingHomeDir,
    Schema,
    InvalidDataPath,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io(_) => StoreErrorKind::Io,
            StoreError::Sql(_) => StoreErrorKind::Sql,
            StoreError::Core(_) => StoreErrorKind::Core,
            StoreError::InvalidJson { .. } => StoreErrorKind::InvalidJson,
            StoreError::MissingHomeDir => StoreErrorKind::MissingHomeDir,
            StoreError::Schema(_) => StoreErrorKind::Schema,
            StoreError::InvalidDataPath(_) => StoreErrorKind::InvalidDataPath,
        }
    }
}
