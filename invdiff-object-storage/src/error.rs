#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Object {key} not found in bucket {bucket}")]
    NotFound { bucket: String, key: String },
    #[error(transparent)]
    ObjectStore(#[from] object_store::Error),
    #[error("Invalid object key {key}: {source}")]
    InvalidKey {
        key: String,
        source: object_store::path::Error,
    },
    #[error("No object store registered for bucket: {0}")]
    UnknownBucket(String),
    #[error("Initialization error: {0}")]
    Initialization(String),
}
