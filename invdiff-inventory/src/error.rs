use invdiff_object_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Failed to retrieve {bucket}/{key}")]
    Retrieval {
        bucket: String,
        key: String,
        source: StorageError,
    },
    #[error("Failed to decode inventory data file {key}: {reason}")]
    Decode { key: String, reason: String },
    #[error("Invalid manifest {bucket}/{key}: {reason}")]
    Format {
        bucket: String,
        key: String,
        reason: String,
    },
}

impl InventoryError {
    pub(crate) fn retrieval(bucket: &str, key: &str, source: StorageError) -> Self {
        InventoryError::Retrieval {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        }
    }

    pub(crate) fn decode(key: &str, reason: impl Into<String>) -> Self {
        InventoryError::Decode {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
