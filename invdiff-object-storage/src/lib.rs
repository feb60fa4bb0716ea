use std::{collections::HashMap, fmt::Display, path::PathBuf, sync::Arc};

use bytes::Bytes;
use object_store::{
    aws::{AmazonS3, AmazonS3Builder},
    local::LocalFileSystem,
    path::Path,
    ObjectStore,
};

pub mod credentials;
pub mod error;

pub use credentials::{resolve_profile, ProfileCredentials, StaticCredentials};
pub use error::StorageError;

/// Read access to whole objects, addressed by bucket and key.
#[async_trait::async_trait]
pub trait ObjectFetcher: Send + Sync + std::fmt::Debug {
    /// Fetch the full body of `key` in `bucket`.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;
}

#[derive(Debug, Clone, Default)]
pub struct S3Settings {
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub allow_http: bool,
    pub credentials: Option<StaticCredentials>,
}

#[derive(Debug, Clone)]
enum Backend {
    S3(S3Settings),
    /// Every bucket is a directory below the root.
    Local(PathBuf),
    /// Only buckets registered through [`BucketStores::with_store`].
    Static,
}

/// Resolves bucket names to object stores.
///
/// Stores are created on first use and reused for the rest of the run.
#[derive(Debug)]
pub struct BucketStores {
    backend: Backend,
    stores: parking_lot::Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl BucketStores {
    pub fn s3(settings: S3Settings) -> Self {
        Self::with_backend(Backend::S3(settings))
    }

    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::with_backend(Backend::Local(root.into()))
    }

    pub fn empty() -> Self {
        Self::with_backend(Backend::Static)
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            stores: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// Register `store` as the backing store for `bucket`, replacing any existing one.
    pub fn with_store(self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.stores.lock().insert(bucket.into(), store);
        self
    }

    pub fn store_for(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let mut stores = self.stores.lock();
        if let Some(store) = stores.get(bucket) {
            return Ok(store.clone());
        }

        let store: Arc<dyn ObjectStore> = match &self.backend {
            Backend::S3(settings) => {
                tracing::info!(bucket, "Using S3 object store");
                Arc::new(Self::s3_object_store(bucket, settings)?)
            }
            Backend::Local(root) => {
                let path = root.join(bucket);
                tracing::info!(bucket, path = %path.display(), "Using LocalFileSystem object store");
                Arc::new(LocalFileSystem::new_with_prefix(path)?)
            }
            Backend::Static => return Err(StorageError::UnknownBucket(bucket.to_string())),
        };

        stores.insert(bucket.to_string(), store.clone());
        Ok(store)
    }

    fn s3_object_store(bucket: &str, settings: &S3Settings) -> Result<AmazonS3, StorageError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_allow_http(settings.allow_http);

        if let Some(region) = &settings.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if let Some(credentials) = &settings.credentials {
            builder = builder
                .with_access_key_id(&credentials.access_key_id)
                .with_secret_access_key(&credentials.secret_access_key);
            if let Some(token) = &credentials.session_token {
                builder = builder.with_token(token);
            }
        }

        builder.build().map_err(|e| {
            StorageError::Initialization(format!(
                "Failed to build S3 object store for bucket {}: {}",
                bucket, e
            ))
        })
    }
}

impl Display for BucketStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.backend {
            Backend::S3(_) => write!(f, "BucketStores(s3)"),
            Backend::Local(root) => write!(f, "BucketStores(local:{})", root.display()),
            Backend::Static => write!(f, "BucketStores(static)"),
        }
    }
}

#[async_trait::async_trait]
impl ObjectFetcher for BucketStores {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let store = self.store_for(bucket)?;
        // Keys are used verbatim; `Path::from` would percent-encode characters such as `%` or `#`.
        let location = Path::parse(key).map_err(|source| StorageError::InvalidKey {
            key: key.to_string(),
            source,
        })?;

        let not_found = |e: object_store::Error| match e {
            object_store::Error::NotFound { .. } => StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            other => StorageError::ObjectStore(other),
        };

        let result = store.get(&location).await.map_err(not_found)?;
        let bytes = result.bytes().await.map_err(not_found)?;
        tracing::debug!(bucket, key, size = bytes.len(), "Fetched object");
        Ok(bytes)
    }
}
