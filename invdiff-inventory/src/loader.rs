use std::{pin::pin, sync::Arc};

use futures::StreamExt;
use invdiff_object_storage::ObjectFetcher;

use crate::{
    decode::{decode_inventory_file, DecodedFile},
    manifest::read_manifest,
    observer::{LoadObserver, TracingObserver},
    record::Inventory,
    InventoryResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// The key names a manifest listing the data files.
    Manifest,
    /// The key names a single data file.
    Direct,
}

impl LoadMode {
    pub fn from_use_manifest(use_manifest: bool) -> Self {
        if use_manifest {
            LoadMode::Manifest
        } else {
            LoadMode::Direct
        }
    }
}

/// Builds inventories from data files in remote buckets.
pub struct InventoryLoader {
    fetcher: Arc<dyn ObjectFetcher>,
    observer: Arc<dyn LoadObserver>,
    fetch_concurrency: usize,
}

impl InventoryLoader {
    pub fn new(fetcher: Arc<dyn ObjectFetcher>) -> Self {
        Self {
            fetcher,
            observer: Arc::new(TracingObserver),
            fetch_concurrency: 1,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Number of data files fetched at once during a manifest load. Values below 1 are treated as 1.
    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency.max(1);
        self
    }

    pub async fn load(&self, mode: LoadMode, bucket: &str, key: &str) -> InventoryResult<Inventory> {
        match mode {
            LoadMode::Manifest => self.load_via_manifest(bucket, key).await,
            LoadMode::Direct => self.load_direct(bucket, key).await,
        }
    }

    pub async fn load_direct(&self, bucket: &str, data_key: &str) -> InventoryResult<Inventory> {
        let inventory = self.decode_file(bucket, data_key).await?.inventory;
        self.observer.inventory_loaded(bucket, data_key, &inventory);
        Ok(inventory)
    }

    /// Load every data file listed in the manifest and merge them in listing order.
    ///
    /// A key present in several files keeps the record of the last file listing it.
    /// The first failing file aborts the load.
    pub async fn load_via_manifest(
        &self,
        bucket: &str,
        manifest_key: &str,
    ) -> InventoryResult<Inventory> {
        let manifest = read_manifest(self.fetcher.as_ref(), bucket, manifest_key).await?;
        self.observer.manifest_read(bucket, manifest_key, &manifest);

        // `buffered` yields in input order, so merge order does not depend on fetch timing.
        let mut decoded_files = pin!(futures::stream::iter(manifest.data_keys())
            .map(|data_key| self.decode_file(bucket, data_key))
            .buffered(self.fetch_concurrency));

        let mut inventory = Inventory::new();
        while let Some(decoded) = decoded_files.next().await {
            inventory.merge(decoded?.inventory);
        }

        self.observer
            .inventory_loaded(bucket, manifest_key, &inventory);
        Ok(inventory)
    }

    async fn decode_file(&self, bucket: &str, data_key: &str) -> InventoryResult<DecodedFile> {
        self.observer.data_file_started(bucket, data_key);
        let decoded = decode_inventory_file(self.fetcher.as_ref(), bucket, data_key).await?;
        self.observer.data_file_decoded(bucket, data_key, &decoded);
        Ok(decoded)
    }
}

impl std::fmt::Debug for InventoryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryLoader")
            .field("fetcher", &self.fetcher)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .finish()
    }
}
