//! Progress notifications emitted while inventories load.

use crate::{decode::DecodedFile, manifest::ManifestDescriptor, record::Inventory};

/// Receives loader progress. All methods default to doing nothing.
pub trait LoadObserver: Send + Sync {
    fn manifest_read(&self, _bucket: &str, _manifest_key: &str, _manifest: &ManifestDescriptor) {}

    fn data_file_started(&self, _bucket: &str, _data_key: &str) {}

    fn data_file_decoded(&self, _bucket: &str, _data_key: &str, _decoded: &DecodedFile) {}

    fn inventory_loaded(&self, _bucket: &str, _key: &str, _inventory: &Inventory) {}
}

/// Forwards progress to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn manifest_read(&self, bucket: &str, manifest_key: &str, manifest: &ManifestDescriptor) {
        tracing::info!(
            bucket,
            manifest_key,
            files = manifest.files.len(),
            source_bucket = manifest.source_bucket.as_deref(),
            "Read inventory manifest"
        );
        if !manifest.is_csv() {
            tracing::warn!(
                bucket,
                manifest_key,
                file_format = manifest.file_format.as_deref(),
                "Manifest declares a non-CSV file format, decoding as CSV anyway"
            );
        }
    }

    fn data_file_started(&self, bucket: &str, data_key: &str) {
        tracing::info!(bucket, data_key, "Processing inventory file");
    }

    fn data_file_decoded(&self, bucket: &str, data_key: &str, decoded: &DecodedFile) {
        tracing::info!(
            bucket,
            data_key,
            objects = decoded.inventory.len(),
            "Read {} objects from {}/{}",
            decoded.inventory.len(),
            bucket,
            data_key
        );
        if decoded.skipped_rows > 0 {
            tracing::debug!(
                bucket,
                data_key,
                skipped = decoded.skipped_rows,
                "Skipped rows with too few fields"
            );
        }
    }

    fn inventory_loaded(&self, bucket: &str, key: &str, inventory: &Inventory) {
        tracing::info!(bucket, key, objects = inventory.len(), "Inventory loaded");
    }
}
