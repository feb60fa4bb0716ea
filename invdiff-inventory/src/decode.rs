use std::io::Read;

use flate2::read::GzDecoder;
use invdiff_object_storage::ObjectFetcher;

use crate::{
    error::InventoryError,
    record::{Inventory, InventoryRecord},
    InventoryResult,
};

/// Data file keys with this suffix are gzip compressed.
pub const GZIP_SUFFIX: &str = ".gz";

/// Outcome of decoding a single data file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFile {
    pub inventory: Inventory,
    /// Rows read, including skipped ones.
    pub rows: usize,
    /// Rows dropped for having too few fields.
    pub skipped_rows: usize,
}

/// Decode the body of the data file stored at `data_key`.
pub fn decode_inventory_bytes(data_key: &str, bytes: &[u8]) -> InventoryResult<DecodedFile> {
    let decompressed;
    let raw = if data_key.ends_with(GZIP_SUFFIX) {
        let mut out = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut out)
            .map_err(|e| InventoryError::decode(data_key, format!("gzip: {}", e)))?;
        decompressed = out;
        decompressed.as_slice()
    } else {
        bytes
    };

    let text = std::str::from_utf8(raw)
        .map_err(|e| InventoryError::decode(data_key, format!("invalid UTF-8: {}", e)))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut decoded = DecodedFile::default();
    for row in reader.records() {
        let row = row.map_err(|e| InventoryError::decode(data_key, format!("csv: {}", e)))?;
        decoded.rows += 1;

        let fields: Vec<&str> = row.iter().collect();
        match InventoryRecord::from_fields(&fields) {
            Ok(record) => {
                decoded.inventory.insert(record);
            }
            Err(e) => {
                tracing::trace!(data_key, row = decoded.rows, "Skipping row: {}", e);
                decoded.skipped_rows += 1;
            }
        }
    }

    Ok(decoded)
}

/// Fetch `data_key` from `bucket` and decode it.
pub async fn decode_inventory_file(
    fetcher: &dyn ObjectFetcher,
    bucket: &str,
    data_key: &str,
) -> InventoryResult<DecodedFile> {
    let bytes = fetcher
        .get_object(bucket, data_key)
        .await
        .map_err(|e| InventoryError::retrieval(bucket, data_key, e))?;

    decode_inventory_bytes(data_key, &bytes)
}
