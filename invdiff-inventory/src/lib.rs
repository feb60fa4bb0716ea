//! Reconciliation of two bucket inventories.
//!
//! Inventories are loaded from manifest or data file keys by the [`InventoryLoader`],
//! compared with [`compare`] and rendered with [`render_report`].

pub mod compare;
pub mod decode;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod observer;
pub mod record;
pub mod report;

pub use compare::{compare, ChecksumMismatch, ComparisonResult, SizeMismatch};
pub use decode::{decode_inventory_bytes, decode_inventory_file, DecodedFile};
pub use error::InventoryError;
pub use loader::{InventoryLoader, LoadMode};
pub use manifest::{read_manifest, ManifestDescriptor, ManifestFile};
pub use observer::{LoadObserver, TracingObserver};
pub use record::{Inventory, InventoryRecord, RowError};
pub use report::{is_clean, render_report, Report};

pub type InventoryResult<T> = Result<T, InventoryError>;
