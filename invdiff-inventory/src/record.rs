//! Inventory rows and the key-indexed inventory built from them.
//!
//! Data files use a fixed column layout without a header row:
//!
//! | index | column   |
//! |-------|----------|
//! | 1     | key      |
//! | 5     | size     |
//! | 7     | checksum |
//!
//! The remaining columns are kept verbatim in [`InventoryRecord::raw_fields`].

use std::collections::{hash_map, HashMap};

use serde::Serialize;

pub const KEY_COLUMN: usize = 1;
pub const SIZE_COLUMN: usize = 5;
pub const CHECKSUM_COLUMN: usize = 7;
/// Rows with fewer fields are skipped while decoding.
pub const MIN_FIELDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRecord {
    pub key: String,
    pub size: u64,
    pub checksum: String,
    pub raw_fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("row has {found} fields, at least {} required", MIN_FIELDS)]
    TooFewFields { found: usize },
}

impl InventoryRecord {
    /// Build a record from one decoded row.
    ///
    /// A size that is missing or not purely numeric becomes 0, as does a numeric size
    /// too large for `u64`. A missing checksum becomes empty. Surrounding double
    /// quotes are stripped from the checksum.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, RowError> {
        if fields.len() < MIN_FIELDS {
            return Err(RowError::TooFewFields {
                found: fields.len(),
            });
        }

        let size = fields
            .get(SIZE_COLUMN)
            .map(|field| parse_size(field.as_ref()))
            .unwrap_or(0);
        let checksum = fields
            .get(CHECKSUM_COLUMN)
            .map(|field| field.as_ref().trim_matches('"').to_string())
            .unwrap_or_default();

        Ok(InventoryRecord {
            key: fields[KEY_COLUMN].as_ref().to_string(),
            size,
            checksum,
            raw_fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
        })
    }
}

fn parse_size(field: &str) -> u64 {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    field.parse().unwrap_or(0)
}

/// Key to record mapping for one bucket. Inserting an existing key replaces the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    records: HashMap<String, InventoryRecord>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record`, returning the record it replaced.
    pub fn insert(&mut self, record: InventoryRecord) -> Option<InventoryRecord> {
        self.records.insert(record.key.clone(), record)
    }

    /// Merge `other` into `self`. Records from `other` win on key collision.
    pub fn merge(&mut self, other: Inventory) {
        self.records.extend(other.records);
    }

    pub fn get(&self, key: &str) -> Option<&InventoryRecord> {
        self.records.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.keys().map(String::as_str)
    }

    pub fn records(&self) -> hash_map::Values<'_, String, InventoryRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<InventoryRecord> for Inventory {
    fn from_iter<T: IntoIterator<Item = InventoryRecord>>(iter: T) -> Self {
        let mut inventory = Inventory::new();
        for record in iter {
            inventory.insert(record);
        }
        inventory
    }
}
