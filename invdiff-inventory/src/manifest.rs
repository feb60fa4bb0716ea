use invdiff_object_storage::ObjectFetcher;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};

use crate::{error::InventoryError, InventoryResult};

/// Index document naming the data files of one inventory export.
///
/// Only `files[].key` is required for loading. The descriptive fields are kept when
/// the producer writes them with the expected type and are `None` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDescriptor {
    #[serde(default, deserialize_with = "lenient")]
    pub source_bucket: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub destination_bucket: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub file_format: Option<String>,
    /// Only the comma separated CSV form is kept; structured schemas are dropped.
    #[serde(default, deserialize_with = "lenient")]
    pub file_schema: Option<String>,
    #[serde(default)]
    pub files: Vec<ManifestFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestFile {
    pub key: String,
    #[serde(default, deserialize_with = "lenient")]
    pub size: Option<u64>,
    #[serde(default, rename = "MD5checksum", deserialize_with = "lenient")]
    pub md5_checksum: Option<String>,
}

/// Deserialize an optional field, treating a value of the wrong type as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

impl ManifestDescriptor {
    /// Parse manifest bytes read from `bucket`/`key`.
    pub fn from_slice(bucket: &str, key: &str, bytes: &[u8]) -> InventoryResult<Self> {
        let format_error = |reason: String| InventoryError::Format {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let text = std::str::from_utf8(bytes)
            .map_err(|e| format_error(format!("manifest is not valid UTF-8: {}", e)))?;
        serde_json::from_str(text).map_err(|e| format_error(e.to_string()))
    }

    /// Whether the data files are declared as CSV. A manifest without a format is assumed CSV.
    pub fn is_csv(&self) -> bool {
        self.file_format
            .as_deref()
            .map_or(true, |format| format.eq_ignore_ascii_case("csv"))
    }

    pub fn data_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.files.iter().map(|file| file.key.as_str())
    }
}

pub async fn read_manifest(
    fetcher: &dyn ObjectFetcher,
    bucket: &str,
    manifest_key: &str,
) -> InventoryResult<ManifestDescriptor> {
    let bytes = fetcher
        .get_object(bucket, manifest_key)
        .await
        .map_err(|e| InventoryError::retrieval(bucket, manifest_key, e))?;

    ManifestDescriptor::from_slice(bucket, manifest_key, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inventory_manifest() {
        let manifest = br#"{
            "sourceBucket": "photos",
            "destinationBucket": "arn:aws:s3:::inventories",
            "version": "2016-11-30",
            "fileFormat": "CSV",
            "fileSchema": "Bucket, Key, VersionId, IsLatest, IsDeleteMarker, Size, LastModifiedDate, ETag, StorageClass, IsMultipartUploaded",
            "files": [
                {"key": "photos/data/a.csv.gz", "size": 2147, "MD5checksum": "f11166069f1990abeb9c97ace9cdfabc"},
                {"key": "photos/data/b.csv.gz"}
            ]
        }"#;

        let parsed = ManifestDescriptor::from_slice("inv", "manifest.json", manifest).unwrap();
        assert_eq!(parsed.source_bucket.as_deref(), Some("photos"));
        assert!(parsed.is_csv());
        assert_eq!(
            parsed.data_keys().collect::<Vec<_>>(),
            vec!["photos/data/a.csv.gz", "photos/data/b.csv.gz"]
        );
        assert_eq!(parsed.files[0].size, Some(2147));
        assert_eq!(
            parsed.files[0].md5_checksum.as_deref(),
            Some("f11166069f1990abeb9c97ace9cdfabc")
        );
        assert_eq!(parsed.files[1].size, None);
    }

    #[test]
    fn missing_files_field_means_no_files() {
        let parsed = ManifestDescriptor::from_slice("inv", "m.json", br#"{"version": "1"}"#).unwrap();
        assert!(parsed.files.is_empty());
        assert!(parsed.is_csv());
    }

    #[test]
    fn descriptive_fields_of_unexpected_type_are_ignored() {
        let manifest = br#"{
            "version": 1,
            "fileFormat": "Parquet",
            "fileSchema": {"type": "message", "fields": ["Bucket", "Key"]},
            "files": [
                {"key": "d/1.parquet", "size": "2147", "MD5checksum": 42},
                {"key": "d/2.parquet", "size": 10}
            ]
        }"#;

        let parsed = ManifestDescriptor::from_slice("b", "m.json", manifest).unwrap();
        assert_eq!(parsed.version, None);
        assert_eq!(parsed.file_schema, None);
        assert_eq!(parsed.file_format.as_deref(), Some("Parquet"));
        assert_eq!(
            parsed.data_keys().collect::<Vec<_>>(),
            vec!["d/1.parquet", "d/2.parquet"]
        );
        assert_eq!(parsed.files[0].size, None);
        assert_eq!(parsed.files[0].md5_checksum, None);
        assert_eq!(parsed.files[1].size, Some(10));
    }

    #[test]
    fn null_descriptive_fields_are_absent() {
        let parsed = ManifestDescriptor::from_slice(
            "b",
            "m.json",
            br#"{"sourceBucket": null, "files": [{"key": "d.csv", "size": null}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.source_bucket, None);
        assert_eq!(parsed.files[0].size, None);
    }

    #[test]
    fn non_csv_format_is_detected() {
        let parsed =
            ManifestDescriptor::from_slice("inv", "m.json", br#"{"fileFormat": "Parquet"}"#).unwrap();
        assert!(!parsed.is_csv());
    }

    #[test]
    fn invalid_json_is_a_format_error() {
        let err = ManifestDescriptor::from_slice("inv", "m.json", b"{not json").unwrap_err();
        assert!(
            matches!(err, InventoryError::Format { ref bucket, ref key, .. } if bucket == "inv" && key == "m.json")
        );
    }

    #[test]
    fn invalid_utf8_is_a_format_error() {
        let err = ManifestDescriptor::from_slice("inv", "m.json", &[0xff, 0xfe, 0x7b]).unwrap_err();
        assert!(matches!(err, InventoryError::Format { .. }));
    }

    #[test]
    fn file_entries_without_key_are_rejected() {
        let err = ManifestDescriptor::from_slice("inv", "m.json", br#"{"files": [{"size": 1}]}"#)
            .unwrap_err();
        assert!(matches!(err, InventoryError::Format { .. }));
    }
}
