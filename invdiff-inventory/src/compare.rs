use std::collections::BTreeSet;

use serde::Serialize;

use crate::record::Inventory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeMismatch {
    pub key: String,
    pub size_first: u64,
    pub size_second: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumMismatch {
    pub key: String,
    pub checksum_first: String,
    pub checksum_second: String,
}

/// Differences between two inventories.
///
/// `matches` counts common keys with equal sizes and ignores checksums, while
/// `strict_matches` requires both to agree. Checksum differences are always
/// reported in `checksum_mismatches`, so a key can be counted in `matches` and
/// still appear there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub total_first: usize,
    pub total_second: usize,
    pub only_in_first: BTreeSet<String>,
    pub only_in_second: BTreeSet<String>,
    pub common_count: usize,
    pub matches: usize,
    pub strict_matches: usize,
    /// Ordered by key.
    pub size_mismatches: Vec<SizeMismatch>,
    /// Ordered by key.
    pub checksum_mismatches: Vec<ChecksumMismatch>,
}

impl ComparisonResult {
    /// No key is missing on either side and no common key differs in size or checksum.
    pub fn is_clean(&self) -> bool {
        self.only_in_first.is_empty()
            && self.only_in_second.is_empty()
            && self.size_mismatches.is_empty()
            && self.checksum_mismatches.is_empty()
    }
}

pub fn compare(first: &Inventory, second: &Inventory) -> ComparisonResult {
    let only_in_first: BTreeSet<String> = first
        .keys()
        .filter(|key| !second.contains_key(key))
        .map(str::to_string)
        .collect();
    let only_in_second: BTreeSet<String> = second
        .keys()
        .filter(|key| !first.contains_key(key))
        .map(str::to_string)
        .collect();

    let mut common: Vec<&str> = first.keys().filter(|key| second.contains_key(key)).collect();
    common.sort_unstable();

    let mut result = ComparisonResult {
        total_first: first.len(),
        total_second: second.len(),
        only_in_first,
        only_in_second,
        common_count: common.len(),
        ..Default::default()
    };

    for key in common {
        let (Some(a), Some(b)) = (first.get(key), second.get(key)) else {
            continue;
        };

        let size_match = a.size == b.size;
        let checksum_match = a.checksum == b.checksum;

        if size_match {
            result.matches += 1;
            if checksum_match {
                result.strict_matches += 1;
            }
        } else {
            result.size_mismatches.push(SizeMismatch {
                key: key.to_string(),
                size_first: a.size,
                size_second: b.size,
            });
        }

        if !checksum_match {
            result.checksum_mismatches.push(ChecksumMismatch {
                key: key.to_string(),
                checksum_first: a.checksum.clone(),
                checksum_second: b.checksum.clone(),
            });
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::record::InventoryRecord;

    fn inventory(entries: &[(&str, u64, &str)]) -> Inventory {
        entries
            .iter()
            .map(|(key, size, checksum)| InventoryRecord {
                key: key.to_string(),
                size: *size,
                checksum: checksum.to_string(),
                raw_fields: Vec::new(),
            })
            .collect()
    }

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn checksum_difference_with_equal_size_still_counts_as_match() {
        let first = inventory(&[("a", 10, "x")]);
        let second = inventory(&[("a", 10, "y"), ("b", 5, "z")]);

        let result = compare(&first, &second);

        assert_eq!(result.total_first, 1);
        assert_eq!(result.total_second, 2);
        assert!(result.only_in_first.is_empty());
        assert_eq!(result.only_in_second, keys(&["b"]));
        assert_eq!(result.common_count, 1);
        assert_eq!(result.matches, 1);
        assert_eq!(result.strict_matches, 0);
        assert!(result.size_mismatches.is_empty());
        assert_eq!(
            result.checksum_mismatches,
            vec![ChecksumMismatch {
                key: "a".to_string(),
                checksum_first: "x".to_string(),
                checksum_second: "y".to_string(),
            }]
        );
        assert!(!result.is_clean());
    }

    #[test]
    fn identical_inventories_are_clean() {
        let a = inventory(&[("k1", 1, "e1"), ("k2", 2, "e2"), ("k3", 3, "e3")]);

        let result = compare(&a, &a);

        assert!(result.only_in_first.is_empty());
        assert!(result.only_in_second.is_empty());
        assert!(result.size_mismatches.is_empty());
        assert!(result.checksum_mismatches.is_empty());
        assert_eq!(result.matches, 3);
        assert_eq!(result.strict_matches, 3);
        assert_eq!(result.common_count, 3);
        assert!(result.is_clean());
    }

    #[test]
    fn size_and_checksum_mismatch_are_both_recorded() {
        let first = inventory(&[("k", 1, "x")]);
        let second = inventory(&[("k", 2, "y")]);

        let result = compare(&first, &second);

        assert_eq!(result.matches, 0);
        assert_eq!(
            result.size_mismatches,
            vec![SizeMismatch {
                key: "k".to_string(),
                size_first: 1,
                size_second: 2,
            }]
        );
        assert_eq!(result.checksum_mismatches.len(), 1);
    }

    #[test]
    fn key_sets_partition_the_union() {
        let first = inventory(&[("a", 1, ""), ("b", 2, ""), ("c", 3, ""), ("d", 4, "")]);
        let second = inventory(&[("c", 3, ""), ("d", 5, ""), ("e", 6, "")]);

        let result = compare(&first, &second);

        let union: BTreeSet<String> = first.keys().chain(second.keys()).map(str::to_string).collect();
        let common: BTreeSet<String> = first
            .keys()
            .filter(|k| second.contains_key(k))
            .map(str::to_string)
            .collect();

        assert!(result.only_in_first.is_disjoint(&result.only_in_second));
        assert!(result.only_in_first.is_disjoint(&common));
        assert!(result.only_in_second.is_disjoint(&common));
        assert_eq!(
            result.only_in_first.len() + result.only_in_second.len() + result.common_count,
            union.len()
        );
        let rebuilt: BTreeSet<String> = result
            .only_in_first
            .iter()
            .chain(result.only_in_second.iter())
            .chain(common.iter())
            .cloned()
            .collect();
        assert_eq!(rebuilt, union);
    }

    #[test]
    fn swapping_sides_mirrors_the_result() {
        let a = inventory(&[("shared", 1, "x"), ("left", 1, "l"), ("sized", 5, "s")]);
        let b = inventory(&[("shared", 1, "y"), ("right", 1, "r"), ("sized", 6, "s")]);

        let ab = compare(&a, &b);
        let ba = compare(&b, &a);

        assert_eq!(ab.only_in_first, ba.only_in_second);
        assert_eq!(ab.only_in_second, ba.only_in_first);
        assert_eq!(ab.common_count, ba.common_count);
        assert_eq!(ab.matches, ba.matches);

        let keys_of = |r: &ComparisonResult| -> Vec<String> {
            r.size_mismatches.iter().map(|m| m.key.clone()).collect()
        };
        assert_eq!(keys_of(&ab), keys_of(&ba));
        assert_eq!(ab.size_mismatches[0].size_first, ba.size_mismatches[0].size_second);
        assert_eq!(
            ab.checksum_mismatches[0].checksum_first,
            ba.checksum_mismatches[0].checksum_second
        );
    }

    #[test]
    fn mismatches_are_ordered_by_key() {
        let first = inventory(&[("z", 1, "a"), ("m", 1, "a"), ("a", 1, "a")]);
        let second = inventory(&[("z", 2, "b"), ("m", 2, "b"), ("a", 2, "b")]);

        let result = compare(&first, &second);

        let size_keys: Vec<&str> = result.size_mismatches.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(size_keys, vec!["a", "m", "z"]);
        let checksum_keys: Vec<&str> = result
            .checksum_mismatches
            .iter()
            .map(|m| m.key.as_str())
            .collect();
        assert_eq!(checksum_keys, vec!["a", "m", "z"]);
    }

    #[test]
    fn empty_inventories_are_clean() {
        let result = compare(&Inventory::new(), &Inventory::new());
        assert!(result.is_clean());
        assert_eq!(result.common_count, 0);
    }
}
