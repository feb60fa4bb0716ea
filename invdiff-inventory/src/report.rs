use std::fmt::{self, Display};

use crate::compare::ComparisonResult;

pub const DEFAULT_PREVIEW_LIMIT: usize = 10;

const RULE_WIDTH: usize = 80;

/// Whether the comparison found no differences at all.
pub fn is_clean(result: &ComparisonResult) -> bool {
    result.is_clean()
}

pub fn render_report(result: &ComparisonResult, name_first: &str, name_second: &str) -> String {
    Report::new(result, name_first, name_second).to_string()
}

/// Human readable rendering of a [`ComparisonResult`].
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    result: &'a ComparisonResult,
    name_first: &'a str,
    name_second: &'a str,
    preview_limit: usize,
}

impl<'a> Report<'a> {
    pub fn new(result: &'a ComparisonResult, name_first: &'a str, name_second: &'a str) -> Self {
        Self {
            result,
            name_first,
            name_second,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }

    /// Maximum entries listed per difference category.
    pub fn with_preview_limit(mut self, preview_limit: usize) -> Self {
        self.preview_limit = preview_limit;
        self
    }

    fn write_section<I, T>(
        &self,
        f: &mut fmt::Formatter<'_>,
        title: &str,
        total: usize,
        entries: I,
    ) -> fmt::Result
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        writeln!(f)?;
        writeln!(f, "{}: {}", title, group_thousands(total))?;
        if total > self.preview_limit {
            writeln!(
                f,
                "  (showing first {} of {})",
                self.preview_limit,
                group_thousands(total)
            )?;
        }
        for entry in entries.into_iter().take(self.preview_limit) {
            writeln!(f, "  - {}", entry)?;
        }
        Ok(())
    }
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let heavy_rule = "=".repeat(RULE_WIDTH);

        writeln!(f)?;
        writeln!(f, "{}", heavy_rule)?;
        writeln!(f, "S3 INVENTORY COMPARISON REPORT")?;
        writeln!(f, "{}", heavy_rule)?;
        writeln!(f, "Bucket 1: {}", self.name_first)?;
        writeln!(f, "Bucket 2: {}", self.name_second)?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;

        writeln!(
            f,
            "Total objects in {}: {}",
            self.name_first,
            group_thousands(result.total_first)
        )?;
        writeln!(
            f,
            "Total objects in {}: {}",
            self.name_second,
            group_thousands(result.total_second)
        )?;
        writeln!(f, "Common objects: {}", group_thousands(result.common_count))?;
        writeln!(f, "Matches (size): {}", group_thousands(result.matches))?;
        writeln!(
            f,
            "Matches (size + checksum): {}",
            group_thousands(result.strict_matches)
        )?;

        self.write_section(
            f,
            &format!("Objects only in {}", self.name_first),
            result.only_in_first.len(),
            &result.only_in_first,
        )?;
        self.write_section(
            f,
            &format!("Objects only in {}", self.name_second),
            result.only_in_second.len(),
            &result.only_in_second,
        )?;
        self.write_section(
            f,
            "Size mismatches",
            result.size_mismatches.len(),
            result
                .size_mismatches
                .iter()
                .map(|m| format!("{}: {} vs {} bytes", m.key, m.size_first, m.size_second)),
        )?;
        self.write_section(
            f,
            "Checksum mismatches",
            result.checksum_mismatches.len(),
            result
                .checksum_mismatches
                .iter()
                .map(|m| format!("{}: {} vs {}", m.key, m.checksum_first, m.checksum_second)),
        )?;

        writeln!(f)?;
        writeln!(f, "{}", heavy_rule)?;
        if is_clean(result) {
            writeln!(f, "✅ SUCCESS: All objects match between both buckets")?;
        } else {
            writeln!(f, "❌ DIFFERENCES FOUND: Objects differ between buckets")?;
        }
        writeln!(f, "{}", heavy_rule)
    }
}

/// Format `n` with `,` between groups of three digits.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// One line summary of the verdict and difference counts.
pub fn render_verdict(result: &ComparisonResult) -> String {
    format!(
        "{} ({} only in first, {} only in second, {} size mismatches, {} checksum mismatches)",
        if is_clean(result) { "CLEAN" } else { "DIFFERENT" },
        result.only_in_first.len(),
        result.only_in_second.len(),
        result.size_mismatches.len(),
        result.checksum_mismatches.len()
    )
}
