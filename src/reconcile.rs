//! Cross-version presence and summary ratios.

use crate::error::{Error, Result};
use crate::model::{ApiRecord, RecordKey};
use std::collections::HashSet;
use std::fmt;

/// Set `in_v1` on every record whose key exists in `reference`.
/// Returns how many were found.
pub fn mark_in_v1(records: &mut [ApiRecord], reference: &[ApiRecord]) -> usize {
    let keys: HashSet<RecordKey> = reference.iter().map(ApiRecord::key).collect();
    let mut found = 0;
    for record in records.iter_mut() {
        record.in_v1 = keys.contains(&record.key());
        found += usize::from(record.in_v1);
    }
    found
}

/// Counts and ratios over the records whose owner is not excluded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub granular: usize,
    pub in_v1: usize,
    pub both: usize,
}

impl Summary {
    pub fn granular_ratio(&self) -> f64 {
        self.granular as f64 / self.total as f64
    }

    pub fn in_v1_ratio(&self) -> f64 {
        self.in_v1 as f64 / self.total as f64
    }

    pub fn both_ratio(&self) -> f64 {
        self.both as f64 / self.total as f64
    }
}

/// Summarize `records`, skipping excluded owners. An empty selection has no
/// meaningful ratios and is an error.
pub fn summarize(records: &[ApiRecord], excluded_owners: &[String]) -> Result<Summary> {
    let selected: Vec<&ApiRecord> = records
        .iter()
        .filter(|r| !excluded_owners.contains(&r.owner))
        .collect();
    if selected.is_empty() {
        return Err(Error::EmptySummary);
    }
    Ok(Summary {
        total: selected.len(),
        granular: selected.iter().filter(|r| r.has_granular_permissions).count(),
        in_v1: selected.iter().filter(|r| r.in_v1).count(),
        both: selected
            .iter()
            .filter(|r| r.has_granular_permissions && r.in_v1)
            .count(),
    })
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "APIs considered:              {}", self.total)?;
        writeln!(
            f,
            "granular permissions:         {:>5.1}% ({})",
            self.granular_ratio() * 100.0,
            self.granular
        )?;
        writeln!(
            f,
            "in v1:                        {:>5.1}% ({})",
            self.in_v1_ratio() * 100.0,
            self.in_v1
        )?;
        write!(
            f,
            "in v1 with granular:          {:>5.1}% ({})",
            self.both_ratio() * 100.0,
            self.both
        )
    }
}
