//! Record report: one headerless CSV row per record.

use crate::model::ApiRecord;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Width of the longest method name, `DELETE`.
const METHOD_WIDTH: usize = 6;

/// Report sink: the given file, or stdout.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Write `records` as CSV: method, path, delegated, application, owner,
/// in v1, granular, both, documentation URL.
pub fn write_report<W: Write>(writer: W, records: &[ApiRecord]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for r in records {
        let method = format!("{:<width$}", r.method.as_str(), width = METHOD_WIDTH);
        csv.write_record([
            method.as_str(),
            r.path.as_str(),
            r.delegated_permissions.as_str(),
            r.app_permissions.as_str(),
            r.owner.as_str(),
            bool_field(r.in_v1),
            bool_field(r.has_granular_permissions),
            bool_field(r.in_v1 && r.has_granular_permissions),
            r.doc_url.as_str(),
        ])
        .with_context(|| format!("failed to write report row for {}", r.short_name()))?;
    }
    csv.flush().context("failed to flush report")?;
    Ok(())
}

fn bool_field(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
