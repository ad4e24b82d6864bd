//! Permission-update source and the document update driver.
//!
//! The source is a headerless CSV of `verb, resource, delegated, application`
//! rows. Permission fields may hold several entries separated by commas or
//! by newlines inside a quoted field.

use crate::extract::{normalize_path, strip_base_urls};
use crate::model::{ApiRecord, Method, RecordKey};
use crate::permissions::PermissionType;
use crate::rewrite::{rewrite_text, RewriteOptions};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// One row of the update source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PermissionUpdate {
    pub verb: String,
    pub resource: String,
    pub delegated: String,
    pub application: String,
}

impl PermissionUpdate {
    fn field(&self, kind: PermissionType) -> &str {
        match kind {
            PermissionType::Delegated => &self.delegated,
            PermissionType::Application => &self.application,
        }
    }
}

/// Updates keyed by normalized `(method, path)`; the first row for a key wins.
#[derive(Debug, Default)]
pub struct UpdateTable {
    entries: HashMap<RecordKey, PermissionUpdate>,
}

impl UpdateTable {
    pub fn load(path: &Path, base_urls: &[String]) -> Result<Self> {
        let file = fs::File::open(path)
            .with_context(|| format!("failed to open update source {}", path.display()))?;
        Self::from_reader(file, base_urls)
            .with_context(|| format!("failed to read update source {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R, base_urls: &[String]) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::Fields)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for (idx, row) in csv.deserialize::<PermissionUpdate>().enumerate() {
            let row = row.with_context(|| format!("row {}", idx + 1))?;
            let method = row
                .verb
                .to_uppercase()
                .parse::<Method>()
                .with_context(|| format!("row {}", idx + 1))?;
            let path = normalize_path(&strip_base_urls(&row.resource, base_urls));
            if entries.contains_key(&(method, path.clone())) {
                warn!(row = idx + 1, %method, %path, "duplicate update row ignored");
                continue;
            }
            entries.insert((method, path), row);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &RecordKey) -> Option<&PermissionUpdate> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merge an update into both permission rows of a document.
pub fn rewrite_document(
    text: &str,
    update: &PermissionUpdate,
    options: &RewriteOptions,
) -> crate::error::Result<String> {
    PermissionType::ALL
        .into_iter()
        .try_fold(text.to_string(), |acc, kind| {
            rewrite_text(&acc, kind, update.field(kind), options)
        })
}

/// What an update run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Documents whose text changed (written, or would be on a dry run)
    pub changed: usize,
    /// Matched documents that already held every permission
    pub unchanged: usize,
    /// Records without an update row
    pub skipped: usize,
}

/// Apply `table` to the documents of the matching records. A document
/// documenting several updated requests is rewritten once with all of them.
/// Nothing is written unless `write` is set.
pub fn apply_updates(
    records: &[ApiRecord],
    table: &UpdateTable,
    options: &RewriteOptions,
    write: bool,
) -> Result<UpdateOutcome> {
    let mut outcome = UpdateOutcome::default();

    // Documents in first-seen order, each with the updates that target it
    let mut documents: Vec<(&Path, Vec<&PermissionUpdate>)> = Vec::new();
    let mut index: HashMap<&Path, usize> = HashMap::new();
    for record in records {
        let Some(update) = table.get(&record.key()) else {
            debug!(api = %record.short_name(), "no update row");
            outcome.skipped += 1;
            continue;
        };
        debug!(
            api = %record.short_name(),
            endpoint = %record.endpoint,
            delegated = %record.delegated_permissions_docs.trim(),
            application = %record.app_permissions_docs.trim(),
            "matched update"
        );
        let path = record.doc_file_path.as_path();
        let slot = *index.entry(path).or_insert_with(|| {
            documents.push((path, Vec::new()));
            documents.len() - 1
        });
        documents[slot].1.push(update);
    }

    for (path, updates) in documents {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let rewritten = updates
            .iter()
            .try_fold(text.clone(), |acc, update| {
                rewrite_document(&acc, update, options)
            })
            .with_context(|| format!("failed to rewrite {}", path.display()))?;

        if rewritten == text {
            debug!(path = %path.display(), "already up to date");
            outcome.unchanged += 1;
            continue;
        }

        outcome.changed += 1;
        if write {
            fs::write(path, &rewritten)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), updates = updates.len(), "rewrote permissions");
        } else {
            info!(path = %path.display(), updates = updates.len(), "would rewrite permissions (dry run)");
        }
    }

    Ok(outcome)
}
