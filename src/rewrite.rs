//! Permission table rewriter.
//!
//! Merges a new permission list into one row of a page's permissions table.
//! Only the cell between the row's second `|` and its last `|` changes; every
//! other byte of the document is left as it was.

use crate::error::{Error, Result};
use crate::markdown::{find_permission_row, split_lines};
use crate::permissions::{sort_permissions, PermissionType, NOT_SUPPORTED};

/// Cell text written when the merged list is empty.
const EMPTY_CELL: &str = "Not supported.";

/// Resource-specific consent scopes end with this.
const RESOURCE_SPECIFIC: &str = ".Group";

#[derive(Debug, Clone, Copy)]
pub struct RewriteOptions {
    pub unmatched_rank: char,
    pub mark_resource_specific: bool,
}

/// Split an update-source permission field into sorted tokens. Entries are
/// separated by commas or newlines; blanks are dropped.
pub fn split_new_permissions(field: &str, options: &RewriteOptions) -> Vec<String> {
    let mut perms: Vec<String> = field
        .split([',', '\n'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    sort_permissions(&mut perms, options.unmatched_rank);
    perms
}

/// Give a `.Group` scope a trailing `*` footnote marker unless it has one.
fn mark_resource_specific(perm: &str) -> String {
    if perm.ends_with(RESOURCE_SPECIFIC) {
        format!("{perm}*")
    } else {
        perm.to_string()
    }
}

/// Union of the old and new tokens in review order, without the
/// "Not supported" placeholder. Emphasis and a trailing period are dropped
/// from the old cell's tokens.
fn merge_permissions(old: &str, new: &[String], options: &RewriteOptions) -> Vec<String> {
    let old_tokens = old
        .split(',')
        .map(|p| p.replace("**", "").trim().trim_end_matches('.').to_string());
    let mut merged: Vec<String> = Vec::new();
    for perm in old_tokens.chain(new.iter().cloned()) {
        let perm = perm.trim();
        if perm.is_empty() || perm.starts_with(NOT_SUPPORTED) {
            continue;
        }
        let perm = if options.mark_resource_specific {
            mark_resource_specific(perm)
        } else {
            perm.to_string()
        };
        if !merged.contains(&perm) {
            merged.push(perm);
        }
    }
    sort_permissions(&mut merged, options.unmatched_rank);
    merged
}

/// Rewrite the permission cell of a single table row.
pub fn rewrite_row(row: &str, new: &[String], options: &RewriteOptions) -> Result<String> {
    let malformed = || Error::MalformedPermissionRow(row.to_string());
    let first = row.find('|').ok_or_else(malformed)?;
    let start = first + 1 + row[first + 1..].find('|').ok_or_else(malformed)?;
    let end = row.rfind('|').ok_or_else(malformed)?;
    if end <= start {
        return Err(malformed());
    }

    let old = &row[start + 1..end];
    let merged = merge_permissions(old, new, options);
    let replacement = if merged.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        merged.join(", ")
    };

    // Keep the cell's own padding when it had content
    let (lead, trail) = if old.trim().is_empty() {
        (" ", " ")
    } else {
        let lead_len = old.len() - old.trim_start().len();
        let trail_len = old.len() - old.trim_end().len();
        (&old[..lead_len], &old[old.len() - trail_len..])
    };

    Ok(format!(
        "{}{lead}{replacement}{trail}{}",
        &row[..=start],
        &row[end..]
    ))
}

/// Rewrite the first `kind` row in `lines` with `new_perms` merged in.
/// Every other line is returned unchanged.
pub fn rewrite_lines<S: AsRef<str>>(
    lines: &[S],
    kind: PermissionType,
    new_perms: &str,
    options: &RewriteOptions,
) -> Result<Vec<String>> {
    let new = split_new_permissions(new_perms, options);
    let target = find_permission_row(lines, kind);
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if Some(idx) == target {
                rewrite_row(line.as_ref(), &new, options)
            } else {
                Ok(line.as_ref().to_string())
            }
        })
        .collect()
}

/// [`rewrite_lines`] over whole document text, keeping line terminators.
pub fn rewrite_text(
    text: &str,
    kind: PermissionType,
    new_perms: &str,
    options: &RewriteOptions,
) -> Result<String> {
    let parts = split_lines(text);
    let contents: Vec<&str> = parts.iter().map(|(content, _)| *content).collect();
    let rewritten = rewrite_lines(&contents, kind, new_perms, options)?;
    Ok(rewritten
        .iter()
        .zip(&parts)
        .map(|(content, (_, terminator))| format!("{content}{terminator}"))
        .collect())
}
