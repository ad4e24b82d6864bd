//! The narrow slice of markdown the extractor and rewriter understand:
//! `##` headings, pipe-table rows, and line terminators.

use crate::error::{Error, Result};
use crate::permissions::PermissionType;
use regex::Regex;
use std::sync::LazyLock;

static RE_EXAMPLES_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##.*Examples?$").unwrap());

/// Lines strictly before the first `## ... Example(s)` heading.
/// Returns every line when there is no such heading.
pub fn lines_before_examples<S: AsRef<str>>(lines: &[S]) -> &[S] {
    let end = lines
        .iter()
        .position(|line| RE_EXAMPLES_HEADING.is_match(line.as_ref()))
        .unwrap_or(lines.len());
    &lines[..end]
}

/// Line with surrounding whitespace trimmed and inner spaces and tabs removed.
fn compact(line: &str) -> String {
    line.trim().chars().filter(|c| *c != ' ' && *c != '\t').collect()
}

/// Whether `line` is the table row for `kind`.
pub fn is_permission_row(line: &str, kind: PermissionType) -> bool {
    let compacted = compact(line);
    compacted
        .strip_prefix('|')
        .and_then(|rest| rest.strip_prefix(kind.row_label()))
        .is_some_and(|rest| rest.starts_with('|'))
}

/// Index of the first row for `kind`.
pub fn find_permission_row<S: AsRef<str>>(lines: &[S], kind: PermissionType) -> Option<usize> {
    lines
        .iter()
        .position(|line| is_permission_row(line.as_ref(), kind))
}

/// The raw permission cell of a row: the third piece when split on `|`.
pub fn permission_cell(row: &str) -> Result<&str> {
    row.split('|')
        .nth(2)
        .ok_or_else(|| Error::MalformedPermissionRow(row.to_string()))
}

/// Split text into `(content, terminator)` pairs so that joining them back
/// reproduces the input exactly. Terminators are `\n`, `\r\n` or empty.
pub fn split_lines(text: &str) -> Vec<(&str, &str)> {
    text.split_inclusive('\n')
        .map(|chunk| {
            if let Some(content) = chunk.strip_suffix("\r\n") {
                (content, "\r\n")
            } else if let Some(content) = chunk.strip_suffix('\n') {
                (content, "\n")
            } else {
                (chunk, "")
            }
        })
        .collect()
}
