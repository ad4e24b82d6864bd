//! Corpus reader: every `.md` file directly inside one documentation root.

use crate::extract::{extract_records, DocumentInfo, ExtractOptions};
use crate::model::ApiRecord;
use crate::ownership::OwnershipRules;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything the reader needs besides the root itself.
#[derive(Debug, Clone, Copy)]
pub struct CorpusOptions<'a> {
    pub extract: ExtractOptions<'a>,
    pub rules: &'a OwnershipRules,
    pub docs_base_url: &'a str,
    pub url_suffix: &'a str,
}

/// Read one documentation root into a deduplicated, sorted record list.
///
/// Traversal is non-recursive and ordered by file name, which makes
/// "first occurrence wins" deduplication repeatable. Any unreadable or
/// malformed document aborts the whole read.
pub fn read_corpus(root: &Path, options: &CorpusOptions) -> Result<Vec<ApiRecord>> {
    let files = markdown_files(root)?;
    let mut records = Vec::new();

    for path in &files {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let endpoint = endpoint_name(path);
        let doc_url = doc_url(path, options.docs_base_url, options.url_suffix);
        let doc = DocumentInfo {
            path,
            endpoint: &endpoint,
            doc_url: &doc_url,
        };
        let found = extract_records(&text, &options.extract, options.rules, &doc)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        debug!(path = %path.display(), records = found.len(), "read document");
        records.extend(found);
    }

    let total = records.len();
    let records = sort_records(dedup_records(records));
    info!(
        root = %root.display(),
        files = files.len(),
        records = records.len(),
        duplicates = total - records.len(),
        "read corpus"
    );
    Ok(records)
}

/// `.md` files (any case) directly inside `root`, sorted by file name.
fn markdown_files(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root)
        .with_context(|| format!("failed to read directory: {}", root.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read directory: {}", root.display()))?
            .path();
        let is_markdown = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("md"));
        if is_markdown && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Name of the directory two levels above the document.
/// "docs/beta/api/team-get.md" → "beta"
fn endpoint_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// "docs/beta/api/team-get.md" → "{base}team-get{suffix}"
fn doc_url(path: &Path, base: &str, suffix: &str) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!("{base}{stem}{suffix}")
}

/// Drop records whose `(method, path)` was already seen; first one wins.
pub fn dedup_records(records: Vec<ApiRecord>) -> Vec<ApiRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.key()))
        .collect()
}

/// Stable sort by [`ApiRecord::sort_key`].
pub fn sort_records(mut records: Vec<ApiRecord>) -> Vec<ApiRecord> {
    records.sort_by_cached_key(ApiRecord::sort_key);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DocVersion};
    use crate::model::{record, Method};
    use tempfile::TempDir;

    fn read(root: &Path) -> Result<Vec<ApiRecord>> {
        let config = Config::default();
        let rules = config.ownership_rules().unwrap();
        let options = CorpusOptions {
            extract: ExtractOptions {
                required_keywords: &config.required_keywords,
                base_urls: &config.base_urls,
            },
            rules: &rules,
            docs_base_url: &config.docs_base_url,
            url_suffix: config.url_suffix(DocVersion::Beta),
        };
        read_corpus(root, &options)
    }

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn dedup_keeps_first() {
        let mut a = record(Method::Get, "/teams/{id}");
        a.owner = "first".to_string();
        let mut b = record(Method::Get, "/teams/{id}");
        b.owner = "second".to_string();
        let c = record(Method::Delete, "/teams/{id}");
        let out = dedup_records(vec![a, b, c]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].owner, "first");
    }

    #[test]
    fn sort_orders_by_path_then_method() {
        let out = sort_records(vec![
            record(Method::Delete, "/teams/{id}"),
            record(Method::Get, "/teams/{id}/channels"),
            record(Method::Get, "/teams/{id}"),
            record(Method::Get, "/chats"),
        ]);
        let names: Vec<_> = out.iter().map(ApiRecord::short_name).collect();
        assert_eq!(
            names,
            vec!["GET /chats", "GET /teams/{id}", "DELETE /teams/{id}", "GET /teams/{id}/channels"]
        );
        for pair in out.windows(2) {
            assert!(pair[0].sort_key() <= pair[1].sort_key());
        }
    }

    #[test]
    fn reads_markdown_files_only_non_recursively() {
        let dir = TempDir::new().unwrap();
        let api = dir.path().join("beta").join("api");
        fs::create_dir_all(api.join("nested")).unwrap();
        write(&api, "team-get.md", "# Get team\nGET /teams/{team-id}\n");
        write(&api, "chat-get.MD", "# Get chat\nGET /chats/{chat-id}\n");
        write(&api, "notes.txt", "# x\nGET /teams/{id}/notes\n");
        write(&api.join("nested"), "deep.md", "# x\nGET /teams/{id}/deep\n");

        let records = read(&api).unwrap();
        let names: Vec<_> = records.iter().map(ApiRecord::short_name).collect();
        assert_eq!(names, vec!["GET /chats/{id}", "GET /teams/{id}"]);
        let team = &records[1];
        assert_eq!(team.endpoint, "beta");
        assert_eq!(
            team.doc_url,
            "https://docs.microsoft.com/graph/api/team-get?view=graph-rest-beta"
        );
        assert_eq!(team.doc_file_path, api.join("team-get.md"));
    }

    #[test]
    fn duplicate_across_files_keeps_first_by_name() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "b-second.md",
            "# x\n| Application | Second.Read.All |\nGET /teams/{teamId}\n",
        );
        write(
            dir.path(),
            "a-first.md",
            "# x\n| Application | First.Read.All |\nGET /teams/{team-id}\n",
        );
        let records = read(dir.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].app_permissions, "First.Read.All");
        let keys: HashSet<_> = records.iter().map(ApiRecord::key).collect();
        assert_eq!(keys.len(), records.len());
    }

    #[test]
    fn malformed_document_aborts_the_read() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "ok.md", "# x\nGET /teams/{id}\n");
        write(dir.path(), "bad.md", "# x\nPOST\tteams\n");
        let err = read(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("bad.md"), "{err:#}");
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(read(&dir.path().join("absent")).is_err());
    }
}
