//! API record extraction from one documentation page.
//!
//! Only the region before the page's `## Examples` heading is considered.
//! Every request line in that region that mentions a required keyword becomes
//! one record; all records of a page share the page's permission table.

use crate::error::{Error, Result};
use crate::markdown::{find_permission_row, lines_before_examples, permission_cell};
use crate::model::{ApiRecord, Method};
use crate::ownership::OwnershipRules;
use crate::permissions::{has_granular, normalize_cell, PermissionType};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// A verb followed by whitespace, or glued straight onto a path or host.
static RE_REQUEST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:GET|PUT|POST|PATCH|DELETE)(?:\s|/|https?://|$)").unwrap()
});

/// Resource-id placeholder spellings collapsed to `{id}`.
const ID_ALIASES: &[&str] = &[
    "{teamId}",
    "{team-id}",
    "{channel-id}",
    "{chat-id}",
    "{chatId}",
    "{app-installation-id}",
    "{message-id}",
    "{tab-id}",
    "{chatThread-id}",
    "{membership-id}",
    "{reply-id}",
    "{app-id}",
    "{hosted-content-id}",
    "{user-id}",
    "{userId}",
    "{meetingId}",
];

/// Relevance filter and host prefixes applied to request lines.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions<'a> {
    pub required_keywords: &'a [String],
    pub base_urls: &'a [String],
}

/// Where a page came from.
#[derive(Debug, Clone, Copy)]
pub struct DocumentInfo<'a> {
    pub path: &'a Path,
    pub endpoint: &'a str,
    pub doc_url: &'a str,
}

/// Permission strings found in a page's table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagePermissions {
    pub delegated: String,
    pub application: String,
    pub delegated_docs: String,
    pub application_docs: String,
}

impl PagePermissions {
    /// Scan `lines` for the first delegated and application rows.
    pub fn scan<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let (delegated_docs, delegated) = row_permissions(lines, PermissionType::Delegated)?;
        let (application_docs, application) = row_permissions(lines, PermissionType::Application)?;
        Ok(Self {
            delegated,
            application,
            delegated_docs,
            application_docs,
        })
    }

    /// Both sides name at least one scope outside the coarse set.
    pub fn is_granular(&self) -> bool {
        has_granular(&self.delegated) && has_granular(&self.application)
    }
}

/// Raw and normalized cell of the first row of `kind`; empty when absent.
fn row_permissions<S: AsRef<str>>(lines: &[S], kind: PermissionType) -> Result<(String, String)> {
    match find_permission_row(lines, kind) {
        Some(idx) => {
            let raw = permission_cell(lines[idx].as_ref())?;
            Ok((raw.to_string(), normalize_cell(raw)))
        }
        None => Ok((String::new(), String::new())),
    }
}

fn contains_any_word(line: &str, words: &[String]) -> bool {
    let lower = line.to_lowercase();
    words.iter().any(|w| lower.contains(&w.to_lowercase()))
}

/// Remove every occurrence of the known host prefixes.
pub fn strip_base_urls(line: &str, base_urls: &[String]) -> String {
    base_urls
        .iter()
        .fold(line.to_string(), |acc, base| acc.replace(base.as_str(), ""))
}

/// Normalize the resource part of a request line: drop a trailing
/// parenthesized clause and collapse id placeholders to `{id}`.
pub fn normalize_path(resource: &str) -> String {
    let resource = resource.trim();
    let resource = match resource.rfind('(') {
        Some(idx) => &resource[..idx],
        None => resource,
    };
    ID_ALIASES
        .iter()
        .fold(resource.trim().to_string(), |acc, alias| acc.replace(alias, "{id}"))
}

/// Split a trimmed, host-stripped request line into method and path.
pub fn parse_request_line(line: &str) -> Result<(Method, String)> {
    let (verb, rest) = line
        .split_once(' ')
        .ok_or_else(|| Error::MalformedRequestLine(line.to_string()))?;
    let method = verb
        .trim()
        .parse::<Method>()
        .map_err(|_| Error::MalformedRequestLine(line.to_string()))?;
    Ok((method, normalize_path(rest)))
}

/// Extract one record per qualifying request line of a page.
pub fn extract_records(
    text: &str,
    options: &ExtractOptions,
    rules: &OwnershipRules,
    doc: &DocumentInfo,
) -> Result<Vec<ApiRecord>> {
    let lines: Vec<&str> = text.lines().collect();
    let scoped = lines_before_examples(&lines);

    let requests: Vec<String> = scoped
        .iter()
        .skip(1)
        .filter(|line| contains_any_word(line, options.required_keywords))
        .map(|line| line.trim())
        .filter(|line| RE_REQUEST_LINE.is_match(line))
        .map(|line| strip_base_urls(line, options.base_urls))
        .collect();

    if requests.is_empty() {
        return Ok(Vec::new());
    }

    let perms = PagePermissions::scan(scoped)?;
    let granular = perms.is_granular();

    requests
        .iter()
        .map(|line| {
            let (method, path) = parse_request_line(line)?;
            Ok(ApiRecord {
                method,
                path,
                delegated_permissions: perms.delegated.clone(),
                app_permissions: perms.application.clone(),
                delegated_permissions_docs: perms.delegated_docs.clone(),
                app_permissions_docs: perms.application_docs.clone(),
                endpoint: doc.endpoint.to_string(),
                owner: rules.classify(line).to_string(),
                has_granular_permissions: granular,
                in_v1: false,
                doc_file_path: doc.path.to_path_buf(),
                doc_url: doc.doc_url.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn extract(text: &str) -> Result<Vec<ApiRecord>> {
        let config = Config::default();
        let rules = config.ownership_rules().unwrap();
        let options = ExtractOptions {
            required_keywords: &config.required_keywords,
            base_urls: &config.base_urls,
        };
        let doc = DocumentInfo {
            path: Path::new("api-reference/beta/api/channel-list.md"),
            endpoint: "beta",
            doc_url: "https://docs.microsoft.com/graph/api/channel-list?view=graph-rest-beta",
        };
        extract_records(text, &options, &rules, &doc)
    }

    const LIST_CHANNELS: &str = "\
# List channels

## Permissions

| Permission type | Permissions (from least to most privileged) |
|:----------------|:--------------------------------------------|
| Delegated (work or school account) | Channel.ReadBasic.All, Group.Read.All |
| Delegated (personal Microsoft account) | Not supported. |
| Application | Group.Read.All, Channel.ReadBasic.All |

## HTTP request

```http
GET /teams/{team-id}/channels
```

## Examples

```http
POST https://graph.microsoft.com/v1.0/teams/{id}/channels
```
";

    #[test]
    fn request_before_examples_is_extracted() {
        let records = extract(LIST_CHANNELS).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.method, Method::Get);
        assert_eq!(r.path, "/teams/{id}/channels");
        assert_eq!(r.app_permissions, "Group.Read.All Channel.ReadBasic.All");
        assert_eq!(r.delegated_permissions, "Channel.ReadBasic.All Group.Read.All");
        assert_eq!(r.app_permissions_docs, " Group.Read.All, Channel.ReadBasic.All ");
        assert!(r.has_granular_permissions);
        assert!(!r.in_v1);
        assert_eq!(r.owner, "Teams");
        assert_eq!(r.endpoint, "beta");
        assert!(r.doc_url.ends_with("channel-list?view=graph-rest-beta"));
    }

    #[test]
    fn request_after_examples_is_ignored() {
        let text = "\
# List channels

## HTTP request

## Examples

GET /teams/{team-id}/channels

| Application | Group.Read.All, Channel.ReadBasic.All |
";
        assert!(extract(text).unwrap().is_empty());
    }

    #[test]
    fn granular_needs_both_sides() {
        let text = "\
# t
| Delegated (work or school account) | Group.Read.All |
| Application | Group.Read.All, Channel.ReadBasic.All |
GET /teams/{id}/channels
";
        let records = extract(text).unwrap();
        assert!(!records[0].has_granular_permissions);
    }

    #[test]
    fn missing_rows_are_empty() {
        let records = extract("# t\nGET /teams\n").unwrap();
        assert_eq!(records[0].delegated_permissions, "");
        assert_eq!(records[0].app_permissions, "");
        assert_eq!(records[0].app_permissions_docs, "");
        assert!(!records[0].has_granular_permissions);
    }

    #[test]
    fn not_supported_is_kept_but_not_granular() {
        let text = "\
# t
| Delegated (work or school account) | ChannelMessage.Send |
| Application | Not supported. |
POST /teams/{id}/channels/{id}/messages
";
        let records = extract(text).unwrap();
        assert_eq!(records[0].app_permissions, "Not supported");
        assert!(!records[0].has_granular_permissions);
        assert_eq!(records[0].owner, "Messaging");
    }

    #[test]
    fn base_urls_and_aliases_are_normalized() {
        let text = "\
# t
POST https://graph.microsoft.com/beta/chats/{chat-id}/members
GET https://graph.microsoft.com/v1.0/users/{user-id}/teamwork/installedApps/{app-installation-id}
";
        let records = extract(text).unwrap();
        let paths: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/chats/{id}/members", "/users/{id}/teamwork/installedApps/{id}"]
        );
        assert_eq!(records[1].owner, "Apps");
    }

    #[test]
    fn trailing_parenthesized_clause_is_dropped() {
        let text = "# t\nGET /teams/{id}/channels/getAllMessages (preview)\n";
        let records = extract(text).unwrap();
        assert_eq!(records[0].path, "/teams/{id}/channels/getAllMessages");
    }

    #[test]
    fn first_line_and_unrelated_lines_are_skipped() {
        let text = "\
GET /teams/{id}
GET /users/{id}
GETTING started with teams
DELETE /teams/{id}
";
        let records = extract(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].method, Method::Delete);
    }

    #[test]
    fn records_of_a_page_share_permissions() {
        let text = "\
# t
| Application | TeamSettings.ReadWrite.All |
| Delegated (work or school account) | TeamSettings.ReadWrite.All |
PATCH /teams/{id}
  PUT /groups/{id}/team
";
        let records = extract(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].method, Method::Put);
        assert_eq!(records[1].path, "/groups/{id}/team");
        assert!(records.iter().all(|r| r.has_granular_permissions));
        assert!(records
            .iter()
            .all(|r| r.app_permissions == "TeamSettings.ReadWrite.All"));
    }

    #[test]
    fn verb_without_space_is_fatal() {
        let text = "# t\nGET\tteams\n";
        assert_eq!(
            extract(text),
            Err(Error::MalformedRequestLine("GET\tteams".to_string()))
        );
    }

    #[test]
    fn verb_glued_to_path_is_fatal() {
        assert_eq!(
            extract("# t\nGET/teams/{team-id}/channels\n"),
            Err(Error::MalformedRequestLine("GET/teams/{team-id}/channels".to_string()))
        );
        assert_eq!(
            extract("# t\nDELETEhttps://graph.microsoft.com/beta/teams/{teamId}\n"),
            Err(Error::MalformedRequestLine("DELETE/teams/{teamId}".to_string()))
        );
    }

    #[test]
    fn verb_prefixed_prose_is_not_a_request() {
        let text = "# t\nGETTING started with teams\nPOSTS in a channel are messages\n";
        assert!(extract(text).unwrap().is_empty());
    }

    #[test]
    fn no_requests_means_no_records() {
        let text = "# Overview of teams\n\nTeams are collections of channels.\n";
        assert!(extract(text).unwrap().is_empty());
    }
}
