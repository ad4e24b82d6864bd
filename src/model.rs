//! Data model for extracted API records.

use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Width each path segment is padded to when building a sort key.
const SEGMENT_WIDTH: usize = 25;

/// HTTP verbs recognized on request lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Put,
        Method::Post,
        Method::Patch,
        Method::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Ordering rank used as the final tiebreak of [`ApiRecord::sort_key`].
    pub fn rank(self) -> u8 {
        match self {
            Method::Get => 1,
            Method::Post => 2,
            Method::Patch => 3,
            Method::Put => 4,
            Method::Delete => 5,
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::UnknownMethod(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an endpoint across documents and versions.
pub type RecordKey = (Method, String);

/// One HTTP endpoint documented in one markdown file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRecord {
    pub method: Method,
    /// Normalized URL template, e.g. `/teams/{id}/channels`
    pub path: String,
    /// Space-joined permission tokens, or empty
    pub delegated_permissions: String,
    pub app_permissions: String,
    /// Raw table cell text, as written in the document
    pub delegated_permissions_docs: String,
    pub app_permissions_docs: String,
    /// Grandparent directory name of the document
    pub endpoint: String,
    pub owner: String,
    pub has_granular_permissions: bool,
    /// Back-filled by reconciliation
    pub in_v1: bool,
    pub doc_file_path: PathBuf,
    pub doc_url: String,
}

impl ApiRecord {
    pub fn key(&self) -> RecordKey {
        (self.method, self.path.clone())
    }

    pub fn short_name(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Sort key: every path segment right-padded with `a` to a fixed width,
    /// joined back with `/`, followed by the method rank.
    pub fn sort_key(&self) -> String {
        let padded: Vec<String> = self
            .path
            .split('/')
            .map(|segment| format!("{:<width$}", segment, width = SEGMENT_WIDTH).replace(' ', "a"))
            .collect();
        format!("{} {}", padded.join("/"), self.method.rank())
    }
}

#[cfg(test)]
pub(crate) fn record(method: Method, path: &str) -> ApiRecord {
    ApiRecord {
        method,
        path: path.to_string(),
        delegated_permissions: String::new(),
        app_permissions: String::new(),
        delegated_permissions_docs: String::new(),
        app_permissions_docs: String::new(),
        endpoint: String::new(),
        owner: String::new(),
        has_granular_permissions: false,
        in_v1: false,
        doc_file_path: PathBuf::new(),
        doc_url: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trips_through_str() {
        for m in Method::ALL {
            assert_eq!(m.as_str().parse::<Method>().unwrap(), m);
        }
        assert_eq!(
            "get".parse::<Method>(),
            Err(Error::UnknownMethod("get".to_string()))
        );
    }

    #[test]
    fn method_ranks() {
        let ranks: Vec<u8> = [Method::Get, Method::Post, Method::Patch, Method::Put, Method::Delete]
            .into_iter()
            .map(Method::rank)
            .collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn sort_key_pads_segments() {
        let r = record(Method::Get, "/teams");
        let expected = format!("{}/teams{} 1", "a".repeat(25), "a".repeat(20));
        assert_eq!(r.sort_key(), expected);
    }

    #[test]
    fn shorter_prefix_sorts_before_child() {
        let parent = record(Method::Delete, "/teams/{id}");
        let child = record(Method::Get, "/teams/{id}/channels");
        assert!(parent.sort_key() < child.sort_key());
    }

    #[test]
    fn method_breaks_ties_on_same_path() {
        let get = record(Method::Get, "/teams/{id}");
        let post = record(Method::Post, "/teams/{id}");
        let delete = record(Method::Delete, "/teams/{id}");
        assert!(get.sort_key() < post.sort_key());
        assert!(post.sort_key() < delete.sort_key());
    }

    #[test]
    fn key_ignores_other_fields() {
        let mut a = record(Method::Get, "/chats");
        let b = record(Method::Get, "/chats");
        a.owner = "Teams".to_string();
        a.in_v1 = true;
        assert_eq!(a.key(), b.key());
        assert_eq!(a.short_name(), "GET /chats");
    }
}
