//! Fatal conditions raised while extracting, reconciling or rewriting.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// A line starting with an HTTP verb but with no space after it.
    #[error("malformed request line (no space after verb): {0:?}")]
    MalformedRequestLine(String),

    /// A permission row that does not have the expected pipe-delimited cells.
    #[error("malformed permission row, expected at least 3 pipe-delimited pieces: {0:?}")]
    MalformedPermissionRow(String),

    #[error("no records left after excluding owners; summary ratios are undefined")]
    EmptySummary,

    #[error("last ownership rule must be a catch-all containing the keyword \"/\"")]
    MissingCatchAll,

    #[error("invalid ownership rule: {0}")]
    InvalidOwnershipRule(String),

    #[error("unknown HTTP method: {0:?}")]
    UnknownMethod(String),
}
