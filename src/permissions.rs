//! Permission tokens: cell normalization, granularity and review sort order.

/// Broad all-access scopes that do not count as granular.
pub const COARSE_PERMISSIONS: &[&str] = &[
    "Group.Read.All",
    "Group.ReadWrite.All",
    "User.Read.All",
    "User.ReadWrite.All",
    "Directory.Read.All",
    "Directory.ReadWrite.All",
];

/// Cell text meaning "no access this way".
pub const NOT_SUPPORTED: &str = "Not supported";

/// Read/write rank for tokens mentioning neither `Read` nor `Write`.
pub const DEFAULT_UNMATCHED_RANK: char = 's';

/// Row of a permissions table, identified by its first cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionType {
    Delegated,
    Application,
}

impl PermissionType {
    pub const ALL: [PermissionType; 2] = [PermissionType::Delegated, PermissionType::Application];

    /// First cell of the row with all spaces and tabs removed.
    pub fn row_label(self) -> &'static str {
        match self {
            PermissionType::Delegated => "Delegated(workorschoolaccount)",
            PermissionType::Application => "Application",
        }
    }
}

/// Normalize a raw permission cell into a space-joined token string.
///
/// Commas become separators, a trailing period and `**` emphasis are dropped.
/// `"Not supported."` normalizes to `"Not supported"`.
pub fn normalize_cell(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    trimmed
        .replace("**", "")
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a normalized permission string into tokens. A trailing
/// `Not supported` phrase contributes no tokens.
pub fn tokens(perms: &str) -> Vec<&str> {
    let trimmed = perms.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(NOT_SUPPORTED).unwrap_or(trimmed);
    trimmed.split_whitespace().collect()
}

pub fn is_granular(token: &str) -> bool {
    !token.is_empty() && !COARSE_PERMISSIONS.contains(&token)
}

/// True when the string holds at least one token outside the coarse set.
pub fn has_granular(perms: &str) -> bool {
    tokens(perms).into_iter().any(is_granular)
}

/// Sort handle for ordering permission lists for review.
///
/// Basic reads come first, then writes, then reads, then everything else;
/// within that, resource-specific (`.Group`) scopes before others, and
/// `Group.` before `Directory.` before the rest. The token itself breaks ties.
pub fn sort_handle(perm: &str, unmatched_rank: char) -> String {
    let readwrite = if perm.contains("ReadBasic") {
        'b'
    } else if perm.contains("Write") {
        'w'
    } else if perm.contains("Read") {
        'r'
    } else {
        unmatched_rank
    };

    let scope = if perm.contains(".Group") { 'r' } else { 'z' };

    let resource = if perm.contains("Group.") {
        'o'
    } else if perm.contains("Directory.") {
        'p'
    } else {
        'n'
    };

    format!("{readwrite} {scope} {resource} {perm}")
}

/// Stable sort of permission tokens by [`sort_handle`].
pub fn sort_permissions<S: AsRef<str>>(perms: &mut [S], unmatched_rank: char) {
    perms.sort_by_cached_key(|p| sort_handle(p.as_ref(), unmatched_rank));
}
