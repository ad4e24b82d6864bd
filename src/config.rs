//! Run configuration: documentation roots, relevance keywords, ownership
//! rules and rewrite switches. Loaded from TOML, with built-in defaults.

use crate::ownership::{OwnershipRule, OwnershipRules, CATCH_ALL_KEYWORD};
use crate::permissions::DEFAULT_UNMATCHED_RANK;
use crate::rewrite::RewriteOptions;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Public documentation base; the file stem and version suffix are appended.
    pub docs_base_url: String,
    /// Host prefixes stripped from request lines.
    pub base_urls: Vec<String>,
    /// A request line must mention one of these (case-insensitive).
    pub required_keywords: Vec<String>,
    /// Owners left out of the summary ratios.
    pub excluded_owners: Vec<String>,
    /// Evaluated in order; the last rule must be a catch-all.
    pub ownership: Vec<OwnershipRule>,
    pub v1: VersionConfig,
    pub beta: VersionConfig,
    pub rewrite: RewriteConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionConfig {
    pub root: Option<PathBuf>,
    /// Appended to documentation URLs; the version's built-in suffix when unset.
    pub url_suffix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteConfig {
    /// Write rewritten documents back to disk.
    pub write: bool,
    /// Read/write sort rank for tokens mentioning neither `Read` nor `Write`.
    pub unmatched_rank: char,
    /// Suffix resource-specific (`.Group`) scopes with a `*` footnote marker.
    /// Off by default.
    pub mark_resource_specific: bool,
}

impl RewriteConfig {
    pub fn options(&self) -> RewriteOptions {
        RewriteOptions {
            unmatched_rank: self.unmatched_rank,
            mark_resource_specific: self.mark_resource_specific,
        }
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            write: false,
            unmatched_rank: DEFAULT_UNMATCHED_RANK,
            mark_resource_specific: false,
        }
    }
}

/// Which documentation tree a command works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DocVersion {
    V1,
    Beta,
}

impl DocVersion {
    /// Documentation view query for this version.
    pub fn default_url_suffix(self) -> &'static str {
        match self {
            DocVersion::V1 => "?view=graph-rest-1.0",
            DocVersion::Beta => "?view=graph-rest-beta",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docs_base_url: "https://docs.microsoft.com/graph/api/".to_string(),
            base_urls: vec![
                "https://graph.microsoft.com/beta".to_string(),
                "https://graph.microsoft.com/v1.0".to_string(),
            ],
            required_keywords: strings(&["team", "channel", "chat"]),
            excluded_owners: Vec::new(),
            ownership: vec![
                OwnershipRule::new("Messaging", &["/messages", "/replies", "hostedContents"]),
                OwnershipRule::new("Apps", &["installedApps", "teamsApps", "appCatalogs", "/tabs"]),
                OwnershipRule::new("Meetings", &["onlineMeetings"]),
                OwnershipRule::new("Teams", &["team", "channel", "chat"]),
                OwnershipRule::new("GraphFW", &[CATCH_ALL_KEYWORD]),
            ],
            v1: VersionConfig::default(),
            beta: VersionConfig::default(),
            rewrite: RewriteConfig::default(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load from `path`, or fall back to the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.ownership_rules()?;
        if !self.rewrite.unmatched_rank.is_ascii_lowercase() {
            bail!(
                "rewrite.unmatched_rank must be a lowercase ASCII letter, got {:?}",
                self.rewrite.unmatched_rank
            );
        }
        Ok(())
    }

    pub fn ownership_rules(&self) -> crate::error::Result<OwnershipRules> {
        OwnershipRules::new(self.ownership.clone())
    }

    pub fn version(&self, version: DocVersion) -> &VersionConfig {
        match version {
            DocVersion::V1 => &self.v1,
            DocVersion::Beta => &self.beta,
        }
    }

    pub fn url_suffix(&self, version: DocVersion) -> &str {
        self.version(version)
            .url_suffix
            .as_deref()
            .unwrap_or(version.default_url_suffix())
    }

    /// Root for `version`: the CLI override first, then the config file.
    pub fn root(&self, version: DocVersion, cli: Option<&Path>) -> Result<PathBuf> {
        cli.map(Path::to_path_buf)
            .or_else(|| self.version(version).root.clone())
            .with_context(|| {
                format!(
                    "no documentation root for {:?}: pass it on the command line or set it in the config",
                    version
                )
            })
    }
}
