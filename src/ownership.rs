//! Ordered keyword rules mapping a request line to its owning team.

use crate::error::{Error, Result};
use serde::Deserialize;

/// Keyword contained in every path, used to mark the catch-all rule.
pub const CATCH_ALL_KEYWORD: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OwnershipRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl OwnershipRule {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Case-insensitive substring match of any keyword.
    fn matches(&self, context_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| context_lower.contains(&k.to_lowercase()))
    }
}

/// Rules in evaluation order, guaranteed to end in a catch-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipRules {
    rules: Vec<OwnershipRule>,
}

impl OwnershipRules {
    pub fn new(rules: Vec<OwnershipRule>) -> Result<Self> {
        for rule in &rules {
            if rule.name.trim().is_empty() {
                return Err(Error::InvalidOwnershipRule("rule name is empty".to_string()));
            }
            if rule.keywords.iter().any(|k| k.is_empty()) {
                return Err(Error::InvalidOwnershipRule(format!(
                    "rule {:?} has an empty keyword",
                    rule.name
                )));
            }
        }
        match rules.last() {
            Some(last) if last.keywords.iter().any(|k| k == CATCH_ALL_KEYWORD) => {
                Ok(Self { rules })
            }
            _ => Err(Error::MissingCatchAll),
        }
    }

    /// Name of the first rule with a keyword found in `context`.
    pub fn classify(&self, context: &str) -> &str {
        let lower = context.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .unwrap_or_else(|| self.catch_all())
            .name
            .as_str()
    }

    fn catch_all(&self) -> &OwnershipRule {
        // `new` rejects an empty list
        &self.rules[self.rules.len() - 1]
    }
}
