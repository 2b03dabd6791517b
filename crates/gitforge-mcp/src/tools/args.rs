//! Typed extraction of tool-call arguments.
//!
//! Call arguments arrive as an untyped JSON map. Each handler converts
//! them eagerly into its own parameter struct through [`parse`], so
//! dynamic typing stays at this one boundary and the handler bodies
//! work with plain typed optionals.

use std::fmt;

use gitforge_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Deserialize the resolved argument map into a handler's parameter
/// struct. Unknown keys are ignored; wrong-typed values fail the call
/// with a tool-level message.
pub(crate) fn parse<T: DeserializeOwned>(arguments: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| Error::InvalidArguments(format!("invalid arguments: {}", e)))
}

/// The repository a tool call targets. Defaults are already injected by
/// the server before the handler sees the map.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RepoArgs {
    pub owner: Option<String>,
    pub repo: Option<String>,
}

impl RepoArgs {
    /// Both owner and repo must be present and non-empty.
    pub fn resolve(&self) -> Result<(&str, &str)> {
        match (non_empty(&self.owner), non_empty(&self.repo)) {
            (Some(owner), Some(repo)) => Ok((owner, repo)),
            _ => Err(Error::InvalidArguments(
                "owner and repo are required (pass them as arguments or configure defaults)"
                    .to_string(),
            )),
        }
    }
}

/// Pagination arguments shared by the list tools.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageArgs {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageArgs {
    /// Forward `page`/`limit` when positive; omit them otherwise.
    pub fn append_to(&self, query: &mut Vec<(String, String)>) {
        if let Some(page) = positive(self.page) {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = positive(self.limit) {
            query.push(("limit".to_string(), limit.to_string()));
        }
    }
}

/// An identifier that may be a numeric id or a textual alias.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum IdOrName {
    Name(String),
    Id(i64),
}

impl IdOrName {
    /// A present, non-empty, positive identifier.
    pub fn require(value: Option<Self>, name: &str) -> Result<Self> {
        match value {
            Some(IdOrName::Name(s)) if !s.is_empty() => Ok(IdOrName::Name(s)),
            Some(IdOrName::Id(n)) if n > 0 => Ok(IdOrName::Id(n)),
            _ => Err(Error::required(name)),
        }
    }
}

impl fmt::Display for IdOrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdOrName::Name(s) => f.write_str(s),
            IdOrName::Id(n) => write!(f, "{}", n),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// A positive integer, or `None` for absent/zero/negative values.
pub(crate) fn positive(value: Option<i64>) -> Option<i64> {
    value.filter(|n| *n > 0)
}

/// A required positive integer id, failing with "`name` is required".
pub(crate) fn require_id(value: Option<i64>, name: &str) -> Result<i64> {
    positive(value).ok_or_else(|| Error::required(name))
}

/// A required non-empty string, failing with "`name` is required".
pub(crate) fn require_str(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::required(name))
}

/// A present, non-empty optional string.
pub(crate) fn opt_str(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
