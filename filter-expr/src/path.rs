//! Path addressing into a filter tree.
//!
//! A path is a slice of [`PathStep`]s walked from the root. The empty path addresses
//! the root group. The same location renders as `root.and[1].or[0]` in validation
//! issues; [`render_path`] and [`parse_issue_path`] convert between the two.

use crate::errors::{FilterError, Result};
use crate::tree::GroupKey;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const ROOT_PATH: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathStep {
    pub key: GroupKey,
    pub index: usize,
}

impl PathStep {
    pub fn new(key: GroupKey, index: usize) -> Self {
        Self { key, index }
    }

    pub fn and(index: usize) -> Self {
        Self::new(GroupKey::And, index)
    }

    pub fn or(index: usize) -> Self {
        Self::new(GroupKey::Or, index)
    }
}

/// Append one step to a rendered path.
pub fn child_path(parent: &str, key: GroupKey, index: usize) -> String {
    format!("{}.{}[{}]", parent, key, index)
}

pub fn render_path(steps: &[PathStep]) -> String {
    steps.iter().fold(ROOT_PATH.to_string(), |acc, step| {
        child_path(&acc, step.key, step.index)
    })
}

/// Parse `root.and[1].or[0]` back into steps.
pub fn parse_issue_path(path: &str) -> Result<Vec<PathStep>> {
    let rest = path
        .strip_prefix(ROOT_PATH)
        .ok_or_else(|| FilterError::Decode(format!("path must start with '{}': {}", ROOT_PATH, path)))?;

    let mut steps = Vec::new();
    if rest.is_empty() {
        return Ok(steps);
    }
    let rest = rest
        .strip_prefix('.')
        .ok_or_else(|| FilterError::Decode(format!("bad path separator in {}", path)))?;

    for segment in rest.split('.') {
        let (key, index) = segment
            .strip_suffix(']')
            .and_then(|s| s.split_once('['))
            .ok_or_else(|| FilterError::Decode(format!("bad path segment '{}'", segment)))?;
        let key = GroupKey::from_str(key)
            .map_err(|_| FilterError::Decode(format!("bad group key '{}'", key)))?;
        let index = index
            .parse::<usize>()
            .map_err(|_| FilterError::Decode(format!("bad index '{}'", index)))?;
        steps.push(PathStep::new(key, index));
    }
    Ok(steps)
}
