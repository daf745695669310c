use crate::tree::GroupKey;

/// Hard failures of tree edits and (de)serialization.
///
/// Semantic problems found while validating a filter are never reported through this
/// type, see [`crate::validation::ValidationIssue`].
#[derive(Debug)]
pub enum FilterError {
    /// A node path was required but an empty path was given.
    EmptyPath(&'static str),
    PathKeyMismatch {
        depth: usize,
        expected: GroupKey,
        actual: GroupKey,
    },
    IndexOutOfRange {
        depth: usize,
        key: GroupKey,
        index: usize,
        len: usize,
    },
    /// A non-final path step selected a condition.
    NotAGroup {
        depth: usize,
        key: GroupKey,
        index: usize,
    },
    NotACondition {
        key: GroupKey,
        index: usize,
    },
    UnknownField(String),
    UnknownOperator(String),
    MalformedGroup(String),
    MalformedNode(String),
    Decode(String),
    Json(serde_json::Error),
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::Json(err)
    }
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::EmptyPath(op) => write!(f, "{}: node path must not be empty", op),
            FilterError::PathKeyMismatch {
                depth,
                expected,
                actual,
            } => write!(
                f,
                "Path key mismatch at depth {}: expected {}, got {}",
                depth, expected, actual
            ),
            FilterError::IndexOutOfRange {
                depth,
                key,
                index,
                len,
            } => write!(
                f,
                "Index out of range at depth {}: {}[{}], length={}",
                depth, key, index, len
            ),
            FilterError::NotAGroup { depth, key, index } => write!(
                f,
                "Path at depth {} targets a non-group at {}[{}]",
                depth, key, index
            ),
            FilterError::NotACondition { key, index } => {
                write!(f, "Target at {}[{}] is not a condition", key, index)
            }
            FilterError::UnknownField(name) => write!(f, "Unknown field: {}", name),
            FilterError::UnknownOperator(op) => write!(f, "Unknown operator: {}", op),
            FilterError::MalformedGroup(msg) => write!(f, "Malformed group: {}", msg),
            FilterError::MalformedNode(msg) => write!(f, "Malformed node: {}", msg),
            FilterError::Decode(msg) => write!(f, "Decode error: {}", msg),
            FilterError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FilterError::Json(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
