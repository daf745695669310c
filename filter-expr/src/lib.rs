//! Nested AND/OR filter expressions.
//!
//! A filter is an immutable tree of [`Group`]s and [`Condition`]s. Edits go through the
//! path-addressed functions in [`actions`] and always return a new root that shares
//! every untouched subtree with the old one. [`serializer`] converts between wire JSON
//! and the normalized tree, [`validation`] checks a tree against a field schema, and
//! [`transport`] describes the HTTP request carrying a filter.

pub mod actions;
pub mod errors;
pub mod path;
pub mod schema;
pub mod serializer;
pub mod transport;
pub mod tree;
pub mod validation;

pub use actions::{
    add_condition_at, add_group_at, remove_at, replace_node_at, toggle_group_key_at, update_condition_at,
};
pub use errors::{FilterError, Result};
pub use path::{parse_issue_path, render_path, PathStep, ROOT_PATH};
pub use schema::{operators_for, Arity, FieldDef, FieldType, OperatorKey, OperatorRule, OperatorSupport};
pub use serializer::{
    decode_filter_param, encode_filter_param, from_json, parse_date, parse_date_values, parse_filter, to_json,
    SerializeOptions,
};
pub use transport::{
    build_get_request, build_post_request, create_request, to_query_string, GetRequest, HttpMethod, PostRequest,
    Request, TransportOptions,
};
pub use tree::{Condition, ConditionPatch, ConditionValue, FilterNode, Group, GroupKey, Scalar, MAX_FILTER_DEPTH};
pub use validation::{validate_filter, validate_json, IssueCode, ValidationIssue, ValidationResult};
