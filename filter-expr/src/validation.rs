//! Schema-driven validation of filter trees.
//!
//! Validation is observational: it walks the tree depth-first (pre-order, children
//! left to right) and collects [`ValidationIssue`]s. It never fails and never
//! repairs the tree.

use crate::path::{child_path, ROOT_PATH};
use crate::schema::{field_by_name, Arity, FieldDef, FieldType, OperatorKey, OperatorSupport};
use crate::serializer::parse_date;
use crate::tree::{Condition, ConditionValue, FilterNode, Group, GroupKey, Scalar, MAX_FILTER_DEPTH};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use strum_macros::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
pub enum IssueCode {
    #[serde(rename = "group.malformed")]
    #[strum(serialize = "group.malformed")]
    GroupMalformed,
    #[serde(rename = "field.unknown")]
    #[strum(serialize = "field.unknown")]
    FieldUnknown,
    #[serde(rename = "operator.unknown")]
    #[strum(serialize = "operator.unknown")]
    OperatorUnknown,
    #[serde(rename = "operator.disabled")]
    #[strum(serialize = "operator.disabled")]
    OperatorDisabled,
    #[serde(rename = "operator.type_mismatch")]
    #[strum(serialize = "operator.type_mismatch")]
    OperatorTypeMismatch,
    #[serde(rename = "value.forbidden")]
    #[strum(serialize = "value.forbidden")]
    ValueForbidden,
    #[serde(rename = "value.missing")]
    #[strum(serialize = "value.missing")]
    ValueMissing,
    #[serde(rename = "value.type")]
    #[strum(serialize = "value.type")]
    ValueType,
    #[serde(rename = "value.arity.two")]
    #[strum(serialize = "value.arity.two")]
    ValueArityTwo,
    #[serde(rename = "value.type.tuple")]
    #[strum(serialize = "value.type.tuple")]
    ValueTypeTuple,
    #[serde(rename = "value.arity.array")]
    #[strum(serialize = "value.arity.array")]
    ValueArityArray,
    #[serde(rename = "value.type.array")]
    #[strum(serialize = "value.type.array")]
    ValueTypeArray,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Location such as `root.and[1].or[0]`.
    pub path: String,
    pub code: IssueCode,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            ok: issues.is_empty(),
            issues,
        }
    }

    pub fn codes(&self) -> Vec<IssueCode> {
        self.issues.iter().map(|i| i.code).collect()
    }

    pub fn has_code(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    pub fn issues_at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ValidationIssue> + 'a {
        self.issues.iter().filter(move |i| i.path == path)
    }
}

/// Validate a typed filter tree.
///
/// Date fields expect normalized [`Scalar::Date`] values, so validate the output of
/// [`crate::serializer::from_json`] rather than raw wire input.
pub fn validate_filter(root: &Group, fields: &[FieldDef], support: &OperatorSupport) -> ValidationResult {
    let validator = Validator { fields, support };
    let mut issues = Vec::new();
    validator.walk_group(root, ROOT_PATH, 0, &mut issues);
    debug!("validated filter: {} issue(s)", issues.len());
    ValidationResult::from_issues(issues)
}

/// Validate an untyped wire document. Unlike a typed [`Group`], raw JSON can hold
/// malformed groups, which are reported as `group.malformed`.
///
/// Values are judged by their JSON shape, so nested lists and objects get the arity
/// code of their operator. Date fields accept any string [`parse_date`] understands.
pub fn validate_json(raw: &JsonValue, fields: &[FieldDef], support: &OperatorSupport) -> ValidationResult {
    let validator = Validator { fields, support };
    let mut issues = Vec::new();
    validator.walk_json(raw, ROOT_PATH, 0, &mut issues);
    debug!("validated raw filter: {} issue(s)", issues.len());
    ValidationResult::from_issues(issues)
}

struct Validator<'a> {
    fields: &'a [FieldDef],
    support: &'a OperatorSupport,
}

fn push(out: &mut Vec<ValidationIssue>, path: &str, code: IssueCode, message: String) {
    out.push(ValidationIssue {
        path: path.to_string(),
        code,
        message,
    });
}

fn too_deep(depth: usize, path: &str, out: &mut Vec<ValidationIssue>) -> bool {
    if depth > MAX_FILTER_DEPTH {
        push(
            out,
            path,
            IssueCode::GroupMalformed,
            format!("Group nesting exceeds {} levels", MAX_FILTER_DEPTH),
        );
        return true;
    }
    false
}

/// Value of a condition as the arity checks see it.
enum ValueShape<T> {
    Absent,
    One(T),
    Many(Vec<T>),
}

/// Null is accepted for every type; arity rules decide whether it is allowed.
fn scalar_matches(value: &Scalar, field_type: FieldType) -> bool {
    match value {
        Scalar::Null => true,
        Scalar::String(_) => field_type == FieldType::String,
        Scalar::Number(n) => field_type == FieldType::Number && n.is_finite(),
        Scalar::Bool(_) => field_type == FieldType::Boolean,
        Scalar::Date(_) => field_type == FieldType::Date,
    }
}

/// Wire counterpart of [`scalar_matches`]. Date fields take strings that parse as a
/// date; nested lists and objects never match.
fn json_matches(value: &JsonValue, field_type: FieldType) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => match field_type {
            FieldType::String => true,
            FieldType::Date => parse_date(s).is_some(),
            _ => false,
        },
        JsonValue::Number(n) => field_type == FieldType::Number && n.as_f64().is_some_and(f64::is_finite),
        JsonValue::Bool(_) => field_type == FieldType::Boolean,
        JsonValue::Array(_) | JsonValue::Object(_) => false,
    }
}

impl Validator<'_> {
    fn walk_group(&self, group: &Group, path: &str, depth: usize, out: &mut Vec<ValidationIssue>) {
        if too_deep(depth, path, out) {
            return;
        }
        for (i, child) in group.children().iter().enumerate() {
            let path = child_path(path, group.key(), i);
            match child {
                FilterNode::Group(g) => self.walk_group(g, &path, depth + 1, out),
                FilterNode::Condition(c) => self.check_condition(c, &path, out),
            }
        }
    }

    fn walk_json(&self, node: &JsonValue, path: &str, depth: usize, out: &mut Vec<ValidationIssue>) {
        let Some(obj) = node.as_object() else {
            push(
                out,
                path,
                IssueCode::GroupMalformed,
                "Node must be a group or condition object".to_string(),
            );
            return;
        };

        let group = match (obj.get("and"), obj.get("or")) {
            (Some(_), Some(_)) => {
                push(
                    out,
                    path,
                    IssueCode::GroupMalformed,
                    "Group cannot have both 'and' and 'or'".to_string(),
                );
                return;
            }
            (Some(list), None) => Some((GroupKey::And, list)),
            (None, Some(list)) => Some((GroupKey::Or, list)),
            (None, None) => None,
        };

        if let Some((key, list)) = group {
            if too_deep(depth, path, out) {
                return;
            }
            let Some(items) = list.as_array() else {
                push(
                    out,
                    path,
                    IssueCode::GroupMalformed,
                    format!("Group '{}' must hold a list", key),
                );
                return;
            };
            for (i, item) in items.iter().enumerate() {
                self.walk_json(item, &child_path(path, key, i), depth + 1, out);
            }
            return;
        }

        let field = obj.get("field").and_then(JsonValue::as_str).unwrap_or_default();
        let operator = obj.get("operator").and_then(JsonValue::as_str).unwrap_or_default();
        let Some((field_type, key)) = self.check_field_and_operator(field, operator, path, out) else {
            return;
        };
        let shape = match obj.get("value") {
            None => ValueShape::Absent,
            Some(JsonValue::Array(items)) => ValueShape::Many(items.iter().collect()),
            Some(value) => ValueShape::One(value),
        };
        self.check_value(field_type, key, shape, json_matches, path, out);
    }

    fn check_condition(&self, cond: &Condition, path: &str, out: &mut Vec<ValidationIssue>) {
        if let Some((field_type, key)) = self.check_field_and_operator(&cond.field, &cond.operator, path, out) {
            let shape = match &cond.value {
                None => ValueShape::Absent,
                Some(ConditionValue::Scalar(s)) => ValueShape::One(s),
                Some(ConditionValue::List(items)) => ValueShape::Many(items.iter().collect()),
            };
            self.check_value(field_type, key, shape, scalar_matches, path, out);
        }
    }

    /// Field and operator checks. `None` means the condition cannot be checked further.
    fn check_field_and_operator(
        &self,
        field: &str,
        operator: &str,
        path: &str,
        out: &mut Vec<ValidationIssue>,
    ) -> Option<(FieldType, OperatorKey)> {
        let Some(def) = field_by_name(self.fields, field) else {
            push(out, path, IssueCode::FieldUnknown, format!("Unknown field \"{}\"", field));
            return None;
        };
        let Some(key) = OperatorKey::canonicalize(operator) else {
            push(
                out,
                path,
                IssueCode::OperatorUnknown,
                format!("Unsupported operator \"{}\"", operator),
            );
            return None;
        };

        let field_type = def.field_type;
        if !self.support.is_enabled(field_type, key) {
            push(
                out,
                path,
                IssueCode::OperatorDisabled,
                format!("Operator {} is not enabled for type {}", key, field_type),
            );
        }
        if !key.rule().supports(field_type) {
            push(
                out,
                path,
                IssueCode::OperatorTypeMismatch,
                format!("Operator {} does not apply to type {}", key, field_type),
            );
        }
        Some((field_type, key))
    }

    /// Arity first, then element types. `matches` decides whether one element fits the
    /// field type.
    fn check_value<T: Copy>(
        &self,
        field_type: FieldType,
        key: OperatorKey,
        value: ValueShape<T>,
        matches: fn(T, FieldType) -> bool,
        path: &str,
        out: &mut Vec<ValidationIssue>,
    ) {
        match key.arity() {
            Arity::None => {
                if !matches!(value, ValueShape::Absent) {
                    push(
                        out,
                        path,
                        IssueCode::ValueForbidden,
                        format!("Operator {} must not have a value", key),
                    );
                }
            }
            Arity::One => match value {
                ValueShape::Absent => push(
                    out,
                    path,
                    IssueCode::ValueMissing,
                    format!("Operator {} requires a value", key),
                ),
                ValueShape::Many(_) => push(
                    out,
                    path,
                    IssueCode::ValueType,
                    format!("Operator {} requires a single {} value", key, field_type),
                ),
                ValueShape::One(v) if !matches(v, field_type) => push(
                    out,
                    path,
                    IssueCode::ValueType,
                    format!("Value does not match field type {}", field_type),
                ),
                ValueShape::One(_) => {}
            },
            Arity::Two => match value {
                ValueShape::Many(items) if items.len() == 2 => {
                    if !items.into_iter().all(|v| matches(v, field_type)) {
                        push(
                            out,
                            path,
                            IssueCode::ValueTypeTuple,
                            format!("Both values must be of type {}", field_type),
                        );
                    }
                }
                _ => push(
                    out,
                    path,
                    IssueCode::ValueArityTwo,
                    format!("Operator {} requires exactly two values", key),
                ),
            },
            Arity::Array => match value {
                // Empty lists are accepted.
                ValueShape::Many(items) => {
                    if !items.into_iter().all(|v| matches(v, field_type)) {
                        push(
                            out,
                            path,
                            IssueCode::ValueTypeArray,
                            format!("All list items must be of type {}", field_type),
                        );
                    }
                }
                _ => push(
                    out,
                    path,
                    IssueCode::ValueArityArray,
                    format!("Operator {} requires a list of values", key),
                ),
            },
        }
    }
}
