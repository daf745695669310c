//! Filter tree data model and its wire JSON shape.
//!
//! ```text
//! Group     := { "and": [Node, ...] } | { "or": [Node, ...] }
//! Node      := Group | Condition
//! Condition := { "field": string, "operator": string, "value"?: Scalar | [Scalar, ...] }
//! ```
//!
//! Nodes are reference counted so that edits can share untouched subtrees between
//! tree versions.

use crate::errors::{FilterError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumString};

/// Maximum group nesting accepted when walking a tree.
pub const MAX_FILTER_DEPTH: usize = 64;

// Largest integer an f64 represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GroupKey {
    And,
    Or,
}

impl GroupKey {
    pub fn toggled(self) -> Self {
        match self {
            GroupKey::And => GroupKey::Or,
            GroupKey::Or => GroupKey::And,
        }
    }
}

/// A single value. `Date` only exists in normalized trees; on the wire dates are
/// ISO-8601 strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

/// ISO-8601 rendering used on the wire, e.g. `2023-08-01T00:00:00.000Z`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Number(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Number(v as f64)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Number(v as f64)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(v: DateTime<Utc>) -> Self {
        Scalar::Date(v)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            // Integral values go out as JSON integers so `30` stays `30`.
            Scalar::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Scalar::Number(n) => serializer.serialize_f64(*n),
            Scalar::String(s) => serializer.serialize_str(s),
            Scalar::Date(d) => serializer.serialize_str(&format_date(d)),
        }
    }
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number, boolean or null")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Scalar, E> {
        Ok(Scalar::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Scalar, E> {
        Ok(Scalar::Null)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Scalar, E> {
        Ok(Scalar::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Scalar, E> {
        Ok(Scalar::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Scalar, E> {
        Ok(Scalar::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Scalar, E> {
        Ok(Scalar::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Scalar, E> {
        Ok(Scalar::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Scalar, E> {
        Ok(Scalar::String(v))
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}

/// Condition value: a scalar or a list (tuple for `between`, list for `in`/`not_in`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    List(Vec<Scalar>),
    Scalar(Scalar),
}

macro_rules! scalar_condition_value {
    ($($t:ty),*) => {
        $(impl From<$t> for ConditionValue {
            fn from(v: $t) -> Self {
                ConditionValue::Scalar(v.into())
            }
        })*
    };
}

scalar_condition_value!(Scalar, bool, f64, i64, i32, &str, String, DateTime<Utc>);

impl From<Vec<Scalar>> for ConditionValue {
    fn from(v: Vec<Scalar>) -> Self {
        ConditionValue::List(v)
    }
}

impl ConditionValue {
    pub fn pair(a: impl Into<Scalar>, b: impl Into<Scalar>) -> Self {
        ConditionValue::List(vec![a.into(), b.into()])
    }

    pub fn list<T: Into<Scalar>>(items: impl IntoIterator<Item = T>) -> Self {
        ConditionValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// A `field operator value` leaf.
///
/// `operator` is kept as written so that raw documents with unknown operators can be
/// represented and reported by the validator. `value` distinguishes an absent key
/// (`None`) from an explicit `null` (`Some(Scalar(Null))`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub value: Option<ConditionValue>,
}

fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<ConditionValue>, D::Error>
where
    D: Deserializer<'de>,
{
    // Only called when the key exists, so `null` becomes an explicit null scalar.
    ConditionValue::deserialize(deserializer).map(Some)
}

impl Condition {
    pub fn new(field: &str, operator: &str, value: impl Into<ConditionValue>) -> Self {
        Self {
            field: field.to_string(),
            operator: operator.to_string(),
            value: Some(value.into()),
        }
    }

    pub fn without_value(field: &str, operator: &str) -> Self {
        Self {
            field: field.to_string(),
            operator: operator.to_string(),
            value: None,
        }
    }

    /// Shallow merge: every field set in `patch` replaces the current one.
    pub fn merged(&self, patch: &ConditionPatch) -> Condition {
        Condition {
            field: patch.field.clone().unwrap_or_else(|| self.field.clone()),
            operator: patch
                .operator
                .clone()
                .unwrap_or_else(|| self.operator.clone()),
            value: match &patch.value {
                Some(v) => v.clone(),
                None => self.value.clone(),
            },
        }
    }
}

/// Partial update for a condition. `value: Some(None)` removes the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionPatch {
    pub field: Option<String>,
    pub operator: Option<String>,
    pub value: Option<Option<ConditionValue>>,
}

impl ConditionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn with_operator(mut self, operator: &str) -> Self {
        self.operator = Some(operator.to_string());
        self
    }

    pub fn with_value(mut self, value: impl Into<ConditionValue>) -> Self {
        self.value = Some(Some(value.into()));
        self
    }

    pub fn without_value(mut self) -> Self {
        self.value = Some(None);
        self
    }
}

/// An AND or OR group. Child order is preserved on output.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    key: GroupKey,
    children: Vec<FilterNode>,
}

/// Node of a filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Group(Arc<Group>),
    Condition(Arc<Condition>),
}

impl From<Group> for FilterNode {
    fn from(g: Group) -> Self {
        FilterNode::Group(Arc::new(g))
    }
}

impl From<Condition> for FilterNode {
    fn from(c: Condition) -> Self {
        FilterNode::Condition(Arc::new(c))
    }
}

impl FilterNode {
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            FilterNode::Group(g) => Some(g),
            FilterNode::Condition(_) => None,
        }
    }

    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            FilterNode::Group(_) => None,
            FilterNode::Condition(c) => Some(c),
        }
    }

    /// True when both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &FilterNode) -> bool {
        match (self, other) {
            (FilterNode::Group(a), FilterNode::Group(b)) => Arc::ptr_eq(a, b),
            (FilterNode::Condition(a), FilterNode::Condition(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Parse one node of an untyped wire document.
    pub fn from_json_value(value: &JsonValue) -> Result<FilterNode> {
        parse_node(value, 0)
    }
}

impl Group {
    pub fn new(key: GroupKey, children: Vec<FilterNode>) -> Self {
        Self { key, children }
    }

    pub fn empty(key: GroupKey) -> Self {
        Self::new(key, Vec::new())
    }

    pub fn empty_and() -> Self {
        Self::empty(GroupKey::And)
    }

    pub fn empty_or() -> Self {
        Self::empty(GroupKey::Or)
    }

    pub fn and(children: Vec<FilterNode>) -> Self {
        Self::new(GroupKey::And, children)
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        Self::new(GroupKey::Or, children)
    }

    pub fn key(&self) -> GroupKey {
        self.key
    }

    pub fn children(&self) -> &[FilterNode] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&FilterNode> {
        self.children.get(index)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Parse a wire document. The root must be a group.
    pub fn from_json_value(value: &JsonValue) -> Result<Group> {
        match parse_node(value, 0)? {
            FilterNode::Group(g) => Ok(Arc::unwrap_or_clone(g)),
            FilterNode::Condition(_) => Err(FilterError::MalformedGroup(
                "root must be a group".to_string(),
            )),
        }
    }

    pub fn to_json_value(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}

fn parse_node(value: &JsonValue, depth: usize) -> Result<FilterNode> {
    if depth > MAX_FILTER_DEPTH {
        return Err(FilterError::MalformedNode(format!(
            "nesting exceeds maximum depth of {}",
            MAX_FILTER_DEPTH
        )));
    }
    let obj = value
        .as_object()
        .ok_or_else(|| FilterError::MalformedNode(format!("expected an object, got {}", value)))?;

    let key = match (obj.get("and"), obj.get("or")) {
        (Some(_), Some(_)) => {
            return Err(FilterError::MalformedGroup(
                "group cannot have both 'and' and 'or'".to_string(),
            ))
        }
        (Some(list), None) => Some((GroupKey::And, list)),
        (None, Some(list)) => Some((GroupKey::Or, list)),
        (None, None) => None,
    };

    match key {
        Some((key, list)) => {
            let items = list.as_array().ok_or_else(|| {
                FilterError::MalformedGroup(format!("'{}' must hold a list of nodes", key))
            })?;
            let children = items
                .iter()
                .map(|item| parse_node(item, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            Ok(Group::new(key, children).into())
        }
        None => {
            let cond = Condition::deserialize(value)
                .map_err(|e| FilterError::MalformedNode(e.to_string()))?;
            Ok(cond.into())
        }
    }
}

impl Serialize for Group {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key.as_ref(), &self.children)?;
        map.end()
    }
}

impl Serialize for FilterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FilterNode::Group(g) => g.serialize(serializer),
            FilterNode::Condition(c) => c.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FilterNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        FilterNode::from_json_value(&value).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Group {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Group::from_json_value(&value).map_err(de::Error::custom)
    }
}
