//! Conversion between wire JSON and the normalized in-memory form.
//!
//! `from_json` canonicalizes operators (`"="` becomes `eq`) and shapes values by
//! operator arity, turning date strings into [`Scalar::Date`]. `to_json` is the
//! inverse and can optionally render `eq`/`neq`/`gt`/`lt` as symbols.

use crate::errors::{FilterError, Result};
use crate::schema::{field_by_name, Arity, FieldDef, FieldType, OperatorKey};
use crate::tree::{format_date, Condition, ConditionValue, FilterNode, Group, Scalar, MAX_FILTER_DEPTH};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, trace};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Emit `=`, `!=`, `>`, `<` instead of `eq`, `neq`, `gt`, `lt`.
    pub use_symbol_ops: bool,
}

impl SerializeOptions {
    pub fn symbols() -> Self {
        Self {
            use_symbol_ops: true,
        }
    }
}

fn field_type_of(fields: &[FieldDef], name: &str) -> Result<FieldType> {
    field_by_name(fields, name)
        .map(|f| f.field_type)
        .ok_or_else(|| FilterError::UnknownField(name.to_string()))
}

fn to_key(op: &str) -> Result<OperatorKey> {
    OperatorKey::canonicalize(op).ok_or_else(|| FilterError::UnknownOperator(op.to_string()))
}

/// Parse a date the way a browser `Date` constructor would for the common cases:
/// RFC 3339, a naive date-time (taken as UTC) or a bare `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(d.and_utc());
    }
    if let Ok(d) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Some(d.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

/// Inbound scalar coercion. Only date fields are touched; unparsable input becomes
/// null.
fn coerce_in(field_type: FieldType, value: &Scalar) -> Scalar {
    if field_type != FieldType::Date {
        return value.clone();
    }
    let parsed = match value {
        Scalar::Date(d) => Some(*d),
        Scalar::String(s) => parse_date(s),
        // Epoch milliseconds.
        Scalar::Number(n) if n.is_finite() => DateTime::from_timestamp_millis(*n as i64),
        _ => None,
    };
    parsed.map(Scalar::Date).unwrap_or(Scalar::Null)
}

/// Outbound scalar coercion: dates become ISO strings.
fn coerce_out(_field_type: FieldType, value: &Scalar) -> Scalar {
    match value {
        Scalar::Date(d) => Scalar::String(format_date(d)),
        other => other.clone(),
    }
}

/// Shape a value by arity. Absent values stay absent; `none` operators never carry a
/// value.
fn shape_value(
    field_type: FieldType,
    arity: Arity,
    value: Option<&ConditionValue>,
    coerce: fn(FieldType, &Scalar) -> Scalar,
) -> Option<ConditionValue> {
    let value = value?;
    let coerce_all = |items: &[Scalar]| -> Vec<Scalar> {
        items.iter().map(|s| coerce(field_type, s)).collect()
    };

    match (arity, value) {
        (Arity::None, _) => None,
        (Arity::One, ConditionValue::Scalar(s)) => Some(ConditionValue::Scalar(coerce(field_type, s))),
        // Left for the validator to flag.
        (Arity::One, ConditionValue::List(items)) => Some(ConditionValue::List(items.clone())),
        (Arity::Two, ConditionValue::List(items)) if items.len() == 2 => {
            Some(ConditionValue::List(coerce_all(items)))
        }
        (Arity::Two, _) => Some(ConditionValue::List(vec![Scalar::Null, Scalar::Null])),
        (Arity::Array, ConditionValue::List(items)) => Some(ConditionValue::List(coerce_all(items))),
        (Arity::Array, ConditionValue::Scalar(_)) => Some(ConditionValue::List(Vec::new())),
    }
}

/// Rebuild `group` with every condition passed through `f`.
fn map_conditions<F>(group: &Group, depth: usize, f: &F) -> Result<Group>
where
    F: Fn(&Condition) -> Result<Condition>,
{
    if depth > MAX_FILTER_DEPTH {
        return Err(FilterError::MalformedNode(format!(
            "nesting exceeds maximum depth of {}",
            MAX_FILTER_DEPTH
        )));
    }
    let children = group
        .children()
        .iter()
        .map(|child| match child {
            FilterNode::Group(g) => Ok(map_conditions(g, depth + 1, f)?.into()),
            FilterNode::Condition(c) => Ok(f(c)?.into()),
        })
        .collect::<Result<Vec<FilterNode>>>()?;
    Ok(Group::new(group.key(), children))
}

/// Normalize a wire filter: canonical operator keys, arity-shaped values and parsed
/// dates.
pub fn from_json(raw: &Group, fields: &[FieldDef]) -> Result<Group> {
    debug!("normalizing filter with {} top-level nodes", raw.len());
    map_conditions(raw, 0, &|cond: &Condition| {
        let field_type = field_type_of(fields, &cond.field)?;
        let key = to_key(&cond.operator)?;
        let value = shape_value(field_type, key.arity(), cond.value.as_ref(), coerce_in);
        trace!("normalized {} {} -> {}", cond.field, cond.operator, key);
        Ok(Condition {
            field: cond.field.clone(),
            operator: key.to_string(),
            value,
        })
    })
}

/// Turn date strings on date fields into [`Scalar::Date`] and leave everything else as
/// written: operators keep their spelling, values keep their shape and strings that do
/// not parse stay strings. This prepares wire input for validation without hiding
/// arity problems the way [`from_json`] does.
pub fn parse_date_values(raw: &Group, fields: &[FieldDef]) -> Result<Group> {
    map_conditions(raw, 0, &|cond: &Condition| {
        let is_date = field_by_name(fields, &cond.field).is_some_and(|f| f.field_type == FieldType::Date);
        if !is_date {
            return Ok(cond.clone());
        }
        let parse = |s: &Scalar| match s {
            Scalar::String(text) => parse_date(text).map_or_else(|| s.clone(), Scalar::Date),
            other => other.clone(),
        };
        let value = cond.value.as_ref().map(|v| match v {
            ConditionValue::Scalar(s) => ConditionValue::Scalar(parse(s)),
            ConditionValue::List(items) => ConditionValue::List(items.iter().map(parse).collect()),
        });
        Ok(Condition {
            value,
            ..cond.clone()
        })
    })
}

/// Produce wire JSON from a normalized filter.
pub fn to_json(root: &Group, fields: &[FieldDef], options: &SerializeOptions) -> Result<Group> {
    debug!(
        "serializing filter with {} top-level nodes (symbols: {})",
        root.len(),
        options.use_symbol_ops
    );
    map_conditions(root, 0, &|cond: &Condition| {
        let field_type = field_type_of(fields, &cond.field)?;
        let key = to_key(&cond.operator)?;
        Ok(Condition {
            field: cond.field.clone(),
            operator: key.wire_name(options.use_symbol_ops),
            value: shape_value(field_type, key.arity(), cond.value.as_ref(), coerce_out),
        })
    })
}

/// Parse wire JSON text.
pub fn parse_filter(text: &str) -> Result<Group> {
    let value: JsonValue = serde_json::from_str(text)?;
    Group::from_json_value(&value)
}

/// JSON text of `filter`, percent-encoded as one query-string value.
pub fn encode_filter_param(filter: &Group) -> Result<String> {
    let text = serde_json::to_string(filter)?;
    Ok(urlencoding::encode(&text).into_owned())
}

/// Inverse of [`encode_filter_param`].
pub fn decode_filter_param(param: &str) -> Result<Group> {
    let text = urlencoding::decode(param).map_err(|e| FilterError::Decode(e.to_string()))?;
    parse_filter(&text)
}

#[cfg(test)]
mod tests;
