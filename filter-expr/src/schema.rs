//! Field schema and operator rules.
//!
//! Two independent tables decide whether an operator may be used on a field:
//! the intrinsic [`OperatorRule`] of every [`OperatorKey`] (type compatibility and
//! value arity), and the deployment-specific [`OperatorSupport`] allow-list.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
}

/// A dataset field the filter may reference. Supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn new(name: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            field_type,
        }
    }
}

/// Find a field by name.
pub fn field_by_name<'a>(fields: &'a [FieldDef], name: &str) -> Option<&'a FieldDef> {
    fields.iter().find(|f| f.name == name)
}

/// Required value shape of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Arity {
    /// `value` must be absent.
    None,
    /// A single scalar.
    One,
    /// Exactly two scalars.
    Two,
    /// Zero or more scalars.
    Array,
}

/// Canonical operator keys.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OperatorKey {
    Eq,
    Neq,
    Gt,
    Lt,
    Between,
    Before,
    After,
    Contains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

/// Legacy symbol accepted on input in place of `eq`.
pub const EQ_SYMBOL: &str = "=";

const ALL_TYPES: &[FieldType] = &[
    FieldType::String,
    FieldType::Number,
    FieldType::Boolean,
    FieldType::Date,
];
const ORDERED_TYPES: &[FieldType] = &[FieldType::Number, FieldType::Date];
const DATE_ONLY: &[FieldType] = &[FieldType::Date];
const STRING_ONLY: &[FieldType] = &[FieldType::String];
const LIST_TYPES: &[FieldType] = &[FieldType::String, FieldType::Number];

/// Intrinsic rule of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorRule {
    pub types: &'static [FieldType],
    pub arity: Arity,
}

impl OperatorRule {
    pub fn supports(&self, field_type: FieldType) -> bool {
        self.types.contains(&field_type)
    }
}

impl OperatorKey {
    pub const fn rule(self) -> OperatorRule {
        use OperatorKey::*;
        match self {
            Eq | Neq => OperatorRule {
                types: ALL_TYPES,
                arity: Arity::One,
            },
            Gt | Lt => OperatorRule {
                types: ORDERED_TYPES,
                arity: Arity::One,
            },
            Between => OperatorRule {
                types: ORDERED_TYPES,
                arity: Arity::Two,
            },
            Before | After => OperatorRule {
                types: DATE_ONLY,
                arity: Arity::One,
            },
            Contains | StartsWith | EndsWith => OperatorRule {
                types: STRING_ONLY,
                arity: Arity::One,
            },
            In | NotIn => OperatorRule {
                types: LIST_TYPES,
                arity: Arity::Array,
            },
            IsNull | IsNotNull => OperatorRule {
                types: ALL_TYPES,
                arity: Arity::None,
            },
        }
    }

    pub const fn arity(self) -> Arity {
        self.rule().arity
    }

    /// Resolve a wire operator: the `"="` alias or a canonical key. Anything else is
    /// unknown.
    pub fn canonicalize(op: &str) -> Option<OperatorKey> {
        if op == EQ_SYMBOL {
            return Some(OperatorKey::Eq);
        }
        OperatorKey::from_str(op).ok()
    }

    /// Symbolic form used when symbol output is requested.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            OperatorKey::Eq => Some("="),
            OperatorKey::Neq => Some("!="),
            OperatorKey::Gt => Some(">"),
            OperatorKey::Lt => Some("<"),
            _ => None,
        }
    }

    /// Wire spelling of this key.
    pub fn wire_name(self, use_symbols: bool) -> String {
        match self.symbol() {
            Some(sym) if use_symbols => sym.to_string(),
            _ => self.to_string(),
        }
    }
}

/// Operators enabled per field type for a deployment.
///
/// A type missing from a config file gets no operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSupport {
    #[serde(default)]
    pub string: Vec<OperatorKey>,
    #[serde(default)]
    pub number: Vec<OperatorKey>,
    #[serde(default)]
    pub boolean: Vec<OperatorKey>,
    #[serde(default)]
    pub date: Vec<OperatorKey>,
}

impl Default for OperatorSupport {
    fn default() -> Self {
        use OperatorKey::*;
        Self {
            string: vec![Eq, Neq, Contains, StartsWith, EndsWith],
            number: vec![Eq, Neq, Gt, Lt, Between],
            boolean: vec![Eq, Neq],
            date: vec![Eq, Neq, Before, After, Between],
        }
    }
}

impl OperatorSupport {
    pub fn for_type(&self, field_type: FieldType) -> &[OperatorKey] {
        match field_type {
            FieldType::String => &self.string,
            FieldType::Number => &self.number,
            FieldType::Boolean => &self.boolean,
            FieldType::Date => &self.date,
        }
    }

    pub fn is_enabled(&self, field_type: FieldType, op: OperatorKey) -> bool {
        self.for_type(field_type).contains(&op)
    }

    /// Enable an extra operator for a type (no-op if already present).
    pub fn with_operator(mut self, field_type: FieldType, op: OperatorKey) -> Self {
        let list = match field_type {
            FieldType::String => &mut self.string,
            FieldType::Number => &mut self.number,
            FieldType::Boolean => &mut self.boolean,
            FieldType::Date => &mut self.date,
        };
        if !list.contains(&op) {
            list.push(op);
        }
        self
    }
}

/// Operators a form may offer for a field type: enabled by `support` and compatible
/// with the type, in support order.
pub fn operators_for(field_type: FieldType, support: &OperatorSupport) -> Vec<OperatorKey> {
    support
        .for_type(field_type)
        .iter()
        .copied()
        .filter(|op| op.rule().supports(field_type))
        .collect()
}
