//! Shared fixtures for the filter-expr integration tests

#![allow(dead_code)]

use filter_expr::{Condition, FieldDef, FieldType, Group};
use serde_json::{json, Value as JsonValue};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A small people dataset covering every field type
pub fn people_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("name", "Name", FieldType::String),
        FieldDef::new("age", "Age", FieldType::Number),
        FieldDef::new("role", "Role", FieldType::String),
        FieldDef::new("isActive", "Active", FieldType::Boolean),
        FieldDef::new("joined", "Joined", FieldType::Date),
    ]
}

/// { and: [ age > 30, { or: [ role = admin, { and: [ isActive = true ] } ] }, name contains "a" ]}
pub fn sample_tree() -> Group {
    Group::and(vec![
        Condition::new("age", "gt", 30).into(),
        Group::or(vec![
            Condition::new("role", "eq", "admin").into(),
            Group::and(vec![Condition::new("isActive", "eq", true).into()]).into(),
        ])
        .into(),
        Condition::new("name", "contains", "a").into(),
    ])
}

pub fn sample_wire() -> JsonValue {
    json!({"and": [
        {"field": "age", "operator": "gt", "value": 30},
        {"or": [
            {"field": "role", "operator": "=", "value": "admin"},
            {"and": [{"field": "isActive", "operator": "eq", "value": true}]}
        ]},
        {"field": "joined", "operator": "between", "value": ["2023-01-01", "2023-12-31T23:59:59Z"]}
    ]})
}

pub fn wire(value: JsonValue) -> Group {
    Group::from_json_value(&value).unwrap()
}

pub fn snapshot(group: &Group) -> JsonValue {
    group.to_json_value().unwrap()
}
