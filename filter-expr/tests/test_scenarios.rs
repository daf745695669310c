mod common;

use common::{people_fields, snapshot, wire};
use filter_expr::{
    add_condition_at, from_json, to_json, toggle_group_key_at, validate_filter, Condition, Group, IssueCode,
    OperatorSupport, SerializeOptions,
};
use serde_json::json;

#[test]
fn test_add_condition_to_empty_root() {
    let out = add_condition_at(&Group::empty_and(), &[], Condition::new("age", "gt", 30)).unwrap();
    assert_eq!(
        snapshot(&out),
        json!({"and": [{"field": "age", "operator": "gt", "value": 30}]})
    );
}

#[test]
fn test_toggle_root_key() {
    let root = wire(json!({"and": [{"field": "age", "operator": "gt", "value": 30}]}));
    let out = toggle_group_key_at(&root, &[]).unwrap();
    assert_eq!(
        snapshot(&out),
        json!({"or": [{"field": "age", "operator": "gt", "value": 30}]})
    );
}

#[test]
fn test_between_needs_two_values() {
    let root = wire(json!({"and": [{"field": "age", "operator": "between", "value": [1]}]}));
    let res = validate_filter(&root, &people_fields(), &OperatorSupport::default());
    assert!(!res.ok);
    let issue = res
        .issues
        .iter()
        .find(|i| i.code == IssueCode::ValueArityTwo)
        .unwrap();
    assert_eq!(issue.path, "root.and[0]");
}

#[test]
fn test_null_check_rejects_value() {
    let root = wire(json!({"and": [{"field": "role", "operator": "is_null", "value": "oops"}]}));
    let res = validate_filter(&root, &people_fields(), &OperatorSupport::default());
    assert!(!res.ok);
    assert!(res.has_code(IssueCode::ValueForbidden));
}

#[test]
fn test_from_json_canonicalizes_eq() {
    let raw = wire(json!({"and": [{"field": "isActive", "operator": "=", "value": true}]}));
    let norm = from_json(&raw, &people_fields()).unwrap();
    let cond = norm.child(0).unwrap().as_condition().unwrap();
    assert_eq!(cond.operator, "eq");
}

#[test]
fn test_to_json_formats_dates() {
    let raw = wire(json!({"and": [{"field": "joined", "operator": "after", "value": "2023-08-01"}]}));
    let norm = from_json(&raw, &people_fields()).unwrap();
    let out = to_json(&norm, &people_fields(), &SerializeOptions::default()).unwrap();
    let value = snapshot(&out)["and"][0]["value"].clone();
    assert!(value.as_str().unwrap().starts_with("2023-08-01"), "{}", value);
}

#[test]
fn test_normalized_sample_validates() {
    let raw = wire(common::sample_wire());
    let norm = from_json(&raw, &people_fields()).unwrap();
    let res = validate_filter(&norm, &people_fields(), &OperatorSupport::default());
    assert!(res.ok, "{:?}", res.issues);
}
