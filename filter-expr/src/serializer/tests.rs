use super::*;
use serde_json::json;

fn fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("age", "Age", FieldType::Number),
        FieldDef::new("role", "Role", FieldType::String),
        FieldDef::new("isActive", "Active", FieldType::Boolean),
        FieldDef::new("joined", "Joined", FieldType::Date),
    ]
}

fn wire(value: serde_json::Value) -> Group {
    Group::from_json_value(&value).unwrap()
}

fn first_condition(group: &Group) -> Condition {
    group.child(0).unwrap().as_condition().unwrap().clone()
}

fn date(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

#[test]
fn test_from_json_maps_eq_alias() {
    let raw = wire(json!({"and": [{"field": "isActive", "operator": "=", "value": true}]}));
    let norm = from_json(&raw, &fields()).unwrap();
    assert_eq!(first_condition(&norm).operator, "eq");
}

#[test]
fn test_from_json_parses_dates() {
    let raw = wire(json!({"and": [
        {"field": "joined", "operator": "after", "value": "2024-01-02T00:00:00.000Z"},
        {"field": "joined", "operator": "before", "value": "2024-03-04"},
        {"field": "joined", "operator": "eq", "value": "not a date"},
        {"field": "joined", "operator": "eq", "value": null}
    ]}));
    let norm = from_json(&raw, &fields()).unwrap();
    let values: Vec<Option<ConditionValue>> = norm
        .children()
        .iter()
        .map(|c| c.as_condition().unwrap().value.clone())
        .collect();
    assert_eq!(
        values,
        vec![
            Some(Scalar::Date(date("2024-01-02T00:00:00Z")).into()),
            Some(Scalar::Date(date("2024-03-04T00:00:00Z")).into()),
            Some(Scalar::Null.into()),
            Some(Scalar::Null.into()),
        ]
    );
}

#[test]
fn test_from_json_leaves_non_date_fields_alone() {
    let raw = wire(json!({"or": [{"field": "role", "operator": "eq", "value": "2024-01-02"}]}));
    let norm = from_json(&raw, &fields()).unwrap();
    assert_eq!(first_condition(&norm).value, Some("2024-01-02".into()));
}

#[test]
fn test_from_json_drops_value_for_null_checks() {
    let raw = wire(json!({"and": [{"field": "role", "operator": "is_null", "value": "oops"}]}));
    let norm = from_json(&raw, &fields()).unwrap();
    assert_eq!(first_condition(&norm).value, None);
}

#[test]
fn test_from_json_shapes_between() {
    let raw = wire(json!({"and": [
        {"field": "age", "operator": "between", "value": [1, 5]},
        {"field": "age", "operator": "between", "value": [1]},
        {"field": "age", "operator": "between", "value": 3},
        {"field": "joined", "operator": "between", "value": ["2024-01-01", "bad"]}
    ]}));
    let norm = from_json(&raw, &fields()).unwrap();
    assert_eq!(
        norm.to_json_value().unwrap(),
        json!({"and": [
            {"field": "age", "operator": "between", "value": [1, 5]},
            {"field": "age", "operator": "between", "value": [null, null]},
            {"field": "age", "operator": "between", "value": [null, null]},
            {"field": "joined", "operator": "between", "value": ["2024-01-01T00:00:00.000Z", null]}
        ]})
    );
}

#[test]
fn test_from_json_shapes_lists() {
    let raw = wire(json!({"and": [
        {"field": "role", "operator": "in", "value": ["admin", "editor"]},
        {"field": "role", "operator": "not_in", "value": "admin"},
        {"field": "age", "operator": "in", "value": []}
    ]}));
    let norm = from_json(&raw, &fields()).unwrap();
    assert_eq!(
        norm.to_json_value().unwrap(),
        json!({"and": [
            {"field": "role", "operator": "in", "value": ["admin", "editor"]},
            {"field": "role", "operator": "not_in", "value": []},
            {"field": "age", "operator": "in", "value": []}
        ]})
    );
}

#[test]
fn test_absent_value_stays_absent() {
    let raw = wire(json!({"and": [{"field": "age", "operator": "between"}]}));
    let norm = from_json(&raw, &fields()).unwrap();
    assert_eq!(first_condition(&norm).value, None);
    let out = to_json(&norm, &fields(), &SerializeOptions::default()).unwrap();
    assert_eq!(
        out.to_json_value().unwrap(),
        json!({"and": [{"field": "age", "operator": "between"}]})
    );
}

#[test]
fn test_unknown_field_and_operator() {
    let raw = wire(json!({"and": [{"field": "nope", "operator": "eq", "value": 1}]}));
    assert!(matches!(
        from_json(&raw, &fields()),
        Err(FilterError::UnknownField(name)) if name == "nope"
    ));

    let raw = wire(json!({"and": [{"or": [{"field": "age", "operator": "like", "value": 1}]}]}));
    assert!(matches!(
        from_json(&raw, &fields()),
        Err(FilterError::UnknownOperator(op)) if op == "like"
    ));
    assert!(matches!(
        to_json(&raw, &fields(), &SerializeOptions::default()),
        Err(FilterError::UnknownOperator(_))
    ));

    // Symbols other than "=" are output-only.
    let raw = wire(json!({"and": [{"field": "age", "operator": ">", "value": 1}]}));
    assert!(matches!(
        from_json(&raw, &fields()),
        Err(FilterError::UnknownOperator(_))
    ));
}

#[test]
fn test_to_json_date_to_iso() {
    let root = Group::and(vec![Condition::new(
        "joined",
        "after",
        Scalar::Date(date("2023-08-01T00:00:00Z")),
    )
    .into()]);
    let out = to_json(&root, &fields(), &SerializeOptions::default()).unwrap();
    let value = first_condition(&out).value.unwrap();
    match value {
        ConditionValue::Scalar(Scalar::String(s)) => assert!(s.starts_with("2023-08-01")),
        other => panic!("expected a string, got {:?}", other),
    }
}

#[test]
fn test_to_json_symbol_mode() {
    let root = wire(json!({"and": [
        {"field": "age", "operator": "eq", "value": 1},
        {"field": "age", "operator": "neq", "value": 2},
        {"field": "age", "operator": "gt", "value": 3},
        {"field": "age", "operator": "=", "value": 4},
        {"or": [{"field": "age", "operator": "lt", "value": 5}]},
        {"field": "age", "operator": "between", "value": [1, 2]}
    ]}));
    let out = to_json(&root, &fields(), &SerializeOptions::symbols()).unwrap();
    assert_eq!(
        out.to_json_value().unwrap(),
        json!({"and": [
            {"field": "age", "operator": "=", "value": 1},
            {"field": "age", "operator": "!=", "value": 2},
            {"field": "age", "operator": ">", "value": 3},
            {"field": "age", "operator": "=", "value": 4},
            {"or": [{"field": "age", "operator": "<", "value": 5}]},
            {"field": "age", "operator": "between", "value": [1, 2]}
        ]})
    );

    let plain = to_json(&root, &fields(), &SerializeOptions::default()).unwrap();
    let ops: Vec<String> = plain
        .children()
        .iter()
        .filter_map(|n| n.as_condition().map(|c| c.operator.clone()))
        .collect();
    assert_eq!(ops, vec!["eq", "neq", "gt", "eq", "between"]);
}

#[test]
fn test_to_json_omits_value_for_null_checks() {
    let root = Group::and(vec![
        Condition::new("isActive", "is_not_null", Scalar::Null).into(),
        Condition::without_value("isActive", "is_null").into(),
    ]);
    let out = to_json(&root, &fields(), &SerializeOptions::default()).unwrap();
    assert_eq!(
        out.to_json_value().unwrap(),
        json!({"and": [
            {"field": "isActive", "operator": "is_not_null"},
            {"field": "isActive", "operator": "is_null"}
        ]})
    );
}

#[test]
fn test_encode_decode_param() {
    let root = wire(json!({"or": [{"field": "role", "operator": "eq", "value": "a&b c"}]}));
    let encoded = encode_filter_param(&root).unwrap();
    assert!(!encoded.contains(' '));
    assert!(!encoded.contains('&'));
    assert!(!encoded.contains('{'));
    assert_eq!(decode_filter_param(&encoded).unwrap(), root);
}

#[test]
fn test_decode_rejects_bad_input() {
    assert!(matches!(
        decode_filter_param("%7B%22and%22"),
        Err(FilterError::Json(_))
    ));
    assert!(matches!(
        decode_filter_param("%FF%FE"),
        Err(FilterError::Decode(_))
    ));
    let condition_root = urlencoding::encode(r#"{"field":"a","operator":"eq"}"#).into_owned();
    assert!(matches!(
        decode_filter_param(&condition_root),
        Err(FilterError::MalformedGroup(_))
    ));
}

#[test]
fn test_parse_date_formats() {
    assert_eq!(
        parse_date("2023-08-01T10:20:30+02:00"),
        Some(date("2023-08-01T08:20:30Z"))
    );
    assert_eq!(
        parse_date("2023-08-01T10:20:30.5"),
        Some(date("2023-08-01T10:20:30.500Z"))
    );
    assert_eq!(parse_date("2023-08-01"), Some(date("2023-08-01T00:00:00Z")));
    assert_eq!(parse_date("yesterday"), None);
}

#[test]
fn test_parse_date_values_keeps_shape() {
    let raw = wire(json!({"and": [
        {"field": "joined", "operator": "between", "value": ["2023-01-01", "later"]},
        {"field": "joined", "operator": "after", "value": 5},
        {"field": "age", "operator": "between", "value": [1]},
        {"field": "role", "operator": "is_null", "value": "2023-01-01"},
        {"field": "nope", "operator": "=", "value": 1}
    ]}));
    let out = parse_date_values(&raw, &fields()).unwrap();

    let between = out.child(0).unwrap().as_condition().unwrap();
    assert_eq!(
        between.value,
        Some(ConditionValue::List(vec![
            Scalar::Date(date("2023-01-01T00:00:00Z")),
            Scalar::String("later".to_string()),
        ]))
    );
    for i in 1..5 {
        assert_eq!(out.child(i), raw.child(i));
    }
    assert_eq!(out.child(4).unwrap().as_condition().unwrap().operator, "=");
}
