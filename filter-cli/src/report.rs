//! Plain-text rendering of validation results and operator tables.

use filter_expr::{operators_for, FieldDef, FieldType, OperatorKey, OperatorSupport, ValidationResult};
use strum::IntoEnumIterator;

/// One `path code message` line per issue, or `ok`.
pub fn format_issues(result: &ValidationResult) -> String {
    if result.ok {
        return "ok".to_string();
    }
    result
        .issues
        .iter()
        .map(|i| format!("{} {} {}", i.path, i.code, i.message))
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_ops(ops: &[OperatorKey], use_symbols: bool) -> String {
    ops.iter()
        .map(|op| op.wire_name(use_symbols))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Operators offered for every field type.
pub fn format_operator_table(support: &OperatorSupport, use_symbols: bool) -> String {
    FieldType::iter()
        .map(|t| format!("{}: {}", t, join_ops(&operators_for(t, support), use_symbols)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Operators offered for each field of a schema.
pub fn format_field_operators(fields: &[FieldDef], support: &OperatorSupport, use_symbols: bool) -> String {
    fields
        .iter()
        .map(|f| {
            format!(
                "{} ({}, {}): {}",
                f.name,
                f.label,
                f.field_type,
                join_ops(&operators_for(f.field_type, support), use_symbols)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
