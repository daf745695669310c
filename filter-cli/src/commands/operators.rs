use super::resolve_schema;
use crate::argparse::OperatorsArgs;
use anyhow::Result;
use filter_cli::report::{format_field_operators, format_operator_table};

pub fn handle_operators_command(args: OperatorsArgs) -> Result<()> {
    let schema = resolve_schema(&args.schema)?;
    let out = if args.per_field {
        format_field_operators(&schema.fields, &schema.support, args.symbols)
    } else {
        format_operator_table(&schema.support, args.symbols)
    };
    println!("{}", out);
    Ok(())
}
