use super::{read_group, read_input, resolve_schema};
use crate::argparse::ValidateArgs;
use crate::utils::print_json;
use anyhow::Result;
use filter_cli::report::format_issues;
use filter_expr::{parse_date_values, validate_filter, validate_json};

pub fn handle_validate_command(args: ValidateArgs) -> Result<bool> {
    let schema = resolve_schema(&args.schema)?;

    let result = if args.raw {
        validate_json(&read_input(&args.input)?, &schema.fields, &schema.support)
    } else {
        // Only dates are parsed; arity repair would hide the issues being checked for.
        let filter = parse_date_values(&read_group(&args.input)?, &schema.fields)?;
        validate_filter(&filter, &schema.fields, &schema.support)
    };
    log::info!("Validation finished with {} issue(s)", result.issues.len());

    if args.json {
        print_json(&result)?;
    } else {
        println!("{}", format_issues(&result));
    }
    Ok(result.ok)
}
