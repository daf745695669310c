use super::{read_group, resolve_schema};
use crate::argparse::{ConvertArgs, DecodeArgs, EncodeArgs, SerializeArgs};
use crate::utils::print_json;
use anyhow::Result;
use filter_expr::{decode_filter_param, encode_filter_param, from_json, to_json, to_query_string, SerializeOptions};

pub fn handle_normalize_command(args: ConvertArgs) -> Result<()> {
    let schema = resolve_schema(&args.schema)?;
    let normalized = from_json(&read_group(&args.input)?, &schema.fields)?;
    print_json(&normalized)
}

pub fn handle_serialize_command(args: SerializeArgs) -> Result<()> {
    let schema = resolve_schema(&args.schema)?;
    let normalized = from_json(&read_group(&args.input)?, &schema.fields)?;
    let options = SerializeOptions {
        use_symbol_ops: args.symbols,
    };
    print_json(&to_json(&normalized, &schema.fields, &options)?)
}

pub fn handle_encode_command(args: EncodeArgs) -> Result<()> {
    let filter = read_group(&args.input)?;
    let out = match args.key {
        Some(key) => to_query_string(&filter, &key, &[], false)?,
        None => encode_filter_param(&filter)?,
    };
    println!("{}", out);
    Ok(())
}

pub fn handle_decode_command(args: DecodeArgs) -> Result<()> {
    print_json(&decode_filter_param(&args.param)?)
}
