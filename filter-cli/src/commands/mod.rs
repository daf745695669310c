mod convert;
mod operators;
mod request;
mod validate;

use crate::argparse::{Commands, FilterInputArgs, SchemaArgs};
use anyhow::Result;
pub use convert::{handle_decode_command, handle_encode_command, handle_normalize_command, handle_serialize_command};
use filter_cli::config::{read_filter_json, Schema};
use filter_expr::Group;
pub use operators::handle_operators_command;
pub use request::handle_request_command;
pub use validate::handle_validate_command;

/// Run a subcommand. `Ok(false)` means the command ran but the filter was rejected.
pub fn handle_command(command: Commands) -> Result<bool> {
    match command {
        Commands::Validate(args) => handle_validate_command(args),
        Commands::Normalize(args) => handle_normalize_command(args).map(|_| true),
        Commands::Serialize(args) => handle_serialize_command(args).map(|_| true),
        Commands::Encode(args) => handle_encode_command(args).map(|_| true),
        Commands::Decode(args) => handle_decode_command(args).map(|_| true),
        Commands::Request(args) => handle_request_command(args).map(|_| true),
        Commands::Operators(args) => handle_operators_command(args).map(|_| true),
    }
}

fn read_input(input: &FilterInputArgs) -> Result<serde_json::Value> {
    read_filter_json(input.filter.as_deref(), input.file.as_deref())
}

fn read_group(input: &FilterInputArgs) -> Result<Group> {
    Ok(Group::from_json_value(&read_input(input)?)?)
}

fn resolve_schema(args: &SchemaArgs) -> Result<Schema> {
    Schema::resolve(args.dataset, args.fields.as_deref(), args.support.as_deref())
}
