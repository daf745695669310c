use clap::{Args, Parser, Subcommand};
use filter_cli::config::Dataset;
use filter_expr::HttpMethod;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "filterctl",
    about = "Build, check and encode nested AND/OR filter expressions",
    version,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Pick which subcommand to use
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a filter against a field schema
    Validate(ValidateArgs),
    /// Normalize wire JSON: canonical operators, shaped values, parsed dates
    Normalize(ConvertArgs),
    /// Normalize, then serialize back to wire JSON
    Serialize(SerializeArgs),
    /// Percent-encode a filter for use as a query parameter
    Encode(EncodeArgs),
    /// Decode a percent-encoded filter query parameter
    Decode(DecodeArgs),
    /// Print the HTTP request that would carry a filter
    Request(RequestArgs),
    /// List the operators offered per field type
    Operators(OperatorsArgs),
}

#[derive(Args, Clone)]
pub struct FilterInputArgs {
    /// Filter JSON; read from --file or stdin when omitted
    pub filter: Option<String>,

    /// Read the filter JSON from a file
    #[arg(long, short)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct SchemaArgs {
    /// Built-in field list: people or products
    #[arg(long, default_value = "people")]
    pub dataset: Dataset,

    /// Field definitions file (YAML or JSON), overrides --dataset
    #[arg(long)]
    pub fields: Option<PathBuf>,

    /// Operator support table file (YAML or JSON)
    #[arg(long)]
    pub support: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: FilterInputArgs,

    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Validate the untyped JSON document, reporting malformed groups instead of failing
    #[arg(long)]
    pub raw: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub input: FilterInputArgs,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

#[derive(Args)]
pub struct SerializeArgs {
    #[command(flatten)]
    pub input: FilterInputArgs,

    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Emit =, !=, > and < instead of eq, neq, gt and lt
    #[arg(long)]
    pub symbols: bool,
}

#[derive(Args)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub input: FilterInputArgs,

    /// Print `key=<encoded>` using this query parameter name
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Percent-encoded filter
    pub param: String,
}

#[derive(Args)]
pub struct RequestArgs {
    /// HTTP method: get or post
    pub method: HttpMethod,

    /// Endpoint URL
    #[arg(long)]
    pub endpoint: String,

    #[command(flatten)]
    pub input: FilterInputArgs,

    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Send the filter as given instead of serializing it through the schema
    #[arg(long)]
    pub passthrough: bool,

    /// GET query parameter name
    #[arg(long, default_value = filter_expr::transport::DEFAULT_QUERY_KEY)]
    pub query_key: String,

    /// Wrap the POST body as {"<key>": filter}
    #[arg(long)]
    pub body_key: Option<String>,

    /// Extra header, as `Name: value`; repeatable
    #[arg(long = "header", short = 'H')]
    pub headers: Vec<String>,

    /// Emit symbolic operators
    #[arg(long)]
    pub symbols: bool,
}

#[derive(Args)]
pub struct OperatorsArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// List per field of the schema instead of per type
    #[arg(long)]
    pub per_field: bool,

    /// Show symbolic spellings
    #[arg(long)]
    pub symbols: bool,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
