use super::{read_group, resolve_schema};
use crate::argparse::RequestArgs;
use crate::utils::{parse_header, print_json};
use anyhow::Result;
use filter_expr::{create_request, TransportOptions};

pub fn handle_request_command(args: RequestArgs) -> Result<()> {
    let filter = read_group(&args.input)?;
    let fields = if args.passthrough {
        Vec::new()
    } else {
        resolve_schema(&args.schema)?.fields
    };

    let mut opts = TransportOptions {
        query_key: args.query_key,
        body_key: args.body_key,
        use_symbol_ops: args.symbols,
        fields,
        ..TransportOptions::default()
    };
    for header in &args.headers {
        let (name, value) = parse_header(header)?;
        opts.headers.insert(name, value);
    }

    let request = create_request(&args.endpoint, args.method, &filter, &opts)?;
    log::info!("{} {}", request.method(), request.url());
    print_json(&request)
}
