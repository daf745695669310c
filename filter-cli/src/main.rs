mod argparse;
mod commands;
mod utils;

use argparse::parse_args;

fn main() -> anyhow::Result<()> {
    let cli = parse_args();
    utils::init_logger(cli.verbose);

    let ok = commands::handle_command(cli.command)?;
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
