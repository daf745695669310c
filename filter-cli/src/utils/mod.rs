mod logger;

pub use logger::init_logger;

use anyhow::Result;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Split a `Name: value` header argument.
pub fn parse_header(arg: &str) -> Result<(String, String)> {
    let (name, value) = arg
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("Header must look like 'Name: value', got '{}'", arg))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Header name is empty in '{}'", arg);
    }
    Ok((name.to_string(), value.trim().to_string()))
}
