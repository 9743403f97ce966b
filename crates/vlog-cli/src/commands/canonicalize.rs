//! Canonicalize command implementation.

use crate::input;
use serde_json::Value;

pub fn run(input: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let json_str = input::read_text(input.as_deref())?;

    let value: Value =
        serde_json::from_str(&json_str).map_err(|e| format!("Invalid JSON: {}", e))?;

    let bytes = vlog_canonical::to_canonical_bytes(&value)
        .map_err(|e| format!("Canonicalization failed: {}", e))?;

    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}
