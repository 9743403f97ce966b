//! Output formatting utilities.

use serde_json::Value;
use vlog_core::{Digest, ErrorKind, EventKind};

/// Formats a JSON document for display.
pub fn format_json(doc: &Value) -> String {
    serde_json::to_string_pretty(doc).unwrap_or_else(|_| "{}".to_string())
}

/// Prints the digest table header.
#[allow(clippy::print_literal)]
pub fn print_digest_header() {
    println!("{:<6} {:<10} {}", "INDEX", "KIND", "DIGEST");
    println!("{}", "-".repeat(82));
}

/// Formats one digest table row.
pub fn format_digest_row(index: usize, kind: EventKind, digest: &Digest) -> String {
    format!("{:<6} {:<10} {}", index, kind.as_str(), digest)
}

/// Stable label for an error kind in JSON output.
pub fn error_kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Canonicalization => "canonicalization",
        ErrorKind::AppendOnly => "append_only",
        ErrorKind::Ordering => "ordering",
        ErrorKind::Identity => "identity",
        ErrorKind::InvalidDigest => "invalid_digest",
    }
}
