//! Canonicalization primitives for the verifiable behavior log.
//!
//! Every byte that participates in an event or stream digest is produced by
//! this crate: values are reduced to a strict [`CanonicalValue`] tree
//! (integers only, NFC strings, string keys) and rendered as compact JSON
//! with code-point-sorted keys.

#![deny(missing_docs)]

/// Canonical value tree and byte rendering.
pub mod canonicalizer;
/// 32-byte digest values.
pub mod digest;
/// Forbidden-key guard for deterministic fields.
pub mod forbidden;
/// Hash-label identifiers.
pub mod identifiers;
mod serializer;
/// Validation helpers used by canonical types.
pub mod validation;

pub use canonicalizer::{
    canonical_bytes, canonicalize, to_canonical_bytes, CanonicalValue, CanonicalizationError,
};
pub use digest::{Digest, DIGEST_LEN};
pub use forbidden::{enforce_forbidden_keys, ForbiddenKeys, DEFAULT_FORBIDDEN_KEYS};
pub use identifiers::{is_hash_label, HashLabel, HASH_LABEL_PREFIX};
pub use validation::ValidationError;

/// Normalizes a string to Unicode NFC.
pub fn normalize_str(s: &str) -> String {
    serializer::nfc(s)
}
