//! Event and stream digests.
//!
//! Event digest: `sha256(canonical_bytes({schema_version, kind, deterministic_fields}))`.
//! Stream digest: `sha256(i_0 || d_0 || i_1 || d_1 || ...)` with each `i` a
//! big-endian u64 index and each `d` a 32-byte event digest.

use serde::Serialize;
use sha2::{Digest as Sha2Digest, Sha256};
use vlog_canonical::{
    canonical_bytes, canonicalize, enforce_forbidden_keys, CanonicalValue, Digest, ForbiddenKeys,
    DIGEST_LEN,
};

use crate::errors::CoreError;
use crate::events::{Event, EventKind, Fields};

/// Version of the digest payload layout. Changing it changes every digest.
pub const SCHEMA_VERSION: u64 = 1;

/// Options for event digesting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestOptions {
    /// Keys rejected at the top level of deterministic fields.
    pub forbidden_keys: ForbiddenKeys,
}

impl DigestOptions {
    /// Options with the forbidden-key guard switched off.
    pub fn unguarded() -> Self {
        Self {
            forbidden_keys: ForbiddenKeys::none(),
        }
    }
}

#[derive(Serialize)]
struct DigestPayload<'a> {
    schema_version: u64,
    kind: EventKind,
    deterministic_fields: &'a Fields,
}

/// Builds the canonical payload that participates in the event digest.
///
/// Observational fields and the stream index are excluded by construction.
pub fn event_digest_payload(event: &Event) -> Result<CanonicalValue, CoreError> {
    event_digest_payload_with(event, &DigestOptions::default())
}

/// [`event_digest_payload`] with explicit options.
pub fn event_digest_payload_with(
    event: &Event,
    options: &DigestOptions,
) -> Result<CanonicalValue, CoreError> {
    enforce_forbidden_keys(event.deterministic_fields(), &options.forbidden_keys)?;
    let payload = DigestPayload {
        schema_version: SCHEMA_VERSION,
        kind: event.kind(),
        deterministic_fields: event.deterministic_fields(),
    };
    Ok(canonicalize(&payload)?)
}

/// Canonical bytes of the digest payload, without hashing.
pub fn event_canonical_bytes(event: &Event) -> Result<Vec<u8>, CoreError> {
    event_canonical_bytes_with(event, &DigestOptions::default())
}

/// [`event_canonical_bytes`] with explicit options.
pub fn event_canonical_bytes_with(
    event: &Event,
    options: &DigestOptions,
) -> Result<Vec<u8>, CoreError> {
    let payload = event_digest_payload_with(event, options)?;
    Ok(canonical_bytes(&payload)?)
}

/// SHA-256 over the canonical bytes of the digest payload.
///
/// # Example
///
/// ```rust
/// use vlog_core::{event_digest, Event, EventKind};
///
/// let a = Event::builder(EventKind::Decision)
///     .deterministic("a", 1)
///     .deterministic("b", "x")
///     .observational("t", "ignored")
///     .build();
/// let b = Event::builder(EventKind::Decision)
///     .deterministic("b", "x")
///     .deterministic("a", 1)
///     .observational("t", "different")
///     .build();
/// assert_eq!(event_digest(&a)?, event_digest(&b)?);
/// # Ok::<(), vlog_core::CoreError>(())
/// ```
///
/// # Errors
///
/// Returns [`CoreError::Canonicalization`] if deterministic fields contain a
/// float or a forbidden top-level key.
pub fn event_digest(event: &Event) -> Result<Digest, CoreError> {
    event_digest_with(event, &DigestOptions::default())
}

/// [`event_digest`] with explicit options.
pub fn event_digest_with(event: &Event, options: &DigestOptions) -> Result<Digest, CoreError> {
    let bytes = event_canonical_bytes_with(event, options)?;
    let digest = Digest::sha256(&bytes);
    tracing::trace!(kind = %event.kind(), digest = %digest, "computed event digest");
    Ok(digest)
}

/// Lowercase hex of [`event_digest`].
pub fn event_digest_hex(event: &Event) -> Result<String, CoreError> {
    Ok(event_digest(event)?.to_hex())
}

/// Commits to an ordered list of event digests.
///
/// Binds both content and position: any reordering, insertion, deletion or
/// substitution changes the result. This is a flat chain, so there are no
/// inclusion proofs; checking equality means recomputing over the whole list.
///
/// # Errors
///
/// Returns [`CoreError::InvalidDigestLength`] if any digest is not 32 bytes.
pub fn stream_digest<D: AsRef<[u8]>>(event_digests: &[D]) -> Result<Digest, CoreError> {
    let mut hasher = Sha256::new();
    for (index, digest) in event_digests.iter().enumerate() {
        let digest = digest.as_ref();
        if digest.len() != DIGEST_LEN {
            return Err(CoreError::InvalidDigestLength {
                index,
                len: digest.len(),
            });
        }
        hasher.update((index as u64).to_be_bytes());
        hasher.update(digest);
    }
    let out: [u8; DIGEST_LEN] = hasher.finalize().into();
    Ok(Digest::from_bytes(out))
}

/// Lowercase hex of [`stream_digest`].
pub fn stream_digest_hex<D: AsRef<[u8]>>(event_digests: &[D]) -> Result<String, CoreError> {
    Ok(stream_digest(event_digests)?.to_hex())
}
