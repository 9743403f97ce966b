//! Event stream model, digest engine and verification suite for the
//! verifiable behavior log.
//!
//! A [`Stream`] is an immutable, append-only sequence of [`Event`]s. Only the
//! `kind` and `deterministic_fields` of an event are committed to by its
//! digest; `observational_fields` ride along without affecting any
//! commitment.
//!
//! # Example
//!
//! ```rust
//! use vlog_core::{verify_stream, Event, EventKind, Stream, VerifyOptions};
//!
//! let label = format!("sha256:{}", "0".repeat(64));
//! let stream = Stream::new()
//!     .append(
//!         Event::builder(EventKind::Intent)
//!             .deterministic("correlation_id", "req-1")
//!             .deterministic("boundary_version", 1)
//!             .deterministic("boundary_config_hash", label.as_str())
//!             .deterministic("input_digest", label.as_str())
//!             .build(),
//!     )
//!     .append(
//!         Event::builder(EventKind::Decision)
//!             .deterministic("correlation_id", "req-1")
//!             .deterministic("policy_version", "v1")
//!             .observational("latency_ms", 12)
//!             .build(),
//!     );
//!
//! verify_stream(&stream, &VerifyOptions::default()).unwrap();
//! assert_eq!(stream.digest_hex().unwrap().len(), 64);
//! ```

#![deny(missing_docs)]

pub mod digest;
/// Error types.
pub mod errors;
/// Event model.
pub mod events;
pub mod projection;
/// Append-only event streams.
pub mod stream;
pub mod verification;

pub use digest::{
    event_canonical_bytes, event_canonical_bytes_with, event_digest, event_digest_hex,
    event_digest_payload, event_digest_payload_with, event_digest_with, stream_digest,
    stream_digest_hex, DigestOptions, SCHEMA_VERSION,
};
pub use errors::{CoreError, ErrorKind};
pub use events::{Event, EventBuilder, EventKind, Fields, ParseEventKindError};
pub use projection::project_normative;
pub use stream::{append_event, Stream};
pub use verification::{
    verify_append_only, verify_deterministic_is_canonicalizable, verify_identity_fields,
    verify_ordering, verify_stream, OrderingOptions, VerifyOptions, DEFAULT_ID_KEY,
    INTENT_BOUNDARY_FIELDS,
};
pub use vlog_canonical::{
    CanonicalValue, CanonicalizationError, Digest, ForbiddenKeys, HashLabel, DEFAULT_FORBIDDEN_KEYS,
};
