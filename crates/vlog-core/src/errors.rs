use thiserror::Error;
use vlog_canonical::CanonicalizationError;

/// Core error types.
///
/// Each verification failure has its own variant so callers can route
/// identity failures differently from append-only breaches.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A value could not be deterministically represented, or a forbidden
    /// key was present in deterministic fields.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
    /// The next stream is not the previous stream plus appended events.
    #[error("append-only violation: {0}")]
    AppendOnlyViolation(String),
    /// A per-correlation-id ordering rule was broken.
    #[error("ordering violation: {0}")]
    OrderingViolation(String),
    /// A required identity field is missing or malformed.
    #[error("identity violation: {0}")]
    IdentityViolation(String),
    /// An event digest handed to the stream digest was not 32 bytes.
    #[error("event digest at index {index} is {len} bytes, expected 32 (sha256)")]
    InvalidDigestLength {
        /// Position of the offending digest.
        index: usize,
        /// Observed length.
        len: usize,
    },
}

/// Discriminant of [`CoreError`], for routing without matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CoreError::Canonicalization`].
    Canonicalization,
    /// See [`CoreError::AppendOnlyViolation`].
    AppendOnly,
    /// See [`CoreError::OrderingViolation`].
    Ordering,
    /// See [`CoreError::IdentityViolation`].
    Identity,
    /// See [`CoreError::InvalidDigestLength`].
    InvalidDigest,
}

impl CoreError {
    /// Returns the error discriminant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Canonicalization(_) => ErrorKind::Canonicalization,
            CoreError::AppendOnlyViolation(_) => ErrorKind::AppendOnly,
            CoreError::OrderingViolation(_) => ErrorKind::Ordering,
            CoreError::IdentityViolation(_) => ErrorKind::Identity,
            CoreError::InvalidDigestLength { .. } => ErrorKind::InvalidDigest,
        }
    }

    /// True for canonicalization failures.
    pub fn is_canonicalization(&self) -> bool {
        self.kind() == ErrorKind::Canonicalization
    }

    /// True for append-only violations.
    pub fn is_append_only(&self) -> bool {
        self.kind() == ErrorKind::AppendOnly
    }

    /// True for ordering violations.
    pub fn is_ordering(&self) -> bool {
        self.kind() == ErrorKind::Ordering
    }

    /// True for identity violations.
    pub fn is_identity(&self) -> bool {
        self.kind() == ErrorKind::Identity
    }
}
