use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::serializer::ValueSerializer;

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalizationError {
    /// Floating-point numbers have no single cross-platform representation.
    #[error("floats are forbidden in deterministic canonicalization (at {0})")]
    FloatNotAllowed(String),
    /// Byte strings would require an implicit encoding choice.
    #[error("bytes are forbidden in deterministic canonicalization (at {0})")]
    BytesNotAllowed(String),
    /// Map keys must be strings.
    #[error("map keys must be strings (at {0})")]
    NonStringKey(String),
    /// Integer cannot be represented.
    #[error("integer out of range at {0}")]
    IntegerOutOfRange(String),
    /// A deny-listed key appeared at the top level of deterministic fields.
    #[error("forbidden key in deterministic_fields: {0:?}")]
    ForbiddenKey(String),
    /// Deterministic fields of a stream event could not be canonicalized.
    #[error("deterministic_fields not canonicalizable; kind={kind} index={index}: {source}")]
    AtEvent {
        /// Position of the event in its stream.
        index: usize,
        /// Event kind identifier.
        kind: String,
        /// Underlying failure.
        #[source]
        source: Box<CanonicalizationError>,
    },
    /// Generic failure.
    #[error("other error: {0}")]
    Other(String),
}

impl serde::ser::Error for CanonicalizationError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CanonicalizationError::Other(msg.to_string())
    }
}

/// Strict, JSON-representable value tree.
///
/// Strings and object keys are NFC-normalized, numbers are integers only,
/// and object keys are ordered by code point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalValue {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// Integer of any width up to 128 bits.
    Integer(i128),
    /// NFC-normalized string.
    String(String),
    /// Ordered sequence.
    Array(Vec<CanonicalValue>),
    /// Object with sorted keys.
    Object(BTreeMap<String, CanonicalValue>),
}

impl Serialize for CanonicalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CanonicalValue::Null => serializer.serialize_unit(),
            CanonicalValue::Bool(b) => serializer.serialize_bool(*b),
            CanonicalValue::Integer(i) => {
                if let Ok(v) = i64::try_from(*i) {
                    serializer.serialize_i64(v)
                } else if let Ok(v) = u64::try_from(*i) {
                    serializer.serialize_u64(v)
                } else {
                    serializer.serialize_i128(*i)
                }
            }
            CanonicalValue::String(s) => serializer.serialize_str(s),
            CanonicalValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            CanonicalValue::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

/// Helper for building value paths in error messages.
#[derive(Debug, Clone)]
pub(crate) struct Path {
    segments: Vec<String>,
}

impl Path {
    pub(crate) fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub(crate) fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(field.to_string());
        Self { segments }
    }

    pub(crate) fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!("[{}]", index));
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "root");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && !segment.starts_with('[') {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Converts any serializable value into its canonical form.
///
/// Rules:
/// - `null`, booleans and integers pass through
/// - strings (and map keys) are normalized to Unicode NFC
/// - floats and byte strings are rejected
/// - sequences keep their order; maps must have string keys
///
/// # Example
///
/// ```rust
/// use vlog_canonical::{canonicalize, CanonicalValue};
/// use serde_json::json;
///
/// let value = canonicalize(&json!({"s": "e\u{0301}"}))?;
/// let CanonicalValue::Object(map) = value else { unreachable!() };
/// assert_eq!(map["s"], CanonicalValue::String("\u{e9}".into()));
///
/// assert!(canonicalize(&json!({"x": 1.5})).is_err());
/// # Ok::<(), vlog_canonical::CanonicalizationError>(())
/// ```
pub fn canonicalize<T: Serialize + ?Sized>(
    value: &T,
) -> Result<CanonicalValue, CanonicalizationError> {
    value.serialize(ValueSerializer::new(Path::root()))
}

/// Renders a canonical value as compact, key-sorted UTF-8 JSON.
pub fn canonical_bytes(value: &CanonicalValue) -> Result<Vec<u8>, CanonicalizationError> {
    serde_json::to_vec(value).map_err(|err| CanonicalizationError::Other(err.to_string()))
}

/// Canonicalizes `value` and renders it in one step.
pub fn to_canonical_bytes<T: Serialize + ?Sized>(
    value: &T,
) -> Result<Vec<u8>, CanonicalizationError> {
    canonical_bytes(&canonicalize(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_display() {
        let path = Path::root().push_field("a").push_index(2).push_field("b");
        assert_eq!(path.to_string(), "a[2].b");
        assert_eq!(Path::root().to_string(), "root");
    }

    #[test]
    fn bytes_are_compact_and_sorted() {
        let bytes = to_canonical_bytes(&json!({"b": 1, "a": {"z": [1, 2], "y": null}})).unwrap();
        assert_eq!(bytes, br#"{"a":{"y":null,"z":[1,2]},"b":1}"#.to_vec());
    }

    #[test]
    fn non_ascii_is_emitted_raw_and_controls_escaped() {
        let bytes = to_canonical_bytes(&json!({"k": "\u{e9}\n\u{1}"})).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "{\"k\":\"\u{e9}\\n\\u0001\"}"
        );
    }

    #[test]
    fn large_integers_render_exactly() {
        assert_eq!(to_canonical_bytes(&u64::MAX).unwrap(), b"18446744073709551615");
        assert_eq!(to_canonical_bytes(&i64::MIN).unwrap(), b"-9223372036854775808");
        assert_eq!(
            to_canonical_bytes(&i128::MIN).unwrap(),
            i128::MIN.to_string().into_bytes()
        );
    }

    #[test]
    fn float_error_names_location() {
        let err = canonicalize(&json!({"a": [0, {"b": 2.5}]})).unwrap_err();
        assert_eq!(err, CanonicalizationError::FloatNotAllowed("a[1].b".into()));
    }
}
