use crate::digest::Digest;
use crate::validation::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Prefix shared by every hash label.
pub const HASH_LABEL_PREFIX: &str = "sha256:";

macro_rules! newtype {
    ($name:ident, $doc:expr, $pattern:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            fn pattern() -> &'static Regex {
                static PATTERN: OnceLock<Regex> = OnceLock::new();
                PATTERN.get_or_init(|| Regex::new($pattern).expect("invalid regex"))
            }

            /// Returns true if `value` satisfies the identifier pattern.
            pub fn is_valid(value: &str) -> bool {
                Self::pattern().is_match(value)
            }

            /// Parses a validated identifier from a string.
            pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if !Self::is_valid(&s) {
                    return Err(ValidationError::PatternMismatch {
                        field: stringify!($name),
                        value: s,
                    });
                }
                Ok(Self(s))
            }

            /// Borrows the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

newtype!(
    HashLabel,
    "Reference to an externally computed digest (`sha256:` + 64 hex characters, either case).",
    r"^sha256:[0-9a-fA-F]{64}$"
);

impl HashLabel {
    /// Builds the lowercase label for a digest.
    pub fn from_digest(digest: &Digest) -> Self {
        Self(format!("{}{}", HASH_LABEL_PREFIX, digest.to_hex()))
    }

    /// Decodes the referenced digest.
    pub fn digest(&self) -> Result<Digest, ValidationError> {
        Digest::from_hex(&self.0[HASH_LABEL_PREFIX.len()..])
    }
}

/// Returns true if `value` is a well-formed hash label.
pub fn is_hash_label(value: &str) -> bool {
    HashLabel::is_valid(value)
}
