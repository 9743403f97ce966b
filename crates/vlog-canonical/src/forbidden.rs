//! Guard against observational keys leaking into deterministic fields.

use std::collections::BTreeSet;

use crate::canonicalizer::CanonicalizationError;

/// Default deny-list for top-level deterministic field keys.
pub const DEFAULT_FORBIDDEN_KEYS: [&str; 14] = [
    "output",
    "outputs",
    "trace",
    "traces",
    "timing",
    "latency",
    "duration",
    "error",
    "errors",
    "exception",
    "stack",
    "metrics",
    "log",
    "logs",
];

/// Case-insensitive set of keys that must not appear in deterministic fields.
///
/// Keys are compared after Unicode full case folding, so `\u{17f}tack` and
/// `\u{fb05}ack` both match `stack`. The check is shallow: only top-level keys are inspected, values never are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenKeys {
    folded: BTreeSet<String>,
}

impl ForbiddenKeys {
    /// Builds a deny-list from arbitrary keys.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            folded: keys.into_iter().map(|k| fold(k.as_ref())).collect(),
        }
    }

    /// An empty deny-list; disables the guard.
    pub fn none() -> Self {
        Self {
            folded: BTreeSet::new(),
        }
    }

    /// Returns true if the guard would reject `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.folded.contains(&fold(key))
    }

    /// Returns true if no key is forbidden.
    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    /// Fails on the first forbidden key in iteration order.
    pub fn enforce<'a, I>(&self, keys: I) -> Result<(), CanonicalizationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.is_empty() {
            return Ok(());
        }
        for key in keys {
            if self.contains(key) {
                return Err(CanonicalizationError::ForbiddenKey(key.to_string()));
            }
        }
        Ok(())
    }
}

impl Default for ForbiddenKeys {
    fn default() -> Self {
        Self::new(DEFAULT_FORBIDDEN_KEYS)
    }
}

/// Runs `forbidden` over the top-level keys of a deterministic field map.
pub fn enforce_forbidden_keys(
    deterministic_fields: &serde_json::Map<String, serde_json::Value>,
    forbidden: &ForbiddenKeys,
) -> Result<(), CanonicalizationError> {
    forbidden.enforce(deterministic_fields.keys().map(String::as_str))
}

fn fold(key: &str) -> String {
    caseless::default_case_fold_str(key)
}
