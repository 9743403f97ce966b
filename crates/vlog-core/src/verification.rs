//! Verification suite: append-only growth, per-correlation-id ordering,
//! identity-field policy and canonicalizability.
//!
//! Every checker makes one left-to-right pass and fails on the first
//! violation; there are no partial results.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use vlog_canonical::{canonicalize, is_hash_label, normalize_str, CanonicalizationError};

use crate::errors::CoreError;
use crate::events::{Event, EventKind};
use crate::stream::Stream;

/// Default deterministic field holding the correlation id.
pub const DEFAULT_ID_KEY: &str = "correlation_id";

/// INTENT fields that must be present.
pub const INTENT_BOUNDARY_FIELDS: [&str; 2] = ["boundary_version", "boundary_config_hash"];

/// Options for [`verify_ordering`].
///
/// All flags are independent. The defaults allow exactly one DECISION per
/// correlation id, gate EXECUTION/PROOF behind a DECISION, and forbid a
/// DECISION after an EXECUTION/PROOF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingOptions {
    /// Deterministic field holding the correlation id.
    pub id_key: String,
    /// Require an INTENT before the first DECISION of an id.
    pub require_intent_before_decision: bool,
    /// Reject a DECISION once an EXECUTION or PROOF was seen for the id.
    pub disallow_decision_after_execution: bool,
    /// Maximum DECISION events per id; `0` disables the limit.
    pub max_decisions_per_id: u32,
}

impl Default for OrderingOptions {
    fn default() -> Self {
        Self {
            id_key: DEFAULT_ID_KEY.to_string(),
            require_intent_before_decision: false,
            disallow_decision_after_execution: true,
            max_decisions_per_id: 1,
        }
    }
}

/// Options for [`verify_stream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Ordering policy; its `id_key` is also used for identity diagnostics.
    pub ordering: OrderingOptions,
    /// Run [`verify_identity_fields`].
    pub check_identity: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            ordering: OrderingOptions::default(),
            check_identity: true,
        }
    }
}

fn reject(err: CoreError) -> CoreError {
    tracing::debug!(kind = ?err.kind(), error = %err, "stream rejected");
    err
}

/// Verifies that `next` extends `prev` by appending events only.
///
/// Compares full event content at every index of `prev`, not digests, and
/// recomputes nothing.
///
/// # Errors
///
/// Returns [`CoreError::AppendOnlyViolation`] if `next` is shorter than
/// `prev` or differs from it at any index below `prev.len()`.
pub fn verify_append_only(prev: &Stream, next: &Stream) -> Result<(), CoreError> {
    if next.len() < prev.len() {
        return Err(reject(CoreError::AppendOnlyViolation(format!(
            "next stream is shorter than previous ({} < {})",
            next.len(),
            prev.len()
        ))));
    }
    let mismatch = prev
        .iter()
        .zip(next.iter())
        .position(|(before, after)| before != after);
    if let Some(index) = mismatch {
        return Err(reject(CoreError::AppendOnlyViolation(format!(
            "prefix mismatch at index {}: stream is not append-only",
            index
        ))));
    }
    Ok(())
}

/// Verifies per-correlation-id ordering constraints.
///
/// Rules, per event:
/// - every event needs a non-empty string id under `options.id_key`
/// - INTENT records the id
/// - DECISION may require a prior INTENT, may be refused after an
///   EXECUTION/PROOF, and is counted against `max_decisions_per_id`
/// - EXECUTION and PROOF need a prior DECISION for the same id
///
/// # Example
///
/// ```rust
/// use vlog_core::{verify_ordering, Event, EventKind, OrderingOptions, Stream};
///
/// let stream = Stream::new().append(
///     Event::builder(EventKind::Execution)
///         .deterministic("correlation_id", "r1")
///         .build(),
/// );
/// let err = verify_ordering(&stream, &OrderingOptions::default()).unwrap_err();
/// assert!(err.is_ordering());
/// ```
pub fn verify_ordering(stream: &Stream, options: &OrderingOptions) -> Result<(), CoreError> {
    let id_key = options.id_key.as_str();
    let mut seen_intent: HashSet<String> = HashSet::new();
    let mut seen_decision: HashMap<String, u32> = HashMap::new();
    let mut seen_execution: HashSet<String> = HashSet::new();

    for (index, event) in stream.iter().enumerate() {
        let id = require_id(event, id_key, index)?;

        match event.kind() {
            EventKind::Intent => {
                seen_intent.insert(id);
            }
            EventKind::Decision => {
                if options.require_intent_before_decision && !seen_intent.contains(&id) {
                    return Err(reject(CoreError::OrderingViolation(format!(
                        "DECISION observed before INTENT for {}={}; index={}",
                        id_key, id, index
                    ))));
                }
                if options.disallow_decision_after_execution && seen_execution.contains(&id) {
                    return Err(reject(CoreError::OrderingViolation(format!(
                        "DECISION observed after EXECUTION/PROOF for {}={}; index={}",
                        id_key, id, index
                    ))));
                }
                let count = seen_decision.get(&id).copied().unwrap_or(0).saturating_add(1);
                if options.max_decisions_per_id > 0 && count > options.max_decisions_per_id {
                    return Err(reject(CoreError::OrderingViolation(format!(
                        "DECISION count exceeds {} for {}={}; index={}",
                        options.max_decisions_per_id, id_key, id, index
                    ))));
                }
                seen_decision.insert(id, count);
            }
            EventKind::Execution | EventKind::Proof => {
                if !seen_decision.contains_key(&id) {
                    return Err(reject(CoreError::OrderingViolation(format!(
                        "{} observed before DECISION for {}={}; index={}",
                        event.kind(),
                        id_key,
                        id,
                        index
                    ))));
                }
                seen_execution.insert(id);
            }
        }
    }
    Ok(())
}

fn require_id(event: &Event, id_key: &str, index: usize) -> Result<String, CoreError> {
    match event.deterministic(id_key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(normalize_str(s)),
        _ => Err(reject(CoreError::OrderingViolation(format!(
            "missing {} in deterministic_fields; kind={} index={}",
            id_key,
            event.kind(),
            index
        )))),
    }
}

/// Verifies required identity fields per event kind.
///
/// - INTENT: `boundary_version` and `boundary_config_hash` present, the
///   latter a hash label; at least one of `intent_digest` / `input_digest`,
///   each a hash label when present
/// - DECISION: `policy_version`, or a well-formed `policy_digest`; a
///   malformed `policy_digest` fails even next to a `policy_version`
/// - EXECUTION, PROOF: no requirements
///
/// `id_key` is only used to label error messages. A JSON `null` digest
/// counts as absent.
pub fn verify_identity_fields(stream: &Stream, id_key: &str) -> Result<(), CoreError> {
    for (index, event) in stream.iter().enumerate() {
        let label = id_label(event, id_key);
        let fail = |what: String| {
            reject(CoreError::IdentityViolation(format!(
                "{}; {}={} index={}",
                what, id_key, label, index
            )))
        };
        let fields = event.deterministic_fields();

        match event.kind() {
            EventKind::Intent => {
                let missing: Vec<&str> = INTENT_BOUNDARY_FIELDS
                    .into_iter()
                    .filter(|k| !fields.contains_key(*k))
                    .collect();
                if !missing.is_empty() {
                    return Err(fail(format!(
                        "INTENT missing deterministic identity fields: {:?}",
                        missing
                    )));
                }
                if !is_label_value(fields.get("boundary_config_hash")) {
                    return Err(fail("INTENT has invalid boundary_config_hash".to_string()));
                }
                let intent_digest = present(fields.get("intent_digest"));
                let input_digest = present(fields.get("input_digest"));
                if intent_digest.is_some() && !is_label_value(intent_digest) {
                    return Err(fail("INTENT has invalid intent_digest".to_string()));
                }
                if input_digest.is_some() && !is_label_value(input_digest) {
                    return Err(fail("INTENT has invalid input_digest".to_string()));
                }
                if intent_digest.is_none() && input_digest.is_none() {
                    return Err(fail(
                        "INTENT missing input_digest or intent_digest".to_string(),
                    ));
                }
            }
            EventKind::Decision => {
                let policy_digest = present(fields.get("policy_digest"));
                if policy_digest.is_some() && !is_label_value(policy_digest) {
                    return Err(fail("DECISION has invalid policy_digest".to_string()));
                }
                if !fields.contains_key("policy_version") && policy_digest.is_none() {
                    return Err(fail(
                        "DECISION missing policy_version or policy_digest".to_string(),
                    ));
                }
            }
            EventKind::Execution | EventKind::Proof => {}
        }
    }
    Ok(())
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn is_label_value(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if is_hash_label(s))
}

fn id_label(event: &Event, id_key: &str) -> String {
    match event.deterministic(id_key) {
        Some(Value::String(s)) => normalize_str(s),
        _ => "unknown".to_string(),
    }
}

/// Fails fast, with the event index, if any deterministic fields cannot be
/// canonicalized. Digesting would reject the same events; this only gives a
/// clearer location.
pub fn verify_deterministic_is_canonicalizable(stream: &Stream) -> Result<(), CoreError> {
    for (index, event) in stream.iter().enumerate() {
        if let Err(source) = canonicalize(event.deterministic_fields()) {
            return Err(reject(CoreError::Canonicalization(
                CanonicalizationError::AtEvent {
                    index,
                    kind: event.kind().to_string(),
                    source: Box::new(source),
                },
            )));
        }
    }
    Ok(())
}

/// Runs canonicalizability, identity (if enabled) and ordering checks, in
/// that order.
pub fn verify_stream(stream: &Stream, options: &VerifyOptions) -> Result<(), CoreError> {
    verify_deterministic_is_canonicalizable(stream)?;
    if options.check_identity {
        verify_identity_fields(stream, &options.ordering.id_key)?;
    }
    verify_ordering(stream, &options.ordering)?;
    tracing::debug!(events = stream.len(), "stream verified");
    Ok(())
}
