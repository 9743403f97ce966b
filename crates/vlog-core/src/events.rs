use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Field map type used for both deterministic and observational fields.
pub type Fields = Map<String, Value>;

/// Closed set of event kinds.
///
/// Adding a kind changes the digest domain and requires a schema version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    /// A request entered the boundary.
    Intent,
    /// A binding policy outcome.
    Decision,
    /// An effect was carried out.
    Execution,
    /// Evidence attached after the fact.
    Proof,
}

impl EventKind {
    /// All kinds, in lifecycle order.
    pub const ALL: [EventKind; 4] = [
        EventKind::Intent,
        EventKind::Decision,
        EventKind::Execution,
        EventKind::Proof,
    ];

    /// Wire identifier (`INTENT`, `DECISION`, `EXECUTION`, `PROOF`).
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Intent => "INTENT",
            EventKind::Decision => "DECISION",
            EventKind::Execution => "EXECUTION",
            EventKind::Proof => "PROOF",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown event kind.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown event kind: {0:?}")]
pub struct ParseEventKindError(String);

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseEventKindError(s.to_string()))
    }
}

/// Immutable event with strict field separation.
///
/// - `deterministic_fields` participate in digests
/// - `observational_fields` are excluded from digests and normative projections
///
/// The event owns both maps outright and only hands out shared references,
/// so nothing reachable from it can change after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    kind: EventKind,
    #[serde(default)]
    deterministic_fields: Fields,
    #[serde(default)]
    observational_fields: Fields,
}

impl Event {
    /// Creates an event from its parts.
    pub fn new(kind: EventKind, deterministic_fields: Fields, observational_fields: Fields) -> Self {
        Self {
            kind,
            deterministic_fields,
            observational_fields,
        }
    }

    /// Starts building an event of the given kind.
    pub fn builder(kind: EventKind) -> EventBuilder {
        EventBuilder {
            kind,
            deterministic_fields: Fields::new(),
            observational_fields: Fields::new(),
        }
    }

    /// Event kind.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Fields that define the event's cryptographic identity.
    pub fn deterministic_fields(&self) -> &Fields {
        &self.deterministic_fields
    }

    /// Fields excluded from every digest.
    pub fn observational_fields(&self) -> &Fields {
        &self.observational_fields
    }

    /// Looks up a deterministic field.
    pub fn deterministic(&self, key: &str) -> Option<&Value> {
        self.deterministic_fields.get(key)
    }

    /// Looks up an observational field.
    pub fn observational(&self, key: &str) -> Option<&Value> {
        self.observational_fields.get(key)
    }

    /// Returns a copy with the observational fields replaced.
    pub fn with_observational_fields(&self, observational_fields: Fields) -> Self {
        Self {
            kind: self.kind,
            deterministic_fields: self.deterministic_fields.clone(),
            observational_fields,
        }
    }
}

/// Builder for [`Event`].
#[derive(Debug, Clone)]
pub struct EventBuilder {
    kind: EventKind,
    deterministic_fields: Fields,
    observational_fields: Fields,
}

impl EventBuilder {
    /// Sets a deterministic field.
    pub fn deterministic(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.deterministic_fields.insert(key.into(), value.into());
        self
    }

    /// Sets an observational field.
    pub fn observational(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.observational_fields.insert(key.into(), value.into());
        self
    }

    /// Finishes the event.
    pub fn build(self) -> Event {
        Event::new(self.kind, self.deterministic_fields, self.observational_fields)
    }
}
