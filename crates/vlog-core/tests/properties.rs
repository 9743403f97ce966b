use proptest::prelude::*;
use serde_json::{json, Map, Value};
use vlog_core::{
    event_digest, verify_append_only, CoreError, Event, EventKind, Fields, Stream,
    DEFAULT_FORBIDDEN_KEYS,
};

fn arb_kind() -> impl Strategy<Value = EventKind> {
    prop::sample::select(EventKind::ALL.to_vec())
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

// Keys are prefixed so they never hit the forbidden-key list.
fn arb_entries() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map("f_[a-z]{1,6}", arb_value(), 0..6)
        .prop_map(|m| m.into_iter().collect())
}

fn arb_event() -> impl Strategy<Value = Event> {
    (arb_kind(), arb_entries())
        .prop_map(|(kind, entries)| Event::new(kind, entries.into_iter().collect(), Map::new()))
}

fn arb_events(max: usize) -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec(arb_event(), 1..=max)
}

fn fields(entries: impl IntoIterator<Item = (String, Value)>) -> Fields {
    entries.into_iter().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Insertion order of deterministic fields never affects the digest.
    #[test]
    fn prop_digest_ignores_key_order(kind in arb_kind(), entries in arb_entries()) {
        let forward = Event::new(kind, fields(entries.clone()), Map::new());
        let backward = Event::new(kind, fields(entries.into_iter().rev()), Map::new());
        prop_assert_eq!(event_digest(&forward).unwrap(), event_digest(&backward).unwrap());
    }

    /// Observational fields are outside the commitment.
    #[test]
    fn prop_digest_ignores_observational_fields(
        event in arb_event(),
        obs in prop::collection::btree_map("[a-z]{1,8}", arb_value(), 0..4),
    ) {
        let annotated = event.with_observational_fields(obs.into_iter().collect());
        prop_assert_eq!(event_digest(&event).unwrap(), event_digest(&annotated).unwrap());
    }

    /// Composed and decomposed spellings of the same text digest equally,
    /// in both values and keys.
    #[test]
    fn prop_digest_ignores_normalization_form(kind in arb_kind(), prefix in "[a-z]{0,8}") {
        let composed = Event::builder(kind)
            .deterministic(format!("{prefix}caf\u{e9}"), format!("{prefix}\u{e9}t\u{e9}"))
            .build();
        let decomposed = Event::builder(kind)
            .deterministic(format!("{prefix}cafe\u{301}"), format!("{prefix}e\u{301}te\u{301}"))
            .build();
        prop_assert_eq!(event_digest(&composed).unwrap(), event_digest(&decomposed).unwrap());
    }

    /// A float anywhere in the deterministic fields is rejected.
    #[test]
    fn prop_float_is_rejected(
        kind in arb_kind(),
        entries in arb_entries(),
        x in -1.0e6f64..1.0e6,
    ) {
        let mut det = fields(entries);
        det.insert("f_nested".to_string(), json!({"deep": [1, {"x": x}]}));
        let event = Event::new(kind, det, Map::new());
        let err = event_digest(&event).unwrap_err();
        prop_assert!(err.is_canonicalization());
    }

    /// Forbidden keys are rejected at the top level whatever their case.
    #[test]
    fn prop_forbidden_key_is_rejected(
        kind in arb_kind(),
        key in prop::sample::select(DEFAULT_FORBIDDEN_KEYS.to_vec()),
        upper in any::<bool>(),
    ) {
        let key = if upper { key.to_uppercase() } else { key.to_string() };
        let event = Event::builder(kind).deterministic(key, 1).build();
        prop_assert!(matches!(event_digest(&event), Err(CoreError::Canonicalization(_))));
    }

    /// Appending always moves the stream digest.
    #[test]
    fn prop_append_changes_stream_digest(events in arb_events(8), next in arb_event()) {
        let stream: Stream = events.into_iter().collect();
        let grown = stream.append(next);
        prop_assert_ne!(stream.digest().unwrap(), grown.digest().unwrap());
    }

    /// Swapping two distinct events changes the stream digest.
    #[test]
    fn prop_stream_digest_is_order_sensitive(a in arb_event(), b in arb_event()) {
        prop_assume!(event_digest(&a).unwrap() != event_digest(&b).unwrap());
        let ab: Stream = vec![a.clone(), b.clone()].into_iter().collect();
        let ba: Stream = vec![b, a].into_iter().collect();
        prop_assert_ne!(ab.digest().unwrap(), ba.digest().unwrap());
    }

    /// Extension passes the append-only check; replacing any committed
    /// event fails it.
    #[test]
    fn prop_append_only_detects_replacement(
        events in arb_events(8),
        extra in arb_events(3),
        pick in any::<prop::sample::Index>(),
    ) {
        let prev: Stream = events.iter().cloned().collect();
        let next: Stream = events.iter().cloned().chain(extra.iter().cloned()).collect();
        prop_assert!(verify_append_only(&prev, &next).is_ok());

        let at = pick.index(events.len());
        let mut tampered = events.clone();
        tampered[at] = Event::builder(events[at].kind())
            .deterministic("f_tampered", true)
            .build();
        let tampered: Stream = tampered.into_iter().chain(extra).collect();
        let err = verify_append_only(&prev, &tampered).unwrap_err();
        prop_assert!(err.is_append_only());
    }
}
