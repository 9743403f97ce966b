use std::collections::BTreeMap;

use serde_json::json;
use vlog_canonical::{
    canonical_bytes, canonicalize, to_canonical_bytes, CanonicalValue, CanonicalizationError,
    Digest, HashLabel,
};

#[test]
fn canonicalizer_produces_ordered_bytes() {
    let value = json!({"b": 1, "a": {"nested": 2}});
    let bytes = to_canonical_bytes(&value).unwrap();
    assert_eq!(bytes, br#"{"a":{"nested":2},"b":1}"#.to_vec());
}

#[test]
fn keys_sort_by_code_point() {
    let value = json!({"\u{e9}": 1, "z": 2, "Z": 3, "a": 4});
    let bytes = to_canonical_bytes(&value).unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "{\"Z\":3,\"a\":4,\"z\":2,\"\u{e9}\":1}"
    );
}

#[test]
fn composed_and_decomposed_strings_agree() {
    let composed = to_canonical_bytes(&json!({"s": "\u{e9}"})).unwrap();
    let decomposed = to_canonical_bytes(&json!({"s": "e\u{0301}"})).unwrap();
    assert_eq!(composed, decomposed);
}

#[test]
fn arrays_keep_their_order() {
    let forward = to_canonical_bytes(&json!([1, 2, 3])).unwrap();
    let reverse = to_canonical_bytes(&json!([3, 2, 1])).unwrap();
    assert_ne!(forward, reverse);
    assert_eq!(forward, b"[1,2,3]".to_vec());
}

#[test]
fn scalars_pass_through() {
    assert_eq!(canonicalize(&json!(null)).unwrap(), CanonicalValue::Null);
    assert_eq!(canonicalize(&json!(true)).unwrap(), CanonicalValue::Bool(true));
    assert_eq!(canonicalize(&json!(-7)).unwrap(), CanonicalValue::Integer(-7));
}

#[test]
fn floats_are_rejected_even_when_integral() {
    let err = canonicalize(&json!({"x": 1.0})).unwrap_err();
    assert_eq!(err, CanonicalizationError::FloatNotAllowed("x".into()));
}

#[test]
fn canonical_value_renders_directly() {
    let mut inner = BTreeMap::new();
    inner.insert("k".to_string(), CanonicalValue::Array(vec![CanonicalValue::Null]));
    let value = CanonicalValue::Object(inner);
    assert_eq!(canonical_bytes(&value).unwrap(), br#"{"k":[null]}"#.to_vec());
}

#[test]
fn hash_label_digest_vector() {
    let digest = Digest::sha256(br#"{"a":1}"#);
    let label = HashLabel::from_digest(&digest);
    assert_eq!(
        label.as_str(),
        "sha256:015abd7f5cc57a2dd94b7590f04ad8084273905ee33ec5cebeae62276a97f862"
    );
}

#[test]
fn parsed_json_integers_keep_full_width() {
    let value: serde_json::Value =
        serde_json::from_str(r#"{"big": 18446744073709551616, "small": 1}"#).unwrap();
    assert_eq!(
        to_canonical_bytes(&value).unwrap(),
        br#"{"big":18446744073709551616,"small":1}"#.to_vec()
    );
}
