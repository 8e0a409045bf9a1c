use proptest::prelude::*;

use crate::codec::{self, Analysis, FeatureMap, Morpheme};

fn field() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9'-]{1,4}"
}

fn morphemes() -> impl Strategy<Value = Vec<Morpheme>> {
    prop::collection::vec((field(), field()), 0..4)
        .prop_map(|v| v.into_iter().map(|(s, g)| Morpheme::new(s, g)).collect())
}

fn features() -> impl Strategy<Value = FeatureMap> {
    prop::collection::btree_map(field(), field(), 0..3)
}

proptest! {
    #[test]
    fn prop_decode_inverts_encode(m in morphemes(), f in features()) {
        let s = codec::encode(&m, &f).unwrap();
        prop_assert_eq!(codec::decode(&s).unwrap(), Analysis::new(m, f));
    }

    #[test]
    fn prop_encode_is_canonical(m in morphemes(), f in features()) {
        let s = codec::encode(&m, &f).unwrap();
        let a: Analysis = s.parse().unwrap();
        prop_assert_eq!(a.encode().unwrap(), s);
    }

    #[test]
    fn prop_reserved_characters_are_rejected(prefix in field(), c in prop::sample::select(codec::RESERVED.to_vec())) {
        let bad = format!("{prefix}{c}");
        prop_assert!(codec::encode(&[Morpheme::new(bad.as_str(), "g")], &FeatureMap::new()).unwrap_err().is_encoding());
        prop_assert!(codec::encode(&[Morpheme::new("s", bad.as_str())], &FeatureMap::new()).unwrap_err().is_encoding());
    }
}

#[test]
fn test_feature_order_is_independent_of_insertion() {
    let mut a = FeatureMap::new();
    a.insert("tense".to_string(), "past".to_string());
    a.insert("aspect".to_string(), "perf".to_string());
    let mut b = FeatureMap::new();
    b.insert("aspect".to_string(), "perf".to_string());
    b.insert("tense".to_string(), "past".to_string());
    assert_eq!(codec::encode(&[], &a).unwrap(), codec::encode(&[], &b).unwrap());
    assert_eq!(codec::encode(&[], &a).unwrap(), "^$aspect(perf) tense(past)|");
}

#[test]
fn test_empty_fields_are_allowed() {
    let m = vec![Morpheme::new("", "ZERO")];
    let s = codec::encode(&m, &FeatureMap::new()).unwrap();
    assert_eq!(s, "^(ZERO)$|");
    assert_eq!(codec::decode(&s).unwrap().morphemes, m);
}
