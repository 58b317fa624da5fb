use bulk_core::canonical::{canonicalize, content_hash};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z0-9 ]{0,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

proptest! {
    #[test]
    fn hash_ignores_formatting(value in json_value()) {
        let compact = serde_json::to_vec(&value).unwrap();
        let pretty = serde_json::to_vec_pretty(&value).unwrap();
        prop_assert_eq!(content_hash(&compact), content_hash(&pretty));
    }

    #[test]
    fn canonical_form_is_a_fixed_point(value in json_value()) {
        let once = canonicalize(&serde_json::to_vec(&value).unwrap()).unwrap();
        let twice = canonicalize(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn canonical_form_preserves_value(value in json_value()) {
        let canonical = canonicalize(&serde_json::to_vec(&value).unwrap()).unwrap();
        let parsed: Value = serde_json::from_slice(&canonical).unwrap();
        prop_assert_eq!(parsed, value);
    }
}
