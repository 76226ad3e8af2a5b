use proptest::prelude::*;
use protonorm_types::Id;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

// ── Construction & display ────────────────────────────────────────

#[test]
fn int_id_displays_as_number() {
    assert_eq!(Id::from(42).to_string(), "42");
    assert_eq!(Id::from(-7i64).as_key(), "-7");
}

#[test]
fn str_id_displays_verbatim() {
    let id = Id::from("key");
    assert_eq!(id.to_string(), "key");
    assert_eq!(id.as_str(), Some("key"));
    assert_eq!(id.as_int(), None);
}

#[test]
fn generate_is_unique_string_key() {
    let a = Id::generate();
    let b = Id::generate();
    assert_ne!(a, b);
    assert!(a.as_str().is_some());
}

#[test]
fn from_uuid_is_string_form() {
    let uuid = uuid::Uuid::now_v7();
    assert_eq!(Id::from(uuid), Id::from(uuid.to_string()));
}

// ── String coercion ───────────────────────────────────────────────

#[test]
fn int_and_numeric_string_are_equal() {
    assert_eq!(Id::from(1), Id::from("1"));
    assert_ne!(Id::from(1), Id::from("01"));
}

#[test]
fn only_canonical_integer_strings_coerce() {
    assert_eq!(Id::from(0), Id::from("0"));
    assert_eq!(Id::from(-12i64), Id::from("-12"));
    assert_ne!(Id::from(0), Id::from("-0"));
    assert_ne!(Id::from(1), Id::from("+1"));
    assert_ne!(Id::from(7), Id::from("007"));
    assert_ne!(Id::from(1), Id::from("1 "));
}

#[test]
fn coerced_ids_share_a_hash_slot() {
    let mut set = HashSet::new();
    set.insert(Id::from(5));
    set.insert(Id::from("5"));
    assert_eq!(set.len(), 1);
}

#[test]
fn coerced_ids_share_a_btree_slot() {
    let mut map = BTreeMap::new();
    map.insert(Id::from(3), "int");
    map.insert(Id::from("3"), "str");
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&Id::from(3)), Some(&"str"));
}

#[test]
fn integers_sort_numerically_before_strings() {
    let mut ids = vec![Id::from("b"), Id::from(10), Id::from("a"), Id::from(2)];
    ids.sort();
    assert_eq!(
        ids,
        vec![Id::from(2), Id::from(10), Id::from("a"), Id::from("b")]
    );
}

// ── JSON ──────────────────────────────────────────────────────────

#[test]
fn serde_is_untagged() {
    assert_eq!(serde_json::to_string(&Id::from(9)).unwrap(), "9");
    assert_eq!(serde_json::to_string(&Id::from("x")).unwrap(), "\"x\"");
    let parsed: Id = serde_json::from_str("\"abc\"").unwrap();
    assert_eq!(parsed, Id::from("abc"));
    let parsed: Id = serde_json::from_str("12").unwrap();
    assert_eq!(parsed.as_int(), Some(12));
}

#[test]
fn from_json_rejects_non_identity_values() {
    assert!(Id::from_json(&serde_json::json!(1.5)).is_err());
    assert!(Id::from_json(&serde_json::json!(true)).is_err());
    assert!(Id::from_json(&serde_json::json!(null)).is_err());
    assert_eq!(Id::from_json(&serde_json::json!(3)).unwrap(), Id::from(3));
}

// ── Ordering laws ─────────────────────────────────────────────────

fn id_strategy() -> impl Strategy<Value = Id> {
    prop_oneof![
        (-50i64..50).prop_map(Id::Int),
        (-50i64..50).prop_map(|v| Id::Str(v.to_string())),
        prop::string::string_regex("[-+]?[a-c0-9]{0,3}").unwrap().prop_map(Id::Str),
    ]
}

proptest! {
    #[test]
    fn ordering_agrees_with_equality(a in id_strategy(), b in id_strategy()) {
        prop_assert_eq!(a.cmp(&b) == Ordering::Equal, a == b);
        prop_assert_eq!(a == b, a.as_key() == b.as_key());
    }

    #[test]
    fn equal_ids_hash_alike(a in id_strategy(), b in id_strategy()) {
        if a == b {
            let mut set = HashSet::new();
            set.insert(a);
            set.insert(b);
            prop_assert_eq!(set.len(), 1);
        }
    }

    #[test]
    fn ordering_is_transitive(a in id_strategy(), b in id_strategy(), c in id_strategy()) {
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
    }
}
