use pretty_assertions::assert_eq;
use protonorm_model::{DynamicMessage, FieldSchema, MessageSchema, ModelError, ScalarType, SchemaPool, Value};
use protonorm_types::Id;
use serde_json::json;

fn pool() -> SchemaPool {
    SchemaPool::builder()
        .message(MessageSchema::new("sample.Status").field(FieldSchema::scalar("value", ScalarType::String)))
        .message(
            MessageSchema::new("sample.Profile")
                .field(FieldSchema::scalar("id", ScalarType::Int))
                .field(FieldSchema::scalar("name", ScalarType::String))
                .field(FieldSchema::scalar("score", ScalarType::Float))
                .field(FieldSchema::scalar("active", ScalarType::Bool))
                .field(FieldSchema::repeated_scalar("tags", ScalarType::String))
                .field(FieldSchema::message("status", "sample.Status")),
        )
        .build()
        .unwrap()
}

fn profile(json: serde_json::Value) -> DynamicMessage {
    let pool = pool();
    DynamicMessage::from_json(&pool.descriptor("sample.Profile").unwrap(), &json).unwrap()
}

// ── Field access ─────────────────────────────────────────────────

#[test]
fn get_returns_set_values() {
    let p = profile(json!({"id": 1, "name": "Name", "status": {"value": "ok"}}));
    assert_eq!(p.get("name"), Some(&Value::from("Name")));
    let status = p.get("status").and_then(Value::as_message).unwrap();
    assert_eq!(status.get("value").and_then(Value::as_str), Some("ok"));
    assert_eq!(p.get("score"), None);
}

#[test]
fn id_reads_int_or_string() {
    assert_eq!(profile(json!({"id": 7})).id(), Some(Id::from(7)));
    assert_eq!(profile(json!({"name": "x"})).id(), None);
}

#[test]
fn set_null_clears_field() {
    let mut p = profile(json!({"id": 1, "name": "Name"}));
    p.set("name", Value::Null).unwrap();
    assert!(!p.has("name"));
}

#[test]
fn set_empty_list_clears_repeated_field() {
    let mut p = profile(json!({"id": 1, "tags": ["a"]}));
    p.set("tags", Value::List(vec![])).unwrap();
    assert!(!p.has("tags"));
    assert_eq!(p, profile(json!({"id": 1})));
}

#[test]
fn take_removes_and_returns_value() {
    let mut p = profile(json!({"id": 1, "name": "Name"}));
    assert_eq!(p.take("name"), Some(Value::from("Name")));
    assert_eq!(p.take("name"), None);
}

#[test]
fn with_builds_fluently() {
    let pool = pool();
    let p = DynamicMessage::new(pool.descriptor("sample.Profile").unwrap())
        .with("id", 3)
        .unwrap()
        .with("name", "Three")
        .unwrap();
    assert_eq!(p, profile(json!({"id": 3, "name": "Three"})));
}

#[test]
fn set_fields_follow_declaration_order() {
    let p = profile(json!({"status": {"value": "v"}, "name": "n", "id": 1}));
    let names: Vec<String> = p.set_fields().map(|(f, _)| f.name().to_string()).collect();
    assert_eq!(names, vec!["id", "name", "status"]);
}

// ── Type checking ────────────────────────────────────────────────

#[test]
fn set_rejects_wrong_scalar_kind() {
    let mut p = profile(json!({"id": 1}));
    let err = p.set("name", Value::Int(5)).unwrap_err();
    assert!(matches!(err, ModelError::TypeMismatch { field, .. } if field == "name"));
}

#[test]
fn set_rejects_list_on_singular_field() {
    let mut p = profile(json!({"id": 1}));
    assert!(p.set("name", Value::List(vec![Value::from("a")])).is_err());
}

#[test]
fn set_rejects_scalar_on_repeated_field() {
    let mut p = profile(json!({"id": 1}));
    assert!(p.set("tags", Value::from("a")).is_err());
}

#[test]
fn set_rejects_message_of_wrong_type() {
    let mut p = profile(json!({"id": 1}));
    let other = profile(json!({"id": 2}));
    assert!(p.set("status", Value::Message(other)).is_err());
}

#[test]
fn set_rejects_unknown_field() {
    let mut p = profile(json!({"id": 1}));
    assert!(matches!(
        p.set("nope", Value::Int(1)),
        Err(ModelError::UnknownField { .. })
    ));
}

#[test]
fn from_json_rejects_unknown_keys() {
    let pool = pool();
    let err = DynamicMessage::from_json(
        &pool.descriptor("sample.Profile").unwrap(),
        &json!({"id": 1, "bogus": true}),
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::UnknownField { field, .. } if field == "bogus"));
}

#[test]
fn from_json_skips_null() {
    assert_eq!(profile(json!({"id": 1, "name": null})), profile(json!({"id": 1})));
}

// ── Encode / decode ──────────────────────────────────────────────

#[test]
fn decode_of_encode_is_equal_and_independent() {
    let original = profile(json!({
        "id": 1, "name": "Name", "score": 2.5, "active": true,
        "tags": ["a", "b"], "status": {"value": "ok"}
    }));
    let bytes = original.encode().unwrap();
    let mut copy = DynamicMessage::decode(original.descriptor(), &bytes).unwrap();
    assert_eq!(copy, original);

    copy.set("name", Value::from("Changed")).unwrap();
    assert_eq!(original.get("name"), Some(&Value::from("Name")));
}

#[test]
fn non_finite_floats_survive_encode_decode() {
    for score in [f64::INFINITY, f64::NEG_INFINITY] {
        let original = profile(json!({"id": 1})).with("score", score).unwrap();
        let copy = DynamicMessage::decode(original.descriptor(), &original.encode().unwrap()).unwrap();
        assert_eq!(copy, original);
    }

    let original = profile(json!({"id": 1})).with("score", f64::NAN).unwrap();
    let copy = DynamicMessage::decode(original.descriptor(), &original.encode().unwrap()).unwrap();
    assert!(matches!(copy.get("score"), Some(Value::Float(v)) if v.is_nan()));
}

#[test]
fn non_finite_floats_use_string_markers() {
    let p = profile(json!({"score": "-Infinity"}));
    assert_eq!(p.get("score"), Some(&Value::Float(f64::NEG_INFINITY)));
    assert_eq!(p.to_json(), json!({"score": "-Infinity"}));

    let err = DynamicMessage::from_json(p.descriptor(), &json!({"score": "inf"})).unwrap_err();
    assert!(matches!(err, ModelError::TypeMismatch { field, .. } if field == "score"));
}

#[test]
fn to_json_matches_input() {
    let input = json!({"id": 1, "name": "Name", "status": {"value": "ok"}});
    assert_eq!(profile(input.clone()).to_json(), input);
}

#[test]
fn serialize_uses_json_form() {
    let p = profile(json!({"id": 1, "tags": ["x"]}));
    assert_eq!(serde_json::to_value(&p).unwrap(), json!({"id": 1, "tags": ["x"]}));
}
