//! Shared sample schema for the integration tests.

#![allow(dead_code)]

use protonorm_model::{DynamicMessage, MessageDescriptor, SchemaPool, Value};
use serde_json::json;

const SAMPLE_SCHEMA: &str = r#"{
    "messages": [
        {"name": "sample.Status", "fields": [
            {"name": "value", "kind": {"scalar": "string"}}
        ]},
        {"name": "sample.Profile", "fields": [
            {"name": "id", "kind": {"scalar": "int"}},
            {"name": "name", "kind": {"scalar": "string"}},
            {"name": "title", "kind": {"scalar": "string"}},
            {"name": "status", "kind": {"message": "sample.Status"}}
        ]},
        {"name": "sample.Address", "fields": [
            {"name": "id", "kind": {"scalar": "int"}},
            {"name": "street", "kind": {"scalar": "string"}},
            {"name": "city", "kind": {"scalar": "string"}},
            {"name": "state", "kind": {"scalar": "string"}}
        ]},
        {"name": "sample.MultipleProfileResponse", "fields": [
            {"name": "profiles", "kind": {"message": "sample.Profile"}, "repeated": true}
        ]},
        {"name": "sample.Location", "fields": [
            {"name": "id", "kind": {"scalar": "int"}},
            {"name": "name", "kind": {"scalar": "string"}},
            {"name": "address", "kind": {"message": "sample.Address"}},
            {"name": "admins", "kind": {"message": "sample.Profile"}, "repeated": true},
            {"name": "profiles", "kind": {"message": "sample.Profile"}, "repeated": true}
        ]},
        {"name": "sample.Team", "fields": [
            {"name": "id", "kind": {"scalar": "string"}},
            {"name": "name", "kind": {"scalar": "string"}},
            {"name": "lead", "kind": {"message": "sample.Member"}},
            {"name": "members", "kind": {"message": "sample.Member"}, "repeated": true}
        ]},
        {"name": "sample.Member", "fields": [
            {"name": "id", "kind": {"scalar": "int"}},
            {"name": "name", "kind": {"scalar": "string"}},
            {"name": "team", "kind": {"message": "sample.Team"}}
        ]},
        {"name": "sample.Ring", "fields": [
            {"name": "id", "kind": {"scalar": "int"}},
            {"name": "link", "kind": {"message": "sample.RingLink"}}
        ]},
        {"name": "sample.RingLink", "fields": [
            {"name": "id", "kind": {"scalar": "int"}},
            {"name": "end", "kind": {"message": "sample.RingEnd"}}
        ]},
        {"name": "sample.RingEnd", "fields": [
            {"name": "id", "kind": {"scalar": "int"}},
            {"name": "ring", "kind": {"message": "sample.Ring"}}
        ]}
    ]
}"#;

pub fn pool() -> SchemaPool {
    SchemaPool::from_json(SAMPLE_SCHEMA).unwrap()
}

pub fn descriptor(pool: &SchemaPool, name: &str) -> MessageDescriptor {
    pool.descriptor(name).unwrap()
}

pub fn message(pool: &SchemaPool, name: &str, json: serde_json::Value) -> DynamicMessage {
    DynamicMessage::from_json(&descriptor(pool, name), &json).unwrap()
}

pub fn status_json(value: &str) -> serde_json::Value {
    json!({"value": value})
}

pub fn profile_json(id: i64) -> serde_json::Value {
    json!({"id": id, "name": "Name", "title": "Title", "status": status_json("status value")})
}

pub fn address_json(id: i64) -> serde_json::Value {
    json!({"id": id, "street": "Market", "city": "SF", "state": "CA"})
}

pub fn location_json() -> serde_json::Value {
    json!({
        "id": 1,
        "name": "HQ",
        "address": address_json(1),
        "admins": [profile_json(1)],
        "profiles": [profile_json(2)],
    })
}

pub fn profile(pool: &SchemaPool, id: i64) -> DynamicMessage {
    message(pool, "sample.Profile", profile_json(id))
}

pub fn address(pool: &SchemaPool, id: i64) -> DynamicMessage {
    message(pool, "sample.Address", address_json(id))
}

pub fn location(pool: &SchemaPool) -> DynamicMessage {
    message(pool, "sample.Location", location_json())
}

pub fn multiple_profile_response(pool: &SchemaPool) -> DynamicMessage {
    message(
        pool,
        "sample.MultipleProfileResponse",
        json!({"profiles": [profile_json(1), profile_json(2)]}),
    )
}

pub fn team(pool: &SchemaPool) -> DynamicMessage {
    message(
        pool,
        "sample.Team",
        json!({
            "id": "t1",
            "name": "Core",
            "members": [
                {"id": 1, "name": "Ada", "team": {"id": "t1", "name": "Core"}},
                {"id": 2, "name": "Linus", "team": {"id": "t1", "name": "Core"}},
            ],
        }),
    )
}

/// Ring -> RingLink -> RingEnd -> Ring, all id 1: a three-hop cycle once
/// flattened.
pub fn ring(pool: &SchemaPool) -> DynamicMessage {
    message(
        pool,
        "sample.Ring",
        json!({"id": 1, "link": {"id": 1, "end": {"id": 1, "ring": {"id": 1}}}}),
    )
}

/// Strips the named fields from a copy of `message`.
pub fn without(message: &DynamicMessage, fields: &[&str]) -> DynamicMessage {
    let mut copy = message.clone();
    for field in fields {
        copy.set(field, Value::Null).unwrap();
    }
    copy
}

/// The value of a singular message field.
pub fn child<'m>(message: &'m DynamicMessage, field: &str) -> &'m DynamicMessage {
    message.get(field).and_then(Value::as_message).unwrap()
}

/// The messages of a repeated message field.
pub fn children<'m>(message: &'m DynamicMessage, field: &str) -> Vec<&'m DynamicMessage> {
    message
        .get(field)
        .and_then(Value::as_list)
        .unwrap()
        .iter()
        .filter_map(Value::as_message)
        .collect()
}
