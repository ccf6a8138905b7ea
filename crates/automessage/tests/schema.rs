// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::missing_panics_doc)] // Tests panic on failure
#![allow(clippy::unreadable_literal)] // Large test constants

//! Schema extraction, schema exchange between engines, generic resolution
//! and runtime type synthesis.

use automessage::{
    fingerprint, DynamicValue, Engine, Error, GenericDefinition, Message, Param, Schema, TypeNode,
    TypeOrigin,
};

#[derive(Debug, Default, Clone, PartialEq, Message)]
struct Leaf {
    weight: f32,
    label: String,
}

#[derive(Debug, Default, Clone, PartialEq, Message)]
struct Branch {
    leaves: Vec<Leaf>,
    depth: u8,
}

#[derive(Debug, Default, Clone, PartialEq, Message)]
struct Trunk {
    branches: Vec<Branch>,
    main: Branch,
    height: f64,
}

#[derive(Debug, Default, Message)]
struct Tree {
    value: i32,
    children: Vec<Tree>,
}

#[derive(Debug, Default, Message)]
struct Priced {
    amount: automessage::Decimal,
}

#[derive(Debug, Default, Clone, PartialEq, Message)]
struct Reversed {
    b: i32,
    a: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Message)]
#[message(name = "telemetry.Frame")]
struct Frame {
    #[message(rename = "Id")]
    id: u32,
    #[message(rename = "Samples")]
    samples: Vec<i16>,
    #[message(skip)]
    cached_checksum: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq, Message)]
struct Pair<A, B> {
    first: A,
    second: B,
}

#[derive(Debug, Default, Clone, PartialEq, Message)]
struct Holder {
    pair: Pair<i32, String>,
    pairs: Vec<Pair<u8, u8>>,
}

fn trunk() -> Trunk {
    let leaf = |weight: f32, label: &str| Leaf {
        weight,
        label: label.to_string(),
    };
    Trunk {
        branches: vec![
            Branch {
                leaves: vec![leaf(0.5, "a"), leaf(1.5, "b")],
                depth: 1,
            },
            Branch::default(),
        ],
        main: Branch {
            leaves: vec![leaf(2.0, "root")],
            depth: 0,
        },
        height: 12.25,
    }
}

#[test]
fn test_dependencies_listed_before_dependents() {
    let engine = Engine::new();
    let schema = engine.extract_schema::<Trunk>().expect("extract");

    let order: Vec<&str> = schema.types.iter().map(|n| n.type_name.as_str()).collect();
    assert_eq!(order, ["schema::Leaf", "schema::Branch", "schema::Trunk"]);
    assert_eq!(schema.type_name, "schema::Trunk");
    assert_eq!(schema.fingerprint, fingerprint("Trunk"));

    let root = schema.root().expect("root entry");
    let children: Vec<(&str, &str)> = root
        .children
        .iter()
        .map(|c| (c.name.as_deref().unwrap_or(""), c.type_name.as_str()))
        .collect();
    assert_eq!(
        children,
        [
            ("branches", "schema::Branch[]"),
            ("height", "Float64"),
            ("main", "schema::Branch"),
        ]
    );
}

#[test]
fn test_members_encoded_in_name_order() {
    let engine = Engine::new();
    let bytes = engine.serialize(&Reversed { b: 2, a: 1 }).expect("serialize");
    assert_eq!(bytes, [1, 0, 0, 0, 2, 0, 0, 0]);
    let back: Reversed = engine.deserialize(&bytes).expect("deserialize");
    assert_eq!(back, Reversed { b: 2, a: 1 });
}

#[test]
fn test_self_referencing_type_is_a_cycle() {
    let engine = Engine::new();
    match engine.extract_schema::<Tree>() {
        Err(Error::DependencyCycle { remaining }) => {
            assert_eq!(remaining, ["schema::Tree".to_string()]);
        }
        other => panic!("expected dependency cycle, got {:?}", other),
    }
    assert!(engine.serialize(&Tree::default()).is_err());
}

#[test]
fn test_decimal_member_not_serializable() {
    let engine = Engine::new();
    assert!(matches!(
        engine.extract_schema::<Priced>(),
        Err(Error::TypeNotSerializable { ref type_name, .. }) if type_name == "Decimal"
    ));
}

#[test]
fn test_decimal_schema_node_unsupported() {
    let engine = Engine::new();
    let schema = Schema {
        type_name: "remote::Invoice".into(),
        fingerprint: fingerprint("Invoice"),
        types: vec![TypeNode::new("remote::Invoice")
            .with_child(TypeNode::member("Amount", "Decimal"))
            .with_child(TypeNode::member("Lines", "Int32"))],
    };
    assert!(matches!(
        engine.compile_schema(&schema),
        Err(Error::UnsupportedPrimitive(ref name)) if name == "Decimal"
    ));

    let array = Schema {
        type_name: "Decimal[]".into(),
        fingerprint: fingerprint("Decimal[]"),
        types: Vec::new(),
    };
    assert!(matches!(
        engine.compute_value_size(&array, &DynamicValue::List(Vec::new())),
        Err(Error::UnsupportedPrimitive(ref name)) if name == "Decimal"
    ));
    assert_eq!(engine.stats().compiled, 0);
}

#[test]
fn test_field_attributes() {
    let engine = Engine::new();
    let schema = engine.extract_schema::<Frame>().expect("extract");
    assert_eq!(schema.type_name, "telemetry.Frame");
    assert_eq!(schema.fingerprint, fingerprint("Frame"));

    let root = schema.root().expect("root");
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.child("Id").map(|c| c.type_name.as_str()), Some("UInt32"));
    assert_eq!(
        root.child("Samples").map(|c| c.type_name.as_str()),
        Some("Int16[]")
    );

    let frame = Frame {
        id: 7,
        samples: vec![-1, 1],
        cached_checksum: Some(99),
    };
    let bytes = engine.serialize(&frame).expect("serialize");
    assert_eq!(bytes.len(), 4 + 4 + 2 * 2);
    let back: Frame = engine.deserialize(&bytes).expect("deserialize");
    assert_eq!(back.id, 7);
    assert_eq!(back.samples, vec![-1, 1]);
    assert_eq!(back.cached_checksum, None);
}

#[test]
fn test_schema_json_decodes_in_fresh_engine() {
    let sender = Engine::new();
    let value = trunk();
    let bytes = sender.serialize(&value).expect("serialize");
    let json = sender
        .extract_schema::<Trunk>()
        .expect("extract")
        .to_json()
        .expect("to json");

    // The receiver has never seen these types.
    let receiver = Engine::new();
    let schema = Schema::from_json(&json).expect("from json");
    let decoded = receiver.deserialize_value(&bytes, &schema).expect("decode");
    assert_eq!(decoded, value.to_value().expect("to_value"));
    assert_eq!(receiver.stats().synthesized, 3);

    let root = receiver.resolve("schema::Trunk").expect("resolve");
    assert_eq!(
        root.as_record().map(|r| r.origin),
        Some(TypeOrigin::Synthesized)
    );

    // The synthesized codec writes the same bytes back.
    let reencoded = receiver.serialize_value(&schema, &decoded).expect("encode");
    assert_eq!(reencoded, bytes);

    // And the field values are reachable dynamically.
    let main = decoded.get_field("main").expect("main");
    assert_eq!(main.get_field("depth").and_then(DynamicValue::as_u8), Some(0));
}

#[test]
fn test_registered_types_are_not_synthesized() {
    let sender = Engine::new();
    let bytes = sender.serialize(&trunk()).expect("serialize");
    let schema = sender.extract_schema::<Trunk>().expect("extract");

    let receiver = Engine::new();
    receiver.register::<Trunk>().expect("register");
    let decoded = receiver.deserialize_value(&bytes, &schema).expect("decode");
    assert_eq!(receiver.stats().synthesized, 0);
    assert_eq!(Trunk::from_value(decoded).expect("from_value"), trunk());
}

#[test]
fn test_schema_drift_reports_missing_member() {
    let engine = Engine::new();
    engine.register::<Leaf>().expect("register");

    // A peer's schema names a member the local type does not have.
    let schema = Schema {
        type_name: "schema::Leaf".into(),
        fingerprint: fingerprint("Leaf"),
        types: vec![TypeNode::new("schema::Leaf")
            .with_child(TypeNode::member("colour", "String"))
            .with_child(TypeNode::member("weight", "Float32"))],
    };
    assert!(matches!(
        engine.compile_schema(&schema),
        Err(Error::MemberMissing { ref member, .. }) if member == "colour"
    ));
}

#[test]
fn test_generic_names() {
    assert_eq!(
        <Pair<i32, String> as Message>::type_name(),
        "schema::Pair<Int32, String>"
    );
    assert_eq!(
        <Vec<Pair<u8, Vec<f32>>> as Message>::type_name(),
        "schema::Pair<UInt8, Float32[]>[]"
    );
}

#[test]
fn test_generic_roundtrip_and_schema() {
    let engine = Engine::new();
    let holder = Holder {
        pair: Pair {
            first: -5,
            second: "five".into(),
        },
        pairs: vec![
            Pair {
                first: 1,
                second: 2,
            },
            Pair {
                first: 3,
                second: 4,
            },
        ],
    };
    let bytes = engine.serialize(&holder).expect("serialize");
    assert_eq!(bytes.len(), (4 + 4 + 4) + (4 + 2 * 2));
    assert_eq!(engine.deserialize::<Holder>(&bytes).expect("deserialize"), holder);

    let schema = engine.extract_schema::<Holder>().expect("extract");
    let order: Vec<&str> = schema.types.iter().map(|n| n.type_name.as_str()).collect();
    assert_eq!(order.last(), Some(&"schema::Holder"));
    assert!(order.contains(&"schema::Pair<Int32, String>"));
    assert!(order.contains(&"schema::Pair<UInt8, UInt8>"));
}

#[test]
fn test_generic_definition_instantiates_by_name() {
    let sender = Engine::new();
    let value = Pair {
        first: 40i32,
        second: "two".to_string(),
    };
    let bytes = sender.serialize(&value).expect("serialize");

    let receiver = Engine::new();
    let definition = GenericDefinition::of::<Pair<Param<0>, Param<1>>>().expect("definition");
    assert_eq!(definition.base(), "schema::Pair");
    assert_eq!(definition.arity(), 2);
    receiver.register_generic(definition);

    let info = receiver
        .resolve("schema::Pair<Int32, String>")
        .expect("instantiate");
    assert_eq!(
        info.as_record().map(|r| r.origin),
        Some(TypeOrigin::Instantiated)
    );

    let decoded = receiver
        .deserialize_named(&bytes, "schema::Pair<Int32, String>")
        .expect("decode");
    assert_eq!(decoded, value.to_value().expect("to_value"));
    assert_eq!(receiver.stats().synthesized, 0);

    assert!(matches!(
        receiver.resolve("schema::Pair<Int32>"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_unknown_name_not_found() {
    let engine = Engine::new();
    assert!(matches!(
        engine.deserialize_named(&[0, 0, 0, 0], "nowhere::Thing"),
        Err(Error::TypeNotFound(_))
    ));
}

#[test]
fn test_sequence_count_limits() {
    let engine = Engine::with_config(
        automessage::EngineConfig::default().with_max_sequence_len(2),
    );
    let bytes = engine.serialize(&vec![1u8, 2, 3]).expect("serialize");
    assert!(matches!(
        engine.deserialize::<Vec<u8>>(&bytes),
        Err(Error::InvalidData(_))
    ));

    let negative = (-1i32).to_le_bytes();
    assert!(matches!(
        engine.deserialize::<Vec<u8>>(&negative),
        Err(Error::InvalidData(_))
    ));
}
