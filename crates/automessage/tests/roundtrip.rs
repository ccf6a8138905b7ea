// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::missing_panics_doc)] // Tests panic on failure
#![allow(clippy::items_after_statements)] // Test helpers

//! Round-trip tests for static types: every value goes through
//! `compute_size`, a stream writer, and back through a stream reader.

use std::collections::VecDeque;
use std::fmt::Debug;

use automessage::wire::{StreamReader, StreamWriter, WireWrite};
use automessage::{Engine, Message};

#[derive(Debug, Default, Clone, PartialEq, Message)]
struct Mock<T> {
    value: T,
}

#[derive(Debug, Default, Clone, PartialEq, Message)]
struct ChildA {
    a: i32,
    b: bool,
    c: f32,
    d: f64,
    e: Vec<i32>,
    f: VecDeque<i32>,
    g: Box<[i32]>,
}

#[derive(Debug, Default, Clone, PartialEq, Message)]
struct ChildB {
    a: Vec<u8>,
}

#[derive(Debug, Default, Clone, PartialEq, Message)]
struct ChildC {
    a: i32,
    b: bool,
    c: f32,
    d: f64,
    e: Vec<i32>,
    f: VecDeque<i32>,
    g: Vec<i32>,
    nested_b: ChildB,
}

#[derive(Debug, Default, Clone, PartialEq, Message)]
struct Nested {
    a: i32,
    b: bool,
    c: f32,
    d: f64,
    e: Vec<i32>,
    f: VecDeque<i32>,
    g: ChildA,
    h: VecDeque<ChildA>,
    i: Vec<ChildA>,
    j: ChildC,
    k: String,
    l: Vec<String>,
    m: char,
}

fn child_a() -> ChildA {
    ChildA {
        a: 31,
        b: true,
        c: 1.3123,
        d: 6.4341,
        e: vec![13, 31, 213, 12321, 321, 3, 1, 23, 1, 32],
        f: VecDeque::from(vec![321, 3, 1, 23, 1, 32]),
        g: vec![3, 1, 23, 1, 32].into_boxed_slice(),
    }
}

fn child_b() -> ChildB {
    let mut rng = fastrand::Rng::with_seed(0x5EED);
    ChildB {
        a: (0..64).map(|_| rng.u8(..)).collect(),
    }
}

fn nested() -> Nested {
    Nested {
        a: 31,
        b: true,
        c: 1.3123,
        d: 6.4341,
        e: vec![13, 31, 213, 12321, 321, 3, 1, 23, 1, 32],
        f: VecDeque::from(vec![321, 3, 1, 23, 1, 32]),
        g: child_a(),
        h: VecDeque::from(vec![child_a(), child_a()]),
        i: vec![child_a(), child_a()],
        j: ChildC {
            a: 31,
            b: true,
            c: 1.3123,
            d: 6.4341,
            e: vec![13, 31, 213],
            f: VecDeque::from(vec![321, 3]),
            g: vec![3, 1, 23],
            nested_b: child_b(),
        },
        k: "naïve ✓".to_string(),
        l: vec![String::new(), "x".to_string(), "yz".to_string()],
        m: '🦀',
    }
}

/// Size, encode through a stream, decode through a stream, compare.
fn roundtrip<T>(engine: &Engine, value: T)
where
    T: Message + Debug + Default + PartialEq + Clone,
{
    let mock = Mock {
        value: value.clone(),
    };
    let expected_size = engine.compute_size(&mock).expect("compute_size");

    let mut writer = StreamWriter::new(Vec::with_capacity(expected_size));
    engine
        .serialize_into(&mock, &mut writer)
        .expect("serialize_into");
    assert_eq!(writer.position(), expected_size, "size of {:?}", value);
    let bytes = writer.into_inner();

    // The buffer-based path produces the same bytes.
    assert_eq!(engine.serialize(&mock).expect("serialize"), bytes);

    let mut reader = StreamReader::new(bytes.as_slice());
    let back: Mock<T> = engine.deserialize_from(&mut reader).expect("deserialize");
    assert_eq!(back.value, value);
}

#[test]
fn test_primitives_roundtrip() {
    let engine = Engine::new();
    roundtrip(&engine, 2i32);
    roundtrip(&engine, true);
    roundtrip(&engine, 0.3123f32);
    roundtrip(&engine, 2.0f64);
    roundtrip(&engine, 2i8);
    roundtrip(&engine, 2u8);
    roundtrip(&engine, 2i16);
    roundtrip(&engine, 2u16);
    roundtrip(&engine, 2u32);
    roundtrip(&engine, 2i64);
    roundtrip(&engine, 2u64);
    roundtrip(&engine, 'q');
    roundtrip(&engine, "testing".to_string());
    roundtrip(&engine, String::new());
}

#[test]
fn test_primitive_arrays_roundtrip() {
    let engine = Engine::new();
    roundtrip(&engine, vec![2i32, 56, 1461, 1313213213]);
    roundtrip(&engine, vec![true, false, false, true]);
    roundtrip(&engine, vec![0.3123f32, 0.51312, 0.3131311]);
    roundtrip(&engine, vec![2.0f64, 131.0, 31231.213123123]);
    roundtrip(&engine, vec![2i8, -123, 123, 12]);
    roundtrip(&engine, vec![23u8, 131, 141, 255]);
    roundtrip(&engine, vec![1i16, 131, -1233, 1413]);
    roundtrip(&engine, vec![123u16, 131, 1232, 12123]);
    roundtrip(&engine, vec![2u32, 312, 131, 12312]);
    roundtrip(&engine, vec![2i64, 231, 123123, -131231, 5, 123]);
    roundtrip(&engine, vec![2u64, 641, 23, 123151]);
    roundtrip(&engine, vec!['a', 'é', '🦀']);
    roundtrip(&engine, Vec::<i32>::new());
}

#[test]
fn test_random_arrays_roundtrip() {
    let engine = Engine::new();
    let mut rng = fastrand::Rng::with_seed(42);
    for _ in 0..8 {
        let len = rng.usize(0..256);
        roundtrip(&engine, (0..len).map(|_| rng.i64(..)).collect::<Vec<_>>());
        roundtrip(&engine, (0..len).map(|_| rng.f64()).collect::<Vec<_>>());
        roundtrip(&engine, (0..len).map(|_| rng.u16(..)).collect::<Vec<_>>());
    }
}

#[test]
fn test_lists_roundtrip() {
    let engine = Engine::new();
    roundtrip(&engine, VecDeque::from(vec![2i32, 56, 1461, 1313213213]));
    roundtrip(&engine, VecDeque::from(vec![true, false, false, true]));
    roundtrip(&engine, VecDeque::from(vec![0.3123f32, 0.51312, 0.3131311]));
    roundtrip(&engine, VecDeque::from(vec![2i8, -123, 123, 12]));
    roundtrip(&engine, VecDeque::from(vec![23u8, 131, 141, 255]));
    roundtrip(&engine, VecDeque::from(vec![2.0f64, 131.0, 31231.213123123]));
    roundtrip(&engine, VecDeque::from(vec![1i16, 131, -1233, 1413]));
    roundtrip(&engine, VecDeque::from(vec![123u16, 131, 1232, 12123]));
    roundtrip(&engine, VecDeque::from(vec![2u32, 312, 131, 12312]));
    roundtrip(&engine, VecDeque::from(vec![2i64, 231, 123123, -131231, 5, 123]));
    roundtrip(&engine, VecDeque::from(vec![2u64, 641, 23, 123151]));
    roundtrip(&engine, VecDeque::from(vec!['a', 'é', '\u{10FFFF}', '🦀']));
    roundtrip(
        &engine,
        VecDeque::from(vec!["a".to_string(), String::new()]),
    );
}

#[test]
fn test_nested_sequences_roundtrip() {
    let engine = Engine::new();
    roundtrip(&engine, vec![vec![1i32, 2], Vec::new(), vec![3]]);
    roundtrip(&engine, vec![VecDeque::from(vec![1u8]), VecDeque::new()]);
}

#[test]
fn test_complex_objects_roundtrip() {
    let engine = Engine::new();
    roundtrip(&engine, child_a());
    roundtrip(&engine, nested());
    roundtrip(&engine, vec![nested(), nested()]);
    roundtrip(&engine, VecDeque::from(vec![nested(), Nested::default()]));
    roundtrip(&engine, vec![child_a()].into_boxed_slice());
}

#[test]
fn test_list_and_array_share_wire_format() {
    let engine = Engine::new();
    let array = engine.serialize(&vec![5u32, 6, 7]).expect("array");
    let list = engine
        .serialize(&VecDeque::from(vec![5u32, 6, 7]))
        .expect("list");
    assert_eq!(array, list);

    // Either shape decodes the other's bytes.
    let back: VecDeque<u32> = engine.deserialize(&array).expect("decode as list");
    assert_eq!(back, VecDeque::from(vec![5, 6, 7]));
}

#[test]
fn test_serialize_into_vec_writer() {
    let engine = Engine::new();
    let mut out = Vec::new();
    {
        let mut writer = StreamWriter::new(&mut out);
        engine.serialize_into(&child_a(), &mut writer).expect("first");
        engine.serialize_into(&7i32, &mut writer).expect("second");
    }
    let mut reader = StreamReader::new(out.as_slice());
    let first: ChildA = engine.deserialize_from(&mut reader).expect("first");
    let second: i32 = engine.deserialize_from(&mut reader).expect("second");
    assert_eq!(first, child_a());
    assert_eq!(second, 7);
}

#[test]
fn test_truncated_input_fails() {
    let engine = Engine::new();
    let bytes = engine.serialize(&nested()).expect("serialize");
    for cut in [0, 1, 4, bytes.len() / 2, bytes.len() - 1] {
        assert!(
            engine.deserialize::<Nested>(&bytes[..cut]).is_err(),
            "decoding {} of {} bytes should fail",
            cut,
            bytes.len()
        );
    }
}
