// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # automessage - schema-driven binary message serialization
//!
//! Describe a type once, get a portable schema for it, and encode/decode
//! values through codecs compiled at runtime from that schema.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use automessage::{Engine, Message};
//!
//! #[derive(Debug, Default, PartialEq, Message)]
//! struct Reading {
//!     sensor: String,
//!     samples: Vec<f64>,
//! }
//!
//! let engine = Engine::new();
//! let value = Reading { sensor: "t0".into(), samples: vec![21.5, 21.7] };
//!
//! let bytes = engine.serialize(&value)?;
//! let back: Reading = engine.deserialize(&bytes)?;
//! assert_eq!(back, value);
//!
//! // Ship the schema; the peer can decode without knowing `Reading`.
//! let schema = engine.extract_schema::<Reading>()?;
//! let dynamic = engine.deserialize_value(&bytes, &schema)?;
//! # Ok::<(), automessage::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  Message (derive)  ->  TypeInfo  ->  Schema (ordered TypeNodes)     |
//! +---------------------------------------------------------------------+
//! |  TypeResolver: declared | generic instantiation | primitive | synth |
//! +---------------------------------------------------------------------+
//! |  Codegen: CompiledType { encode, decode, exact_size } per type      |
//! +---------------------------------------------------------------------+
//! |  Wire: little-endian, no padding, i32 counts  (Cursor / Stream)     |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Wire format
//!
//! | Type | Encoding |
//! |------|----------|
//! | `Boolean`, `Int8`, `UInt8` | 1 byte |
//! | `Int16`, `UInt16` | 2 bytes LE |
//! | `Int32`, `UInt32`, `Float32`, `Char` | 4 bytes LE (`Char` as its Unicode scalar) |
//! | `Int64`, `UInt64`, `Float64` | 8 bytes LE |
//! | `String` | `i32` UTF-8 byte count, then the bytes |
//! | `T[]` | `i32` element count, then the elements |
//! | record | members in schema order (sorted by member name) |

// Allow the derive macro to work inside this crate's tests
extern crate self as automessage;

pub mod codegen;
pub mod config;
mod engine;
mod error;
mod message;
pub mod resolver;
pub mod schema;
pub mod types;
pub mod value;
pub mod wire;

pub use automessage_codegen::Message;
pub use codegen::CompiledType;
pub use config::EngineConfig;
pub use engine::{Engine, EngineStats};
pub use error::{Error, Result};
pub use message::{Decimal, Message, Param};
pub use resolver::{GenericDefinition, TypeResolver};
pub use schema::{fingerprint, Schema, TypeNode};
pub use types::{
    ContainerKind, MemberInfo, PrimitiveKind, RecordInfo, TypeInfo, TypeKind, TypeOrigin, TypeRef,
};
pub use value::{DynamicRecord, DynamicValue, PrimitiveArray};
