// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value types.
//!
//! Compiled codecs operate on [`DynamicValue`] trees. Static types convert
//! to and from them through [`Message`](crate::Message); synthesized types
//! only ever exist in this form.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::types::PrimitiveKind;

/// A homogeneous run of fixed-width primitives, coded in bulk.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveArray {
    Bool(Vec<bool>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Char(Vec<char>),
}

/// Apply the same expression to whichever vector a `PrimitiveArray` holds.
macro_rules! each_array {
    ($array:expr, $items:ident => $body:expr) => {
        match $array {
            PrimitiveArray::Bool($items) => $body,
            PrimitiveArray::I8($items) => $body,
            PrimitiveArray::I16($items) => $body,
            PrimitiveArray::I32($items) => $body,
            PrimitiveArray::I64($items) => $body,
            PrimitiveArray::U8($items) => $body,
            PrimitiveArray::U16($items) => $body,
            PrimitiveArray::U32($items) => $body,
            PrimitiveArray::U64($items) => $body,
            PrimitiveArray::F32($items) => $body,
            PrimitiveArray::F64($items) => $body,
            PrimitiveArray::Char($items) => $body,
        }
    };
}

impl PrimitiveArray {
    pub fn len(&self) -> usize {
        each_array!(self, items => items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::I8(_) => PrimitiveKind::I8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::U8(_) => PrimitiveKind::U8,
            Self::U16(_) => PrimitiveKind::U16,
            Self::U32(_) => PrimitiveKind::U32,
            Self::U64(_) => PrimitiveKind::U64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            Self::Char(_) => PrimitiveKind::Char,
        }
    }

    /// Expand into one scalar value per element.
    pub fn to_values(&self) -> Vec<DynamicValue> {
        each_array!(self, items => items.iter().map(|&v| DynamicValue::from(v)).collect())
    }
}

/// Field map of a record value, tagged with the record's canonical name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DynamicRecord {
    type_name: String,
    fields: BTreeMap<String, DynamicValue>,
}

impl DynamicRecord {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Set a field, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: DynamicValue) -> Option<DynamicValue> {
        self.fields.insert(name.into(), value)
    }

    /// Builder-style [`DynamicRecord::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&DynamicValue> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut DynamicValue> {
        self.fields.get_mut(name)
    }

    pub fn take(&mut self, name: &str) -> Option<DynamicValue> {
        self.fields.remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &DynamicValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A dynamic value that can hold any serializable type.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    // Primitives
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),

    // Sequences
    Array(PrimitiveArray),
    List(Vec<DynamicValue>),

    // Records
    Record(DynamicRecord),
}

/// Generate `as_*` accessors for the scalar variants.
macro_rules! impl_scalar_accessor {
    ($name:ident, $variant:ident, $type:ty) => {
        pub fn $name(&self) -> Option<$type> {
            match self {
                Self::$variant(v) => Some(*v),
                _ => None,
            }
        }
    };
}

impl DynamicValue {
    impl_scalar_accessor!(as_bool, Bool, bool);
    impl_scalar_accessor!(as_i8, I8, i8);
    impl_scalar_accessor!(as_i16, I16, i16);
    impl_scalar_accessor!(as_i32, I32, i32);
    impl_scalar_accessor!(as_i64, I64, i64);
    impl_scalar_accessor!(as_u8, U8, u8);
    impl_scalar_accessor!(as_u16, U16, u16);
    impl_scalar_accessor!(as_u32, U32, u32);
    impl_scalar_accessor!(as_u64, U64, u64);
    impl_scalar_accessor!(as_f32, F32, f32);
    impl_scalar_accessor!(as_f64, F64, f64);
    impl_scalar_accessor!(as_char, Char, char);

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&PrimitiveArray> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DynamicValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&DynamicRecord> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Get a record field by name.
    pub fn get_field(&self, name: &str) -> Option<&DynamicValue> {
        self.as_record()?.get(name)
    }

    pub fn into_record(self) -> Result<DynamicRecord> {
        match self {
            Self::Record(record) => Ok(record),
            other => Err(Error::mismatch("record", &other)),
        }
    }

    /// Element count for either sequence representation.
    pub fn sequence_len(&self) -> Option<usize> {
        match self {
            Self::Array(array) => Some(array.len()),
            Self::List(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Short description of the value's shape, for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Bool(_) => PrimitiveKind::Bool.canonical_name().to_string(),
            Self::I8(_) => PrimitiveKind::I8.canonical_name().to_string(),
            Self::I16(_) => PrimitiveKind::I16.canonical_name().to_string(),
            Self::I32(_) => PrimitiveKind::I32.canonical_name().to_string(),
            Self::I64(_) => PrimitiveKind::I64.canonical_name().to_string(),
            Self::U8(_) => PrimitiveKind::U8.canonical_name().to_string(),
            Self::U16(_) => PrimitiveKind::U16.canonical_name().to_string(),
            Self::U32(_) => PrimitiveKind::U32.canonical_name().to_string(),
            Self::U64(_) => PrimitiveKind::U64.canonical_name().to_string(),
            Self::F32(_) => PrimitiveKind::F32.canonical_name().to_string(),
            Self::F64(_) => PrimitiveKind::F64.canonical_name().to_string(),
            Self::Char(_) => PrimitiveKind::Char.canonical_name().to_string(),
            Self::String(_) => PrimitiveKind::String.canonical_name().to_string(),
            Self::Array(array) => format!("{} array", array.kind().canonical_name()),
            Self::List(_) => "list".to_string(),
            Self::Record(record) => format!("record {}", record.type_name()),
        }
    }
}

macro_rules! impl_from_scalar {
    ($type:ty, $variant:ident) => {
        impl From<$type> for DynamicValue {
            fn from(v: $type) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_scalar!(bool, Bool);
impl_from_scalar!(i8, I8);
impl_from_scalar!(i16, I16);
impl_from_scalar!(i32, I32);
impl_from_scalar!(i64, I64);
impl_from_scalar!(u8, U8);
impl_from_scalar!(u16, U16);
impl_from_scalar!(u32, U32);
impl_from_scalar!(u64, U64);
impl_from_scalar!(f32, F32);
impl_from_scalar!(f64, F64);
impl_from_scalar!(char, Char);
impl_from_scalar!(String, String);
impl_from_scalar!(PrimitiveArray, Array);
impl_from_scalar!(DynamicRecord, Record);

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<DynamicValue>> for DynamicValue {
    fn from(v: Vec<DynamicValue>) -> Self {
        Self::List(v)
    }
}
