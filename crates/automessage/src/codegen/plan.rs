// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-member coding plans and the routines that execute them.

use std::sync::Arc;

use super::CompiledType;
use crate::config::{DecodeLimits, COUNT_PREFIX_SIZE};
use crate::error::{Error, Result};
use crate::types::PrimitiveKind;
use crate::value::{DynamicValue, PrimitiveArray};
use crate::wire::{WireRead, WireWrite};

/// How one member (or one sequence element) is coded.
#[derive(Clone)]
pub(crate) enum FieldPlan {
    /// Fixed-width scalar.
    Scalar(PrimitiveKind),
    /// Count-prefixed UTF-8.
    Text,
    /// Count-prefixed run of fixed-width primitives, one bulk read/write.
    Bulk(PrimitiveKind),
    /// Count-prefixed sequence coded element by element.
    Elements(Box<FieldPlan>),
    /// Nested record, delegated to its compiled function set.
    Record(Arc<CompiledType>),
}

impl std::fmt::Debug for FieldPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldPlan::Scalar(kind) => write!(f, "Scalar({})", kind.canonical_name()),
            FieldPlan::Text => f.write_str("Text"),
            FieldPlan::Bulk(kind) => write!(f, "Bulk({})", kind.canonical_name()),
            FieldPlan::Elements(element) => write!(f, "Elements({:?})", element),
            FieldPlan::Record(compiled) => write!(f, "Record({})", compiled.type_name()),
        }
    }
}

fn scalar_size(kind: PrimitiveKind) -> Result<usize> {
    kind.wire_size()
        .ok_or_else(|| Error::UnsupportedPrimitive(kind.canonical_name().into()))
}

fn write_count(w: &mut dyn WireWrite, count: usize) -> Result<()> {
    let count = i32::try_from(count).map_err(|_| {
        Error::InvalidData(format!("count {} does not fit in a 32-bit prefix", count))
    })?;
    w.write_i32(count)?;
    Ok(())
}

fn read_count(r: &mut dyn WireRead, limit: usize, what: &str) -> Result<usize> {
    let offset = r.position();
    let raw = r.read_i32()?;
    let count = usize::try_from(raw).map_err(|_| {
        Error::InvalidData(format!("negative {} count {} at offset {}", what, raw, offset))
    })?;
    if count > limit {
        return Err(Error::InvalidData(format!(
            "{} count {} at offset {} exceeds limit {}",
            what, count, offset, limit
        )));
    }
    Ok(count)
}

pub(crate) fn encode_scalar(
    kind: PrimitiveKind,
    w: &mut dyn WireWrite,
    value: &DynamicValue,
) -> Result<()> {
    match (kind, value) {
        (PrimitiveKind::Bool, DynamicValue::Bool(v)) => w.write_bool(*v)?,
        (PrimitiveKind::I8, DynamicValue::I8(v)) => w.write_i8(*v)?,
        (PrimitiveKind::I16, DynamicValue::I16(v)) => w.write_i16(*v)?,
        (PrimitiveKind::I32, DynamicValue::I32(v)) => w.write_i32(*v)?,
        (PrimitiveKind::I64, DynamicValue::I64(v)) => w.write_i64(*v)?,
        (PrimitiveKind::U8, DynamicValue::U8(v)) => w.write_u8(*v)?,
        (PrimitiveKind::U16, DynamicValue::U16(v)) => w.write_u16(*v)?,
        (PrimitiveKind::U32, DynamicValue::U32(v)) => w.write_u32(*v)?,
        (PrimitiveKind::U64, DynamicValue::U64(v)) => w.write_u64(*v)?,
        (PrimitiveKind::F32, DynamicValue::F32(v)) => w.write_f32(*v)?,
        (PrimitiveKind::F64, DynamicValue::F64(v)) => w.write_f64(*v)?,
        (PrimitiveKind::Char, DynamicValue::Char(v)) => w.write_char(*v)?,
        (PrimitiveKind::String | PrimitiveKind::Decimal, _) => {
            return Err(Error::UnsupportedPrimitive(kind.canonical_name().into()))
        }
        (_, other) => return Err(Error::mismatch(kind.canonical_name(), other)),
    }
    Ok(())
}

pub(crate) fn decode_scalar(kind: PrimitiveKind, r: &mut dyn WireRead) -> Result<DynamicValue> {
    let value = match kind {
        PrimitiveKind::Bool => DynamicValue::Bool(r.read_bool()?),
        PrimitiveKind::I8 => DynamicValue::I8(r.read_i8()?),
        PrimitiveKind::I16 => DynamicValue::I16(r.read_i16()?),
        PrimitiveKind::I32 => DynamicValue::I32(r.read_i32()?),
        PrimitiveKind::I64 => DynamicValue::I64(r.read_i64()?),
        PrimitiveKind::U8 => DynamicValue::U8(r.read_u8()?),
        PrimitiveKind::U16 => DynamicValue::U16(r.read_u16()?),
        PrimitiveKind::U32 => DynamicValue::U32(r.read_u32()?),
        PrimitiveKind::U64 => DynamicValue::U64(r.read_u64()?),
        PrimitiveKind::F32 => DynamicValue::F32(r.read_f32()?),
        PrimitiveKind::F64 => DynamicValue::F64(r.read_f64()?),
        PrimitiveKind::Char => DynamicValue::Char(r.read_char()?),
        PrimitiveKind::String | PrimitiveKind::Decimal => {
            return Err(Error::UnsupportedPrimitive(kind.canonical_name().into()))
        }
    };
    Ok(value)
}

fn write_array(w: &mut dyn WireWrite, array: &PrimitiveArray) -> Result<()> {
    match array {
        PrimitiveArray::Bool(v) => w.write_bool_slice(v)?,
        PrimitiveArray::I8(v) => w.write_i8_slice(v)?,
        PrimitiveArray::I16(v) => w.write_i16_slice(v)?,
        PrimitiveArray::I32(v) => w.write_i32_slice(v)?,
        PrimitiveArray::I64(v) => w.write_i64_slice(v)?,
        PrimitiveArray::U8(v) => w.write_bytes(v)?,
        PrimitiveArray::U16(v) => w.write_u16_slice(v)?,
        PrimitiveArray::U32(v) => w.write_u32_slice(v)?,
        PrimitiveArray::U64(v) => w.write_u64_slice(v)?,
        PrimitiveArray::F32(v) => w.write_f32_slice(v)?,
        PrimitiveArray::F64(v) => w.write_f64_slice(v)?,
        PrimitiveArray::Char(v) => w.write_char_slice(v)?,
    }
    Ok(())
}

fn read_array(r: &mut dyn WireRead, kind: PrimitiveKind, count: usize) -> Result<PrimitiveArray> {
    let array = match kind {
        PrimitiveKind::Bool => PrimitiveArray::Bool(r.read_bool_vec(count)?),
        PrimitiveKind::I8 => PrimitiveArray::I8(r.read_i8_vec(count)?),
        PrimitiveKind::I16 => PrimitiveArray::I16(r.read_i16_vec(count)?),
        PrimitiveKind::I32 => PrimitiveArray::I32(r.read_i32_vec(count)?),
        PrimitiveKind::I64 => PrimitiveArray::I64(r.read_i64_vec(count)?),
        PrimitiveKind::U8 => PrimitiveArray::U8(r.read_u8_vec(count)?),
        PrimitiveKind::U16 => PrimitiveArray::U16(r.read_u16_vec(count)?),
        PrimitiveKind::U32 => PrimitiveArray::U32(r.read_u32_vec(count)?),
        PrimitiveKind::U64 => PrimitiveArray::U64(r.read_u64_vec(count)?),
        PrimitiveKind::F32 => PrimitiveArray::F32(r.read_f32_vec(count)?),
        PrimitiveKind::F64 => PrimitiveArray::F64(r.read_f64_vec(count)?),
        PrimitiveKind::Char => PrimitiveArray::Char(r.read_char_vec(count)?),
        PrimitiveKind::String | PrimitiveKind::Decimal => {
            return Err(Error::UnsupportedPrimitive(kind.canonical_name().into()))
        }
    };
    Ok(array)
}

impl FieldPlan {
    pub(crate) fn encode(&self, w: &mut dyn WireWrite, value: &DynamicValue) -> Result<()> {
        match self {
            FieldPlan::Scalar(kind) => encode_scalar(*kind, w, value),
            FieldPlan::Text => match value {
                DynamicValue::String(text) => {
                    write_count(w, text.len())?;
                    w.write_bytes(text.as_bytes())?;
                    Ok(())
                }
                other => Err(Error::mismatch("String", other)),
            },
            FieldPlan::Bulk(kind) => match value {
                DynamicValue::Array(array) if array.kind() == *kind => {
                    write_count(w, array.len())?;
                    write_array(w, array)
                }
                DynamicValue::List(items) => {
                    write_count(w, items.len())?;
                    for item in items {
                        encode_scalar(*kind, w, item)?;
                    }
                    Ok(())
                }
                other => Err(Error::mismatch(format!("{} array", kind.canonical_name()), other)),
            },
            FieldPlan::Elements(element) => match value {
                DynamicValue::List(items) => {
                    write_count(w, items.len())?;
                    for item in items {
                        element.encode(w, item)?;
                    }
                    Ok(())
                }
                DynamicValue::Array(array) => {
                    write_count(w, array.len())?;
                    for item in array.to_values() {
                        element.encode(w, &item)?;
                    }
                    Ok(())
                }
                other => Err(Error::mismatch("sequence", other)),
            },
            FieldPlan::Record(compiled) => compiled.encode(w, value),
        }
    }

    pub(crate) fn decode(&self, r: &mut dyn WireRead, limits: DecodeLimits) -> Result<DynamicValue> {
        match self {
            FieldPlan::Scalar(kind) => decode_scalar(*kind, r),
            FieldPlan::Text => {
                let len = read_count(r, limits.max_string_bytes, "string")?;
                let bytes = r.read_run(len, 1)?;
                let text = String::from_utf8(bytes)
                    .map_err(|err| Error::InvalidData(format!("string is not UTF-8: {}", err)))?;
                Ok(DynamicValue::String(text))
            }
            FieldPlan::Bulk(kind) => {
                let count = read_count(r, limits.max_sequence_len, "sequence")?;
                Ok(DynamicValue::Array(read_array(r, *kind, count)?))
            }
            FieldPlan::Elements(element) => {
                let count = read_count(r, limits.max_sequence_len, "sequence")?;
                // Capacity is capped; a corrupt count fails on read, not on allocation.
                let mut items = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    items.push(element.decode(r, limits)?);
                }
                Ok(DynamicValue::List(items))
            }
            FieldPlan::Record(compiled) => compiled.decode(r),
        }
    }

    pub(crate) fn exact_size(&self, value: &DynamicValue) -> Result<usize> {
        match self {
            FieldPlan::Scalar(kind) => scalar_size(*kind),
            FieldPlan::Text => match value {
                DynamicValue::String(text) => Ok(COUNT_PREFIX_SIZE + text.len()),
                other => Err(Error::mismatch("String", other)),
            },
            FieldPlan::Bulk(kind) => {
                let count = value
                    .sequence_len()
                    .ok_or_else(|| Error::mismatch(format!("{} array", kind.canonical_name()), value))?;
                Ok(COUNT_PREFIX_SIZE + count * scalar_size(*kind)?)
            }
            FieldPlan::Elements(element) => match (element.as_ref(), value) {
                (FieldPlan::Scalar(kind), _) => {
                    let count = value
                        .sequence_len()
                        .ok_or_else(|| Error::mismatch("sequence", value))?;
                    Ok(COUNT_PREFIX_SIZE + count * scalar_size(*kind)?)
                }
                (_, DynamicValue::List(items)) => {
                    let mut total = COUNT_PREFIX_SIZE;
                    for item in items {
                        total += element.exact_size(item)?;
                    }
                    Ok(total)
                }
                (_, DynamicValue::Array(array)) => {
                    let mut total = COUNT_PREFIX_SIZE;
                    for item in array.to_values() {
                        total += element.exact_size(&item)?;
                    }
                    Ok(total)
                }
                (_, other) => Err(Error::mismatch("sequence", other)),
            },
            FieldPlan::Record(compiled) => compiled.exact_size(value),
        }
    }
}
