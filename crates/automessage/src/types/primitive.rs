// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive (final) types of the wire format.

/// Primitive type kinds.
///
/// These are the leaves of every type graph: schema extraction never
/// descends into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
    /// 128-bit decimal. Recognized as a leaf type but has no wire encoding.
    Decimal,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 14] = [
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Char,
        Self::String,
        Self::Decimal,
    ];

    /// Canonical type name as it appears in schemas.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::Bool => "Boolean",
            Self::I8 => "Int8",
            Self::I16 => "Int16",
            Self::I32 => "Int32",
            Self::I64 => "Int64",
            Self::U8 => "UInt8",
            Self::U16 => "UInt16",
            Self::U32 => "UInt32",
            Self::U64 => "UInt64",
            Self::F32 => "Float32",
            Self::F64 => "Float64",
            Self::Char => "Char",
            Self::String => "String",
            Self::Decimal => "Decimal",
        }
    }

    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.canonical_name() == name)
    }

    /// Resolve a canonical name or one of the accepted spellings
    /// (`i32`, `str`, `Single`, `System.Int32`, ...).
    pub fn from_alias(name: &str) -> Option<Self> {
        let name = name.strip_prefix("System.").unwrap_or(name);
        if let Some(kind) = Self::from_canonical(name) {
            return Some(kind);
        }
        let kind = match name {
            "bool" => Self::Bool,
            "i8" | "SByte" => Self::I8,
            "i16" | "Short" => Self::I16,
            "i32" | "Int" => Self::I32,
            "i64" | "Long" => Self::I64,
            "u8" | "Byte" => Self::U8,
            "u16" | "UShort" => Self::U16,
            "u32" | "UInt" => Self::U32,
            "u64" | "ULong" => Self::U64,
            "f32" | "Single" | "Float" => Self::F32,
            "f64" | "Double" => Self::F64,
            "char" => Self::Char,
            "str" | "string" => Self::String,
            "decimal" => Self::Decimal,
            _ => return None,
        };
        Some(kind)
    }

    /// Encoded size in bytes, `None` for variable-size or unencodable kinds.
    pub fn wire_size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::I8 | Self::U8 => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::I32 | Self::U32 | Self::F32 | Self::Char => Some(4),
            Self::I64 | Self::U64 | Self::F64 => Some(8),
            Self::String | Self::Decimal => None,
        }
    }

    /// Fixed-width kinds whose sequences are read and written in one bulk
    /// operation.
    pub fn is_bulk_element(self) -> bool {
        self.wire_size().is_some()
    }
}
