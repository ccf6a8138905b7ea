// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type information.
//!
//! A [`TypeInfo`] is the introspection view of a type: its canonical name,
//! whether it is a primitive, a sequence or a record, and for records the
//! ordered list of serializable members.

use std::fmt;
use std::sync::Arc;

use super::naming;
use super::PrimitiveKind;

/// Which collection shape a sequence type came from.
///
/// The wire encoding is identical; the distinction only selects between the
/// bulk path (arrays of fixed-width primitives) and element-wise coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Contiguous storage (`Vec<T>`, `Box<[T]>`).
    Array,
    /// Growable list coded element by element (`VecDeque<T>`).
    List,
}

/// Where a record type came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeOrigin {
    /// A program type implementing [`Message`](crate::Message).
    Declared,
    /// Built at runtime from a schema node.
    Synthesized,
    /// A generic definition with its parameters bound.
    Instantiated,
}

/// Lazily-evaluated link to a member type.
///
/// Record members point at their types through plain function pointers so
/// that self-referential types can describe themselves without recursing
/// forever.
#[derive(Clone)]
pub enum TypeRef {
    Lazy(fn() -> Arc<TypeInfo>),
    Resolved(Arc<TypeInfo>),
}

impl TypeRef {
    pub fn get(&self) -> Arc<TypeInfo> {
        match self {
            TypeRef::Lazy(describe) => describe(),
            TypeRef::Resolved(info) => Arc::clone(info),
        }
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Lazy(_) => f.write_str("TypeRef::Lazy(..)"),
            TypeRef::Resolved(info) => write!(f, "TypeRef::Resolved({})", info.name),
        }
    }
}

impl From<Arc<TypeInfo>> for TypeRef {
    fn from(info: Arc<TypeInfo>) -> Self {
        TypeRef::Resolved(info)
    }
}

/// A serializable member of a record.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub name: String,
    pub ty: TypeRef,
}

impl MemberInfo {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SequenceInfo {
    pub element: Arc<TypeInfo>,
    pub container: ContainerKind,
}

#[derive(Debug, Clone)]
pub struct RecordInfo {
    pub members: Vec<MemberInfo>,
    pub default_constructible: bool,
    pub origin: TypeOrigin,
}

impl RecordInfo {
    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Type kind enumeration.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Sequence(SequenceInfo),
    Record(RecordInfo),
    /// Placeholder for the N-th parameter of a generic definition.
    Parameter(usize),
}

/// Introspection handle for one type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// Canonical name, unique per type (`Int32`, `Int32[]`, `app::Point`).
    pub name: String,
    /// Unqualified name, used for the schema fingerprint.
    pub short_name: String,
    pub kind: TypeKind,
}

impl TypeInfo {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        let name = kind.canonical_name();
        Self {
            name: name.to_string(),
            short_name: name.to_string(),
            kind: TypeKind::Primitive(kind),
        }
    }

    pub fn sequence(element: Arc<TypeInfo>, container: ContainerKind) -> Self {
        Self {
            name: naming::array_name(&element.name),
            short_name: naming::array_name(&element.short_name),
            kind: TypeKind::Sequence(SequenceInfo { element, container }),
        }
    }

    /// A declared record. Use [`TypeInfo::without_default`] for types that
    /// cannot be default-constructed.
    pub fn record(
        name: impl Into<String>,
        short_name: impl Into<String>,
        members: Vec<MemberInfo>,
    ) -> Self {
        Self::record_with_origin(name, short_name, members, TypeOrigin::Declared)
    }

    pub fn record_with_origin(
        name: impl Into<String>,
        short_name: impl Into<String>,
        members: Vec<MemberInfo>,
        origin: TypeOrigin,
    ) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            kind: TypeKind::Record(RecordInfo {
                members,
                default_constructible: true,
                origin,
            }),
        }
    }

    pub fn parameter(index: usize) -> Self {
        let name = naming::parameter_name(index);
        Self {
            name: name.clone(),
            short_name: name,
            kind: TypeKind::Parameter(index),
        }
    }

    pub fn without_default(mut self) -> Self {
        if let TypeKind::Record(record) = &mut self.kind {
            record.default_constructible = false;
        }
        self
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self.kind, TypeKind::Record(_))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self.kind {
            TypeKind::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&SequenceInfo> {
        match &self.kind {
            TypeKind::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordInfo> {
        match &self.kind {
            TypeKind::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.as_record()?.member(name)
    }
}

/// Strip every sequence level and return the innermost element type.
pub fn base_element(info: &Arc<TypeInfo>) -> Arc<TypeInfo> {
    let mut current = Arc::clone(info);
    while let TypeKind::Sequence(seq) = &current.kind {
        let next = Arc::clone(&seq.element);
        current = next;
    }
    current
}
