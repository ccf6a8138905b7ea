// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type model: primitive kinds, type information, canonical names.

mod info;
pub mod naming;
mod primitive;

pub use info::{
    base_element, ContainerKind, MemberInfo, RecordInfo, SequenceInfo, TypeInfo, TypeKind,
    TypeOrigin, TypeRef,
};
pub use primitive::PrimitiveKind;
