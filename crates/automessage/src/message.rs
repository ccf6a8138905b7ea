// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The [`Message`] trait and its implementations for built-in types.
//!
//! User records implement it with `#[derive(Message)]`:
//!
//! ```ignore
//! #[derive(Debug, Default, automessage::Message)]
//! pub struct Reading {
//!     pub sensor: String,
//!     #[message(rename = "Values")]
//!     pub samples: Vec<f64>,
//!     #[message(skip)]
//!     pub cached_mean: Option<f64>,
//! }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{ContainerKind, PrimitiveKind, TypeInfo};
use crate::value::{DynamicValue, PrimitiveArray};

/// A type the engine can describe, extract a schema for, and convert to
/// and from a [`DynamicValue`].
pub trait Message: Sized + 'static {
    /// Introspection view of the type.
    fn type_info() -> Arc<TypeInfo>;

    /// Canonical type name. Overridden where it is cheaper than building
    /// the full [`TypeInfo`].
    fn type_name() -> String {
        Self::type_info().name.clone()
    }

    fn to_value(&self) -> Result<DynamicValue>;

    fn from_value(value: DynamicValue) -> Result<Self>;

    /// Collect a slice of this type into a bulk primitive array, when the
    /// type is a fixed-width primitive.
    #[doc(hidden)]
    fn collect_array(_items: &[Self]) -> Option<PrimitiveArray> {
        None
    }

    /// Inverse of [`Message::collect_array`].
    #[doc(hidden)]
    fn vec_from_array(array: PrimitiveArray) -> Result<Vec<Self>> {
        Err(Error::TypeMismatch {
            expected: Self::type_name(),
            found: format!("{} array", array.kind().canonical_name()),
        })
    }
}

macro_rules! impl_primitive_message {
    ($type:ty, $kind:ident) => {
        impl Message for $type {
            fn type_info() -> Arc<TypeInfo> {
                Arc::new(TypeInfo::primitive(PrimitiveKind::$kind))
            }

            fn type_name() -> String {
                PrimitiveKind::$kind.canonical_name().to_string()
            }

            fn to_value(&self) -> Result<DynamicValue> {
                Ok(DynamicValue::$kind(*self))
            }

            fn from_value(value: DynamicValue) -> Result<Self> {
                match value {
                    DynamicValue::$kind(v) => Ok(v),
                    other => Err(Error::mismatch(PrimitiveKind::$kind.canonical_name(), &other)),
                }
            }

            fn collect_array(items: &[Self]) -> Option<PrimitiveArray> {
                Some(PrimitiveArray::$kind(items.to_vec()))
            }

            fn vec_from_array(array: PrimitiveArray) -> Result<Vec<Self>> {
                match array {
                    PrimitiveArray::$kind(items) => Ok(items),
                    other => Err(Error::TypeMismatch {
                        expected: format!("{} array", PrimitiveKind::$kind.canonical_name()),
                        found: format!("{} array", other.kind().canonical_name()),
                    }),
                }
            }
        }
    };
}

impl_primitive_message!(bool, Bool);
impl_primitive_message!(i8, I8);
impl_primitive_message!(i16, I16);
impl_primitive_message!(i32, I32);
impl_primitive_message!(i64, I64);
impl_primitive_message!(u8, U8);
impl_primitive_message!(u16, U16);
impl_primitive_message!(u32, U32);
impl_primitive_message!(u64, U64);
impl_primitive_message!(f32, F32);
impl_primitive_message!(f64, F64);
impl_primitive_message!(char, Char);

impl Message for String {
    fn type_info() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::primitive(PrimitiveKind::String))
    }

    fn type_name() -> String {
        PrimitiveKind::String.canonical_name().to_string()
    }

    fn to_value(&self) -> Result<DynamicValue> {
        Ok(DynamicValue::String(self.clone()))
    }

    fn from_value(value: DynamicValue) -> Result<Self> {
        match value {
            DynamicValue::String(s) => Ok(s),
            other => Err(Error::mismatch(PrimitiveKind::String.canonical_name(), &other)),
        }
    }
}

/// Opaque 128-bit decimal.
///
/// Recognized as a primitive so that it terminates schema extraction, but it
/// has no wire encoding: any type reaching it fails with
/// [`Error::TypeNotSerializable`] or [`Error::UnsupportedPrimitive`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Decimal(pub [u8; 16]);

impl Message for Decimal {
    fn type_info() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::primitive(PrimitiveKind::Decimal))
    }

    fn type_name() -> String {
        PrimitiveKind::Decimal.canonical_name().to_string()
    }

    fn to_value(&self) -> Result<DynamicValue> {
        Err(Error::UnsupportedPrimitive(
            PrimitiveKind::Decimal.canonical_name().into(),
        ))
    }

    fn from_value(_value: DynamicValue) -> Result<Self> {
        Err(Error::UnsupportedPrimitive(
            PrimitiveKind::Decimal.canonical_name().into(),
        ))
    }
}

/// Placeholder for the N-th type parameter when capturing a generic
/// definition with [`GenericDefinition::of`](crate::GenericDefinition::of).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Param<const N: usize>;

impl<const N: usize> Message for Param<N> {
    fn type_info() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::parameter(N))
    }

    fn to_value(&self) -> Result<DynamicValue> {
        Err(Error::not_serializable(
            Self::type_name(),
            "unbound generic parameter",
        ))
    }

    fn from_value(_value: DynamicValue) -> Result<Self> {
        Err(Error::not_serializable(
            Self::type_name(),
            "unbound generic parameter",
        ))
    }
}

fn elements_to_value<T: Message>(items: &[T], container: ContainerKind) -> Result<DynamicValue> {
    if container == ContainerKind::Array {
        if let Some(array) = T::collect_array(items) {
            return Ok(DynamicValue::Array(array));
        }
    }
    items
        .iter()
        .map(Message::to_value)
        .collect::<Result<Vec<_>>>()
        .map(DynamicValue::List)
}

// Both sequence representations are accepted regardless of container kind.
fn elements_from_value<T: Message>(value: DynamicValue) -> Result<Vec<T>> {
    match value {
        DynamicValue::Array(array) => T::vec_from_array(array),
        DynamicValue::List(items) => items.into_iter().map(T::from_value).collect(),
        other => Err(Error::mismatch(
            crate::types::naming::array_name(&T::type_name()),
            &other,
        )),
    }
}

impl<T: Message> Message for Vec<T> {
    fn type_info() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::sequence(T::type_info(), ContainerKind::Array))
    }

    fn type_name() -> String {
        crate::types::naming::array_name(&T::type_name())
    }

    fn to_value(&self) -> Result<DynamicValue> {
        elements_to_value(self, ContainerKind::Array)
    }

    fn from_value(value: DynamicValue) -> Result<Self> {
        elements_from_value(value)
    }
}

impl<T: Message> Message for Box<[T]> {
    fn type_info() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::sequence(T::type_info(), ContainerKind::Array))
    }

    fn type_name() -> String {
        crate::types::naming::array_name(&T::type_name())
    }

    fn to_value(&self) -> Result<DynamicValue> {
        elements_to_value(self, ContainerKind::Array)
    }

    fn from_value(value: DynamicValue) -> Result<Self> {
        elements_from_value(value).map(Vec::into_boxed_slice)
    }
}

impl<T: Message> Message for VecDeque<T> {
    fn type_info() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::sequence(T::type_info(), ContainerKind::List))
    }

    fn type_name() -> String {
        crate::types::naming::array_name(&T::type_name())
    }

    fn to_value(&self) -> Result<DynamicValue> {
        self.iter()
            .map(Message::to_value)
            .collect::<Result<Vec<_>>>()
            .map(DynamicValue::List)
    }

    fn from_value(value: DynamicValue) -> Result<Self> {
        elements_from_value(value).map(VecDeque::from)
    }
}
