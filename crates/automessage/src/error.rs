// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine error type.

use std::fmt;

use crate::value::DynamicValue;
use crate::wire::WireError;

/// Errors raised by schema extraction, type resolution, codec compilation
/// and the encode/decode paths.
#[derive(Debug)]
pub enum Error {
    /// The type cannot take part in serialization (no default constructor,
    /// unsupported primitive, unbound generic parameter, ...).
    TypeNotSerializable { type_name: String, reason: String },
    /// Topological ordering made no progress; the listed types depend on
    /// each other (or on themselves).
    DependencyCycle { remaining: Vec<String> },
    /// A schema type name could not be resolved and had no children to
    /// synthesize a record from.
    TypeNotFound(String),
    /// The schema names a member the resolved type does not have.
    MemberMissing { type_name: String, member: String },
    /// A complex type was compiled before one of its dependencies.
    OrderingViolation { type_name: String, dependency: String },
    /// A primitive the wire format declares but has no encoding for.
    UnsupportedPrimitive(String),
    /// A dynamic value does not have the shape its codec expects.
    TypeMismatch { expected: String, found: String },
    /// Malformed input: bad count, invalid UTF-8, unparsable schema JSON.
    InvalidData(String),
    /// Reader or writer failure, including invalid char scalars.
    Wire(WireError),
}

impl Error {
    pub(crate) fn mismatch(expected: impl Into<String>, found: &DynamicValue) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            found: found.describe(),
        }
    }

    pub(crate) fn not_serializable(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::TypeNotSerializable {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TypeNotSerializable { type_name, reason } => {
                write!(f, "type '{}' is not serializable: {}", type_name, reason)
            }
            Error::DependencyCycle { remaining } => write!(
                f,
                "no progress in solving type dependencies: {}",
                remaining.join(", ")
            ),
            Error::TypeNotFound(name) => write!(f, "type '{}' not found", name),
            Error::MemberMissing { type_name, member } => {
                write!(f, "type '{}' has no member '{}'", type_name, member)
            }
            Error::OrderingViolation {
                type_name,
                dependency,
            } => write!(
                f,
                "types registered in wrong order: '{}' needs '{}' compiled first",
                type_name, dependency
            ),
            Error::UnsupportedPrimitive(name) => {
                write!(f, "primitive '{}' has no wire encoding", name)
            }
            Error::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            Error::InvalidData(reason) => write!(f, "invalid data: {}", reason),
            Error::Wire(err) => write!(f, "wire error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Wire(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WireError> for Error {
    fn from(err: WireError) -> Self {
        Error::Wire(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(format!("schema JSON: {}", err))
    }
}

pub type Result<T> = core::result::Result<T, Error>;
