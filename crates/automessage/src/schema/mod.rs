// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Portable type schemas.
//!
//! A [`Schema`] lists every complex type reachable from a root type, ordered
//! so that each type appears after all of the complex types it depends on.
//! Schemas serialize to JSON so they can travel alongside the payloads they
//! describe.

mod extract;

pub(crate) use extract::extract;

use serde::{Deserialize, Serialize};

use crate::config::{FINGERPRINT_BASE, FINGERPRINT_MODULUS};
use crate::error::Result;

/// One node of the type tree.
///
/// Top-level entries of [`Schema::types`] carry their children; a child is a
/// reference (member name plus type name) and only carries children of its
/// own in hand-written schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeNode {
    /// Member name, absent on top-level entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TypeNode>,
}

impl TypeNode {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            name: None,
            type_name: type_name.into(),
            children: Vec::new(),
        }
    }

    pub fn member(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_name: type_name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: TypeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn child(&self, name: &str) -> Option<&TypeNode> {
        self.children
            .iter()
            .find(|child| child.name.as_deref() == Some(name))
    }
}

/// Description of a root type and every complex type it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Canonical name of the root type.
    pub type_name: String,
    /// Polynomial hash of the root type's short name.
    pub fingerprint: i64,
    /// Complex types in dependency order.
    pub types: Vec<TypeNode>,
}

impl Schema {
    /// Look up a top-level entry by type name.
    pub fn node(&self, type_name: &str) -> Option<&TypeNode> {
        self.types.iter().find(|node| node.type_name == type_name)
    }

    /// The root's own entry, when the root is a complex type.
    pub fn root(&self) -> Option<&TypeNode> {
        self.node(&self.type_name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Polynomial rolling hash of `text` over its UTF-16 code units.
///
/// `hash = Σ (c - 'a' + 1) · 31^i  (mod 1_000_000_009)` with truncating
/// remainder on signed 64-bit arithmetic, so characters below `'a'` can
/// produce negative intermediate and final values.
pub fn fingerprint(text: &str) -> i64 {
    let mut hash: i64 = 0;
    let mut power: i64 = 1;
    for unit in text.encode_utf16() {
        let weight = i64::from(unit) - i64::from(b'a') + 1;
        hash = (hash + weight * power) % FINGERPRINT_MODULUS;
        power = (power * FINGERPRINT_BASE) % FINGERPRINT_MODULUS;
    }
    hash
}
