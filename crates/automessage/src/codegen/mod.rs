// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec compilation.
//!
//! Each complex type is compiled once into a [`CompiledType`]: three
//! closures (encode, decode, exact size) that capture the member plans in
//! schema order. Nested complex types are linked by `Arc` to their own
//! compiled function sets, which must already exist; the schema's
//! dependency order guarantees that.

mod plan;

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

pub(crate) use plan::FieldPlan;

use crate::config::DecodeLimits;
use crate::error::{Error, Result};
use crate::schema::TypeNode;
use crate::types::{ContainerKind, PrimitiveKind, TypeInfo, TypeKind};
use crate::value::{DynamicRecord, DynamicValue};
use crate::wire::{WireRead, WireWrite};

pub type EncodeFn = Box<dyn Fn(&mut dyn WireWrite, &DynamicValue) -> Result<()> + Send + Sync>;
pub type DecodeFn = Box<dyn Fn(&mut dyn WireRead) -> Result<DynamicValue> + Send + Sync>;
pub type SizeFn = Box<dyn Fn(&DynamicValue) -> Result<usize> + Send + Sync>;

/// Compiled function set for one type.
pub struct CompiledType {
    type_name: String,
    encode: EncodeFn,
    decode: DecodeFn,
    exact_size: SizeFn,
}

impl CompiledType {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn encode(&self, w: &mut dyn WireWrite, value: &DynamicValue) -> Result<()> {
        (self.encode)(w, value)
    }

    pub fn decode(&self, r: &mut dyn WireRead) -> Result<DynamicValue> {
        (self.decode)(r)
    }

    /// Exact number of bytes `encode` will write for `value`.
    pub fn exact_size(&self, value: &DynamicValue) -> Result<usize> {
        (self.exact_size)(value)
    }
}

impl fmt::Debug for CompiledType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledType")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Builds function sets against the cache of already-compiled types.
pub(crate) struct Compiler<'a> {
    compiled: &'a DashMap<String, Arc<CompiledType>>,
    limits: DecodeLimits,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(compiled: &'a DashMap<String, Arc<CompiledType>>, limits: DecodeLimits) -> Self {
        Self { compiled, limits }
    }

    /// Compile a record from its schema node and resolved type.
    ///
    /// Members are coded in the order of the node's children.
    pub(crate) fn compile_record(&self, node: &TypeNode, info: &TypeInfo) -> Result<CompiledType> {
        let record = info
            .as_record()
            .ok_or_else(|| Error::TypeMismatch {
                expected: format!("record {}", node.type_name),
                found: info.name.clone(),
            })?;

        let mut fields = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let member_name = child.name.as_deref().ok_or_else(|| {
                Error::InvalidData(format!("child of '{}' has no member name", node.type_name))
            })?;
            let member = record.member(member_name).ok_or_else(|| Error::MemberMissing {
                type_name: node.type_name.clone(),
                member: member_name.to_string(),
            })?;
            let plan = self.plan_for(&node.type_name, &child.type_name, &member.ty.get())?;
            fields.push((member_name.to_string(), plan));
        }

        log::debug!(
            "[codegen] compiled {} ({} members)",
            node.type_name,
            fields.len()
        );
        Ok(record_functions(node.type_name.clone(), fields, self.limits))
    }

    /// Compile a root that is not a record (a primitive or a sequence).
    pub(crate) fn compile_root(&self, type_name: &str, info: &TypeInfo) -> Result<CompiledType> {
        let plan = self.plan_for(type_name, type_name, info)?;
        log::debug!("[codegen] compiled root {} as {:?}", type_name, plan);
        Ok(plan_functions(type_name.to_string(), plan, self.limits))
    }

    /// Choose the plan for `type_name`, checking it against the member's
    /// resolved type.
    fn plan_for(&self, owner: &str, type_name: &str, info: &TypeInfo) -> Result<FieldPlan> {
        if let Some(element_name) = type_name.strip_suffix(crate::config::ARRAY_SUFFIX) {
            let seq = info.as_sequence().ok_or_else(|| Error::TypeMismatch {
                expected: type_name.to_string(),
                found: info.name.clone(),
            })?;
            if seq.container == ContainerKind::Array {
                if let Some(kind) = seq.element.as_primitive().filter(|k| k.is_bulk_element()) {
                    if PrimitiveKind::from_alias(element_name) == Some(kind) {
                        return Ok(FieldPlan::Bulk(kind));
                    }
                }
            }
            let element = self.plan_for(owner, element_name, &seq.element)?;
            return Ok(FieldPlan::Elements(Box::new(element)));
        }

        if let Some(kind) = PrimitiveKind::from_alias(type_name) {
            return match info.kind {
                TypeKind::Primitive(found) if found == kind => match kind {
                    PrimitiveKind::String => Ok(FieldPlan::Text),
                    PrimitiveKind::Decimal => Err(Error::UnsupportedPrimitive(type_name.into())),
                    _ => Ok(FieldPlan::Scalar(kind)),
                },
                _ => Err(Error::TypeMismatch {
                    expected: type_name.to_string(),
                    found: info.name.clone(),
                }),
            };
        }

        if !info.is_record() || info.name != type_name {
            return Err(Error::TypeMismatch {
                expected: type_name.to_string(),
                found: info.name.clone(),
            });
        }
        let dependency = self
            .compiled
            .get(type_name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::OrderingViolation {
                type_name: owner.to_string(),
                dependency: type_name.to_string(),
            })?;
        Ok(FieldPlan::Record(dependency))
    }
}

fn record_functions(
    type_name: String,
    fields: Vec<(String, FieldPlan)>,
    limits: DecodeLimits,
) -> CompiledType {
    let fields: Arc<[(String, FieldPlan)]> = fields.into();

    let encode = {
        let fields = Arc::clone(&fields);
        let type_name = type_name.clone();
        Box::new(move |w: &mut dyn WireWrite, value: &DynamicValue| -> Result<()> {
            let record = value
                .as_record()
                .ok_or_else(|| Error::mismatch(format!("record {}", type_name), value))?;
            for (name, plan) in fields.iter() {
                let field = record.get(name).ok_or_else(|| Error::MemberMissing {
                    type_name: type_name.clone(),
                    member: name.clone(),
                })?;
                plan.encode(w, field)?;
            }
            Ok(())
        }) as EncodeFn
    };

    let decode = {
        let fields = Arc::clone(&fields);
        let type_name = type_name.clone();
        Box::new(move |r: &mut dyn WireRead| -> Result<DynamicValue> {
            let mut record = DynamicRecord::new(type_name.clone());
            for (name, plan) in fields.iter() {
                record.insert(name.clone(), plan.decode(r, limits)?);
            }
            Ok(DynamicValue::Record(record))
        }) as DecodeFn
    };

    let exact_size = {
        let type_name = type_name.clone();
        Box::new(move |value: &DynamicValue| -> Result<usize> {
            let record = value
                .as_record()
                .ok_or_else(|| Error::mismatch(format!("record {}", type_name), value))?;
            let mut total = 0usize;
            for (name, plan) in fields.iter() {
                let field = record.get(name).ok_or_else(|| Error::MemberMissing {
                    type_name: type_name.clone(),
                    member: name.clone(),
                })?;
                total += plan.exact_size(field)?;
            }
            Ok(total)
        }) as SizeFn
    };

    CompiledType {
        type_name,
        encode,
        decode,
        exact_size,
    }
}

fn plan_functions(type_name: String, plan: FieldPlan, limits: DecodeLimits) -> CompiledType {
    let plan = Arc::new(plan);

    let encode = {
        let plan = Arc::clone(&plan);
        Box::new(move |w: &mut dyn WireWrite, value: &DynamicValue| plan.encode(w, value)) as EncodeFn
    };
    let decode = {
        let plan = Arc::clone(&plan);
        Box::new(move |r: &mut dyn WireRead| plan.decode(r, limits)) as DecodeFn
    };
    let exact_size = Box::new(move |value: &DynamicValue| plan.exact_size(value)) as SizeFn;

    CompiledType {
        type_name,
        encode,
        decode,
        exact_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MemberInfo, TypeRef};
    use crate::wire::{Cursor, StreamWriter};

    fn int32() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::primitive(PrimitiveKind::I32))
    }

    fn text() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::primitive(PrimitiveKind::String))
    }

    fn point() -> TypeInfo {
        TypeInfo::record(
            "t::Point",
            "Point",
            vec![
                MemberInfo::new("X", TypeRef::Lazy(int32)),
                MemberInfo::new("Y", TypeRef::Lazy(int32)),
            ],
        )
    }

    fn point_node() -> TypeNode {
        TypeNode::new("t::Point")
            .with_child(TypeNode::member("X", "Int32"))
            .with_child(TypeNode::member("Y", "Int32"))
    }

    fn limits() -> DecodeLimits {
        DecodeLimits {
            max_sequence_len: 64,
            max_string_bytes: 64,
        }
    }

    #[test]
    fn test_record_roundtrip_in_child_order() {
        let cache = DashMap::new();
        let compiler = Compiler::new(&cache, limits());
        let compiled = compiler
            .compile_record(&point_node(), &point())
            .expect("compile");

        let value = DynamicValue::Record(DynamicRecord::new("t::Point").with("X", 1i32).with("Y", 2i32));
        assert_eq!(compiled.exact_size(&value).expect("size"), 8);

        let mut writer = StreamWriter::new(Vec::new());
        compiled.encode(&mut writer, &value).expect("encode");
        let bytes = writer.into_inner();
        assert_eq!(bytes, vec![1, 0, 0, 0, 2, 0, 0, 0]);

        let back = compiled.decode(&mut Cursor::new(&bytes)).expect("decode");
        assert_eq!(back, value);
    }

    #[test]
    fn test_missing_member() {
        let cache = DashMap::new();
        let compiler = Compiler::new(&cache, limits());
        let node = point_node().with_child(TypeNode::member("Z", "Int32"));
        match compiler.compile_record(&node, &point()) {
            Err(Error::MemberMissing { type_name, member }) => {
                assert_eq!(type_name, "t::Point");
                assert_eq!(member, "Z");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_dependency_must_be_compiled_first() {
        fn point_info() -> Arc<TypeInfo> {
            Arc::new(point())
        }
        let line = TypeInfo::record(
            "t::Line",
            "Line",
            vec![MemberInfo::new("From", TypeRef::Lazy(point_info))],
        );
        let node = TypeNode::new("t::Line").with_child(TypeNode::member("From", "t::Point"));

        let cache = DashMap::new();
        let compiler = Compiler::new(&cache, limits());
        assert!(matches!(
            compiler.compile_record(&node, &line),
            Err(Error::OrderingViolation { ref dependency, .. }) if dependency == "t::Point"
        ));

        let point_fns = compiler
            .compile_record(&point_node(), &point())
            .expect("compile point");
        cache.insert("t::Point".to_string(), Arc::new(point_fns));
        assert!(compiler.compile_record(&node, &line).is_ok());
    }

    #[test]
    fn test_schema_and_type_must_agree() {
        let cache = DashMap::new();
        let compiler = Compiler::new(&cache, limits());
        let node = TypeNode::new("t::Point")
            .with_child(TypeNode::member("X", "String"))
            .with_child(TypeNode::member("Y", "Int32"));
        assert!(matches!(
            compiler.compile_record(&node, &point()),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_root_plans() {
        let cache = DashMap::new();
        let compiler = Compiler::new(&cache, limits());

        let ints = TypeInfo::sequence(int32(), ContainerKind::Array);
        let compiled = compiler.compile_root("Int32[]", &ints).expect("compile");
        let value = DynamicValue::Array(crate::value::PrimitiveArray::I32(vec![1, 2, 3]));
        assert_eq!(compiled.exact_size(&value).expect("size"), 16);

        let strings = TypeInfo::sequence(text(), ContainerKind::List);
        let compiled = compiler.compile_root("String[]", &strings).expect("compile");
        assert_eq!(compiled.type_name(), "String[]");
        let value = DynamicValue::List(vec!["ab".into()]);
        assert_eq!(compiled.exact_size(&value).expect("size"), 4 + 4 + 2);
    }
}
