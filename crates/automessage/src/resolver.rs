// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-name resolution and runtime type synthesis.
//!
//! Resolution order for a name:
//!
//! 1. the resolved-type cache (which also holds synthesized records);
//! 2. declared program types, after splitting off `[]` suffixes and
//!    instantiating registered generic definitions;
//! 3. primitive names and their aliases.
//!
//! A schema node that still cannot be resolved but lists children is turned
//! into a synthesized record with one member per child.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{Error, Result};
use crate::message::Message;
use crate::schema::TypeNode;
use crate::types::naming;
use crate::types::{ContainerKind, MemberInfo, PrimitiveKind, TypeInfo, TypeKind, TypeOrigin};

/// A generic record captured with [`Param`](crate::Param) placeholders,
/// e.g. `GenericDefinition::of::<Pair<Param<0>, Param<1>>>()`.
#[derive(Debug, Clone)]
pub struct GenericDefinition {
    base: String,
    arity: usize,
    template: Arc<TypeInfo>,
}

impl GenericDefinition {
    pub fn of<T: Message>() -> Result<Self> {
        Self::from_template(T::type_info())
    }

    pub fn from_template(template: Arc<TypeInfo>) -> Result<Self> {
        if !template.is_record() {
            return Err(Error::not_serializable(
                &template.name,
                "generic definitions must be records",
            ));
        }
        let (base, args) = naming::parse_generic(&template.name).ok_or_else(|| {
            Error::not_serializable(&template.name, "not a generic type")
        })?;
        for (index, arg) in args.iter().enumerate() {
            if *arg != naming::parameter_name(index) {
                return Err(Error::not_serializable(
                    &template.name,
                    "type arguments must be Param<0>, Param<1>, ... in order",
                ));
            }
        }
        Ok(Self {
            base,
            arity: args.len(),
            template,
        })
    }

    /// Canonical name without type arguments.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

/// Thread-safe resolver shared by every engine operation.
#[derive(Default)]
pub struct TypeResolver {
    resolved: DashMap<String, Arc<TypeInfo>>,
    declared: DashMap<String, Arc<TypeInfo>>,
    generics: DashMap<String, Arc<GenericDefinition>>,
    synthesized: AtomicU64,
}

impl TypeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a program type resolvable by its canonical name.
    pub fn declare(&self, info: Arc<TypeInfo>) {
        if let Entry::Vacant(slot) = self.declared.entry(info.name.clone()) {
            log::debug!("[resolver] declared {}", info.name);
            slot.insert(info);
        }
    }

    pub fn declare_generic(&self, definition: GenericDefinition) {
        log::debug!(
            "[resolver] declared generic {}/{}",
            definition.base,
            definition.arity
        );
        self.generics
            .insert(definition.base.clone(), Arc::new(definition));
    }

    /// Resolve a canonical (or alias) type name.
    pub fn resolve(&self, name: &str) -> Result<Arc<TypeInfo>> {
        let mut in_progress = Vec::new();
        self.resolve_inner(name, &mut in_progress)
    }

    /// Resolve a schema node, synthesizing a record from its children when
    /// the name is unknown.
    pub fn resolve_node(&self, node: &TypeNode) -> Result<Arc<TypeInfo>> {
        match self.resolve(&node.type_name) {
            Ok(info) => Ok(info),
            Err(Error::TypeNotFound(_)) if !node.children.is_empty() => self.synthesize(node),
            Err(err) => Err(err),
        }
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    pub fn declared_count(&self) -> usize {
        self.declared.len()
    }

    pub fn synthesized_count(&self) -> u64 {
        self.synthesized.load(Ordering::Relaxed)
    }

    fn resolve_inner(&self, name: &str, in_progress: &mut Vec<String>) -> Result<Arc<TypeInfo>> {
        if let Some(hit) = self.resolved.get(name) {
            return Ok(Arc::clone(hit.value()));
        }
        if in_progress.iter().any(|entry| entry == name) {
            return Err(Error::DependencyCycle {
                remaining: in_progress.clone(),
            });
        }

        in_progress.push(name.to_string());
        let outcome = self.resolve_uncached(name, in_progress);
        in_progress.pop();

        Ok(self.remember(name, outcome?))
    }

    fn resolve_uncached(&self, name: &str, in_progress: &mut Vec<String>) -> Result<Arc<TypeInfo>> {
        let (base, depth) = naming::split_array_suffix(name);
        let mut info = self
            .resolve_base(&base, in_progress)?
            .ok_or_else(|| Error::TypeNotFound(name.to_string()))?;
        for _ in 0..depth {
            info = Arc::new(TypeInfo::sequence(info, ContainerKind::Array));
        }
        Ok(info)
    }

    fn resolve_base(
        &self,
        base: &str,
        in_progress: &mut Vec<String>,
    ) -> Result<Option<Arc<TypeInfo>>> {
        if let Some(hit) = self.resolved.get(base) {
            return Ok(Some(Arc::clone(hit.value())));
        }
        if let Some(hit) = self.declared.get(base) {
            return Ok(Some(Arc::clone(hit.value())));
        }
        if let Some((generic_base, arg_names)) = naming::parse_generic(base) {
            let definition = self
                .generics
                .get(&generic_base)
                .map(|entry| Arc::clone(entry.value()));
            if let Some(definition) = definition {
                let args = arg_names
                    .iter()
                    .map(|arg| self.resolve_inner(arg, in_progress))
                    .collect::<Result<Vec<_>>>()?;
                return self.instantiate(&definition, &args, in_progress).map(Some);
            }
        }
        Ok(PrimitiveKind::from_alias(base).map(|kind| Arc::new(TypeInfo::primitive(kind))))
    }

    fn instantiate(
        &self,
        definition: &GenericDefinition,
        args: &[Arc<TypeInfo>],
        in_progress: &mut Vec<String>,
    ) -> Result<Arc<TypeInfo>> {
        if args.len() != definition.arity {
            return Err(Error::TypeMismatch {
                expected: format!("{} type arguments for {}", definition.arity, definition.base),
                found: args.len().to_string(),
            });
        }
        let arg_names: Vec<String> = args.iter().map(|arg| arg.name.clone()).collect();
        let name = naming::generic_name(&definition.base, &arg_names);

        let template = definition
            .template
            .as_record()
            .ok_or_else(|| Error::not_serializable(&definition.template.name, "not a record"))?;
        let mut members = Vec::with_capacity(template.members.len());
        for member in &template.members {
            let bound = self.bind(&member.ty.get(), args, &arg_names, in_progress)?;
            members.push(MemberInfo::new(member.name.clone(), bound));
        }

        log::debug!("[resolver] instantiated {}", name);
        Ok(Arc::new(TypeInfo::record_with_origin(
            name,
            naming::short_name(&definition.base),
            members,
            TypeOrigin::Instantiated,
        )))
    }

    /// Substitute generic parameters inside a member type.
    fn bind(
        &self,
        info: &Arc<TypeInfo>,
        args: &[Arc<TypeInfo>],
        arg_names: &[String],
        in_progress: &mut Vec<String>,
    ) -> Result<Arc<TypeInfo>> {
        if !naming::has_parameters(&info.name) {
            return Ok(Arc::clone(info));
        }
        match &info.kind {
            TypeKind::Parameter(index) => args.get(*index).cloned().ok_or_else(|| {
                Error::not_serializable(&info.name, "generic parameter index out of range")
            }),
            TypeKind::Sequence(seq) => {
                let element = self.bind(&seq.element, args, arg_names, in_progress)?;
                Ok(Arc::new(TypeInfo::sequence(element, seq.container)))
            }
            TypeKind::Record(_) => self.resolve_inner(
                &naming::substitute_parameters(&info.name, arg_names),
                in_progress,
            ),
            TypeKind::Primitive(_) => Ok(Arc::clone(info)),
        }
    }

    fn synthesize(&self, node: &TypeNode) -> Result<Arc<TypeInfo>> {
        let mut members = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let name = child.name.as_deref().ok_or_else(|| {
                Error::InvalidData(format!(
                    "child of '{}' has no member name",
                    node.type_name
                ))
            })?;
            // Children may carry their own children in hand-written schemas.
            let info = self.resolve_node(child)?;
            members.push(MemberInfo::new(name, info));
        }

        let info = TypeInfo::record_with_origin(
            node.type_name.clone(),
            naming::short_name(&node.type_name),
            members,
            TypeOrigin::Synthesized,
        );

        match self.resolved.entry(node.type_name.clone()) {
            Entry::Occupied(existing) => Ok(Arc::clone(existing.get())),
            Entry::Vacant(slot) => {
                self.synthesized.fetch_add(1, Ordering::Relaxed);
                log::debug!(
                    "[resolver] synthesized {} ({} members)",
                    node.type_name,
                    node.children.len()
                );
                Ok(Arc::clone(slot.insert(Arc::new(info)).value()))
            }
        }
    }

    /// Get-or-create insert: the first writer wins.
    fn remember(&self, name: &str, info: Arc<TypeInfo>) -> Arc<TypeInfo> {
        Arc::clone(
            self.resolved
                .entry(name.to_string())
                .or_insert(info)
                .value(),
        )
    }
}
