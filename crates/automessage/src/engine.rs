// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialization engine.
//!
//! The [`Engine`] owns four caches, all safe for concurrent first use:
//!
//! - extracted schemas, keyed by Rust type;
//! - compiled function sets, keyed by canonical type name;
//! - resolved types (declared, instantiated and synthesized), inside the
//!   [`TypeResolver`];
//! - declared program types, also inside the resolver.
//!
//! Every cache uses get-or-create semantics: when two threads build the same
//! entry at once, the first insert wins and both callers get that entry.

use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::codegen::{CompiledType, Compiler};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::resolver::{GenericDefinition, TypeResolver};
use crate::schema::{extract, Schema};
use crate::types::{TypeInfo, TypeKind, TypeOrigin};
use crate::value::DynamicValue;
use crate::wire::{Cursor, CursorMut, WireError, WireRead, WireWrite};

/// Snapshot of cache sizes and hit counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub schemas: usize,
    pub compiled: usize,
    pub resolved: usize,
    pub declared: usize,
    pub synthesized: u64,
    pub schema_hits: u64,
    pub schema_misses: u64,
    pub compile_hits: u64,
    pub compile_misses: u64,
}

#[derive(Default)]
struct Counters {
    schema_hits: AtomicU64,
    schema_misses: AtomicU64,
    compile_hits: AtomicU64,
    compile_misses: AtomicU64,
}

/// Schema-driven binary serializer with runtime-compiled codecs.
pub struct Engine {
    config: EngineConfig,
    schemas: DashMap<TypeId, Arc<Schema>>,
    compiled: DashMap<String, Arc<CompiledType>>,
    resolver: TypeResolver,
    counters: Counters,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            schemas: DashMap::new(),
            compiled: DashMap::new(),
            resolver: TypeResolver::new(),
            counters: Counters::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    // ------------------------------------------------------------------
    // Schemas and type resolution
    // ------------------------------------------------------------------

    /// Schema of `T`, extracted once and cached.
    ///
    /// Every record met during extraction becomes resolvable by name.
    pub fn extract_schema<T: Message>(&self) -> Result<Arc<Schema>> {
        let key = TypeId::of::<T>();
        if let Some(hit) = self.schemas.get(&key) {
            self.counters.schema_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(hit.value()));
        }
        self.counters.schema_misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("[engine] schema cache miss for {}", T::type_name());

        let schema = Arc::new(self.extract_schema_of(&T::type_info())?);
        Ok(Arc::clone(self.schemas.entry(key).or_insert(schema).value()))
    }

    /// Extract the schema of a runtime type handle. Not cached.
    pub fn extract_schema_of(&self, info: &Arc<TypeInfo>) -> Result<Schema> {
        let extraction = extract(info)?;
        for record in extraction.records {
            let synthesized = matches!(
                &record.kind,
                TypeKind::Record(r) if r.origin == TypeOrigin::Synthesized
            );
            if !synthesized {
                self.resolver.declare(record);
            }
        }
        Ok(extraction.schema)
    }

    /// Make `T` and every record it reaches resolvable by name, so that
    /// schemas naming them bind to the program types instead of
    /// synthesized ones.
    pub fn register<T: Message>(&self) -> Result<()> {
        self.extract_schema::<T>().map(|_| ())
    }

    pub fn register_generic(&self, definition: GenericDefinition) {
        self.resolver.declare_generic(definition);
    }

    pub fn resolve(&self, type_name: &str) -> Result<Arc<TypeInfo>> {
        self.resolver.resolve(type_name)
    }

    /// Resolve every complex type of a schema (synthesizing unknown ones)
    /// and return the root type.
    pub fn resolve_schema(&self, schema: &Schema) -> Result<Arc<TypeInfo>> {
        for node in &schema.types {
            self.resolver.resolve_node(node)?;
        }
        self.resolver.resolve(&schema.type_name)
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    /// Compiled function set of `T`.
    pub fn function_set<T: Message>(&self) -> Result<Arc<CompiledType>> {
        let schema = self.extract_schema::<T>()?;
        if let Some(hit) = self.lookup_compiled(&schema.type_name) {
            self.counters.compile_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }
        self.counters.compile_misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("[engine] compiling {}", schema.type_name);
        self.compile_with_root(&schema, Some(&T::type_info()))
    }

    /// Compile every complex type of `schema` in order and return the
    /// root's function set.
    pub fn compile_schema(&self, schema: &Schema) -> Result<Arc<CompiledType>> {
        if let Some(hit) = self.lookup_compiled(&schema.type_name) {
            self.counters.compile_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }
        self.counters.compile_misses.fetch_add(1, Ordering::Relaxed);
        self.compile_with_root(schema, None)
    }

    fn compile_with_root(
        &self,
        schema: &Schema,
        root: Option<&Arc<TypeInfo>>,
    ) -> Result<Arc<CompiledType>> {
        let compiler = Compiler::new(&self.compiled, self.config.limits());
        for node in &schema.types {
            if self.compiled.contains_key(&node.type_name) {
                continue;
            }
            let info = self.resolver.resolve_node(node)?;
            let compiled = compiler.compile_record(node, &info)?;
            self.insert_compiled(compiled);
        }

        if let Some(hit) = self.lookup_compiled(&schema.type_name) {
            return Ok(hit);
        }

        let info = match root {
            Some(info) => Arc::clone(info),
            None => self.resolver.resolve(&schema.type_name)?,
        };
        if info.is_record() {
            // The schema did not list its own root; derive a complete one.
            let full = self.extract_schema_of(&info)?;
            if full.root().is_none() {
                return Err(Error::TypeNotFound(schema.type_name.clone()));
            }
            return self.compile_with_root(&full, Some(&info));
        }
        let compiled = compiler.compile_root(&schema.type_name, &info)?;
        Ok(self.insert_compiled(compiled))
    }

    fn lookup_compiled(&self, type_name: &str) -> Option<Arc<CompiledType>> {
        self.compiled
            .get(type_name)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn insert_compiled(&self, compiled: CompiledType) -> Arc<CompiledType> {
        match self.compiled.entry(compiled.type_name().to_string()) {
            Entry::Occupied(existing) => {
                log::debug!(
                    "[codegen] {} already compiled by another caller, discarding duplicate",
                    existing.key()
                );
                Arc::clone(existing.get())
            }
            Entry::Vacant(slot) => Arc::clone(slot.insert(Arc::new(compiled)).value()),
        }
    }

    // ------------------------------------------------------------------
    // Static types
    // ------------------------------------------------------------------

    /// Encode `value` into a buffer of exactly the computed size.
    pub fn serialize<T: Message>(&self, value: &T) -> Result<Vec<u8>> {
        let functions = self.function_set::<T>()?;
        encode_exact(&functions, &value.to_value()?)
    }

    pub fn serialize_into<T: Message>(&self, value: &T, w: &mut dyn WireWrite) -> Result<()> {
        let functions = self.function_set::<T>()?;
        functions.encode(w, &value.to_value()?)
    }

    /// Encode into `buf` starting at `offset`; returns the bytes written.
    pub fn serialize_to_slice<T: Message>(
        &self,
        value: &T,
        buf: &mut [u8],
        offset: usize,
    ) -> Result<usize> {
        let functions = self.function_set::<T>()?;
        let dynamic = value.to_value()?;
        let len = buf.len();
        let target = buf.get_mut(offset..).ok_or_else(|| {
            Error::Wire(WireError::WriteFailed {
                offset,
                reason: format!("offset past end of {}-byte buffer", len),
            })
        })?;
        let mut cursor = CursorMut::new(target);
        functions.encode(&mut cursor, &dynamic)?;
        Ok(cursor.offset())
    }

    pub fn compute_size<T: Message>(&self, value: &T) -> Result<usize> {
        let functions = self.function_set::<T>()?;
        functions.exact_size(&value.to_value()?)
    }

    pub fn deserialize<T: Message>(&self, bytes: &[u8]) -> Result<T> {
        self.deserialize_from(&mut Cursor::new(bytes))
    }

    pub fn deserialize_from<T: Message>(&self, r: &mut dyn WireRead) -> Result<T> {
        let functions = self.function_set::<T>()?;
        T::from_value(functions.decode(r)?)
    }

    // ------------------------------------------------------------------
    // Dynamic values
    // ------------------------------------------------------------------

    pub fn serialize_value(&self, schema: &Schema, value: &DynamicValue) -> Result<Vec<u8>> {
        let functions = self.compile_schema(schema)?;
        encode_exact(&functions, value)
    }

    pub fn serialize_value_into(
        &self,
        schema: &Schema,
        value: &DynamicValue,
        w: &mut dyn WireWrite,
    ) -> Result<()> {
        self.compile_schema(schema)?.encode(w, value)
    }

    pub fn compute_value_size(&self, schema: &Schema, value: &DynamicValue) -> Result<usize> {
        self.compile_schema(schema)?.exact_size(value)
    }

    /// Decode bytes described by `schema`, synthesizing any types the
    /// program does not declare.
    pub fn deserialize_value(&self, bytes: &[u8], schema: &Schema) -> Result<DynamicValue> {
        self.deserialize_value_from(&mut Cursor::new(bytes), schema)
    }

    pub fn deserialize_value_from(
        &self,
        r: &mut dyn WireRead,
        schema: &Schema,
    ) -> Result<DynamicValue> {
        self.compile_schema(schema)?.decode(r)
    }

    /// Decode bytes of an already-known type, by canonical name.
    pub fn deserialize_named(&self, bytes: &[u8], type_name: &str) -> Result<DynamicValue> {
        let functions = match self.lookup_compiled(type_name) {
            Some(functions) => functions,
            None => {
                let info = self.resolver.resolve(type_name)?;
                let schema = self.extract_schema_of(&info)?;
                self.compile_with_root(&schema, Some(&info))?
            }
        };
        functions.decode(&mut Cursor::new(bytes))
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            schemas: self.schemas.len(),
            compiled: self.compiled.len(),
            resolved: self.resolver.resolved_count(),
            declared: self.resolver.declared_count(),
            synthesized: self.resolver.synthesized_count(),
            schema_hits: self.counters.schema_hits.load(Ordering::Relaxed),
            schema_misses: self.counters.schema_misses.load(Ordering::Relaxed),
            compile_hits: self.counters.compile_hits.load(Ordering::Relaxed),
            compile_misses: self.counters.compile_misses.load(Ordering::Relaxed),
        }
    }
}

fn encode_exact(functions: &CompiledType, value: &DynamicValue) -> Result<Vec<u8>> {
    let size = functions.exact_size(value)?;
    let mut buffer = vec![0u8; size];
    let mut cursor = CursorMut::new(&mut buffer);
    functions.encode(&mut cursor, value)?;
    debug_assert_eq!(
        cursor.offset(),
        size,
        "exact size of {} disagrees with its encoder",
        functions.type_name()
    );
    Ok(buffer)
}
