// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema extraction: walk a type graph and emit its complex types in
//! dependency order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::{fingerprint, Schema, TypeNode};
use crate::error::{Error, Result};
use crate::types::{base_element, PrimitiveKind, RecordInfo, TypeInfo, TypeKind};

/// Result of walking one root type.
pub(crate) struct Extraction {
    pub schema: Schema,
    /// Every record met during the walk, in discovery order.
    pub records: Vec<Arc<TypeInfo>>,
}

/// Extract the schema of `root`.
pub(crate) fn extract(root: &Arc<TypeInfo>) -> Result<Extraction> {
    let mut extractor = SchemaExtractor::default();
    extractor.visit(root)?;
    let records = extractor.records.clone();
    let types = extractor.into_ordered()?;

    log::debug!(
        "[schema] extracted {} ({} complex types)",
        root.name,
        types.len()
    );

    Ok(Extraction {
        schema: Schema {
            type_name: root.name.clone(),
            fingerprint: fingerprint(&root.short_name),
            types,
        },
        records,
    })
}

#[derive(Default)]
struct SchemaExtractor {
    nodes: Vec<TypeNode>,
    index: HashMap<String, usize>,
    /// `(dependent, dependency)` pairs, by node slot.
    edges: HashSet<(usize, usize)>,
    records: Vec<Arc<TypeInfo>>,
}

impl SchemaExtractor {
    fn visit(&mut self, info: &Arc<TypeInfo>) -> Result<()> {
        match &info.kind {
            TypeKind::Primitive(PrimitiveKind::Decimal) => Err(Error::not_serializable(
                &info.name,
                "decimal values have no wire encoding",
            )),
            TypeKind::Primitive(_) => Ok(()),
            TypeKind::Parameter(_) => Err(Error::not_serializable(
                &info.name,
                "unbound generic parameter",
            )),
            TypeKind::Sequence(seq) => self.visit(&seq.element),
            TypeKind::Record(record) => self.visit_record(info, record),
        }
    }

    fn visit_record(&mut self, info: &Arc<TypeInfo>, record: &RecordInfo) -> Result<()> {
        // Already registered (possibly still in progress further up the walk).
        if self.index.contains_key(&info.name) {
            return Ok(());
        }
        if !record.default_constructible {
            return Err(Error::not_serializable(
                &info.name,
                "no default constructor",
            ));
        }

        // Register before descending so cyclic references terminate.
        let slot = self.nodes.len();
        self.index.insert(info.name.clone(), slot);
        self.nodes.push(TypeNode::new(info.name.clone()));
        self.records.push(Arc::clone(info));

        let mut children = Vec::with_capacity(record.members.len());
        let mut seen = HashSet::with_capacity(record.members.len());
        for member in &record.members {
            if !seen.insert(member.name.as_str()) {
                return Err(Error::not_serializable(
                    &info.name,
                    format!("duplicate member '{}'", member.name),
                ));
            }

            let member_info = member.ty.get();
            self.visit(&member_info)?;

            let base = base_element(&member_info);
            if base.is_record() {
                if let Some(&dependency) = self.index.get(&base.name) {
                    self.edges.insert((slot, dependency));
                }
            }
            children.push(TypeNode::member(member.name.clone(), member_info.name.clone()));
        }

        children.sort_by(|a, b| a.name.cmp(&b.name));
        self.nodes[slot].children = children;
        Ok(())
    }

    /// Repeated passes: emit every node whose dependencies are all emitted;
    /// a pass that emits nothing means a cycle.
    fn into_ordered(self) -> Result<Vec<TypeNode>> {
        let count = self.nodes.len();
        let mut dependencies = vec![Vec::new(); count];
        for &(dependent, dependency) in &self.edges {
            dependencies[dependent].push(dependency);
        }

        let mut emitted = vec![false; count];
        let mut order = Vec::with_capacity(count);
        while order.len() < count {
            let mut progress = false;
            for slot in 0..count {
                if emitted[slot] {
                    continue;
                }
                if dependencies[slot].iter().all(|&dep| emitted[dep]) {
                    emitted[slot] = true;
                    order.push(slot);
                    progress = true;
                }
            }
            if !progress {
                let remaining = (0..count)
                    .filter(|&slot| !emitted[slot])
                    .map(|slot| self.nodes[slot].type_name.clone())
                    .collect();
                return Err(Error::DependencyCycle { remaining });
            }
        }

        let mut nodes: Vec<Option<TypeNode>> = self.nodes.into_iter().map(Some).collect();
        Ok(order
            .into_iter()
            .filter_map(|slot| nodes[slot].take())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContainerKind, MemberInfo, TypeRef};

    fn int32() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::primitive(PrimitiveKind::I32))
    }

    fn leaf() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::record(
            "t::Leaf",
            "Leaf",
            vec![MemberInfo::new("Value", TypeRef::Lazy(int32))],
        ))
    }

    fn leaves() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::sequence(leaf(), ContainerKind::Array))
    }

    fn branch() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::record(
            "t::Branch",
            "Branch",
            vec![
                MemberInfo::new("Leaves", TypeRef::Lazy(leaves)),
                MemberInfo::new("Count", TypeRef::Lazy(int32)),
            ],
        ))
    }

    fn trunk() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::record(
            "t::Trunk",
            "Trunk",
            vec![
                MemberInfo::new("Main", TypeRef::Lazy(branch)),
                MemberInfo::new("Spare", TypeRef::Lazy(leaf)),
            ],
        ))
    }

    fn node() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::record(
            "t::Node",
            "Node",
            vec![MemberInfo::new("Next", TypeRef::Lazy(nodes))],
        ))
    }

    fn nodes() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::sequence(node(), ContainerKind::List))
    }

    #[test]
    fn test_dependencies_come_first() {
        let extraction = extract(&trunk()).expect("extract");
        let names: Vec<_> = extraction
            .schema
            .types
            .iter()
            .map(|n| n.type_name.as_str())
            .collect();
        assert_eq!(names, vec!["t::Leaf", "t::Branch", "t::Trunk"]);
        assert_eq!(extraction.records.len(), 3);
        assert_eq!(extraction.schema.type_name, "t::Trunk");
        assert_eq!(extraction.schema.fingerprint, fingerprint("Trunk"));
    }

    #[test]
    fn test_children_sorted_by_name() {
        let extraction = extract(&branch()).expect("extract");
        let root = extraction.schema.root().expect("root node");
        let children: Vec<_> = root
            .children
            .iter()
            .map(|c| (c.name.as_deref(), c.type_name.as_str()))
            .collect();
        assert_eq!(
            children,
            vec![(Some("Count"), "Int32"), (Some("Leaves"), "t::Leaf[]")]
        );
    }

    #[test]
    fn test_primitive_root_has_no_types() {
        let extraction = extract(&int32()).expect("extract");
        assert!(extraction.schema.types.is_empty());
        assert_eq!(extraction.schema.type_name, "Int32");
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let err = extract(&node()).err().expect("cycle");
        match err {
            Error::DependencyCycle { remaining } => assert_eq!(remaining, vec!["t::Node"]),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_decimal_member_rejected() {
        fn decimal() -> Arc<TypeInfo> {
            Arc::new(TypeInfo::primitive(PrimitiveKind::Decimal))
        }
        let info = Arc::new(TypeInfo::record(
            "t::Price",
            "Price",
            vec![MemberInfo::new("Amount", TypeRef::Lazy(decimal))],
        ));
        assert!(matches!(
            extract(&info),
            Err(Error::TypeNotSerializable { .. })
        ));
    }

    #[test]
    fn test_non_constructible_rejected() {
        let info = Arc::new(TypeInfo::record("t::Handle", "Handle", Vec::new()).without_default());
        assert!(matches!(
            extract(&info),
            Err(Error::TypeNotSerializable { ref type_name, .. }) if type_name == "t::Handle"
        ));
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let info = Arc::new(TypeInfo::record(
            "t::Twice",
            "Twice",
            vec![
                MemberInfo::new("A", TypeRef::Lazy(int32)),
                MemberInfo::new("A", TypeRef::Lazy(int32)),
            ],
        ));
        assert!(matches!(
            extract(&info),
            Err(Error::TypeNotSerializable { .. })
        ));
    }
}
