//! The immutable type graph and its read-only queries.
//!
//! [`TypeGraph`] stores nodes in a `Vec` indexed by [`TypeRef`]. Arena order
//! is discovery order: records are listed in the order they were created,
//! which keeps every downstream pass deterministic.
//!
//! # Invariants
//!
//! - Every child reference resolves to a node in the same arena.
//! - A union holds at most one member per [`TypeKind`].
//! - Root names are unique.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use typefold_types::{NameHints, RecordType, Type, TypeKind, TypeRef};

use crate::error::{GraphError, GraphResult};

/// A node of the graph: a type plus its name hints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeNode {
    pub ty: Type,
    pub names: NameHints,
}

impl TypeNode {
    /// Create a node.
    pub fn new(ty: Type, names: NameHints) -> Self {
        Self { ty, names }
    }
}

/// One immutable generation of the type graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    roots: BTreeMap<String, TypeRef>,
}

impl TypeGraph {
    pub(crate) fn from_parts(nodes: Vec<TypeNode>, roots: BTreeMap<String, TypeRef>) -> Self {
        Self { nodes, roots }
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Retrieve a node.
    pub fn node(&self, r: TypeRef) -> Option<&TypeNode> {
        self.nodes.get(r.index())
    }

    /// Retrieve a node's type, failing if the reference is unknown.
    pub fn resolve(&self, r: TypeRef) -> GraphResult<&Type> {
        self.node(r)
            .map(|n| &n.ty)
            .ok_or(GraphError::NodeNotFound(r))
    }

    /// The kind of a node.
    pub fn kind(&self, r: TypeRef) -> Option<TypeKind> {
        self.node(r).map(|n| n.ty.kind())
    }

    /// The name hints of a node.
    pub fn names(&self, r: TypeRef) -> Option<&NameHints> {
        self.node(r).map(|n| &n.names)
    }

    /// The record payload of a node, if it is a record.
    pub fn record(&self, r: TypeRef) -> Option<&RecordType> {
        self.node(r).and_then(|n| n.ty.as_record())
    }

    /// Every node with its reference, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeRef, &TypeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (TypeRef::new(i as u32), n))
    }

    /// All record types, in discovery order.
    pub fn records(&self) -> Vec<(TypeRef, &RecordType)> {
        self.iter()
            .filter_map(|(r, n)| n.ty.as_record().map(|record| (r, record)))
            .collect()
    }

    /// Top-level named types.
    pub fn roots(&self) -> &BTreeMap<String, TypeRef> {
        &self.roots
    }

    /// Look up a top-level type by name.
    pub fn root(&self, name: &str) -> Option<TypeRef> {
        self.roots.get(name).copied()
    }

    // ---------------------------------------------------------------
    // Nullability
    // ---------------------------------------------------------------

    /// The non-null alternatives of a type.
    ///
    /// `null` yields an empty set, a union yields its non-null members
    /// (nested unions are flattened) and anything else yields itself.
    pub fn non_null_members(&self, r: TypeRef) -> GraphResult<Vec<TypeRef>> {
        let mut members = Vec::new();
        let mut seen = HashSet::new();
        self.collect_non_null(r, &mut members, &mut seen)?;
        Ok(members)
    }

    fn collect_non_null(
        &self,
        r: TypeRef,
        out: &mut Vec<TypeRef>,
        seen: &mut HashSet<TypeRef>,
    ) -> GraphResult<()> {
        if !seen.insert(r) {
            return Ok(());
        }
        match self.resolve(r)? {
            ty if ty.kind().is_null() => {}
            Type::Union(members) => {
                for member in members {
                    self.collect_non_null(*member, out, seen)?;
                }
            }
            _ => out.push(r),
        }
        Ok(())
    }

    /// Returns `true` if the type admits `null`.
    pub fn is_nullable(&self, r: TypeRef) -> bool {
        match self.node(r).map(|n| &n.ty) {
            Some(ty) if ty.kind().is_null() => true,
            Some(Type::Union(members)) => members.iter().any(|m| self.is_nullable(*m)),
            _ => false,
        }
    }

    // ---------------------------------------------------------------
    // Structural equality
    // ---------------------------------------------------------------

    /// Structural equality of two nodes of this graph.
    ///
    /// Name hints are ignored. Recursive types are compared coinductively:
    /// a pair already under comparison is assumed equal.
    pub fn structurally_equal(&self, a: TypeRef, b: TypeRef) -> bool {
        let mut assumed = HashSet::new();
        self.equal_inner(a, b, &mut assumed)
    }

    fn equal_inner(
        &self,
        a: TypeRef,
        b: TypeRef,
        assumed: &mut HashSet<(TypeRef, TypeRef)>,
    ) -> bool {
        if a == b || assumed.contains(&(a, b)) {
            return true;
        }
        let (Some(na), Some(nb)) = (self.node(a), self.node(b)) else {
            return false;
        };
        if na.ty.kind() != nb.ty.kind() {
            return false;
        }
        assumed.insert((a, b));

        match (&na.ty, &nb.ty) {
            (Type::Primitive(x), Type::Primitive(y)) => x == y,
            (Type::String(x), Type::String(y)) => x == y,
            (Type::Formatted(x), Type::Formatted(y)) => x == y,
            (Type::Array(x), Type::Array(y)) | (Type::Map(x), Type::Map(y)) => {
                self.equal_inner(*x, *y, assumed)
            }
            (Type::Record(x), Type::Record(y)) => {
                x.pinned == y.pinned
                    && x.len() == y.len()
                    && x.fields.iter().all(|(name, ta)| match y.field(name) {
                        Some(tb) => self.equal_inner(*ta, tb, assumed),
                        None => false,
                    })
            }
            (Type::Union(xs), Type::Union(ys)) => {
                if xs.len() != ys.len() {
                    return false;
                }
                let by_kind: HashMap<TypeKind, TypeRef> = ys
                    .iter()
                    .filter_map(|m| self.kind(*m).map(|k| (k, *m)))
                    .collect();
                xs.iter().all(|x| {
                    self.kind(*x)
                        .and_then(|k| by_kind.get(&k))
                        .is_some_and(|y| self.equal_inner(*x, *y, assumed))
                })
            }
            _ => false,
        }
    }

    // ---------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------

    /// Check the graph invariants.
    ///
    /// Graphs produced by [`TypeBuilder::finish`](crate::TypeBuilder::finish)
    /// always pass; deserialized graphs may not.
    pub fn validate(&self) -> GraphResult<()> {
        for (r, node) in self.iter() {
            for child in node.ty.children() {
                if child.index() >= self.nodes.len() {
                    return Err(GraphError::DanglingReference {
                        node: r,
                        target: child,
                    });
                }
            }
            if let Type::Union(members) = &node.ty {
                let mut kinds = HashSet::new();
                for member in members {
                    let kind = self.kind(*member).ok_or(GraphError::NodeNotFound(*member))?;
                    if !kinds.insert(kind) {
                        return Err(GraphError::DuplicateUnionKind {
                            union: r,
                            kind: kind.to_string(),
                        });
                    }
                }
            }
        }
        for target in self.roots.values() {
            if target.index() >= self.nodes.len() {
                return Err(GraphError::NodeNotFound(*target));
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------

    /// Compact single-line rendering of a type, for logs and tests.
    ///
    /// Records are written as `{field: type, ...}`, nullable unions as
    /// `type?`, enumerated strings as `enum{value:count,...}`. A record
    /// reached again while it is being rendered prints as its reference.
    pub fn describe(&self, r: TypeRef) -> String {
        let mut stack = Vec::new();
        self.describe_inner(r, &mut stack)
    }

    fn describe_inner(&self, r: TypeRef, stack: &mut Vec<TypeRef>) -> String {
        let Some(node) = self.node(r) else {
            return format!("<missing {r}>");
        };
        match &node.ty {
            Type::Primitive(p) => p.to_string(),
            Type::String(s) => match &s.histogram {
                Some(h) => {
                    let values: Vec<String> = h.iter().map(|(v, c)| format!("{v}:{c}")).collect();
                    format!("enum{{{}}}", values.join(","))
                }
                None => "string".into(),
            },
            Type::Formatted(format) => format.to_string(),
            Type::Array(item) => format!("[{}]", self.describe_inner(*item, stack)),
            Type::Map(value) => format!("map<{}>", self.describe_inner(*value, stack)),
            Type::Record(record) => {
                if stack.contains(&r) {
                    return r.to_string();
                }
                stack.push(r);
                let fields: Vec<String> = record
                    .fields
                    .iter()
                    .map(|(name, ty)| format!("{name}: {}", self.describe_inner(*ty, stack)))
                    .collect();
                stack.pop();
                format!("{{{}}}", fields.join(", "))
            }
            Type::Union(members) => {
                let non_null: Vec<String> = members
                    .iter()
                    .filter(|m| !self.kind(**m).is_some_and(TypeKind::is_null))
                    .map(|m| self.describe_inner(*m, stack))
                    .collect();
                let nullable = non_null.len() < members.len();
                let body = if non_null.len() == 1 {
                    non_null[0].clone()
                } else {
                    format!("({})", non_null.join(" | "))
                };
                if nullable {
                    format!("{body}?")
                } else {
                    body
                }
            }
        }
    }
}
