//! Node construction for one graph generation.
//!
//! [`TypeBuilder`] appends nodes to a fresh arena. Recursive types are built
//! by reserving a forwarding slot first, referring to it from children, and
//! filling it last. [`TypeBuilder::finish`] checks that every slot was filled
//! and every reference resolves before handing out an immutable
//! [`TypeGraph`].

use std::collections::{BTreeMap, HashSet};

use tracing::trace;

use typefold_types::{
    NameHints, PrimitiveKind, RecordType, StringFormat, StringHistogram, StringType,
    StringTypeMapping, Type, TypeKind, TypeRef,
};

use crate::error::{GraphError, GraphResult};
use crate::graph::{TypeGraph, TypeNode};

/// Builder for a new [`TypeGraph`].
#[derive(Debug, Default)]
pub struct TypeBuilder {
    slots: Vec<Option<TypeNode>>,
    roots: BTreeMap<String, TypeRef>,
    mapping: StringTypeMapping,
}

impl TypeBuilder {
    /// A builder that keeps every string format.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder that reconstitutes string formats according to `mapping`.
    pub fn with_mapping(mapping: StringTypeMapping) -> Self {
        Self {
            mapping,
            ..Self::default()
        }
    }

    /// The string format policy in effect.
    pub fn mapping(&self) -> &StringTypeMapping {
        &self.mapping
    }

    /// Number of slots allocated so far, filled or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Kind of an already-filled slot. `None` for reserved or unknown slots.
    pub fn kind_of(&self, r: TypeRef) -> Option<TypeKind> {
        self.get(r).map(|n| n.ty.kind())
    }

    /// The node in a filled slot.
    pub fn get(&self, r: TypeRef) -> Option<&TypeNode> {
        self.slots.get(r.index()).and_then(Option::as_ref)
    }

    // ---------------------------------------------------------------
    // Slots
    // ---------------------------------------------------------------

    /// Reserve an empty slot to be filled later.
    pub fn reserve(&mut self) -> TypeRef {
        let r = TypeRef::new(self.slots.len() as u32);
        self.slots.push(None);
        r
    }

    fn push(&mut self, ty: Type, names: NameHints) -> TypeRef {
        let r = TypeRef::new(self.slots.len() as u32);
        self.slots.push(Some(TypeNode::new(ty, names)));
        r
    }

    fn fill(&mut self, slot: TypeRef, ty: Type, names: NameHints) -> GraphResult<TypeRef> {
        match self.slots.get_mut(slot.index()) {
            None => Err(GraphError::NodeNotFound(slot)),
            Some(Some(_)) => Err(GraphError::SlotAlreadyFilled(slot)),
            Some(entry) => {
                *entry = Some(TypeNode::new(ty, names));
                Ok(slot)
            }
        }
    }

    fn place(
        &mut self,
        ty: Type,
        names: NameHints,
        forwarding: Option<TypeRef>,
    ) -> GraphResult<TypeRef> {
        match forwarding {
            Some(slot) => self.fill(slot, ty, names),
            None => Ok(self.push(ty, names)),
        }
    }

    fn check_ref(&self, r: TypeRef) -> GraphResult<()> {
        if r.index() < self.slots.len() {
            Ok(())
        } else {
            Err(GraphError::NodeNotFound(r))
        }
    }

    /// Apply the string format policy to a node about to be stored.
    fn lower(&self, ty: Type) -> Type {
        match ty {
            Type::Formatted(format) if self.mapping.lowers(format) => Type::plain_string(),
            other => other,
        }
    }

    /// Store a copy of an existing node in a reserved slot, applying the
    /// string format policy. Used by rewrite to carry nodes forward.
    pub(crate) fn copy_into(
        &mut self,
        slot: TypeRef,
        ty: Type,
        names: NameHints,
    ) -> GraphResult<TypeRef> {
        let ty = self.lower(ty);
        self.fill(slot, ty, names)
    }

    // ---------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------

    /// A primitive leaf.
    pub fn new_primitive(&mut self, kind: PrimitiveKind) -> TypeRef {
        self.push(Type::Primitive(kind), NameHints::empty())
    }

    /// A plain string, or an enumerated one when `histogram` is given.
    pub fn new_string(&mut self, names: NameHints, histogram: Option<StringHistogram>) -> TypeRef {
        self.push(Type::String(StringType { histogram }), names)
    }

    /// A transformed string. Lowered to a plain string if the policy says so.
    pub fn new_formatted(&mut self, names: NameHints, format: StringFormat) -> TypeRef {
        let ty = self.lower(Type::Formatted(format));
        self.push(ty, names)
    }

    /// An array of `item`.
    pub fn new_array(&mut self, names: NameHints, item: TypeRef) -> GraphResult<TypeRef> {
        self.check_ref(item)?;
        Ok(self.push(Type::Array(item), names))
    }

    /// A string-keyed map of `value`.
    pub fn new_map(&mut self, names: NameHints, value: TypeRef) -> GraphResult<TypeRef> {
        self.check_ref(value)?;
        Ok(self.push(Type::Map(value), names))
    }

    /// A record. Fills `forwarding` when given, otherwise appends.
    pub fn new_record_type(
        &mut self,
        names: NameHints,
        fields: BTreeMap<String, TypeRef>,
        pinned: bool,
        forwarding: Option<TypeRef>,
    ) -> GraphResult<TypeRef> {
        for ty in fields.values() {
            self.check_ref(*ty)?;
        }
        self.place(Type::Record(RecordType { fields, pinned }), names, forwarding)
    }

    /// A union of `members`.
    ///
    /// Nested unions whose slots are filled are flattened and repeated refs
    /// are dropped. Two members of the same known kind are rejected.
    pub fn new_union(&mut self, names: NameHints, members: Vec<TypeRef>) -> GraphResult<TypeRef> {
        let mut flat = Vec::with_capacity(members.len());
        for member in members {
            self.check_ref(member)?;
            match self.get(member).map(|n| &n.ty) {
                Some(Type::Union(inner)) => flat.extend(inner.iter().copied()),
                _ => flat.push(member),
            }
        }

        let mut seen = HashSet::new();
        flat.retain(|m| seen.insert(*m));

        let mut kinds = HashSet::new();
        for member in &flat {
            if let Some(kind) = self.kind_of(*member) {
                if !kinds.insert(kind) {
                    return Err(GraphError::DuplicateUnionKind {
                        union: TypeRef::new(self.slots.len() as u32),
                        kind: kind.to_string(),
                    });
                }
            }
        }

        Ok(self.push(Type::Union(flat), names))
    }

    /// A type that additionally admits `null`.
    ///
    /// `null` itself and unions that already contain `null` are returned
    /// unchanged. A union without `null` is extended into a new union node;
    /// the original stays in the arena for whoever else refers to it. Anything
    /// else, including reserved slots, is wrapped in a new union with a fresh
    /// `null` member.
    pub fn make_nullable(&mut self, ty: TypeRef, names: NameHints) -> GraphResult<TypeRef> {
        self.check_ref(ty)?;
        let members = match self.get(ty).map(|n| &n.ty) {
            Some(t) if t.kind().is_null() => return Ok(ty),
            Some(Type::Union(members)) => {
                if members.iter().any(|m| self.kind_of(*m).is_some_and(TypeKind::is_null)) {
                    return Ok(ty);
                }
                members.clone()
            }
            _ => vec![ty],
        };

        let null = self.new_primitive(PrimitiveKind::Null);
        let mut all = Vec::with_capacity(members.len() + 1);
        all.push(null);
        all.extend(members);
        trace!(inner = %ty, "wrapping in nullable union");
        self.new_union(names, all)
    }

    /// Register a top-level name.
    pub fn add_root(&mut self, name: impl Into<String>, ty: TypeRef) -> GraphResult<()> {
        self.check_ref(ty)?;
        let name = name.into();
        if self.roots.contains_key(&name) {
            return Err(GraphError::DuplicateRoot(name));
        }
        self.roots.insert(name, ty);
        Ok(())
    }

    /// Seal the arena into an immutable graph.
    pub fn finish(self) -> GraphResult<TypeGraph> {
        let mut nodes = Vec::with_capacity(self.slots.len());
        for (i, slot) in self.slots.into_iter().enumerate() {
            match slot {
                Some(node) => nodes.push(node),
                None => return Err(GraphError::UnfilledSlot(TypeRef::new(i as u32))),
            }
        }
        let graph = TypeGraph::from_parts(nodes, self.roots);
        graph.validate()?;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typefold_types::FormatMapping;

    #[test]
    fn reserved_slot_must_be_filled() {
        let mut b = TypeBuilder::new();
        let slot = b.reserve();
        assert_eq!(b.finish().unwrap_err(), GraphError::UnfilledSlot(slot));
    }

    #[test]
    fn slot_cannot_be_filled_twice() {
        let mut b = TypeBuilder::new();
        let slot = b.reserve();
        b.new_record_type(NameHints::empty(), BTreeMap::new(), false, Some(slot))
            .unwrap();
        let err = b
            .new_record_type(NameHints::empty(), BTreeMap::new(), false, Some(slot))
            .unwrap_err();
        assert_eq!(err, GraphError::SlotAlreadyFilled(slot));
    }

    #[test]
    fn unknown_child_is_rejected() {
        let mut b = TypeBuilder::new();
        let err = b.new_array(NameHints::empty(), TypeRef::new(5)).unwrap_err();
        assert_eq!(err, GraphError::NodeNotFound(TypeRef::new(5)));
    }

    #[test]
    fn union_rejects_repeated_kind() {
        let mut b = TypeBuilder::new();
        let s1 = b.new_string(NameHints::empty(), None);
        let s2 = b.new_string(NameHints::empty(), None);
        assert!(matches!(
            b.new_union(NameHints::empty(), vec![s1, s2]),
            Err(GraphError::DuplicateUnionKind { .. })
        ));
    }

    #[test]
    fn union_flattens_and_dedups() {
        let mut b = TypeBuilder::new();
        let s = b.new_string(NameHints::empty(), None);
        let i = b.new_primitive(PrimitiveKind::Integer);
        let inner = b.new_union(NameHints::empty(), vec![s, i]).unwrap();
        let outer = b.new_union(NameHints::empty(), vec![inner, s]).unwrap();
        let graph = b.finish().unwrap();
        assert_eq!(graph.resolve(outer).unwrap(), &Type::Union(vec![s, i]));
    }

    #[test]
    fn make_nullable_is_idempotent() {
        let mut b = TypeBuilder::new();
        let s = b.new_string(NameHints::empty(), None);
        let once = b.make_nullable(s, NameHints::inferred("name")).unwrap();
        let twice = b.make_nullable(once, NameHints::inferred("name")).unwrap();
        assert_eq!(once, twice);

        let null = b.new_primitive(PrimitiveKind::Null);
        assert_eq!(b.make_nullable(null, NameHints::empty()).unwrap(), null);

        let graph = b.finish().unwrap();
        assert_eq!(graph.names(once).and_then(|n| n.first()), Some("name"));
        assert_eq!(graph.describe(once), "string?");
    }

    #[test]
    fn make_nullable_extends_existing_union() {
        let mut b = TypeBuilder::new();
        let s = b.new_string(NameHints::empty(), None);
        let i = b.new_primitive(PrimitiveKind::Integer);
        let u = b.new_union(NameHints::empty(), vec![s, i]).unwrap();
        let n = b.make_nullable(u, NameHints::empty()).unwrap();
        let graph = b.finish().unwrap();
        assert_eq!(graph.non_null_members(n).unwrap(), vec![s, i]);
        assert!(graph.is_nullable(n));
        assert!(!graph.is_nullable(u));
    }

    #[test]
    fn formatted_strings_follow_mapping() {
        let mapping = StringTypeMapping::new().with(StringFormat::Uuid, FormatMapping::AsString);
        let mut b = TypeBuilder::with_mapping(mapping);
        let uuid = b.new_formatted(NameHints::empty(), StringFormat::Uuid);
        let date = b.new_formatted(NameHints::empty(), StringFormat::Date);
        let graph = b.finish().unwrap();
        assert_eq!(graph.kind(uuid), Some(TypeKind::String));
        assert_eq!(graph.kind(date), Some(TypeKind::Formatted(StringFormat::Date)));
    }

    #[test]
    fn duplicate_roots_are_rejected() {
        let mut b = TypeBuilder::new();
        let r = b
            .new_record_type(NameHints::explicit("Top"), BTreeMap::new(), true, None)
            .unwrap();
        b.add_root("Top", r).unwrap();
        assert_eq!(
            b.add_root("Top", r).unwrap_err(),
            GraphError::DuplicateRoot("Top".into())
        );
    }
}
